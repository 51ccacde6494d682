//! Terminal progress for long runs

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use crate::util::truncate_str;

/// Progress bar that is absent in quiet mode
pub struct RunProgress {
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
}

impl RunProgress {
    /// Bar for `total` items
    pub fn new(total: u64, quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
        }
    }

    /// Record one finished item
    pub fn advance(&self, label: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                pb.position() as f64 / elapsed
            } else {
                0.0
            };
            pb.set_message(format!("{:.1}/s | {}", rate, truncate_str(label, 40)));
        }
    }

    pub fn finish(&self, message: impl Into<String>) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.into());
        }
    }
}
