//! Configuration for corpus-acquire

mod http;
mod logging;
mod pull;
mod site;

pub use http::HttpConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use pull::{PullConfig, SamplerConfig, TITLE_PLACEHOLDER};
pub use site::{IndexLevels, SiteConfig, TraversalConfig, BUCKET_PLACEHOLDER, ID_PLACEHOLDER};

use anyhow::{Context, Result};
use regex_lite::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default user agent for all HTTP requests
pub const DEFAULT_USER_AGENT: &str = "CorpusAcquireBot/0.1 (+https://github.com/corpus-acquire)";

/// Upper bound for `pull.concurrency`
pub const MAX_CONCURRENCY: usize = 64;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Content site configuration
    #[serde(default)]
    pub site: SiteConfig,
    /// Index traversal configuration
    #[serde(default)]
    pub traversal: TraversalConfig,
    /// Resumable pull configuration
    #[serde(default)]
    pub pull: PullConfig,
    /// Random sampler configuration
    #[serde(default)]
    pub sampler: SamplerConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Validate all configuration fields.
    ///
    /// Every problem is collected and reported in one error.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // HTTP validation
        if self.http.timeout_secs == 0 {
            errors.push("http.timeout_secs must be positive".to_string());
        }
        if self.http.connect_timeout_secs == 0 {
            errors.push("http.connect_timeout_secs must be positive".to_string());
        }
        if self.http.user_agent.trim().is_empty() {
            errors.push("http.user_agent must not be empty".to_string());
        }
        if self.http.max_content_size == 0 {
            errors.push("http.max_content_size must be positive".to_string());
        }

        // Site validation
        check_url(&mut errors, "site.base_url", &self.site.base_url);
        check_template(
            &mut errors,
            "site.bucket_url_template",
            &self.site.bucket_url_template,
            BUCKET_PLACEHOLDER,
        );
        if let Some(template) = &self.site.print_url_template {
            check_template(&mut errors, "site.print_url_template", template, ID_PLACEHOLDER);
        }
        match Regex::new(&self.site.topic_id_pattern) {
            Ok(re) if re.captures_len() < 2 => {
                errors.push("site.topic_id_pattern must contain a capture group".to_string());
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("site.topic_id_pattern is not a valid regex: {}", e)),
        }

        // Traversal validation
        if self.traversal.buckets.is_empty() {
            errors.push("traversal.buckets must not be empty".to_string());
        }
        if self.traversal.buckets.iter().any(|b| b.trim().is_empty()) {
            errors.push("traversal.buckets must not contain empty keys".to_string());
        }
        check_selector(
            &mut errors,
            "traversal.sub_index_container",
            &self.traversal.sub_index_container,
        );
        check_selector(
            &mut errors,
            "traversal.article_container",
            &self.traversal.article_container,
        );

        // Pull validation
        if self.pull.concurrency == 0 || self.pull.concurrency > MAX_CONCURRENCY {
            errors.push(format!(
                "pull.concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.pull.concurrency
            ));
        }

        // Sampler validation
        check_url(&mut errors, "sampler.random_api_url", &self.sampler.random_api_url);
        check_template(
            &mut errors,
            "sampler.article_url_template",
            &self.sampler.article_url_template,
            TITLE_PLACEHOLDER,
        );
        if self.sampler.max_attempts == Some(0) {
            errors.push("sampler.max_attempts must be positive when set".to_string());
        }
        if self.sampler.timeout_secs == Some(0) {
            errors.push("sampler.timeout_secs must be positive when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

fn check_url(errors: &mut Vec<String>, field: &str, value: &str) {
    if let Err(e) = Url::parse(value) {
        errors.push(format!("{} is not a valid URL ({}): {}", field, e, value));
    }
}

fn check_template(errors: &mut Vec<String>, field: &str, template: &str, placeholder: &str) {
    if !template.contains(placeholder) {
        errors.push(format!("{} must contain {}", field, placeholder));
        return;
    }
    check_url(errors, field, &template.replace(placeholder, "x"));
}

fn check_selector(errors: &mut Vec<String>, field: &str, selector: &str) {
    if Selector::parse(selector).is_err() {
        errors.push(format!("{} is not a valid CSS selector: {}", field, selector));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Helper: build a valid default config for mutation-based testing
    // ========================================================================

    fn valid_config() -> Config {
        Config::default()
    }

    fn assert_rejected(cfg: &Config, expected: &str) {
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "unexpected error message: {}",
            err
        );
    }

    // ========================================================================
    // Config::validate – happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate – pull and sampler
    // ========================================================================

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut cfg = valid_config();
        cfg.pull.concurrency = 0;
        assert_rejected(&cfg, "pull.concurrency must be between 1 and 64");
    }

    #[test]
    fn validate_rejects_excessive_concurrency() {
        let mut cfg = valid_config();
        cfg.pull.concurrency = 65;
        assert_rejected(&cfg, "pull.concurrency must be between 1 and 64, got 65");
    }

    #[test]
    fn validate_accepts_max_concurrency() {
        let mut cfg = valid_config();
        cfg.pull.concurrency = MAX_CONCURRENCY;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_max_attempts() {
        let mut cfg = valid_config();
        cfg.sampler.max_attempts = Some(0);
        assert_rejected(&cfg, "sampler.max_attempts must be positive");
    }

    #[test]
    fn validate_rejects_template_without_placeholder() {
        let mut cfg = valid_config();
        cfg.sampler.article_url_template = "https://en.wikipedia.org/wiki/".to_string();
        assert_rejected(&cfg, "sampler.article_url_template must contain {title}");
    }

    // ========================================================================
    // Config::validate – site and traversal
    // ========================================================================

    #[test]
    fn validate_rejects_invalid_base_url() {
        let mut cfg = valid_config();
        cfg.site.base_url = "not a url".to_string();
        assert_rejected(&cfg, "site.base_url is not a valid URL");
    }

    #[test]
    fn validate_rejects_pattern_without_capture_group() {
        let mut cfg = valid_config();
        cfg.site.topic_id_pattern = r"data-topic-id=\d+".to_string();
        assert_rejected(&cfg, "site.topic_id_pattern must contain a capture group");
    }

    #[test]
    fn validate_accepts_missing_print_template() {
        let mut cfg = valid_config();
        cfg.site.print_url_template = None;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_buckets() {
        let mut cfg = valid_config();
        cfg.traversal.buckets.clear();
        assert_rejected(&cfg, "traversal.buckets must not be empty");
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut cfg = valid_config();
        cfg.traversal.article_container = "main >> ul[".to_string();
        assert_rejected(&cfg, "traversal.article_container is not a valid CSS selector");
    }

    // ========================================================================
    // Config::validate – multiple errors collected
    // ========================================================================

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.http.timeout_secs = 0;
        cfg.pull.concurrency = 0;
        cfg.traversal.buckets.clear();
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("Configuration validation failed"));
        assert!(msg.contains("http.timeout_secs must be positive"));
        assert!(msg.contains("pull.concurrency"));
        assert!(msg.contains("traversal.buckets"));
    }

    // ========================================================================
    // Config::load / TOML
    // ========================================================================

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: Config = toml::from_str("[pull]\nconcurrency = 8\n").unwrap();
        assert_eq!(cfg.pull.concurrency, 8);
        assert_eq!(cfg.sampler.section_index, 1);
        assert_eq!(cfg.traversal.buckets.len(), 26);
        assert_eq!(cfg.traversal.levels, IndexLevels::TwoLevel);
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn default_toml_round_trips() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.site.print_url_template, Config::default().site.print_url_template);
        assert_eq!(parsed.traversal.bucket_delay_ms, 5000);
    }

    #[test]
    fn load_reports_validation_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pull]\nconcurrency = 0\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("pull.concurrency"));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.pull.concurrency, 4);
    }

    #[test]
    fn single_level_parses() {
        let cfg: Config = toml::from_str("[traversal]\nlevels = \"single_level\"\n").unwrap();
        assert_eq!(cfg.traversal.levels, IndexLevels::SingleLevel);
    }
}
