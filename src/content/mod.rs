//! Content normalization
//!
//! Turns raw article markup into ordered plain-text sections:
//!
//! ```text
//! HTML ──html_to_text──▶ flat text ──strip [..]──▶ split on rule ──per-section patterns──▶ sections
//! ```

mod html;
mod normalize;

pub use html::{html_to_text, RULE, SECTION_DELIMITER};
pub use normalize::{is_disambiguation_like, normalize, TextNormalizer, DISAMBIGUATION_MARKER};
