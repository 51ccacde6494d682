//! Pattern-based normalization of flattened article text
//!
//! Works on the plaintext produced by [`html_to_text`], not on the DOM, so
//! every stage targets a residual textual artifact of the known source
//! formats: citation brackets, edit-section anchors, media file references,
//! collapsible info panels, relative link prefixes and bullet lines.

use regex_lite::Regex;
use std::sync::OnceLock;

use super::html::{html_to_text, SECTION_DELIMITER};
use crate::types::NormalizedArticle;

/// Phrase that marks a disambiguation page
pub const DISAMBIGUATION_MARKER: &str = "Topics referred to by the same term";

static RE_BRACKETED: OnceLock<Regex> = OnceLock::new();
static RE_EDIT_ANCHOR: OnceLock<Regex> = OnceLock::new();
static RE_MEDIA_FILE: OnceLock<Regex> = OnceLock::new();
static RE_QUICK_FACTS: OnceLock<Regex> = OnceLock::new();
static RE_MORE_INFORMATION: OnceLock<Regex> = OnceLock::new();
static RE_DOT_SLASH: OnceLock<Regex> = OnceLock::new();
static RE_BULLET_LINE: OnceLock<Regex> = OnceLock::new();

/// Converts raw article markup into ordered clean sections
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw HTML markup into sections
    pub fn normalize(&self, markup: &str) -> NormalizedArticle {
        self.normalize_text(&html_to_text(markup))
    }

    /// Normalize text that has already been flattened to plaintext
    pub fn normalize_text(&self, text: &str) -> NormalizedArticle {
        let text = self.remove_bracketed(text);

        let sections = text
            .split(SECTION_DELIMITER)
            .map(|section| self.clean_section(section))
            .collect();

        NormalizedArticle::new(sections)
    }

    /// Check for the disambiguation marker phrase
    pub fn is_disambiguation_like(text: &str) -> bool {
        text.contains(DISAMBIGUATION_MARKER)
    }

    /// Remove `[...]` annotations (citations and rendered link targets)
    fn remove_bracketed(&self, text: &str) -> String {
        let re = RE_BRACKETED.get_or_init(|| Regex::new(r"\[.*?\]").unwrap());
        re.replace_all(text, "").into_owned()
    }

    /// Apply the per-section stripping stages in order
    fn clean_section(&self, section: &str) -> String {
        let mut text = section.to_string();
        text = self.remove_edit_anchors(&text);
        text = self.remove_media_files(&text);
        text = self.remove_quick_facts(&text);
        text = self.remove_more_information(&text);
        text = self.remove_dot_slash_prefixes(&text);
        text = self.remove_bullet_lines(&text);
        text
    }

    /// `/w/index.php?title=X&action=edit&section=N`
    fn remove_edit_anchors(&self, text: &str) -> String {
        let re = RE_EDIT_ANCHOR.get_or_init(|| {
            Regex::new(r"/w/index\.php\?title=.*?&action=edit&section=\d+").unwrap()
        });
        re.replace_all(text, "").into_owned()
    }

    /// `File:Name.jpg` and other image references
    fn remove_media_files(&self, text: &str) -> String {
        let re = RE_MEDIA_FILE.get_or_init(|| {
            Regex::new(r"File:.*?\.(?i:jpe?g|png|gif|svg|webp)").unwrap()
        });
        re.replace_all(text, "").into_owned()
    }

    /// Collapsible `Quick Facts ... Close` panels
    fn remove_quick_facts(&self, text: &str) -> String {
        let re = RE_QUICK_FACTS.get_or_init(|| Regex::new(r"(?s)Quick Facts.*?Close").unwrap());
        re.replace_all(text, "").into_owned()
    }

    /// Collapsible `More information ... Close` panels
    fn remove_more_information(&self, text: &str) -> String {
        let re = RE_MORE_INFORMATION
            .get_or_init(|| Regex::new(r"(?s)More information.*?Close").unwrap());
        re.replace_all(text, "").into_owned()
    }

    /// `./Some_Page#anchor` up to and including the next whitespace
    fn remove_dot_slash_prefixes(&self, text: &str) -> String {
        let re = RE_DOT_SLASH.get_or_init(|| Regex::new(r"\./\S*\s").unwrap());
        re.replace_all(text, "").into_owned()
    }

    /// Lines starting with `*`
    fn remove_bullet_lines(&self, text: &str) -> String {
        let re = RE_BULLET_LINE
            .get_or_init(|| Regex::new(r"(?m)^[ \t]*\*[^\n]*(?:\n|$)").unwrap());
        re.replace_all(text, "").into_owned()
    }
}

/// Normalize raw markup with the default normalizer
pub fn normalize(markup: &str) -> NormalizedArticle {
    TextNormalizer::new().normalize(markup)
}

/// See [`TextNormalizer::is_disambiguation_like`]
pub fn is_disambiguation_like(text: &str) -> bool {
    TextNormalizer::is_disambiguation_like(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new()
    }

    #[test]
    fn test_citation_removed() {
        let article = normalizer().normalize_text("Sancocho is a stew.[12] It is popular.");
        assert_eq!(article.sections, vec!["Sancocho is a stew. It is popular."]);
        assert!(!article.sections[0].contains('['));
        assert!(!article.sections[0].contains(']'));
    }

    #[test]
    fn test_citation_removed_from_markup() {
        let article = normalizer().normalize(
            r##"<p>Sancocho is a stew.<sup><a href="#cite_note-12">[12]</a></sup> It is popular.</p>"##,
        );
        assert_eq!(article.sections, vec!["Sancocho is a stew. It is popular."]);
    }

    #[test]
    fn test_split_on_delimiter_preserves_order() {
        let text = format!("First section{}Second section", SECTION_DELIMITER);
        let article = normalizer().normalize_text(&text);
        assert_eq!(article.sections, vec!["First section", "Second section"]);
    }

    #[test]
    fn test_markup_sections_split() {
        let article = normalizer().normalize("<p>Lead</p><hr><p>Body of the article.</p>");
        assert_eq!(article.len(), 2);
        assert_eq!(article.section(0), Some("Lead"));
        assert_eq!(article.section(1), Some("Body of the article."));
    }

    #[test]
    fn test_quick_facts_removed() {
        let text = "Intro Quick Facts Born, Died ...\nCharles McElroy White\nDied 1977\n\nClose\nRest of text";
        let article = normalizer().normalize_text(text);
        let section = &article.sections[0];
        assert!(!section.contains("Quick Facts"));
        assert!(!section.contains("Charles McElroy White"));
        assert!(!section.contains("Close"));
        assert!(section.starts_with("Intro "));
        assert!(section.ends_with("Rest of text"));
    }

    #[test]
    fn test_quick_facts_is_non_greedy() {
        let text = "A Quick Facts x Close B Quick Facts y Close C";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "A  B  C");
    }

    #[test]
    fn test_more_information_removed() {
        let text = "Album More information Review scores, Source ...\n\nProfessional ratings\n\n\nClose\n\nReleased 1999";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "Album \n\nReleased 1999");
    }

    #[test]
    fn test_edit_anchor_removed() {
        let text = "History/w/index.php?title=David_S._Lewis&action=edit&section=3 Early life";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "History Early life");
    }

    #[test]
    fn test_media_file_removed() {
        let text = "File:Parade_9_May_2015.jpgCadets marched.";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "Cadets marched.");

        let svg = normalizer().normalize_text("Map File:Dominican_Republic.SVG here");
        assert_eq!(svg.sections[0], "Map  here");
    }

    #[test]
    fn test_non_image_file_reference_kept() {
        let article = normalizer().normalize_text("See File:notes.txt for details");
        assert_eq!(article.sections[0], "See File:notes.txt for details");
    }

    #[test]
    fn test_dot_slash_prefix_removed() {
        let text = "Season ./2023_Formula_Drift_season#pcs-ref-back-link-cite_note-19 results";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "Season results");
    }

    #[test]
    fn test_bullet_lines_removed() {
        let text = "Cast\n* Rudee Lipscomb as Marcy\n  * Nested item\nPlot follows";
        let article = normalizer().normalize_text(text);
        assert_eq!(article.sections[0], "Cast\nPlot follows");
    }

    #[test]
    fn test_inline_asterisk_kept() {
        let article = normalizer().normalize_text("Rated 5* by critics");
        assert_eq!(article.sections[0], "Rated 5* by critics");
    }

    #[test]
    fn test_list_markup_removed() {
        let article =
            normalizer().normalize("<p>Cast</p><ul><li>Rudee Lipscomb as Marcy</li></ul><p>Plot</p>");
        assert_eq!(article.sections, vec!["Cast\n\n\nPlot"]);
    }

    #[test]
    fn test_empty_document_yields_single_empty_section() {
        let article = normalizer().normalize("");
        assert_eq!(article.sections, vec![String::new()]);

        let plain = normalizer().normalize_text("");
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn test_disambiguation_marker() {
        assert!(TextNormalizer::is_disambiguation_like(
            "Mercury may refer to: Topics referred to by the same term"
        ));
        assert!(!TextNormalizer::is_disambiguation_like("Mercury is a planet."));
        assert!(!TextNormalizer::is_disambiguation_like("topics referred to by the same term"));
        assert!(is_disambiguation_like("x Topics referred to by the same term y"));
    }

    #[test]
    fn test_mobile_article_layout() {
        let html = r#"
            <html><body>
            <section data-mw-section-id="0">
                <h1>Sancocho</h1>
            </section>
            <section data-mw-section-id="1">
                <p>Sancocho is a traditional soup<sup><a href="./Sancocho#cite_note-1">[1]</a></sup>
                made with <a href="./Meat">meat</a> and root vegetables.</p>
                <ul><li><a href="./Ajiaco">Ajiaco</a></li></ul>
            </section>
            </body></html>
        "#;

        let article = normalize(html);
        assert_eq!(article.len(), 2);
        assert_eq!(article.section(0), Some("Sancocho"));
        let body = article.section(1).unwrap();
        let words = body.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(words, "Sancocho is a traditional soup made with meat and root vegetables.");
        assert!(!body.contains("Ajiaco"));
        assert!(!body.contains('['));
    }
}
