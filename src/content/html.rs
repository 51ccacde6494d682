//! HTML to plaintext conversion
//!
//! Flattens a document into text the normalizer can work on. The output
//! follows a few fixed conventions the normalizer depends on:
//! - hyperlinks render as `text [href]`
//! - list items render as `* item` lines
//! - `<hr>` and every `<section>` after the first content become
//!   [`SECTION_DELIMITER`]
//! - `script`, `style`, `head` and similar elements produce nothing

use scraper::{ElementRef, Html, Node};

/// Horizontal rule rendered between sections
pub const RULE: &str = "--------------------------------------------------------------------------------";

/// Delimiter between sections in flattened text
pub const SECTION_DELIMITER: &str =
    "\n\n--------------------------------------------------------------------------------\n\n";

/// Convert an HTML document into flat plaintext
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut writer = TextWriter::default();
    writer.walk(document.root_element());
    writer.finish()
}

#[derive(Default)]
struct TextWriter {
    out: String,
    /// Newlines owed before the next text
    pending_breaks: usize,
    /// Space owed before the next text
    pending_space: bool,
    /// Section delimiter owed before the next text
    pending_rule: bool,
    list_depth: usize,
    pre_depth: usize,
}

impl TextWriter {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        self.element(child_element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            "script" | "style" | "noscript" | "head" | "template" | "link" | "meta" | "svg" => {}

            "hr" => self.rule(),
            "section" => {
                // The first section is the lead; boundaries come before the rest
                self.rule();
                self.walk(element);
                self.block_break(2);
            }
            "br" => {
                self.pending_breaks += 1;
                self.pending_space = false;
            }

            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "table" | "blockquote" | "figure"
            | "dl" => {
                self.block_break(2);
                self.walk(element);
                self.block_break(2);
            }
            "pre" => {
                self.block_break(2);
                self.pre_depth += 1;
                self.walk(element);
                self.pre_depth -= 1;
                self.block_break(2);
            }
            "ul" | "ol" => {
                self.block_break(if self.list_depth == 0 { 2 } else { 1 });
                self.list_depth += 1;
                self.walk(element);
                self.list_depth -= 1;
                self.block_break(if self.list_depth == 0 { 2 } else { 1 });
            }
            "li" => {
                self.block_break(1);
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.marker(&format!("{}* ", indent));
                self.walk(element);
                self.block_break(1);
            }
            "div" | "article" | "main" | "header" | "footer" | "aside" | "nav" | "tr" | "dt"
            | "dd" | "figcaption" | "details" | "summary" | "address" | "caption" => {
                self.block_break(1);
                self.walk(element);
                self.block_break(1);
            }
            "td" | "th" => {
                self.pending_space = true;
                self.walk(element);
                self.pending_space = true;
            }

            "a" => {
                let start = self.out.len();
                self.walk(element);
                if let Some(href) = element.value().attr("href") {
                    let href = href.trim();
                    let label = self.out.get(start..).unwrap_or_default().trim();
                    if !href.is_empty() && !href.starts_with('#') && label != href {
                        self.pending_space = !label.is_empty();
                        self.text(&format!("[{}]", href));
                    }
                }
            }
            "img" => {
                if let Some(alt) = element.value().attr("alt") {
                    self.text(alt);
                }
                if let Some(src) = element.value().attr("src") {
                    if !src.trim().is_empty() {
                        self.pending_space = true;
                        self.text(&format!("[{}]", src.trim()));
                    }
                }
            }

            _ => self.walk(element),
        }
    }

    /// Write text, collapsing whitespace outside `<pre>`
    fn text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            if !text.is_empty() {
                self.flush();
                self.out.push_str(text);
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }

        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.flush();
            self.out.push_str(word);
            if words.peek().is_some() {
                self.pending_space = true;
            }
        }

        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    /// Write a list marker right at the current position
    fn marker(&mut self, marker: &str) {
        self.flush();
        self.out.push_str(marker);
        self.pending_space = false;
    }

    /// Emit owed separators ahead of new content
    fn flush(&mut self) {
        if self.out.is_empty() {
            self.pending_breaks = 0;
            self.pending_space = false;
            self.pending_rule = false;
            return;
        }

        if self.pending_rule {
            let trimmed = self.out.trim_end().len();
            self.out.truncate(trimmed);
            self.out.push_str(SECTION_DELIMITER);
        } else if self.pending_breaks > 0 {
            let trimmed = self.out.trim_end_matches([' ', '\t']).len();
            self.out.truncate(trimmed);
            let owed = self.pending_breaks.min(2);
            let existing = self.out.len() - self.out.trim_end_matches('\n').len();
            for _ in existing..owed {
                self.out.push('\n');
            }
        } else if self.pending_space && !self.out.ends_with([' ', '\n']) {
            self.out.push(' ');
        }

        self.pending_rule = false;
        self.pending_breaks = 0;
        self.pending_space = false;
    }

    fn block_break(&mut self, newlines: usize) {
        self.pending_breaks = self.pending_breaks.max(newlines);
        self.pending_space = false;
    }

    fn rule(&mut self) {
        self.pending_rule = true;
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let text = html_to_text("<html><body><p>First  paragraph</p><p>Second\nparagraph</p></body></html>");
        assert_eq!(text, "First paragraph\n\nSecond paragraph");
    }

    #[test]
    fn test_links_render_href_in_brackets() {
        let text = html_to_text(r#"<p>See <a href="./Sancocho">the stew</a> for more.</p>"#);
        assert_eq!(text, "See the stew [./Sancocho] for more.");
    }

    #[test]
    fn test_fragment_links_render_label_only() {
        let text = html_to_text(r##"<p>Note<a href="#cite_note-1">1</a></p>"##);
        assert_eq!(text, "Note1");
    }

    #[test]
    fn test_list_items_render_as_bullets() {
        let text = html_to_text("<p>Cast</p><ul><li>Rudee Lipscomb as Marcy</li><li>Other</li></ul><p>After</p>");
        assert_eq!(text, "Cast\n\n* Rudee Lipscomb as Marcy\n* Other\n\nAfter");
    }

    #[test]
    fn test_rule_becomes_section_delimiter() {
        let text = html_to_text("<p>Lead</p><hr><p>Body</p>");
        assert_eq!(text, format!("Lead{}Body", SECTION_DELIMITER));
    }

    #[test]
    fn test_sections_become_delimited_blocks() {
        let html = "<body><section><p>Lead</p></section><section><h2>History</h2><p>Body</p></section></body>";
        let text = html_to_text(html);
        let parts: Vec<&str> = text.split(SECTION_DELIMITER).collect();
        assert_eq!(parts, vec!["Lead", "History\n\nBody"]);
    }

    #[test]
    fn test_leading_and_trailing_rules_are_dropped() {
        let text = html_to_text("<hr><p>Only</p><hr><hr>");
        assert_eq!(text, "Only");
    }

    #[test]
    fn test_scripts_and_styles_are_skipped() {
        let text = html_to_text("<html><head><title>T</title><style>p{}</style></head><body><script>x()</script><p>Visible</p></body></html>");
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_images_render_source_in_brackets() {
        let text = html_to_text(r#"<p>Before <img src="./File:Map.svg" alt="Map"> after</p>"#);
        assert_eq!(text, "Before Map [./File:Map.svg] after");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html_to_text(""), "");
    }
}
