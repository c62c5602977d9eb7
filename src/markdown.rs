//! Converts page bodies to HTML. The source format is chosen strictly by file
//! extension: `.md` bodies go through [`pulldown_cmark`] with tables,
//! typographic punctuation, and hard line breaks enabled; `.html` bodies are
//! passed through verbatim.
//!
//! Neither path sanitizes anything. Raw HTML (whether embedded in markdown or
//! in an `.html` page) reaches the output template untouched, so only trusted,
//! locally authored content should be fed through here.

use pulldown_cmark::{html, Event, Options, Parser};
use std::fmt;

/// The file extensions (without the dot) that name content files.
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "html"];

/// The format of a page body, derived from its source file's extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Html,
}

impl SourceFormat {
    /// Picks the format for an extension (without the dot).
    pub fn from_extension(extension: &str) -> Result<SourceFormat, UnsupportedContentType> {
        match extension {
            "md" => Ok(SourceFormat::Markdown),
            "html" => Ok(SourceFormat::Html),
            _ => Err(UnsupportedContentType(extension.to_owned())),
        }
    }
}

/// Renders page bodies. Constructed once per build and shared by reference.
pub struct ContentRenderer {
    options: Options,
    hard_breaks: bool,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        ContentRenderer {
            options,
            hard_breaks: true,
        }
    }
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `body` to HTML according to `format`.
    pub fn render(&self, format: SourceFormat, body: &str) -> String {
        match format {
            SourceFormat::Html => body.to_owned(),
            SourceFormat::Markdown => self.render_markdown(body),
        }
    }

    fn render_markdown(&self, markdown: &str) -> String {
        let hard_breaks = self.hard_breaks;
        let events = Parser::new_ext(markdown, self.options).map(|ev| match ev {
            // Every newline inside a paragraph becomes a `<br />`.
            Event::SoftBreak if hard_breaks => Event::HardBreak,
            _ => ev,
        });
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

/// Returned for content files whose extension isn't in [`CONTENT_EXTENSIONS`].
/// Pages that fail this way are skipped rather than aborting the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedContentType(pub String);

impl fmt::Display for UnsupportedContentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "unsupported content type: file has no extension")
        } else {
            write!(f, "unsupported content type `.{}`", self.0)
        }
    }
}

impl std::error::Error for UnsupportedContentType {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Ok(SourceFormat::Markdown), SourceFormat::from_extension("md"));
        assert_eq!(Ok(SourceFormat::Html), SourceFormat::from_extension("html"));
        assert_eq!(
            Err(UnsupportedContentType(String::from("txt"))),
            SourceFormat::from_extension("txt")
        );
    }

    #[test]
    fn test_html_passes_through() {
        let body = "<div class=\"raw\"><script>x()</script></div>\n";
        assert_eq!(body, ContentRenderer::new().render(SourceFormat::Html, body));
    }

    #[test]
    fn test_markdown_hard_breaks() {
        let html = ContentRenderer::new().render(SourceFormat::Markdown, "one\ntwo\n");
        assert_eq!("<p>one<br />\ntwo</p>\n", html);
    }

    #[test]
    fn test_markdown_tables_and_punctuation() {
        let renderer = ContentRenderer::new();
        let table = renderer.render(SourceFormat::Markdown, "| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(table.contains("<table>"));
        assert!(table.contains("<td>1</td>"));

        let quoted = renderer.render(SourceFormat::Markdown, "\"quoted\" -- dash\n");
        assert!(quoted.contains('\u{201c}'));
        assert!(quoted.contains('\u{2013}'));
    }
}
