//! XHTML to plain text
//!
//! Walks the `quick-xml` event stream of a chapter. Tags and comments are
//! dropped, `<head>`, `<script>` and `<style>` are dropped with their
//! content, block-level elements become line breaks and character
//! entities are decoded. Runs of whitespace inside a line collapse to one
//! space; at most one blank line separates blocks. Markup that stops
//! parsing keeps the text read up to that point.

use log::debug;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Elements whose start or end ends the current line
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "br",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "tr",
    "blockquote",
    "section",
    "article",
    "ul",
    "ol",
    "table",
    "hr",
];

/// Elements dropped together with their content
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style"];

/// Extract readable text from an XHTML document
///
/// ```
/// use lume::reader::markup::strip_markup;
///
/// let html = "<html><head><title>x</title></head>\
///             <body><h1>One</h1><p>Fish &amp; chips</p></body></html>";
/// assert_eq!(strip_markup(html), "One\n\nFish & chips");
/// ```
pub fn strip_markup(html: &str) -> String {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    // Chapters are often sloppy XHTML: `<br>` without `/`, stray end tags.
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut out = TextSink::default();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if is_one_of(name.as_ref(), SKIPPED_ELEMENTS) {
                    skip_depth += 1;
                } else if skip_depth == 0 && is_one_of(name.as_ref(), BLOCK_ELEMENTS) {
                    out.line_break();
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if is_one_of(name.as_ref(), SKIPPED_ELEMENTS) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 && is_one_of(name.as_ref(), BLOCK_ELEMENTS) {
                    out.line_break();
                }
            }
            Ok(Event::Empty(e)) => {
                if skip_depth == 0 && is_one_of(e.local_name().as_ref(), BLOCK_ELEMENTS) {
                    out.line_break();
                }
            }
            Ok(Event::Text(e)) if skip_depth == 0 => {
                match e.unescape_with(resolve_entity) {
                    Ok(text) => out.push_str(&text),
                    // Undefined or bare `&`: decode what we can, keep the rest.
                    Err(_) => match reader.decoder().decode(&e) {
                        Ok(raw) => out.push_str(&unescape_lenient(&raw)),
                        Err(err) => debug!("undecodable text run: {err}"),
                    },
                }
            }
            Ok(Event::CData(e)) if skip_depth == 0 => match reader.decoder().decode(&e) {
                Ok(text) => out.push_str(&text),
                Err(err) => debug!("undecodable CDATA: {err}"),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(
                    "markup error at byte {}, keeping text so far: {err}",
                    reader.error_position()
                );
                break;
            }
        }
    }

    out.finish()
}

fn is_one_of(name: &[u8], set: &[&str]) -> bool {
    set.iter().any(|candidate| name.eq_ignore_ascii_case(candidate.as_bytes()))
}

/// XML's predefined entities plus the HTML ones common in books
fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| match name {
        "nbsp" => Some("\u{a0}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "hellip" => Some("\u{2026}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "copy" => Some("\u{a9}"),
        _ => None,
    })
}

/// Unescape reference by reference, leaving unknown ones as written
fn unescape_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let reference = tail.find(';').map(|end| &tail[..=end]);
        match reference.and_then(|r| unescape_with(r, resolve_entity).ok().map(|t| (r, t))) {
            Some((reference, text)) => {
                out.push_str(&text);
                rest = &tail[reference.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Accumulates text, collapsing whitespace and blank lines
#[derive(Default)]
struct TextSink {
    text: String,
    pending_space: bool,
    /// Line breaks owed before the next character (capped at 2)
    pending_breaks: u8,
}

impl TextSink {
    fn push(&mut self, c: char) {
        if c.is_whitespace() {
            self.pending_space = true;
            return;
        }
        if !self.text.is_empty() {
            if self.pending_breaks > 0 {
                for _ in 0..self.pending_breaks {
                    self.text.push('\n');
                }
            } else if self.pending_space {
                self.text.push(' ');
            }
        }
        self.pending_breaks = 0;
        self.pending_space = false;
        self.text.push(c);
    }

    fn push_str(&mut self, text: &str) {
        for c in text.chars() {
            self.push(c);
        }
    }

    fn line_break(&mut self) {
        self.pending_breaks = (self.pending_breaks + 1).min(2);
        self.pending_space = false;
    }

    fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_tags_and_keeps_inline_text() {
        assert_eq!(
            strip_markup("<p>Hello <em>brave</em> <b>new</b> world</p>"),
            "Hello brave new world"
        );
    }

    #[test]
    fn test_block_elements_break_lines() {
        assert_eq!(
            strip_markup("<div>one</div><div>two</div><p>three<br/>four</p>"),
            "one\n\ntwo\n\nthree\nfour"
        );
    }

    #[test]
    fn test_skips_head_script_and_style() {
        let html = "<html><head><title>T</title><style>p{}</style></head>\
                    <body><script>var x = 1 &lt; 2;</script><p>body</p></body></html>";
        assert_eq!(strip_markup(html), "body");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(strip_markup("a<!-- <p>hidden</p> -->b"), "ab");
    }

    #[test]
    fn test_entities() {
        assert_eq!(
            strip_markup("&lt;tag&gt; &quot;q&quot; &apos;a&apos; &#65;&#x42;&#x43;"),
            "<tag> \"q\" 'a' ABC"
        );
    }

    #[test]
    fn test_nbsp_becomes_space() {
        assert_eq!(strip_markup("a&nbsp;b&#160;c"), "a b c");
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        assert_eq!(strip_markup("fish &chips; & peas"), "fish &chips; & peas");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(strip_markup("<p>  a \n\t b  </p>"), "a b");
    }

    #[test]
    fn test_uppercase_tags() {
        assert_eq!(strip_markup("<P>x</P><SCRIPT>y</SCRIPT><P>z</P>"), "x\n\nz");
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(strip_markup("<p>Ça va, très bien</p>"), "Ça va, très bien");
    }

    #[test]
    fn test_unterminated_tag_drops_rest() {
        assert_eq!(strip_markup("text<p class="), "text");
    }

    #[test]
    fn test_unclosed_br_still_breaks() {
        assert_eq!(strip_markup("<p>one<br>two</p><p>three</p>"), "one\ntwo\n\nthree");
    }

    #[test]
    fn test_nested_skipped_elements() {
        let html = "<head><style>a</style><title>t</title></head><div>kept</div>";
        assert_eq!(strip_markup(html), "kept");
    }

    #[test]
    fn test_html_entities_and_cdata() {
        assert_eq!(
            strip_markup("<p>wait&hellip; <![CDATA[a < b]]></p>"),
            "wait\u{2026} a < b"
        );
    }

    #[test]
    fn test_xml_prolog_and_doctype_ignored() {
        let html = "<?xml version=\"1.0\"?><!DOCTYPE html><html><body><p>hi</p></body></html>";
        assert_eq!(strip_markup(html), "hi");
    }
}
