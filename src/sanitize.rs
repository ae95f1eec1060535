// Paste Sanitization
// Best-effort textual attribute stripping for pasted HTML, plus the
// markup generators for plain-text paste and list creation.
// This is not a hardened sanitizer: it never parses, and it never fails.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::commands::ListKind;
use crate::dom::node::escape_text;

static OPENING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(\w+)([^>]*?)>").expect("opening tag pattern is valid"));

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=["']([^"']*)["']"#).expect("href pattern is valid"));

/// Strip every attribute from every opening tag, except `href` on anchors.
///
/// Closing tags, comments and text pass through unchanged. A tag whose
/// attributes cannot be understood is emitted bare.
pub fn clean(html: &str) -> String {
    OPENING_TAG
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[1];
            let attributes = &caps[2];
            if tag.eq_ignore_ascii_case("a")
                && attributes.contains("href=")
                && let Some(href) = HREF.captures(attributes)
            {
                return format!("<{tag} href=\"{}\">", &href[1]);
            }
            format!("<{tag}>")
        })
        .into_owned()
}

/// Convert plain text into paragraphs: blank lines separate paragraphs,
/// remaining newlines become `<br>`. Paragraphs that are blank after
/// trimming are dropped.
pub fn plain_text_to_html(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.split("\n\n")
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(|para| format!("<p>{}</p>", escape_text(para).replace('\n', "<br>")))
        .collect()
}

/// Build a list from selected text, one item per non-blank line
pub fn list_markup(kind: ListKind, selected: &str) -> String {
    let tag = kind.tag();
    let items: String = selected
        .split('\n')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| format!("<li>{}</li>", escape_text(item)))
        .collect();
    format!("<{tag}>{items}</{tag}>")
}

/// A single empty item the user can type into
pub fn empty_list_markup(kind: ListKind) -> String {
    let tag = kind.tag();
    format!("<{tag}><li></li></{tag}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_attributes() {
        assert_eq!(
            clean(r#"<p style="color:red" class="a">hi</p>"#),
            "<p>hi</p>"
        );
    }

    #[test]
    fn test_clean_keeps_link_href() {
        assert_eq!(
            clean(r#"<a href="https://x.com" target="_blank">go</a>"#),
            r#"<a href="https://x.com">go</a>"#
        );
        assert_eq!(
            clean("<A class='x' href='/local'>go</A>"),
            r#"<A href="/local">go</A>"#
        );
    }

    #[test]
    fn test_clean_drops_everything_else() {
        assert_eq!(
            clean(r#"<img src="x.png" onerror="alert(1)"><span id="s" onclick="y()">t</span>"#),
            "<img><span>t</span>"
        );
        assert_eq!(clean("<a name=\"top\">anchor</a>"), "<a>anchor</a>");
    }

    #[test]
    fn test_clean_tolerates_malformed_markup() {
        assert_eq!(clean("<b>unclosed <i"), "<b>unclosed <i");
        assert_eq!(clean("<a href=>x</a>"), "<a>x</a>");
        assert_eq!(clean("1 < 2 > 0"), "1 < 2 > 0");
        assert_eq!(clean("<br/>"), "<br>");
    }

    #[test]
    fn test_clean_attribute_containing_angle_bracket() {
        // Best effort: the tag ends at the first `>`
        assert_eq!(clean(r#"<p title="a>b">x</p>"#), r#"<p>b">x</p>"#);
    }

    #[test]
    fn test_plain_text_paragraphs() {
        assert_eq!(
            plain_text_to_html("line1\nline2\n\nline3"),
            "<p>line1<br>line2</p><p>line3</p>"
        );
        assert_eq!(plain_text_to_html("\n\n  \n\n\n"), "");
        assert_eq!(plain_text_to_html("a < b"), "<p>a &lt; b</p>");
        assert_eq!(plain_text_to_html("one\r\n\r\ntwo"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_list_markup() {
        assert_eq!(
            list_markup(ListKind::Unordered, "a\nb\n\nc"),
            "<ul><li>a</li><li>b</li><li>c</li></ul>"
        );
        assert_eq!(
            list_markup(ListKind::Ordered, "  first \n second"),
            "<ol><li>first</li><li>second</li></ol>"
        );
        assert_eq!(empty_list_markup(ListKind::Unordered), "<ul><li></li></ul>");
    }
}
