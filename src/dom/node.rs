// Document Node Tree
// The in-memory representation of the live editable fragment.
// HTML is only the serialization format; editing works on this tree.

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements treated as block containers for selection text and block commands.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tr",
    "ul",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// An element with a lower-case tag name, ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        is_void(&self.tag)
    }

    pub fn is_block(&self) -> bool {
        is_block(&self.tag)
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    /// Open tag including attributes, e.g. `<a href="x">`
    pub fn open_tag(&self) -> String {
        let mut out = String::new();
        self.write_open_tag(&mut out);
        out
    }

    /// Markup for this element wrapped around plain `text`, ignoring existing children
    pub fn markup_around(&self, text: &str) -> String {
        let mut out = self.open_tag();
        out.push_str(&escape_text(text));
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        out
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
    }

    fn write_html(&self, out: &mut String) {
        self.write_open_tag(out);
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// A node of the editable fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(Element::new(tag))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn is_block(&self) -> bool {
        self.as_element().is_some_and(Element::is_block)
    }

    /// Number of offsets inside this node: bytes for text, children for elements
    pub fn len(&self) -> usize {
        match self {
            Node::Text(text) => text.len(),
            Node::Element(el) => el.children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(el) => el.write_html(out),
        }
    }
}

/// Serialize a list of sibling nodes, the equivalent of `innerHTML`
pub fn serialize_children(children: &[Node]) -> String {
    let mut out = String::new();
    for child in children {
        child.write_html(&mut out);
    }
    out
}

/// Escape text content for HTML output
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_nested() {
        let p = Element::new("P").with_children(vec![
            Node::text("a "),
            Node::Element(Element::new("b").with_children(vec![Node::text("x")])),
            Node::element("br"),
        ]);
        assert_eq!(Node::Element(p).to_html(), "<p>a <b>x</b><br></p>");
    }

    #[test]
    fn test_escaping() {
        let a = Element::new("a")
            .with_attr("href", "x?a=1&b=\"2\"")
            .with_children(vec![Node::text("1 < 2 & 3")]);
        assert_eq!(
            Node::Element(a).to_html(),
            "<a href=\"x?a=1&amp;b=&quot;2&quot;\">1 &lt; 2 &amp; 3</a>"
        );
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut el = Element::new("div").with_attr("style", "a");
        el.set_attr("STYLE", "b");
        assert_eq!(el.attrs, vec![("style".to_string(), "b".to_string())]);
        assert_eq!(el.attr("style"), Some("b"));
    }

    #[test]
    fn test_block_classification() {
        assert!(is_block("h2"));
        assert!(!is_block("b"));
        assert!(is_void("br"));
        assert!(!is_void("p"));
    }
}
