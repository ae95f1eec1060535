// Fragment Parser
// Tolerant HTML fragment parsing into the node tree.
// Never fails: unknown constructs degrade to text, stray closing tags are dropped.

use super::node::{Element, Node, is_void};

enum Token {
    Start {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End(String),
    Skip,
}

/// Parse an HTML fragment, the equivalent of assigning `innerHTML`
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        if rest.starts_with('<') {
            match read_tag(rest) {
                Some((token, consumed)) => {
                    builder.push_token(token);
                    rest = &rest[consumed..];
                }
                None => {
                    builder.push_text("<");
                    rest = &rest[1..];
                }
            }
            continue;
        }

        let end = rest.find('<').unwrap_or(rest.len());
        builder.push_text(&decode_entities(&rest[..end]));
        rest = &rest[end..];
    }

    builder.finish()
}

struct TreeBuilder {
    // Bottom of the stack is the fragment root
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            stack: vec![Element::new("#fragment")],
        }
    }

    fn current(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let current = self.current();
        if let Some(Node::Text(prev)) = current.children.last_mut() {
            prev.push_str(text);
        } else {
            current.children.push(Node::text(text));
        }
    }

    fn push_token(&mut self, token: Token) {
        match token {
            Token::Start {
                tag,
                attrs,
                self_closing,
            } => {
                let mut element = Element::new(tag);
                element.attrs = attrs;
                if self_closing || is_void(&element.tag) {
                    self.current().children.push(Node::Element(element));
                } else {
                    self.stack.push(element);
                }
            }
            Token::End(tag) => {
                let Some(depth) = self.stack.iter().skip(1).rposition(|el| el.tag == tag) else {
                    return;
                };
                // rposition over skip(1) is relative to index 1
                let target = depth + 1;
                while self.stack.len() > target {
                    self.close_current();
                }
            }
            Token::Skip => {}
        }
    }

    fn close_current(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            self.current().children.push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.close_current();
        }
        self.stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default()
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

/// Read one tag starting at `<`. Returns the token and the number of bytes consumed,
/// or `None` when the input is not a complete tag.
fn read_tag(input: &str) -> Option<(Token, usize)> {
    let bytes = input.as_bytes();
    match *bytes.get(1)? {
        b'/' => {
            let name_len = bytes[2..].iter().take_while(|b| is_name_byte(**b)).count();
            if name_len == 0 {
                return None;
            }
            let close = input[2..].find('>')? + 2;
            let tag = input[2..2 + name_len].to_ascii_lowercase();
            Some((Token::End(tag), close + 1))
        }
        b'!' | b'?' => {
            let close = input.find('>')?;
            Some((Token::Skip, close + 1))
        }
        b if b.is_ascii_alphabetic() => read_start_tag(input),
        _ => None,
    }
}

fn read_start_tag(input: &str) -> Option<(Token, usize)> {
    let bytes = input.as_bytes();
    let name_len = bytes[1..].iter().take_while(|b| is_name_byte(**b)).count();
    let tag = input[1..1 + name_len].to_ascii_lowercase();
    let mut pos = 1 + name_len;
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match *bytes.get(pos)? {
            b'>' => {
                return Some((
                    Token::Start {
                        tag,
                        attrs,
                        self_closing,
                    },
                    pos + 1,
                ));
            }
            b'/' => {
                self_closing = true;
                pos += 1;
                continue;
            }
            _ => {}
        }
        self_closing = false;

        let name_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let name = input[name_start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let mut value = String::new();
        if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match *bytes.get(pos)? {
                quote @ (b'"' | b'\'') => {
                    let start = pos + 1;
                    let len = input[start..].find(quote as char)?;
                    value = decode_entities(&input[start..start + len]);
                    pos = start + len + 1;
                }
                _ => {
                    let start = pos;
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>'
                    {
                        pos += 1;
                    }
                    value = decode_entities(&input[start..pos]);
                }
            }
        }

        if !name.is_empty() && !attrs.iter().any(|(n, _)| *n == name) {
            attrs.push((name, value));
        }
    }
}

/// Decode the handful of character references that editors commonly emit.
/// Unknown references are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::serialize_children;

    fn roundtrip(html: &str) -> String {
        serialize_children(&parse_fragment(html))
    }

    #[test]
    fn test_parse_nested_elements() {
        let nodes = parse_fragment("<p>a <b>bold</b></p>");
        assert_eq!(nodes.len(), 1);
        let p = nodes[0].as_element().unwrap();
        assert_eq!(p.tag, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.text_content(), "a bold");
    }

    #[test]
    fn test_parse_attributes() {
        let nodes = parse_fragment("<a HREF='x.html' target=_blank data-x>go</a>");
        let a = nodes[0].as_element().unwrap();
        assert_eq!(a.attr("href"), Some("x.html"));
        assert_eq!(a.attr("target"), Some("_blank"));
        assert_eq!(a.attr("data-x"), Some(""));
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        assert_eq!(roundtrip("<p>unclosed"), "<p>unclosed</p>");
        assert_eq!(roundtrip("a</b>c"), "ac");
        assert_eq!(roundtrip("<p><b>x</p>y"), "<p><b>x</b></p>y");
    }

    #[test]
    fn test_void_and_self_closing() {
        assert_eq!(roundtrip("a<br/>b<BR>c"), "a<br>b<br>c");
        assert_eq!(roundtrip("<span/>x"), "<span></span>x");
    }

    #[test]
    fn test_comments_and_doctype_are_dropped() {
        assert_eq!(
            roundtrip("<!DOCTYPE html><!--StartFragment--><i>x</i><!--EndFragment-->"),
            "<i>x</i>"
        );
    }

    #[test]
    fn test_malformed_angle_brackets_become_text() {
        assert_eq!(roundtrip("1 < 2 and <b"), "1 &lt; 2 and &lt;b");
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;&#65;&#x42;&nbsp;"), "a & b <AB\u{a0}");
        assert_eq!(decode_entities("AT&T; &bogus;"), "AT&T; &bogus;");
        assert_eq!(roundtrip("x&nbsp;y &amp; z"), "x&nbsp;y &amp; z");
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let inputs = [
            "<p style=\"text-align: center;\">Hi <a href=\"a&amp;b\">x</a></p>",
            "<ul><li>a</li><li></li></ul>",
            "plain &lt;text&gt;",
        ];
        for input in inputs {
            let once = roundtrip(input);
            assert_eq!(roundtrip(&once), once);
        }
    }
}
