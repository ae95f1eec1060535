// Ranges over the node tree
// A boundary is a container path plus an offset: a byte offset for text
// containers, a child index for element containers (DOM semantics).

use std::cmp::Ordering;

use super::node::Node;

/// Child indices from the fragment root down to a node. The empty path is the root.
pub type NodePath = Vec<usize>;

/// A boundary point inside the fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub path: NodePath,
    pub offset: usize,
}

impl Boundary {
    pub fn new(path: NodePath, offset: usize) -> Self {
        Boundary { path, offset }
    }

    /// Document-order key. Lexicographic comparison of keys orders boundaries.
    pub fn key(&self) -> Vec<usize> {
        let mut key = self.path.clone();
        key.push(self.offset);
        key
    }
}

impl PartialOrd for Boundary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Boundary {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A selection range. `start` never comes after `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(a: Boundary, b: Boundary) -> Self {
        if a <= b {
            Range { start: a, end: b }
        } else {
            Range { start: b, end: a }
        }
    }

    pub fn caret(at: Boundary) -> Self {
        Range {
            start: at.clone(),
            end: at,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether the node at `path` lies completely inside this range
    pub(crate) fn contains_node(&self, path: &[usize]) -> bool {
        let Some((last, parent)) = path.split_last() else {
            return false;
        };
        let before = child_key(parent, *last);
        let after = child_key(parent, *last + 1);
        before >= self.start.key() && after <= self.end.key()
    }

    /// Whether the node at `path` lies completely outside this range
    pub(crate) fn excludes_node(&self, path: &[usize]) -> bool {
        let Some((last, parent)) = path.split_last() else {
            return false;
        };
        let before = child_key(parent, *last);
        let after = child_key(parent, *last + 1);
        after <= self.start.key() || before >= self.end.key()
    }

    /// The selected byte span of a text node at `path` with length `len`
    pub(crate) fn text_span(&self, path: &[usize], len: usize) -> (usize, usize) {
        let mut node_start = path.to_vec();
        node_start.push(0);

        let lo = if self.start.path == path {
            self.start.offset.min(len)
        } else if node_start >= self.start.key() {
            0
        } else {
            len
        };
        let hi = if self.end.path == path {
            self.end.offset.min(len)
        } else if node_start < self.end.key() {
            len
        } else {
            0
        };
        (lo, hi.max(lo))
    }
}

fn child_key(parent: &[usize], index: usize) -> Vec<usize> {
    let mut key = parent.to_vec();
    key.push(index);
    key
}

pub fn node_at<'a>(root: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = root.get(*first)?;
    for index in rest {
        node = node.as_element()?.children.get(*index)?;
    }
    Some(node)
}

pub fn node_at_mut<'a>(root: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = root.get_mut(*first)?;
    for index in rest {
        node = node.as_element_mut()?.children.get_mut(*index)?;
    }
    Some(node)
}

/// The child list of the element at `path` (the root list for the empty path)
pub fn children_at_mut<'a>(root: &'a mut Vec<Node>, path: &[usize]) -> Option<&'a mut Vec<Node>> {
    if path.is_empty() {
        return Some(root);
    }
    node_at_mut(root, path)
        .and_then(Node::as_element_mut)
        .map(|el| &mut el.children)
}

/// Whether `boundary` points at an existing container with an in-bounds offset
pub fn is_valid_boundary(root: &[Node], boundary: &Boundary) -> bool {
    if boundary.path.is_empty() {
        return boundary.offset <= root.len();
    }
    match node_at(root, &boundary.path) {
        Some(Node::Text(text)) => {
            boundary.offset <= text.len() && text.is_char_boundary(boundary.offset)
        }
        Some(Node::Element(el)) => boundary.offset <= el.children.len(),
        None => false,
    }
}

/// Plain text of the range. `<br>` and block boundaries become newlines,
/// the way a browser's selection stringifies.
pub fn range_text(root: &[Node], range: &Range) -> String {
    let mut collector = TextCollector {
        range,
        out: String::new(),
        need_break: false,
    };
    let mut path = Vec::new();
    collector.walk(root, &mut path);
    collector.out
}

struct TextCollector<'a> {
    range: &'a Range,
    out: String,
    need_break: bool,
}

impl TextCollector<'_> {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.need_break && !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.need_break = false;
        self.out.push_str(text);
    }

    fn walk(&mut self, children: &[Node], path: &mut Vec<usize>) {
        for (index, child) in children.iter().enumerate() {
            path.push(index);
            if self.range.excludes_node(path) {
                path.pop();
                continue;
            }
            match child {
                Node::Text(text) => {
                    let (lo, hi) = self.range.text_span(path, text.len());
                    if let Some(slice) = text.get(lo..hi) {
                        self.push_text(slice);
                    }
                }
                Node::Element(el) if el.tag == "br" => {
                    if self.range.contains_node(path) {
                        self.out.push('\n');
                        self.need_break = false;
                    }
                }
                Node::Element(el) => {
                    let block = el.is_block();
                    if block {
                        self.need_break = true;
                    }
                    self.walk(&el.children, path);
                    if block {
                        self.need_break = true;
                    }
                }
            }
            path.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_fragment;

    #[test]
    fn test_boundary_ordering() {
        let before_child = Boundary::new(vec![0], 1);
        let inside_child = Boundary::new(vec![0, 1], 0);
        let after_child = Boundary::new(vec![0], 2);
        assert!(before_child < inside_child);
        assert!(inside_child < after_child);
    }

    #[test]
    fn test_range_normalizes_order() {
        let a = Boundary::new(vec![0], 3);
        let b = Boundary::new(vec![0], 1);
        let range = Range::new(a.clone(), b.clone());
        assert_eq!(range.start, b);
        assert_eq!(range.end, a);
    }

    #[test]
    fn test_range_text_within_one_node() {
        let root = parse_fragment("hello world");
        let range = Range::new(Boundary::new(vec![0], 6), Boundary::new(vec![0], 11));
        assert_eq!(range_text(&root, &range), "world");
    }

    #[test]
    fn test_range_text_across_blocks() {
        let root = parse_fragment("<p>one<br>two</p><p>three</p>");
        let range = Range::new(Boundary::new(vec![], 0), Boundary::new(vec![], 2));
        assert_eq!(range_text(&root, &range), "one\ntwo\nthree");
    }

    #[test]
    fn test_range_text_partial_element() {
        let root = parse_fragment("ab<b>cd</b>ef");
        let range = Range::new(Boundary::new(vec![0], 1), Boundary::new(vec![1, 0], 1));
        assert_eq!(range_text(&root, &range), "bc");
    }

    #[test]
    fn test_is_valid_boundary() {
        let root = parse_fragment("<p>héllo</p>");
        assert!(is_valid_boundary(&root, &Boundary::new(vec![], 1)));
        assert!(is_valid_boundary(&root, &Boundary::new(vec![0, 0], 3)));
        assert!(!is_valid_boundary(&root, &Boundary::new(vec![0, 0], 2)));
        assert!(!is_valid_boundary(&root, &Boundary::new(vec![1], 0)));
    }
}
