// Memory Engine
// An in-process host engine: editable node tree, selection, native-style
// formatting commands and a frame queue standing in for "next paint".

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use super::node::{Element, Node, serialize_children};
use super::parser::parse_fragment;
use super::range::{
    Boundary, NodePath, Range, children_at_mut, is_valid_boundary, node_at, node_at_mut,
    range_text,
};
use super::{FrameCallback, HostEngine, SurroundError};
use crate::commands::{Alignment, FormatCommand};

/// Where a block-level command applies
#[derive(Debug, PartialEq, Eq)]
enum BlockTarget {
    /// An existing block element that can be renamed or restyled
    Existing(NodePath),
    /// A run of inline siblings inside `container` around `index` that needs a wrapper
    Run { container: NodePath, index: usize },
    Nothing,
}

pub struct MemoryEngine {
    root: Vec<Node>,
    selection: Option<Range>,
    focused: bool,
    frames: VecDeque<FrameCallback>,
}

impl fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("root", &self.root)
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .field("pending_frames", &self.frames.len())
            .finish()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Create an engine with an empty fragment and no selection
    pub fn new() -> Self {
        MemoryEngine {
            root: Vec::new(),
            selection: None,
            focused: false,
            frames: VecDeque::new(),
        }
    }

    /// Create an engine whose fragment is parsed from `html`
    pub fn from_html(html: &str) -> Self {
        MemoryEngine {
            root: parse_fragment(html),
            ..Self::new()
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Set the selection. Returns false (leaving the selection unchanged)
    /// if either boundary does not point into the fragment.
    pub fn set_selection(&mut self, range: Range) -> bool {
        if !self.is_valid_range(&range) {
            return false;
        }
        self.selection = Some(range);
        true
    }

    /// Select the whole fragment
    pub fn select_all(&mut self) {
        self.selection = Some(Range::new(
            Boundary::new(Vec::new(), 0),
            Boundary::new(Vec::new(), self.root.len()),
        ));
    }

    /// Place a caret after the last node of the fragment
    pub fn collapse_to_end(&mut self) {
        self.selection = Some(Range::caret(Boundary::new(Vec::new(), self.root.len())));
    }

    /// Select by grapheme offsets over the concatenated text nodes.
    /// Returns false if an offset is past the end of the text.
    pub fn select_text(&mut self, start: usize, end: usize) -> bool {
        let (start, end) = (start.min(end), start.max(end));
        let range = if start == end {
            self.locate_text_offset(start, false).map(Range::caret)
        } else {
            match (
                self.locate_text_offset(start, true),
                self.locate_text_offset(end, false),
            ) {
                (Some(a), Some(b)) => Some(Range::new(a, b)),
                _ => None,
            }
        };
        match range {
            Some(range) => {
                self.selection = Some(range);
                true
            }
            None => false,
        }
    }

    /// Number of frame callbacks waiting for the next paint
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Run one rendering pass: every callback queued before this call runs once.
    /// Callbacks scheduled while painting wait for the following pass.
    pub fn paint(&mut self) -> usize {
        let due: Vec<FrameCallback> = self.frames.drain(..).collect();
        let count = due.len();
        for callback in due {
            callback();
        }
        if count > 0 {
            trace!(count, "painted frame");
        }
        count
    }

    fn is_valid_range(&self, range: &Range) -> bool {
        is_valid_boundary(&self.root, &range.start) && is_valid_boundary(&self.root, &range.end)
    }

    fn text_nodes(&self) -> Vec<(NodePath, &str)> {
        fn collect<'a>(children: &'a [Node], path: &mut NodePath, out: &mut Vec<(NodePath, &'a str)>) {
            for (index, child) in children.iter().enumerate() {
                path.push(index);
                match child {
                    Node::Text(text) => out.push((path.clone(), text.as_str())),
                    Node::Element(el) => collect(&el.children, path, out),
                }
                path.pop();
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// Map a grapheme offset to a boundary. At a node edge `prefer_next`
    /// picks the start of the following text node over the end of the previous one.
    fn locate_text_offset(&self, target: usize, prefer_next: bool) -> Option<Boundary> {
        let mut seen = 0;
        let mut last = None;
        for (path, text) in self.text_nodes() {
            let count = text.graphemes(true).count();
            if target < seen + count || (target == seen + count && !prefer_next) {
                let byte = text
                    .grapheme_indices(true)
                    .nth(target - seen)
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                return Some(Boundary::new(path, byte));
            }
            seen += count;
            last = Some(Boundary::new(path, text.len()));
        }
        if target == seen {
            Some(last.unwrap_or_else(|| Boundary::new(Vec::new(), self.root.len())))
        } else {
            None
        }
    }

    /// Remove everything inside `range`. The start boundary stays valid.
    fn delete_contents(&mut self, range: &Range) {
        fn prune(children: &mut Vec<Node>, path: &mut NodePath, range: &Range) {
            for index in (0..children.len()).rev() {
                path.push(index);
                if range.contains_node(path) {
                    children.remove(index);
                } else if !range.excludes_node(path) {
                    match &mut children[index] {
                        Node::Text(text) => {
                            let (lo, hi) = range.text_span(path, text.len());
                            if lo < hi && text.is_char_boundary(lo) && text.is_char_boundary(hi) {
                                text.replace_range(lo..hi, "");
                            }
                        }
                        Node::Element(el) => prune(&mut el.children, path, range),
                    }
                }
                path.pop();
            }
        }

        if range.is_collapsed() {
            return;
        }
        prune(&mut self.root, &mut Vec::new(), range);
    }

    /// Insert `nodes` at `at`, splitting a text container. Returns the boundary after them.
    fn insert_nodes(&mut self, at: &Boundary, nodes: Vec<Node>) -> Option<Boundary> {
        let count = nodes.len();

        let split = match node_at(&self.root, &at.path) {
            Some(Node::Text(text)) => {
                let offset = floor_char_boundary(text, at.offset);
                Some((text[..offset].to_string(), text[offset..].to_string()))
            }
            _ => None,
        };

        if let Some((left, right)) = split {
            let (index, parent) = at.path.split_last()?;
            let siblings = children_at_mut(&mut self.root, parent)?;
            let mut after = *index + count;
            let mut replacement = Vec::with_capacity(count + 2);
            if !left.is_empty() {
                replacement.push(Node::Text(left));
                after += 1;
            }
            replacement.extend(nodes);
            if !right.is_empty() {
                replacement.push(Node::Text(right));
            }
            siblings.splice(*index..*index + 1, replacement);
            return Some(Boundary::new(parent.to_vec(), after));
        }

        let siblings = children_at_mut(&mut self.root, &at.path)?;
        let offset = at.offset.min(siblings.len());
        siblings.splice(offset..offset, nodes);
        Some(Boundary::new(at.path.clone(), offset + count))
    }

    /// Insert nodes containing blocks. An enclosing paragraph or heading is
    /// split at `at` so the blocks land between its halves.
    fn insert_blocks(&mut self, at: &Boundary, nodes: Vec<Node>) -> Option<Boundary> {
        let Some(host) = (1..=at.path.len())
            .rev()
            .map(|len| &at.path[..len])
            .find(|prefix| {
                matches!(
                    node_at(&self.root, prefix),
                    Some(Node::Element(el)) if holds_inline_only(el)
                )
            })
            .map(<[usize]>::to_vec)
        else {
            return self.insert_nodes(at, nodes);
        };

        let (index, parent) = host.split_last()?;
        let Some(Node::Element(el)) = node_at_mut(&mut self.root, &host) else {
            return None;
        };
        let children = std::mem::take(&mut el.children);
        let (left, right) = split_children(children, &at.path[host.len()..], at.offset);
        let shell = Element {
            children: Vec::new(),
            ..el.clone()
        };

        let count = nodes.len();
        let mut replacement = Vec::with_capacity(count + 2);
        if has_content(&left) {
            replacement.push(Node::Element(Element {
                children: left,
                ..shell.clone()
            }));
        }
        let after = *index + replacement.len() + count;
        replacement.extend(nodes);
        if has_content(&right) {
            replacement.push(Node::Element(Element {
                children: right,
                ..shell.clone()
            }));
        }

        debug!(tag = %shell.tag, "split block around inserted blocks");
        let siblings = children_at_mut(&mut self.root, parent)?;
        siblings.splice(*index..*index + 1, replacement);
        Some(Boundary::new(parent.to_vec(), after))
    }

    /// The node whose child list a boundary effectively sits in
    fn boundary_parent(&self, at: &Boundary) -> NodePath {
        match node_at(&self.root, &at.path) {
            Some(Node::Text(_)) => at.path[..at.path.len() - 1].to_vec(),
            _ => at.path.clone(),
        }
    }

    /// Convert a boundary into a child index of its parent, splitting a text
    /// node if the boundary falls inside it. Returns the index and whether a split happened.
    fn split_at_boundary(&mut self, at: &Boundary) -> Result<(usize, bool), SurroundError> {
        let text = match node_at(&self.root, &at.path) {
            Some(Node::Text(text)) => text.clone(),
            _ => return Ok((at.offset, false)),
        };
        let (index, parent) = at
            .path
            .split_last()
            .ok_or(SurroundError::InvalidBoundary)?;
        if at.offset == 0 {
            return Ok((*index, false));
        }
        if at.offset >= text.len() {
            return Ok((*index + 1, false));
        }
        let offset = floor_char_boundary(&text, at.offset);
        let siblings =
            children_at_mut(&mut self.root, parent).ok_or(SurroundError::InvalidBoundary)?;
        siblings.splice(
            *index..*index + 1,
            [
                Node::Text(text[..offset].to_string()),
                Node::Text(text[offset..].to_string()),
            ],
        );
        Ok((*index + 1, true))
    }

    /// Apply an inline style command. A range inside one container that holds
    /// no block elements is surrounded as a whole; anything else is wrapped
    /// text run by text run so that block structure is never changed.
    fn wrap_selection(&mut self, range: &Range, wrapper: Element) {
        if !self.range_contains_block(range) && self.surround(range, &wrapper).is_ok() {
            return;
        }

        let spans: Vec<(NodePath, usize, usize)> = self
            .text_nodes()
            .into_iter()
            .filter(|(path, _)| !range.excludes_node(path))
            .map(|(path, text)| {
                let (lo, hi) = range.text_span(&path, text.len());
                (path, lo, hi)
            })
            .filter(|(_, lo, hi)| lo < hi)
            .collect();
        debug!(tag = %wrapper.tag, runs = spans.len(), "wrapping text runs");

        // Back to front, so splits never move a run that is still to be wrapped
        let mut wrapped: Vec<NodePath> = Vec::new();
        for (path, lo, hi) in spans.into_iter().rev() {
            let Some((index, parent)) = path.split_last() else {
                continue;
            };
            let Some((offset, extra)) = self.wrap_text_run(&path, lo, hi, &wrapper) else {
                continue;
            };
            for later in &mut wrapped {
                if later.len() > parent.len()
                    && later[..parent.len()] == *parent
                    && later[parent.len()] > *index
                {
                    later[parent.len()] += extra;
                }
            }
            let mut element_path = parent.to_vec();
            element_path.push(index + offset);
            wrapped.push(element_path);
        }

        if let (Some(last), Some(first)) = (wrapped.first(), wrapped.last()) {
            self.selection = Some(Range::new(
                Boundary::new(first.clone(), 0),
                Boundary::new(last.clone(), 1),
            ));
        }
    }

    /// Wrap bytes `lo..hi` of the text node at `path` in a copy of `wrapper`.
    /// Returns the wrapper's offset from the old index and how many siblings were added.
    fn wrap_text_run(
        &mut self,
        path: &[usize],
        lo: usize,
        hi: usize,
        wrapper: &Element,
    ) -> Option<(usize, usize)> {
        let text = match node_at(&self.root, path) {
            Some(Node::Text(text)) => text.clone(),
            _ => return None,
        };
        let (index, parent) = path.split_last()?;
        let lo = floor_char_boundary(&text, lo);
        let hi = floor_char_boundary(&text, hi);

        let mut element = wrapper.clone();
        element.children = vec![Node::text(&text[lo..hi])];

        let mut replacement = Vec::with_capacity(3);
        if lo > 0 {
            replacement.push(Node::text(&text[..lo]));
        }
        let offset = replacement.len();
        replacement.push(Node::Element(element));
        if hi < text.len() {
            replacement.push(Node::text(&text[hi..]));
        }
        let extra = replacement.len() - 1;

        let siblings = children_at_mut(&mut self.root, parent)?;
        siblings.splice(*index..*index + 1, replacement);
        Some((offset, extra))
    }

    /// Whether the range fully contains any block element
    fn range_contains_block(&self, range: &Range) -> bool {
        fn walk(children: &[Node], path: &mut NodePath, range: &Range) -> bool {
            for (index, child) in children.iter().enumerate() {
                path.push(index);
                let found = match child {
                    Node::Element(el) if !range.excludes_node(path) => {
                        (el.is_block() && range.contains_node(path))
                            || walk(&el.children, path, range)
                    }
                    _ => false,
                };
                path.pop();
                if found {
                    return true;
                }
            }
            false
        }
        walk(&self.root, &mut Vec::new(), range)
    }

    fn block_target(&self, at: &Boundary) -> BlockTarget {
        for len in (1..=at.path.len()).rev() {
            let prefix = &at.path[..len];
            if let Some(Node::Element(el)) = node_at(&self.root, prefix) {
                if is_formattable_block(el) {
                    return BlockTarget::Existing(prefix.to_vec());
                }
                if el.is_block() {
                    let index = if len < at.path.len() {
                        at.path[len]
                    } else {
                        at.offset
                    };
                    return BlockTarget::Run {
                        container: prefix.to_vec(),
                        index,
                    };
                }
            }
        }

        let index = at.path.first().copied().unwrap_or(at.offset);
        if self.root.is_empty() {
            return BlockTarget::Run {
                container: Vec::new(),
                index: 0,
            };
        }
        let index = index.min(self.root.len() - 1);
        match &self.root[index] {
            Node::Element(el) if is_formattable_block(el) => BlockTarget::Existing(vec![index]),
            Node::Element(el) if el.is_block() => BlockTarget::Nothing,
            _ => BlockTarget::Run {
                container: Vec::new(),
                index,
            },
        }
    }

    /// Wrap the maximal run of inline siblings around `index` in `wrapper`
    fn wrap_inline_run(&mut self, container: &[usize], index: usize, mut wrapper: Element) -> Option<NodePath> {
        let siblings = children_at_mut(&mut self.root, container)?;
        let mut path = container.to_vec();

        if siblings.is_empty() {
            siblings.push(Node::Element(wrapper));
            path.push(0);
            return Some(path);
        }

        let index = index.min(siblings.len() - 1);
        if siblings[index].is_block() {
            return None;
        }
        let mut lo = index;
        while lo > 0 && !siblings[lo - 1].is_block() {
            lo -= 1;
        }
        let mut hi = index + 1;
        while hi < siblings.len() && !siblings[hi].is_block() {
            hi += 1;
        }
        wrapper.children = siblings.drain(lo..hi).collect();
        siblings.insert(lo, Node::Element(wrapper));
        path.push(lo);
        Some(path)
    }

    /// Every block target the range touches: the block around each selected
    /// text run, or the block at the start for a caret.
    fn block_targets(&self, range: &Range) -> Vec<BlockTarget> {
        let mut anchors: Vec<Boundary> = Vec::new();
        if !range.is_collapsed() {
            for (path, text) in self.text_nodes() {
                if range.excludes_node(&path) {
                    continue;
                }
                let (lo, hi) = range.text_span(&path, text.len());
                if lo < hi {
                    anchors.push(Boundary::new(path, lo));
                }
            }
        }
        if anchors.is_empty() {
            anchors.push(range.start.clone());
        }

        let mut targets: Vec<BlockTarget> = Vec::new();
        for anchor in anchors {
            let target = match self.block_target(&anchor) {
                BlockTarget::Run { container, index } => BlockTarget::Run {
                    index: self.run_start(&container, index),
                    container,
                },
                other => other,
            };
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    /// First index of the inline run containing `index`
    fn run_start(&self, container: &[usize], index: usize) -> usize {
        let siblings: &[Node] = if container.is_empty() {
            &self.root
        } else {
            match node_at(&self.root, container).and_then(Node::as_element) {
                Some(el) => &el.children,
                None => return index,
            }
        };
        if siblings.is_empty() {
            return 0;
        }
        let mut lo = index.min(siblings.len() - 1);
        while lo > 0 && !siblings[lo - 1].is_block() {
            lo -= 1;
        }
        lo
    }

    fn apply_block(&mut self, range: &Range, update: impl Fn(&mut Element), wrapper: Element) {
        let targets = self.block_targets(range);
        debug!(targets = targets.len(), "applying block command");

        // Renames first; they never move nodes
        let mut runs = Vec::new();
        for target in targets {
            match target {
                BlockTarget::Existing(path) => {
                    if let Some(Node::Element(el)) = node_at_mut(&mut self.root, &path) {
                        update(el);
                    }
                }
                BlockTarget::Run { container, index } => runs.push((container, index)),
                BlockTarget::Nothing => {}
            }
        }

        // Back to front, so wrapping a run never shifts one still pending
        runs.sort();
        let mut caret = None;
        for (container, index) in runs.into_iter().rev() {
            if let Some(path) = self.wrap_inline_run(&container, index, wrapper.clone()) {
                let len = node_at(&self.root, &path).map(Node::len).unwrap_or(0);
                caret = Some(Boundary::new(path, len));
            }
        }
        if let Some(caret) = caret {
            self.selection = Some(Range::caret(caret));
        }
    }
}

fn is_formattable_block(el: &Element) -> bool {
    el.is_block() && !matches!(el.tag.as_str(), "ul" | "ol" | "li" | "table" | "tr")
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Blocks that may only hold phrasing content, so a nested block must split them
fn holds_inline_only(el: &Element) -> bool {
    matches!(
        el.tag.as_str(),
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre"
    )
}

fn has_content(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Text(text) => !text.is_empty(),
        Node::Element(_) => true,
    })
}

/// Split a child list at a boundary given relative to its container
fn split_children(
    mut children: Vec<Node>,
    path: &[usize],
    offset: usize,
) -> (Vec<Node>, Vec<Node>) {
    let Some((&index, rest)) = path.split_first() else {
        let right = children.split_off(offset.min(children.len()));
        return (children, right);
    };
    if index >= children.len() {
        return (children, Vec::new());
    }

    let mut right = children.split_off(index + 1);
    let Some(node) = children.pop() else {
        return (children, right);
    };
    let (inner_left, inner_right) = match node {
        Node::Text(text) => {
            let at = floor_char_boundary(&text, offset);
            (
                vec![Node::text(&text[..at])],
                vec![Node::text(&text[at..])],
            )
        }
        Node::Element(Element {
            tag,
            attrs,
            children: inner,
        }) => {
            let (l, r) = split_children(inner, rest, offset);
            let half = |children: Vec<Node>| {
                if has_content(&children) {
                    vec![Node::Element(Element {
                        tag: tag.clone(),
                        attrs: attrs.clone(),
                        children,
                    })]
                } else {
                    Vec::new()
                }
            };
            (half(l), half(r))
        }
    };
    children.extend(inner_left.into_iter().filter(|n| has_content(std::slice::from_ref(n))));
    let mut tail: Vec<Node> = inner_right
        .into_iter()
        .filter(|n| has_content(std::slice::from_ref(n)))
        .collect();
    tail.append(&mut right);
    (children, tail)
}

fn inline_wrapper(command: &FormatCommand) -> Option<Element> {
    match command {
        FormatCommand::Bold => Some(Element::new("b")),
        FormatCommand::Italic => Some(Element::new("i")),
        FormatCommand::Underline => Some(Element::new("u")),
        FormatCommand::StrikeThrough => Some(Element::new("strike")),
        FormatCommand::CreateLink(url) => Some(Element::new("a").with_attr("href", url.as_str())),
        FormatCommand::FormatBlock(_) | FormatCommand::Justify(_) => None,
    }
}

fn alignment_wrapper(alignment: Alignment) -> Element {
    Element::new("div").with_attr("style", alignment.css())
}

impl HostEngine for MemoryEngine {
    fn selection(&self) -> Option<Range> {
        self.selection
            .as_ref()
            .filter(|range| self.is_valid_range(range))
            .cloned()
    }

    fn selected_text(&self, range: &Range) -> String {
        range_text(&self.root, range)
    }

    fn exec(&mut self, command: &FormatCommand) {
        let Some(range) = self.selection() else {
            debug!(%command, "exec without selection");
            return;
        };
        if command.needs_extent() && range.is_collapsed() {
            debug!(%command, "exec on collapsed selection has no effect");
            return;
        }

        match command {
            FormatCommand::FormatBlock(format) => {
                let tag = format.tag();
                let rename = tag.clone();
                self.apply_block(&range, move |el| el.tag = rename.clone(), Element::new(tag));
            }
            FormatCommand::Justify(alignment) => {
                let css = alignment.css();
                self.apply_block(
                    &range,
                    move |el| el.set_attr("style", css),
                    alignment_wrapper(*alignment),
                );
            }
            inline => {
                if let Some(wrapper) = inline_wrapper(inline) {
                    self.wrap_selection(&range, wrapper);
                }
            }
        }
    }

    fn surround(&mut self, range: &Range, wrapper: &Element) -> Result<(), SurroundError> {
        if !self.is_valid_range(range) {
            return Err(SurroundError::InvalidBoundary);
        }
        let parent = self.boundary_parent(&range.start);
        if parent != self.boundary_parent(&range.end) {
            return Err(SurroundError::PartialSelection);
        }

        // Split the end first so the start index stays put
        let (mut end_index, _) = self.split_at_boundary(&range.end)?;
        let (start_index, split) = self.split_at_boundary(&range.start)?;
        if split {
            end_index += 1;
        }

        let siblings =
            children_at_mut(&mut self.root, &parent).ok_or(SurroundError::InvalidBoundary)?;
        let end_index = end_index.clamp(start_index, siblings.len());
        let mut element = wrapper.clone();
        element.children = siblings.drain(start_index..end_index).collect();
        let count = element.children.len();
        siblings.insert(start_index, Node::Element(element));

        let mut path = parent;
        path.push(start_index);
        self.selection = Some(Range::new(
            Boundary::new(path.clone(), 0),
            Boundary::new(path, count),
        ));
        Ok(())
    }

    fn insert_html(&mut self, html: &str) {
        let Some(range) = self.selection() else {
            debug!("insert_html without selection");
            return;
        };
        self.delete_contents(&range);
        let nodes = parse_fragment(html);
        let after = if nodes.iter().any(Node::is_block) {
            self.insert_blocks(&range.start, nodes)
        } else {
            self.insert_nodes(&range.start, nodes)
        };
        if let Some(after) = after {
            self.selection = Some(Range::caret(after));
        }
    }

    fn serialize(&self) -> String {
        serialize_children(&self.root)
    }

    fn set_inner_html(&mut self, html: &str) {
        self.root = parse_fragment(html);
        self.selection = None;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn request_frame(&mut self, callback: FrameCallback) {
        self.frames.push_back(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine_with(html: &str) -> MemoryEngine {
        MemoryEngine::from_html(html)
    }

    #[test]
    fn test_select_text_by_graphemes() {
        let mut engine = engine_with("<p>héllo <b>wörld</b></p>");
        assert!(engine.select_text(6, 11));
        let range = engine.selection().unwrap();
        assert_eq!(engine.selected_text(&range), "wörld");
        assert!(!engine.select_text(0, 99));
    }

    #[test]
    fn test_bold_surrounds_text() {
        let mut engine = engine_with("<p>hello world</p>");
        engine.select_text(6, 11);
        engine.exec(&FormatCommand::Bold);
        assert_eq!(engine.serialize(), "<p>hello <b>world</b></p>");
    }

    #[test]
    fn test_bold_on_caret_has_no_effect() {
        let mut engine = engine_with("<p>hello</p>");
        engine.select_text(2, 2);
        engine.exec(&FormatCommand::Bold);
        assert_eq!(engine.serialize(), "<p>hello</p>");
    }

    #[test]
    fn test_exec_without_selection_has_no_effect() {
        let mut engine = engine_with("<p>hello</p>");
        engine.exec(&FormatCommand::Italic);
        assert_eq!(engine.serialize(), "<p>hello</p>");
    }

    #[test]
    fn test_surround_rejects_partial_selection() {
        let mut engine = engine_with("ab<i>cd</i>ef");
        engine.select_text(1, 3);
        let range = engine.selection().unwrap();
        assert_eq!(
            engine.surround(&range, &Element::new("span")),
            Err(SurroundError::PartialSelection)
        );
        assert_eq!(engine.serialize(), "ab<i>cd</i>ef");
    }

    #[test]
    fn test_surround_whole_elements() {
        let mut engine = engine_with("ab<i>cd</i>ef");
        engine.select_all();
        let range = engine.selection().unwrap();
        engine.surround(&range, &Element::new("span")).unwrap();
        assert_eq!(engine.serialize(), "<span>ab<i>cd</i>ef</span>");
    }

    #[test]
    fn test_style_command_wraps_each_run_across_elements() {
        let mut engine = engine_with("ab<i>cd</i>ef");
        engine.select_text(1, 3);
        engine.exec(&FormatCommand::Underline);
        assert_eq!(engine.serialize(), "a<u>b</u><i><u>c</u>d</i>ef");
    }

    #[test]
    fn test_bold_across_paragraphs_keeps_blocks() {
        let mut engine = engine_with("<p>one</p><p>two</p>");
        engine.select_text(1, 5);
        engine.exec(&FormatCommand::Bold);
        assert_eq!(engine.serialize(), "<p>o<b>ne</b></p><p><b>tw</b>o</p>");
    }

    #[test]
    fn test_bold_never_wraps_block_elements() {
        let mut engine = engine_with("<p>x</p><p>y</p>");
        engine.select_all();
        engine.exec(&FormatCommand::Bold);
        assert_eq!(engine.serialize(), "<p><b>x</b></p><p><b>y</b></p>");
    }

    #[test]
    fn test_format_block_renames_every_selected_block() {
        let mut engine = engine_with("<p>one</p><p>two</p><p>three</p>");
        engine.select_text(1, 5);
        engine.exec(&"formatBlock:h1".parse().unwrap());
        assert_eq!(engine.serialize(), "<h1>one</h1><h1>two</h1><p>three</p>");

        let mut engine = engine_with("<p>one</p><p>two</p>");
        engine.select_all();
        engine.exec(&"formatBlock:h1".parse().unwrap());
        assert_eq!(engine.serialize(), "<h1>one</h1><h1>two</h1>");
    }

    #[test]
    fn test_justify_styles_every_selected_block() {
        let mut engine = engine_with("<p>one</p><p>two</p>");
        engine.select_text(0, 6);
        engine.exec(&FormatCommand::Justify(Alignment::Center));
        assert_eq!(
            engine.serialize(),
            "<p style=\"text-align: center;\">one</p><p style=\"text-align: center;\">two</p>"
        );
    }

    #[test]
    fn test_format_block_wraps_each_loose_run() {
        let mut engine = engine_with("a<p>b</p>c");
        engine.select_all();
        engine.exec(&"formatBlock:h3".parse().unwrap());
        assert_eq!(engine.serialize(), "<h3>a</h3><h3>b</h3><h3>c</h3>");
    }

    #[test]
    fn test_create_link() {
        let mut engine = engine_with("go here");
        engine.select_text(3, 7);
        engine.exec(&FormatCommand::CreateLink("https://x.com".to_string()));
        assert_eq!(engine.serialize(), "go <a href=\"https://x.com\">here</a>");
    }

    #[test]
    fn test_format_block_renames_enclosing_block() {
        let mut engine = engine_with("<p>title</p><p>body</p>");
        engine.select_text(2, 2);
        engine.exec(&"formatBlock:h1".parse().unwrap());
        assert_eq!(engine.serialize(), "<h1>title</h1><p>body</p>");
    }

    #[test]
    fn test_format_block_wraps_top_level_run() {
        let mut engine = engine_with("a <b>b</b><p>c</p>");
        engine.select_text(0, 0);
        engine.exec(&"formatBlock:h2".parse().unwrap());
        assert_eq!(engine.serialize(), "<h2>a <b>b</b></h2><p>c</p>");
    }

    #[test]
    fn test_justify_sets_style() {
        let mut engine = engine_with("<p>x</p>");
        engine.select_text(0, 1);
        engine.exec(&FormatCommand::Justify(Alignment::Center));
        assert_eq!(
            engine.serialize(),
            "<p style=\"text-align: center;\">x</p>"
        );
    }

    #[test]
    fn test_justify_wraps_loose_text() {
        let mut engine = engine_with("loose");
        engine.select_text(1, 1);
        engine.exec(&FormatCommand::Justify(Alignment::Right));
        assert_eq!(
            engine.serialize(),
            "<div style=\"text-align: right;\">loose</div>"
        );
    }

    #[test]
    fn test_insert_html_replaces_selection() {
        let mut engine = engine_with("<p>hello world</p>");
        engine.select_text(0, 5);
        engine.insert_html("<i>bye</i>");
        assert_eq!(engine.serialize(), "<p><i>bye</i> world</p>");
        engine.insert_html("!");
        assert_eq!(engine.serialize(), "<p><i>bye</i>! world</p>");
    }

    #[test]
    fn test_insert_html_across_blocks() {
        let mut engine = engine_with("<p>one</p><p>two</p>");
        engine.select_text(1, 5);
        engine.insert_html("X");
        assert_eq!(engine.serialize(), "<p>oX</p><p>o</p>");
    }

    #[test]
    fn test_insert_html_into_empty_fragment() {
        let mut engine = MemoryEngine::new();
        engine.collapse_to_end();
        engine.insert_html("<ul><li></li></ul>");
        assert_eq!(engine.serialize(), "<ul><li></li></ul>");
    }

    #[test]
    fn test_insert_block_splits_paragraph() {
        let mut engine = engine_with("<p>a<b>bc</b>d</p>");
        engine.select_text(2, 2);
        engine.insert_html("<ul><li>x</li></ul>");
        assert_eq!(
            engine.serialize(),
            "<p>a<b>b</b></p><ul><li>x</li></ul><p><b>c</b>d</p>"
        );
        engine.insert_html("y");
        assert_eq!(
            engine.serialize(),
            "<p>a<b>b</b></p><ul><li>x</li></ul>y<p><b>c</b>d</p>"
        );
    }

    #[test]
    fn test_insert_block_replacing_whole_paragraph_text() {
        let mut engine = engine_with("<p>one</p><p>two</p>");
        assert!(engine.set_selection(Range::new(
            Boundary::new(vec![1, 0], 0),
            Boundary::new(vec![1, 0], 3),
        )));
        engine.insert_html("<ol><li>two</li></ol>");
        assert_eq!(engine.serialize(), "<p>one</p><ol><li>two</li></ol>");
    }

    #[test]
    fn test_insert_html_without_selection_is_ignored() {
        let mut engine = engine_with("x");
        engine.insert_html("<b>y</b>");
        assert_eq!(engine.serialize(), "x");
    }

    #[test]
    fn test_set_inner_html_drops_selection() {
        let mut engine = engine_with("x");
        engine.select_all();
        engine.set_inner_html("<p>y</p>");
        assert!(engine.selection().is_none());
        assert_eq!(engine.serialize(), "<p>y</p>");
    }

    #[test]
    fn test_paint_runs_frames_once() {
        let mut engine = MemoryEngine::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        engine.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        assert_eq!(engine.pending_frames(), 1);
        assert_eq!(engine.paint(), 1);
        assert_eq!(engine.paint(), 0);
        assert_eq!(hits.get(), 1);
    }
}
