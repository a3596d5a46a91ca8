//! A minimal rendered-document model for highlighting.
//!
//! Nodes live in an arena and refer to each other by index. Replaced nodes are
//! detached and their slots go on a free list for the next replacement, so the
//! arena stays bounded by the largest tree it has held. A freed id reports
//! [`HighlightError::DetachedSegment`] until its slot is reused.

use super::{ElementInfo, Piece, SegmentId, SegmentProvider};
use crate::error::HighlightError;
use crate::search::{HIGHLIGHT_CLASS, escape_html};

/// Index of a node in a [`RenderTree`].
pub type NodeId = usize;

/// Class of the element wrapping a rendered document.
const CONTENT_CLASS: &str = "markdown-content";

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Element { tag: String, classes: Vec<String> },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Element tree of a rendered document.
#[derive(Debug, Clone)]
pub struct RenderTree {
    nodes: Vec<Node>,
    root: NodeId,

    /// Detached slots available to `orphan`
    free: Vec<NodeId>,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    /// An empty document: a single content `div`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element {
                    tag: "div".into(),
                    classes: vec![CONTENT_CLASS.into()],
                },
                parent: None,
                children: vec![],
            }],
            root: 0,
            free: Vec::new(),
        }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Renders Markdown into a tree.
    ///
    /// Handles headings, paragraphs, fenced code blocks and inline code.
    /// Fenced blocks become `pre > code.hljs`, except `mermaid` fences which
    /// become `div.mermaid`. Everything else is kept as literal text.
    pub fn from_markdown(raw: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        let mut paragraph: Vec<&str> = Vec::new();
        let mut lines = raw.lines();

        while let Some(line) = lines.next() {
            let trimmed = line.trim_start();

            if let Some(info) = trimmed.strip_prefix("```") {
                tree.flush_paragraph(&mut paragraph);
                let language = info.trim();
                let mut body: Vec<&str> = Vec::new();
                for line in lines.by_ref() {
                    if line.trim_start().starts_with("```") {
                        break;
                    }
                    body.push(line);
                }
                let code = body.join("\n");

                if language == "mermaid" {
                    let diagram = tree.append_element(root, "div", &["mermaid"]);
                    tree.append_text(diagram, &code);
                } else {
                    let pre = tree.append_element(root, "pre", &[]);
                    let language_class = format!("language-{language}");
                    let classes: Vec<&str> = if language.is_empty() {
                        vec!["hljs"]
                    } else {
                        vec![language_class.as_str(), "hljs"]
                    };
                    let block = tree.append_element(pre, "code", &classes);
                    tree.append_text(block, &code);
                }
                continue;
            }

            if trimmed.is_empty() {
                tree.flush_paragraph(&mut paragraph);
                continue;
            }

            if let Some((level, text)) = heading(trimmed) {
                tree.flush_paragraph(&mut paragraph);
                let element = tree.append_element(root, &format!("h{level}"), &[]);
                tree.append_inline(element, text);
                continue;
            }

            paragraph.push(trimmed.trim_end());
        }
        tree.flush_paragraph(&mut paragraph);

        tree
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        self.push_node(
            parent,
            NodeData::Element {
                tag: tag.to_string(),
                classes: classes.iter().map(ToString::to_string).collect(),
            },
        )
    }

    /// Appends text, merging into a preceding text sibling.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeData::Text(existing) = &mut self.nodes[last].data
        {
            existing.push_str(text);
            return last;
        }
        self.push_node(parent, NodeData::Text(text.to_string()))
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(self.root, &mut text);
        text
    }

    /// Text of each highlight mark, in document order.
    pub fn marked_texts(&self) -> Vec<String> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.is_mark(id))
            .map(|id| {
                let mut text = String::new();
                self.collect_text(id, &mut text);
                text
            })
            .collect()
    }

    /// Serializes the document as HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(self.root, &mut html);
        html
    }

    fn push_node(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: vec![],
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn flush_paragraph(&mut self, lines: &mut Vec<&str>) {
        if lines.is_empty() {
            return;
        }
        let text = lines.join(" ");
        lines.clear();
        let paragraph = self.append_element(self.root, "p", &[]);
        self.append_inline(paragraph, &text);
    }

    /// Splits backtick-delimited spans into `code` elements.
    fn append_inline(&mut self, parent: NodeId, text: &str) {
        let parts: Vec<&str> = text.split('`').collect();
        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            let is_code = i % 2 == 1;
            if is_code && (parts.len() % 2 == 1 || i < last) {
                if !part.is_empty() {
                    let code = self.append_element(parent, "code", &[]);
                    self.append_text(code, part);
                }
            } else if is_code {
                // Unclosed backtick
                self.append_text(parent, &format!("`{part}"));
            } else if !part.is_empty() {
                self.append_text(parent, part);
            }
        }
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].data, NodeData::Text(_))
    }

    fn is_mark(&self, id: NodeId) -> bool {
        matches!(
            &self.nodes[id].data,
            NodeData::Element { tag, classes }
                if tag == "mark" && classes.iter().any(|c| c == HIGHLIGHT_CLASS)
        )
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(text) => out.push_str(&escape_html(text)),
            NodeData::Element { tag, classes } => {
                out.push('<');
                out.push_str(tag);
                if !classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&escape_html(&classes.join(" ")));
                    out.push('"');
                }
                out.push('>');
                for &child in &self.nodes[id].children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Checks that `id` is an attached text node and returns its parent.
    fn text_parent(&self, id: NodeId) -> Result<NodeId, HighlightError> {
        let node = self.nodes.get(id).ok_or(HighlightError::MissingSegment(id))?;
        if !matches!(node.data, NodeData::Text(_)) {
            return Err(HighlightError::NotText(id));
        }
        node.parent.ok_or(HighlightError::DetachedSegment(id))
    }

    /// Swaps `old` for `replacements` in its parent's child list and frees it.
    ///
    /// On failure the replacements are freed instead.
    fn splice(&mut self, parent: NodeId, old: NodeId, replacements: Vec<NodeId>) -> Result<(), HighlightError> {
        let Some(position) = self.nodes[parent]
            .children
            .iter()
            .position(|&child| child == old)
        else {
            for id in replacements {
                self.release(id);
            }
            return Err(HighlightError::DetachedSegment(old));
        };
        for &id in &replacements {
            self.nodes[id].parent = Some(parent);
        }
        self.nodes[parent]
            .children
            .splice(position..=position, replacements);
        self.release(old);
        Ok(())
    }

    /// Creates a node that is not yet attached anywhere, reusing a freed slot
    /// when there is one.
    fn orphan(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: vec![],
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            return id;
        }
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Frees a detached node and everything below it.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            stack.append(&mut node.children);
            node.parent = None;
            node.data = NodeData::Text(String::new());
            self.free.push(id);
        }
    }

    /// Merges adjacent text siblings and drops empty text nodes.
    fn merge_text(&mut self) {
        for id in self.preorder() {
            if self.is_text(id) {
                continue;
            }
            let children = std::mem::take(&mut self.nodes[id].children);
            let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());
            for child in children {
                let NodeData::Text(text) = &self.nodes[child].data else {
                    merged.push(child);
                    continue;
                };
                let text = text.clone();
                match merged.last() {
                    _ if text.is_empty() => self.release(child),
                    Some(&last) if self.is_text(last) => {
                        if let NodeData::Text(existing) = &mut self.nodes[last].data {
                            existing.push_str(&text);
                        }
                        self.release(child);
                    }
                    _ => merged.push(child),
                }
            }
            self.nodes[id].children = merged;
        }
    }
}

impl SegmentProvider for RenderTree {
    fn segments(&self) -> Vec<SegmentId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.is_text(id))
            .collect()
    }

    fn segment_text(&self, id: SegmentId) -> Result<String, HighlightError> {
        match &self.nodes.get(id).ok_or(HighlightError::MissingSegment(id))?.data {
            NodeData::Text(text) => Ok(text.clone()),
            NodeData::Element { .. } => Err(HighlightError::NotText(id)),
        }
    }

    fn ancestors(&self, id: SegmentId) -> Result<Vec<ElementInfo>, HighlightError> {
        let mut current = self.text_parent(id)?;
        let mut ancestors = Vec::new();
        loop {
            if let NodeData::Element { tag, classes } = &self.nodes[current].data {
                ancestors.push(ElementInfo {
                    tag: tag.clone(),
                    classes: classes.clone(),
                });
            }
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None if current == self.root => return Ok(ancestors),
                None => return Err(HighlightError::DetachedSegment(id)),
            }
        }
    }

    fn replace_segment(&mut self, id: SegmentId, pieces: Vec<Piece>) -> Result<(), HighlightError> {
        let parent = self.text_parent(id)?;

        let mut replacements = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Text(text) => replacements.push(self.orphan(NodeData::Text(text))),
                Piece::Mark { text, class } => {
                    let mark = self.orphan(NodeData::Element {
                        tag: "mark".into(),
                        classes: class.split_whitespace().map(ToString::to_string).collect(),
                    });
                    let inner = self.orphan(NodeData::Text(text));
                    self.nodes[inner].parent = Some(mark);
                    self.nodes[mark].children.push(inner);
                    replacements.push(mark);
                }
            }
        }

        self.splice(parent, id, replacements)
    }

    fn remove_marks(&mut self) -> usize {
        let marks: Vec<NodeId> = self
            .preorder()
            .into_iter()
            .filter(|&id| self.is_mark(id))
            .collect();

        let mut removed = 0;
        for mark in marks {
            let Some(parent) = self.nodes[mark].parent else {
                continue;
            };
            let mut text = String::new();
            self.collect_text(mark, &mut text);
            let replacement = self.orphan(NodeData::Text(text));
            if self.splice(parent, mark, vec![replacement]).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            self.merge_text();
        }
        removed
    }
}

/// Parses an ATX heading: one to six `#` followed by a space.
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..]
        .strip_prefix(' ')
        .map(|text| (level, text.trim()))
}
