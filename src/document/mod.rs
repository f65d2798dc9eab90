//! In-memory model of rendered chapter markup
//!
//! A chapter pane is parsed into an arena of nodes. Node handles stay valid
//! for the life of the document even when nodes are detached, so a searchful
//! pass can hold handles across structural edits. Handles are ephemeral:
//! they must not be persisted across a re-render of the chapter.

mod markup;

use crate::error::{DocumentError, DocumentResult};
use crate::utils::text;
use std::fmt;

/// Class carried by every verse text container element
pub const VERSE_TEXT_CLASS: &str = "verse-text";

/// Handle to a node in a [`VerseDocument`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds: element markup or a text payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

/// Tag name and attributes of an element node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(pair) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            pair.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    /// Attributes in document order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tokens of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let value = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr("class", &value);
    }

    pub fn remove_class(&mut self, class: &str) {
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attr("class");
        } else {
            let value = remaining.join(" ");
            self.set_attr("class", &value);
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Arena-backed tree for one rendered chapter pane
#[derive(Debug, Clone)]
pub struct VerseDocument {
    nodes: Vec<Node>,
}

impl Default for VerseDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VerseDocument {
    /// Create an empty document holding only the synthetic pane root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Element(ElementData::new("body")),
            }],
        }
    }

    /// Parse rendered chapter markup into a document
    pub fn parse(markup_text: &str) -> DocumentResult<Self> {
        let mut doc = Self::new();
        let roots = markup::parse_fragment(&mut doc, markup_text)?;
        for &r in &roots {
            doc.nodes[r.0].parent = Some(doc.root());
        }
        doc.nodes[0].children = roots;
        Ok(doc)
    }

    /// The synthetic pane root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(s) => Some(s.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Text(_))
    }

    pub(crate) fn new_element(&mut self, data: ElementData) -> NodeId {
        self.push_node(NodeKind::Element(data))
    }

    pub(crate) fn new_text(&mut self, payload: String) -> NodeId {
        self.push_node(NodeKind::Text(payload))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// All nodes below `root` in document order, excluding `root` itself
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            for &c in self.nodes[id.0].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Text nodes below `root` in document order
    pub fn text_nodes_under(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.is_text(*id))
            .collect()
    }

    /// Elements below `root` carrying `class`, in document order
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.element(*id)
                    .map(|el| el.has_class(class))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Verse text containers in document order
    pub fn verse_roots(&self) -> Vec<NodeId> {
        self.elements_with_class(self.root(), VERSE_TEXT_CLASS)
    }

    /// Concatenated text payloads below `id` (or the payload itself for a text node)
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Element(_) => {
                for &c in &self.nodes[id.0].children {
                    self.collect_text(c, out);
                }
            }
        }
    }

    /// Text content with whitespace collapsed, as a rendered pane would show it
    pub fn visible_text(&self, id: NodeId) -> String {
        text::collapse_whitespace(&self.text_content(id))
    }

    /// Serialized markup of the children of `id`
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &c in &self.nodes[id.0].children {
            markup::serialize_node(self, c, &mut out);
        }
        out
    }

    /// Replace the children of `id` with the parse of `markup_text`
    pub fn set_inner_markup(&mut self, id: NodeId, markup_text: &str) -> DocumentResult<()> {
        if self.element(id).is_none() {
            return Err(DocumentError::NotAnElement(id));
        }
        let new_children = markup::parse_fragment(self, markup_text)?;
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for c in old {
            self.nodes[c.0].parent = None;
        }
        for &c in &new_children {
            self.nodes[c.0].parent = Some(id);
        }
        self.nodes[id.0].children = new_children;
        Ok(())
    }

    /// Replace a text node with the parse of `markup_text`, splicing the new
    /// nodes into the old node's position. Returns the spliced node handles.
    pub fn replace_text_with_markup(
        &mut self,
        id: NodeId,
        markup_text: &str,
    ) -> DocumentResult<Vec<NodeId>> {
        if !self.is_text(id) {
            return Err(DocumentError::NotAText(id));
        }
        let parent = self.nodes[id.0].parent.ok_or(DocumentError::Detached(id))?;
        let new_children = markup::parse_fragment(self, markup_text)?;
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or(DocumentError::Detached(id))?;
        for &c in &new_children {
            self.nodes[c.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(pos..=pos, new_children.iter().copied());
        self.nodes[id.0].parent = None;
        Ok(new_children)
    }

    /// Replace an element with its own children, then merge adjacent text
    /// nodes in the parent so cleared content is byte-identical to the
    /// content before the element was spliced in.
    pub fn unwrap_element(&mut self, id: NodeId) -> DocumentResult<()> {
        if self.element(id).is_none() {
            return Err(DocumentError::NotAnElement(id));
        }
        let parent = self.nodes[id.0].parent.ok_or(DocumentError::Detached(id))?;
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|c| *c == id)
            .ok_or(DocumentError::Detached(id))?;
        for &c in &children {
            self.nodes[c.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(pos..=pos, children.into_iter());
        self.nodes[id.0].parent = None;
        self.merge_adjacent_text(parent);
        Ok(())
    }

    /// Merge runs of adjacent text children of `parent` into single nodes
    pub fn merge_adjacent_text(&mut self, parent: NodeId) {
        let child_ids = self.nodes[parent.0].children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(child_ids.len());
        for id in child_ids {
            let prev_text = kept.last().map(|p| self.is_text(*p)).unwrap_or(false);
            if prev_text && self.is_text(id) {
                let tail = match &mut self.nodes[id.0].kind {
                    NodeKind::Text(s) => std::mem::take(s),
                    NodeKind::Element(_) => String::new(),
                };
                let prev = kept[kept.len() - 1];
                if let NodeKind::Text(s) = &mut self.nodes[prev.0].kind {
                    s.push_str(&tail);
                }
                self.nodes[id.0].parent = None;
            } else {
                kept.push(id);
            }
        }
        self.nodes[parent.0].children = kept;
    }

    /// Replace non-breaking spaces with plain spaces in all text below `root`
    pub fn normalize_nbsp_under(&mut self, root: NodeId) {
        for id in self.text_nodes_under(root) {
            if let NodeKind::Text(s) = &mut self.nodes[id.0].kind {
                if s.contains('\u{a0}') {
                    *s = s.replace('\u{a0}', " ");
                }
            }
        }
    }
}
