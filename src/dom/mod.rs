//! A minimal rendered-node tree and the direction classifier that runs
//! over it.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Lookups
//! with an id that does not exist return `None` or do nothing, so callers
//! can walk arbitrary markup without checking every step.

mod classify;
mod html;

pub use classify::{
    AUTO_CLASS, LTR_CLASS, RTL_CLASS, SPECIAL_TAGS, classify, classify_with, direction_class,
    direction_of, set_direction_class,
};
pub use html::parse_fragment;

use std::fmt::Write as _;

/// Index of a node in its [`Tree`].
pub type NodeId = usize;

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of nodes.
///
/// # Example
///
/// ```
/// use autodir::dom::Tree;
///
/// let mut tree = Tree::new();
/// let text = tree.create_text("hi");
/// let p = tree.element("p", &[text]);
/// tree.add_class(p, "note");
/// assert_eq!(tree.outer_html(p), r#"<p class="note">hi</p>"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create an element and append `children` to it.
    pub fn element(&mut self, tag: &str, children: &[NodeId]) -> NodeId {
        let id = self.create_element(tag);
        for &child in children {
            self.append(id, child);
        }
        id
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || parent >= self.nodes.len() || child >= self.nodes.len() {
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Replace the children of `parent` with `children`.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if parent >= self.nodes.len() {
            return;
        }
        for old in std::mem::take(&mut self.nodes[parent].children) {
            self.nodes[old].parent = None;
        }
        for child in children {
            self.append(parent, child);
        }
    }

    /// Insert `child` right before `sibling`, under the sibling's parent.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        if sibling == child || child >= self.nodes.len() {
            return;
        }
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        self.detach(child);
        let Some(pos) = self.nodes[parent].children.iter().position(|&c| c == sibling) else {
            return;
        };
        self.nodes[parent].children.insert(pos, child);
        self.nodes[child].parent = Some(parent);
    }

    /// Append `text` to `parent`, extending its last child when that is
    /// already text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.children(parent).last().copied();
        if let Some(NodeKind::Text(existing)) = last.and_then(|id| self.kind_mut(id)) {
            existing.push_str(text);
            return;
        }
        let id = self.create_text(text);
        self.append(parent, id);
    }

    /// Move every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        if from == to || from >= self.nodes.len() {
            return;
        }
        for child in self.children(from).to_vec() {
            self.append(to, child);
        }
    }

    /// Remove `id` from its parent. The node itself stays in the arena.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        self.nodes[parent].children.retain(|&c| c != id);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of `id`; empty for text nodes and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Element { classes, .. }) => classes,
            _ => &[],
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(NodeKind::Element { classes, .. }) = self.kind_mut(id) {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(NodeKind::Element { classes, .. }) = self.kind_mut(id) {
            classes.retain(|c| c != class);
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeKind::Element { attrs, .. }) = self.kind_mut(id) {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.get(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    /// Serialize `id` and its descendants as HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize only the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.nodes.get_mut(id).map(|node| &mut node.kind)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.get(id).map(|node| &node.kind) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Element { .. }) => {
                    stack.extend(self.children(id).iter().rev());
                }
                None => {}
            }
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(id) => {
                    if let Some(tag) = self.tag(id) {
                        let _ = write!(out, "</{tag}>");
                    }
                    continue;
                }
            };
            match self.get(id).map(|node| &node.kind) {
                Some(NodeKind::Text(text)) => escape_into(text, out),
                Some(NodeKind::Element {
                    tag,
                    classes,
                    attrs,
                }) => {
                    out.push('<');
                    out.push_str(tag);
                    if !classes.is_empty() {
                        let _ = write!(out, " class=\"{}\"", classes.join(" "));
                    }
                    for (name, value) in attrs {
                        if value.is_empty() {
                            let _ = write!(out, " {name}");
                        } else {
                            let _ = write!(out, " {name}=\"");
                            escape_into(value, out);
                            out.push('"');
                        }
                    }
                    out.push('>');
                    if VOID_TAGS.contains(&tag.as_str()) {
                        continue;
                    }
                    stack.push(Step::Close(id));
                    stack.extend(self.children(id).iter().rev().map(|&c| Step::Open(c)));
                }
                None => {}
            }
        }
    }
}

/// Pending work while serializing.
enum Step {
    Open(NodeId),
    Close(NodeId),
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
