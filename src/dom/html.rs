//! An implementation of html5ever's sink trait, so rendered HTML can be
//! parsed straight into a [`Tree`].

use std::borrow::Cow;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink};
use html5ever::{Attribute, ExpandedName, LocalName, Namespace, ParseOpts, QualName};
use tracing::trace;

use super::{NodeId, Tree};

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Handle for nodes the tree builder creates but we never keep (comments,
/// processing instructions). Tree operations ignore ids past the arena.
const DISCARDED: NodeId = NodeId::MAX;

/// Parse `html` as the content of a `<div>` and append the resulting nodes
/// to `parent`.
///
/// Text is decoded, so `&lt;` becomes `<` in the tree and is escaped again
/// on output. A `class` attribute fills the element's class list.
///
/// # Example
///
/// ```
/// use autodir::dom::{Tree, parse_fragment};
///
/// let mut tree = Tree::new();
/// let root = tree.create_element("div");
/// parse_fragment(&mut tree, root, "<p class=\"note\">a &amp; <u>b</u></p>");
/// assert_eq!(tree.inner_html(root), r#"<p class="note">a &amp; <u>b</u></p>"#);
/// ```
pub fn parse_fragment(tree: &mut Tree, parent: NodeId, html: &str) {
    let document = tree.create_element("#document");
    let sink = FragmentSink {
        tree: RefCell::new(&mut *tree),
        document: Rc::new(SinkNode::other(document)),
    };
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let context = QualName::new(None, Namespace::from(HTML_NS), LocalName::from("div"));
    html5ever::parse_fragment(sink, opts, context, Vec::new()).one(html);

    // The builder wraps fragment content in an <html> element.
    for wrapper in tree.children(document).to_vec() {
        tree.move_children(wrapper, parent);
    }
}

#[derive(Debug)]
struct SinkNode {
    id: NodeId,
    name: QualName,
}

impl SinkNode {
    fn other(id: NodeId) -> Self {
        Self {
            id,
            name: QualName::new(None, Namespace::from(""), LocalName::from("")),
        }
    }
}

type Handle = Rc<SinkNode>;

struct FragmentSink<'t> {
    tree: RefCell<&'t mut Tree>,
    document: Handle,
}

impl<'t> FragmentSink<'t> {
    fn tree(&self) -> RefMut<'_, &'t mut Tree> {
        self.tree.borrow_mut()
    }

    fn set_attrs(&self, id: NodeId, attrs: Vec<Attribute>, only_missing: bool) {
        let mut tree = self.tree();
        for attr in attrs {
            let name = &*attr.name.local;
            if name == "class" {
                if only_missing && !tree.classes(id).is_empty() {
                    continue;
                }
                for class in attr.value.split_whitespace() {
                    tree.add_class(id, class);
                }
            } else if !only_missing || tree.attr(id, name).is_none() {
                tree.set_attr(id, name, &attr.value);
            }
        }
    }
}

impl TreeSink for FragmentSink<'_> {
    type Handle = Handle;
    type Output = ();
    type ElemName<'a>
        = ExpandedName<'a>
    where
        Self: 'a;

    fn finish(self) -> Self::Output {}

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!(%msg, "html parse error");
    }

    fn get_document(&self) -> Self::Handle {
        Rc::clone(&self.document)
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        target.name.expanded()
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let id = self.tree().create_element(&name.local);
        self.set_attrs(id, attrs, false);
        Rc::new(SinkNode { id, name })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Rc::new(SinkNode::other(DISCARDED))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Rc::new(SinkNode::other(DISCARDED))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.tree().append(parent.id, node.id),
            NodeOrText::AppendText(text) => self.tree().append_text(parent.id, &text),
        }
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut tree = self.tree();
        let id = match new_node {
            NodeOrText::AppendNode(node) => node.id,
            NodeOrText::AppendText(text) => tree.create_text(&text),
        };
        tree.insert_before(sibling.id, id);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.tree().parent(element.id).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        Rc::clone(target)
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        self.set_attrs(target.id, attrs, true);
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.tree().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        self.tree().move_children(node.id, new_parent.id);
    }
}
