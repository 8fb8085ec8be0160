use std::collections::HashSet;

use tracing::trace;

use super::{NodeId, Tree};
use crate::direction::{DEFAULT_TABLE, Direction, ScriptTable, detect_with};

pub const LTR_CLASS: &str = "esm-ltr";
pub const RTL_CLASS: &str = "esm-rtl";
pub const AUTO_CLASS: &str = "esm-auto";

const DIRECTION_CLASSES: [&str; 3] = [LTR_CLASS, RTL_CLASS, AUTO_CLASS];

/// Inline formatting elements whose own direction has no visual effect.
/// Text found inside them decides the direction of the nearest enclosing
/// block instead.
pub const SPECIAL_TAGS: &[&str] = &["em", "i", "strong", "b", "del", "s", "code", "a"];

/// The class carrying `direction`.
pub const fn direction_class(direction: Direction) -> &'static str {
    match direction {
        Direction::Ltr => LTR_CLASS,
        Direction::Rtl => RTL_CLASS,
        Direction::Auto => AUTO_CLASS,
    }
}

/// Assign `direction` to `id`, replacing whatever direction class it had.
pub fn set_direction_class(tree: &mut Tree, id: NodeId, direction: Direction) {
    clear_direction_class(tree, id);
    tree.add_class(id, direction_class(direction));
}

fn clear_direction_class(tree: &mut Tree, id: NodeId) {
    for class in DIRECTION_CLASSES {
        tree.remove_class(id, class);
    }
}

/// The direction class currently on `id`, if any.
pub fn direction_of(tree: &Tree, id: NodeId) -> Option<Direction> {
    [Direction::Ltr, Direction::Rtl, Direction::Auto]
        .into_iter()
        .find(|&direction| tree.has_class(id, direction_class(direction)))
}

/// Classify every block under `root` with the built-in script table.
///
/// `fallback` is used for blocks whose text has no strong character
/// until some text in the walk decides a direction.
pub fn classify(tree: &mut Tree, root: NodeId, fallback: Direction) {
    classify_with(&DEFAULT_TABLE, tree, root, fallback);
}

/// Like [`classify`], with a custom script table.
pub fn classify_with(table: &ScriptTable, tree: &mut Tree, root: NodeId, fallback: Direction) {
    let mut pass = Pass {
        table,
        last: fallback,
        committed: HashSet::new(),
    };
    pass.run(tree, root);
}

/// State of one classification run.
struct Pass<'t> {
    table: &'t ScriptTable,
    /// Most recently detected direction anywhere in the walk.
    last: Direction,
    /// Elements whose direction was decided by their own text.
    committed: HashSet<NodeId>,
}

/// An element whose children are being visited.
struct Frame {
    el: NodeId,
    children: Vec<NodeId>,
    next: usize,
    scanned: bool,
}

impl Frame {
    fn enter(tree: &mut Tree, el: NodeId) -> Option<Self> {
        if tree.tag(el)? == "p" {
            split_lines(tree, el);
        }
        Some(Self {
            el,
            children: tree.children(el).to_vec(),
            next: 0,
            scanned: false,
        })
    }
}

impl Pass<'_> {
    /// Depth-first walk with an explicit stack, so nesting depth is bounded
    /// by memory rather than the call stack.
    fn run(&mut self, tree: &mut Tree, root: NodeId) {
        let Some(frame) = Frame::enter(tree, root) else {
            return;
        };
        let mut stack = vec![frame];
        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.next) else {
                if let Some(done) = stack.pop() {
                    self.leave(tree, &done);
                }
                continue;
            };
            frame.next += 1;
            let el = frame.el;

            let Some(text) = tree.text(child) else {
                if let Some(inner) = Frame::enter(tree, child) {
                    stack.push(inner);
                }
                continue;
            };
            if text.trim().is_empty() || self.committed.contains(&el) {
                continue;
            }
            frame.scanned = true;
            if let Some(direction) = detect_with(self.table, text) {
                self.last = direction;
                self.commit(tree, el, direction);
            }
        }
    }

    /// Finish an element once all of its children were visited.
    fn leave(&mut self, tree: &mut Tree, frame: &Frame) {
        let el = frame.el;
        if !self.committed.contains(&el) {
            if frame.scanned && ends_with_block(tree, &frame.children) {
                trace!(node = el, direction = %self.last, "fallback direction");
                set_direction_class(tree, el, self.last);
            } else if direction_of(tree, el).is_some() {
                trace!(node = el, "clearing stale direction");
                clear_direction_class(tree, el);
            }
        }

        if tree.tag(el) == Some("ul") {
            aggregate_list(tree, el, self.committed.contains(&el));
        }
    }

    fn commit(&mut self, tree: &mut Tree, el: NodeId, direction: Direction) {
        self.committed.insert(el);
        if !is_special(tree, el) {
            self.assign(tree, el, direction);
            return;
        }
        match block_ancestor(tree, el) {
            Some(block) if self.committed.contains(&block) => {}
            Some(block) => {
                self.committed.insert(block);
                self.assign(tree, block, direction);
            }
            None => self.assign(tree, el, direction),
        }
    }

    /// Set the class on `target`, mirroring it onto an enclosing list item.
    fn assign(&mut self, tree: &mut Tree, target: NodeId, direction: Direction) {
        set_direction_class(tree, target, direction);
        if let Some(parent) = tree.parent(target) {
            if tree.tag(parent) == Some("li") {
                self.committed.insert(parent);
                set_direction_class(tree, parent, direction);
            }
        }
    }
}

/// Whether the children end in an element, or in the bare newline a
/// renderer leaves after a closing block tag.
fn ends_with_block(tree: &Tree, children: &[NodeId]) -> bool {
    children
        .last()
        .is_some_and(|&c| tree.is_element(c) || tree.text(c) == Some("\n"))
}

fn is_special(tree: &Tree, id: NodeId) -> bool {
    tree.tag(id).is_some_and(|tag| SPECIAL_TAGS.contains(&tag))
}

/// Nearest ancestor of `id` that is not a special inline element.
fn block_ancestor(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(id)?;
    while is_special(tree, current) {
        current = tree.parent(current)?;
    }
    Some(current)
}

fn aggregate_list(tree: &mut Tree, list: NodeId, committed: bool) {
    let first_item = tree
        .children(list)
        .iter()
        .copied()
        .find(|&c| tree.tag(c) == Some("li"));
    if first_item.is_some_and(|li| tree.has_class(li, RTL_CLASS)) {
        set_direction_class(tree, list, Direction::Rtl);
    } else if !committed {
        tree.remove_class(list, RTL_CLASS);
    }
}

/// Split a paragraph holding several lines into one `div` per line.
///
/// Lines end at `<br>` elements and at newlines inside text nodes. Both
/// separators are dropped. Paragraphs with a single line are left alone,
/// which keeps repeated runs stable.
fn split_lines(tree: &mut Tree, p: NodeId) {
    let mut lines: Vec<Vec<NodeId>> = vec![Vec::new()];
    let mut split = false;
    for child in tree.children(p).to_vec() {
        if tree.tag(child) == Some("br") {
            lines.push(Vec::new());
            split = true;
            continue;
        }
        let Some(text) = tree.text(child).filter(|t| t.contains('\n')) else {
            if let Some(line) = lines.last_mut() {
                line.push(child);
            }
            continue;
        };
        split = true;
        let pieces: Vec<String> = text.split('\n').map(str::to_string).collect();
        for (i, piece) in pieces.iter().enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if piece.is_empty() {
                continue;
            }
            let node = tree.create_text(piece);
            if let Some(line) = lines.last_mut() {
                line.push(node);
            }
        }
    }
    if !split {
        return;
    }

    lines.retain(|line| line.iter().any(|&n| !is_blank(tree, n)));
    if lines.len() < 2 {
        return;
    }

    trace!(node = p, lines = lines.len(), "splitting paragraph");
    let blocks = lines
        .into_iter()
        .map(|line| tree.element("div", &line))
        .collect();
    tree.set_children(p, blocks);
}

fn is_blank(tree: &Tree, id: NodeId) -> bool {
    tree.text(id).is_some_and(|t| t.trim().is_empty())
}
