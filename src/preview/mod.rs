//! Markdown preview rendering.
//!
//! Markdown is rendered to HTML with comrak, raw HTML included, and parsed
//! back into a [`Tree`] with html5ever so the direction classifier sees the
//! same elements a browser would. Soft breaks render as `<br>` plus a
//! newline, so multi-line paragraphs are split per line by the classifier.

use comrak::{Options, markdown_to_html};
use tracing::debug;

use crate::direction::{Direction, ScriptTable};
use crate::dom::{self, NodeId, Tree};

/// Class of the top-level preview element.
pub const PREVIEW_CLASS: &str = "markdown-preview-view";

/// A rendered markdown document.
///
/// # Example
///
/// ```
/// use autodir::direction::Direction;
/// use autodir::preview::Preview;
///
/// let mut preview = Preview::parse("שלום עולם");
/// preview.classify(Direction::Ltr);
/// assert!(preview.html().contains(r#"<p class="esm-rtl">שלום עולם</p>"#));
/// ```
#[derive(Debug, Clone)]
pub struct Preview {
    tree: Tree,
    root: NodeId,
}

impl Preview {
    pub fn parse(source: &str) -> Self {
        let html = markdown_to_html(source, &create_options());

        let mut tree = Tree::new();
        let root = tree.create_element("div");
        tree.add_class(root, PREVIEW_CLASS);
        dom::parse_fragment(&mut tree, root, &html);
        debug!(bytes = html.len(), nodes = tree.len(), "rendered preview tree");
        Self { tree, root }
    }

    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Run the direction classifier over the whole document.
    pub fn classify(&mut self, fallback: Direction) {
        dom::classify(&mut self.tree, self.root, fallback);
    }

    pub fn classify_with(&mut self, table: &ScriptTable, fallback: Direction) {
        dom::classify_with(table, &mut self.tree, self.root, fallback);
    }

    /// Give the whole document one direction instead of classifying it.
    pub fn force_direction(&mut self, direction: Direction) {
        dom::set_direction_class(&mut self.tree, self.root, direction);
    }

    pub fn html(&self) -> String {
        self.tree.outer_html(self.root)
    }
}

/// Render `source` to HTML.
///
/// In `Auto` mode every block is classified, starting from `fallback`.
/// Otherwise the preview root carries the forced direction.
pub fn render_html(source: &str, mode: Direction, fallback: Direction) -> String {
    let mut preview = Preview::parse(source);
    match mode {
        Direction::Auto => preview.classify(fallback),
        forced => preview.force_direction(forced),
    }
    preview.html()
}

fn create_options() -> Options {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.front_matter_delimiter = Some("---".to_string());

    // Raw HTML is parsed into real elements, not escaped
    options.render.unsafe_ = true;
    options.render.hardbreaks = true;

    options
}
