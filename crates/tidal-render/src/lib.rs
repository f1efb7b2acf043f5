#![forbid(unsafe_code)]

//! Rendering sink: text nodes, placeholders, and mounted slots.
//!
//! # Role in Tidal
//! `tidal-render` is the surface the reactive core renders into. It owns no
//! reactivity of its own: the core hands it string content and refreshes it
//! in place when values change. A host component tree holds [`Node`]s and
//! [`NodeSlot`]s and reads their current content whenever it paints.
//!
//! # Primary responsibilities
//! - **TextHandle**: shared mutable text content, updated in place.
//! - **Node**: a renderable unit — either live text or an empty placeholder.
//! - **NodeSlot**: a mounted position whose content can be swapped wholesale.
//! - **Renderable**: the capability to produce current display content on
//!   demand.
//!
//! # How it fits in the system
//! `tidal-reactive` creates a `TextHandle` per bound value and rewrites it on
//! every emit, and swaps a `NodeSlot`'s node when a derived view refreshes.
//! Both updates land synchronously inside the source's notification pass;
//! how the host schedules repaints around that is out of scope here.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared mutable text content of a mounted text node.
///
/// Cloning a `TextHandle` creates a second handle to the **same** content;
/// `set_text` through either handle is visible through both. This is what
/// lets the reactive core keep a node fresh after handing it to a host.
pub struct TextHandle {
    content: Rc<RefCell<String>>,
}

impl Clone for TextHandle {
    fn clone(&self) -> Self {
        Self {
            content: Rc::clone(&self.content),
        }
    }
}

impl TextHandle {
    /// Create a text handle with the given initial content.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            content: Rc::new(RefCell::new(initial.into())),
        }
    }

    /// Create a text handle with empty content.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Replace the content in place. All clones of this handle observe the
    /// new text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.content.borrow_mut() = text.into();
    }

    /// Current content, cloned.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.borrow().clone()
    }
}

impl fmt::Debug for TextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextHandle")
            .field("content", &*self.content.borrow())
            .finish()
    }
}

impl fmt::Display for TextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content.borrow())
    }
}

/// A renderable unit handed to a host tree.
///
/// `Empty` is the placeholder rendered where no content exists yet (e.g. a
/// derived view over a source that has not fired).
#[derive(Clone, Debug)]
pub enum Node {
    /// Live text content.
    Text(TextHandle),
    /// Empty placeholder.
    Empty,
}

impl Node {
    /// Create a text node with the given content.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextHandle::new(content))
    }

    /// Create an empty placeholder node.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Current textual content; an empty string for `Empty`.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(handle) => handle.text(),
            Self::Empty => String::new(),
        }
    }

    /// Whether this node is the empty placeholder.
    #[must_use]
    pub fn is_empty_placeholder(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

// Plain values coerce to text nodes; results that are already nodes pass
// through untouched.

impl From<TextHandle> for Node {
    fn from(handle: TextHandle) -> Self {
        Self::Text(handle)
    }
}

impl From<String> for Node {
    fn from(content: String) -> Self {
        Self::text(content)
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<Option<Node>> for Node {
    fn from(node: Option<Node>) -> Self {
        node.unwrap_or(Self::Empty)
    }
}

/// Capability to produce current display content on demand.
///
/// Implementors recompute from live state on every call; nothing is cached
/// at this seam.
pub trait Renderable {
    /// Produce the node representing the current state.
    fn render(&self) -> Node;
}

/// A mounted position in a host tree whose content can be refreshed in
/// place.
///
/// Cloning a `NodeSlot` shares the slot: the reactive core keeps one clone
/// to write refreshed content through, the host keeps another to read from.
pub struct NodeSlot {
    current: Rc<RefCell<Node>>,
}

impl Clone for NodeSlot {
    fn clone(&self) -> Self {
        Self {
            current: Rc::clone(&self.current),
        }
    }
}

impl NodeSlot {
    /// Create a slot holding the given initial node.
    #[must_use]
    pub fn new(initial: Node) -> Self {
        Self {
            current: Rc::new(RefCell::new(initial)),
        }
    }

    /// Swap in a new node. All clones of this slot observe it.
    pub fn set(&self, node: Node) {
        *self.current.borrow_mut() = node;
    }

    /// Current node, cloned.
    #[must_use]
    pub fn get(&self) -> Node {
        self.current.borrow().clone()
    }

    /// Current textual content of the mounted node.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.current.borrow().display_text()
    }
}

impl fmt::Debug for NodeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSlot")
            .field("current", &*self.current.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_handle_shares_content() {
        let a = TextHandle::new("hello");
        let b = a.clone();

        b.set_text("world");
        assert_eq!(a.text(), "world");
        assert_eq!(b.text(), "world");
    }

    #[test]
    fn text_handle_display() {
        let handle = TextHandle::new("42");
        assert_eq!(format!("{handle}"), "42");
    }

    #[test]
    fn empty_node_displays_blank() {
        let node = Node::empty();
        assert_eq!(node.display_text(), "");
        assert!(node.is_empty_placeholder());
    }

    #[test]
    fn text_node_displays_content() {
        let node = Node::text("abc");
        assert_eq!(node.display_text(), "abc");
        assert!(!node.is_empty_placeholder());
    }

    #[test]
    fn node_clone_shares_text_handle() {
        let node = Node::text("before");
        let clone = node.clone();

        if let Node::Text(handle) = &node {
            handle.set_text("after");
        }
        assert_eq!(clone.display_text(), "after");
    }

    #[test]
    fn coercion_from_plain_values() {
        let from_str: Node = "x".into();
        assert_eq!(from_str.display_text(), "x");

        let from_string: Node = String::from("y").into();
        assert_eq!(from_string.display_text(), "y");

        let from_none: Node = None.into();
        assert!(from_none.is_empty_placeholder());

        let from_some: Node = Some(Node::text("z")).into();
        assert_eq!(from_some.display_text(), "z");
    }

    #[test]
    fn slot_set_visible_through_clones() {
        let slot = NodeSlot::new(Node::empty());
        let host_side = slot.clone();

        slot.set(Node::text("mounted"));
        assert_eq!(host_side.display_text(), "mounted");
        assert!(!host_side.get().is_empty_placeholder());
    }
}
