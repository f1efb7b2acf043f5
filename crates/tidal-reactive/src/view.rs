#![forbid(unsafe_code)]

//! Rendered views over observable values.
//!
//! # Design
//!
//! [`Observable::render`] binds a value to a live text node: the node's
//! content is seeded from the current value and rewritten in place on every
//! subsequent emit. [`Observable::map`] builds a [`MappedView`], a derived
//! render-capable unit that recomputes its node from the source's *current*
//! value — on demand through the [`Renderable`] impl, and into its mounted
//! [`NodeSlot`] on every source emit. Nothing is cached between renders.
//!
//! Before the source has ever fired, a mapped view renders [`Node::Empty`]
//! rather than a stringified absent value.
//!
//! # Invariants
//!
//! 1. A rendered text node always shows the last emitted value (empty text
//!    while uninitialized).
//! 2. `MappedView::render` reflects the source at call time, never a stale
//!    snapshot.
//! 3. Slot refreshes happen synchronously inside the source's notification
//!    pass.
//!
//! # Failure Modes
//!
//! - **Transformer panics**: propagates to the `emit` (or `render`) caller.
//! - The internal subscriptions live for the source's lifetime; there is no
//!   unmount. Hosts that discard the node or slot simply stop reading it.

use std::fmt;
use std::rc::Rc;

use tidal_render::{Node, NodeSlot, Renderable, TextHandle};

use crate::observable::Observable;

impl<T: Clone + fmt::Display + 'static> Observable<T> {
    /// Produce a live text node bound to this observable.
    ///
    /// The node starts with the current value's text (empty if the
    /// observable has not fired) and is rewritten in place on every emit.
    #[must_use]
    pub fn render(&self) -> Node {
        let initial = self.with(|v| v.map(ToString::to_string).unwrap_or_default());
        let handle = TextHandle::new(initial);
        let writer = handle.clone();
        // Deferred: the handle already carries the current content. The
        // subscription stays attached for the observable's lifetime.
        let _ = self.subscribe_deferred(move |value| writer.set_text(value.to_string()));
        Node::Text(handle)
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Build a derived view whose node is computed by `transformer` from
    /// this observable's current value.
    ///
    /// Transformer results that are not already [`Node`]s coerce to text
    /// via `Into<Node>`. The view is live: every source emit refreshes its
    /// mounted slot, and [`MappedView::render`] recomputes on demand.
    pub fn map<N, F>(&self, transformer: F) -> MappedView<T>
    where
        F: Fn(&T) -> N + 'static,
        N: Into<Node>,
    {
        let transformer: Rc<dyn Fn(&T) -> Node> = Rc::new(move |value| transformer(value).into());

        let initial = match self.get() {
            Some(value) => transformer(&value),
            None => Node::Empty,
        };
        let slot = NodeSlot::new(initial);

        let writer = slot.clone();
        let refresh = Rc::clone(&transformer);
        // Deferred: the slot was just seeded above. Captures only the slot
        // and transformer, so no reference cycle back to the source.
        let _ = self.subscribe_deferred(move |value| writer.set(refresh(value)));

        MappedView {
            source: self.clone(),
            transformer,
            slot,
        }
    }
}

/// A live, continuously-updating derived view over an [`Observable`].
///
/// Obtained from [`Observable::map`]. Cloning shares the mounted slot and
/// source handle.
pub struct MappedView<T> {
    source: Observable<T>,
    transformer: Rc<dyn Fn(&T) -> Node>,
    slot: NodeSlot,
}

impl<T> Clone for MappedView<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            transformer: Rc::clone(&self.transformer),
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for MappedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedView")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> MappedView<T> {
    /// The mounted slot a host holds; refreshed on every source emit.
    #[must_use]
    pub fn mounted(&self) -> NodeSlot {
        self.slot.clone()
    }
}

impl<T: Clone + 'static> Renderable for MappedView<T> {
    /// Recompute the node from the source's current value. While the
    /// source is uninitialized this is the empty placeholder.
    fn render(&self) -> Node {
        match self.source.get() {
            Some(value) => (self.transformer)(&value),
            None => Node::Empty,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn render_seeds_from_current_value() {
        let obs = Observable::new(5);
        let node = obs.render();
        assert_eq!(node.display_text(), "5");
    }

    #[test]
    fn render_on_unfired_is_blank() {
        let obs: Observable<i32> = Observable::uninitialized();
        let node = obs.render();
        assert_eq!(node.display_text(), "");

        obs.emit(3);
        assert_eq!(node.display_text(), "3");
    }

    #[test]
    fn render_tracks_emits_in_place() {
        let obs = Observable::new(1);
        let node = obs.render();

        obs.emit(2);
        assert_eq!(node.display_text(), "2");

        obs.transform(|v| v * 10);
        assert_eq!(node.display_text(), "20");
    }

    #[test]
    fn map_renders_empty_before_fire() {
        let obs: Observable<i32> = Observable::uninitialized();
        let view = obs.map(|v| format!("value: {v}"));

        assert!(view.render().is_empty_placeholder());
        assert!(view.mounted().get().is_empty_placeholder());
    }

    #[test]
    fn map_recomputes_on_demand() {
        let obs = Observable::new(2);
        let renders = Rc::new(Cell::new(0u32));
        let renders_clone = Rc::clone(&renders);
        let view = obs.map(move |v| {
            renders_clone.set(renders_clone.get() + 1);
            format!("#{v}")
        });
        let after_seed = renders.get();

        assert_eq!(view.render().display_text(), "#2");
        assert_eq!(view.render().display_text(), "#2");
        // Each render call recomputes; nothing is cached.
        assert_eq!(renders.get(), after_seed + 2);

        obs.emit(3);
        assert_eq!(view.render().display_text(), "#3");
    }

    #[test]
    fn map_refreshes_mounted_slot_on_emit() {
        let obs = Observable::new("a".to_string());
        let view = obs.map(|v| v.to_uppercase());
        let slot = view.mounted();
        assert_eq!(slot.display_text(), "A");

        obs.emit("b".to_string());
        assert_eq!(slot.display_text(), "B");
    }

    #[test]
    fn map_transformer_may_return_node_directly() {
        let obs = Observable::new(1);
        let view = obs.map(|v| {
            if *v > 0 {
                Node::text("positive")
            } else {
                Node::Empty
            }
        });
        assert_eq!(view.render().display_text(), "positive");

        obs.emit(-1);
        assert!(view.render().is_empty_placeholder());
        assert!(view.mounted().get().is_empty_placeholder());
    }
}
