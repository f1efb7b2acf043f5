#![forbid(unsafe_code)]

//! Observable value container with ordered, synchronous notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). The lifecycle is an explicit two-state variant:
//! `None` means the container has never fired, `Some(v)` means it has. A
//! fired-but-absent state is unrepresentable.
//!
//! [`emit`](Observable::emit) is the single mutation path: it stores the
//! value and synchronously invokes every subscriber registered at the start
//! of the pass, in registration order, before returning. There is no
//! equality check — emitting a value equal to the current one notifies
//! again.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Every emit is visible to all subscribers registered before the pass
//!    began, before `emit` returns.
//! 3. A subscriber added during a pass does not observe the emit in
//!    progress; one removed during a pass may still observe it (removal
//!    takes effect for subsequent emits).
//! 4. [`Subscription::unsubscribe`] removes exactly the handler it was
//!    returned for, keyed by an opaque token rather than a positional
//!    index, and is idempotent.
//!
//! # Failure Modes
//!
//! - **Handler panics**: the panic propagates to the `emit` caller; later
//!   handlers in the pass are not invoked. The value update itself has
//!   already landed.
//! - **Forgotten Subscription**: dropping the handle does *not* detach the
//!   handler — the observable owns its subscribers until `unsubscribe` is
//!   called. Internal subscriptions made by `render`/`map` rely on this.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::provision::PendingProvision;

pub(crate) type Handler<T> = Rc<dyn Fn(&T)>;

/// One registered subscriber. The token is what `unsubscribe` keys removal
/// by, so concurrent add/remove can never evict the wrong handler.
pub(crate) struct Entry<T> {
    pub(crate) id: u64,
    pub(crate) handler: Handler<T>,
}

/// Shared interior for [`Observable<T>`].
pub(crate) struct ObservableInner<T> {
    /// `None` until the first emit.
    pub(crate) value: Option<T>,
    /// Token source for subscriber and failure-handler entries.
    pub(crate) next_id: u64,
    pub(crate) subscribers: Vec<Entry<T>>,
    /// Completion channels of in-flight `provide` tasks, FIFO.
    pub(crate) pending: Vec<PendingProvision<T>>,
    pub(crate) failure_handlers: Vec<crate::provision::FailureEntry>,
}

/// A shared value container that notifies subscribers on every emit.
///
/// Cloning an `Observable` creates a new handle to the **same** inner
/// state — both handles see the same value and share subscribers.
pub struct Observable<T> {
    pub(crate) inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::uninitialized()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create an observable that starts initialized with `value`.
    ///
    /// Constructing with a value counts as having fired: a subscriber added
    /// afterwards receives `value` immediately.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::from_state(Some(value))
    }

    /// Create an observable with no value yet. It fires for the first time
    /// on the first [`emit`](Self::emit) (or resolved provision).
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::from_state(None)
    }

    fn from_state(value: Option<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                next_id: 0,
                subscribers: Vec::new(),
                pending: Vec::new(),
                failure_handlers: Vec::new(),
            })),
        }
    }

    /// Whether at least one value has been emitted (or supplied at
    /// construction).
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    /// Get a clone of the current value; `None` while uninitialized.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.inner.borrow().value.as_ref())
    }

    /// Store a new value and synchronously notify every subscriber, in
    /// registration order, before returning.
    ///
    /// The pass iterates a snapshot of the subscriber list, so handlers may
    /// freely subscribe, unsubscribe, or emit re-entrantly. Each pass
    /// delivers its own emitted value even if a nested emit changed the
    /// stored value in between.
    pub fn emit(&self, value: T) {
        let pass: Vec<Handler<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = Some(value.clone());
            inner
                .subscribers
                .iter()
                .map(|entry| Rc::clone(&entry.handler))
                .collect()
        };
        tracing::trace!(subscribers = pass.len(), "emit");
        for handler in &pass {
            handler(&value);
        }
    }

    /// Register `handler` at the end of the subscriber list. If the
    /// observable has already fired, `handler` is invoked immediately and
    /// synchronously with the current value before `subscribe` returns.
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let handler: Handler<T> = Rc::new(handler);
        let subscription = self.attach(Rc::clone(&handler));
        let replay = self.inner.borrow().value.clone();
        if let Some(value) = replay {
            handler(&value);
        }
        subscription
    }

    /// Register `handler` without the immediate replay of the current
    /// value; it only sees emits that happen after registration.
    pub fn subscribe_deferred(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        self.attach(Rc::new(handler))
    }

    fn attach(&self, handler: Handler<T>) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push(Entry { id, handler });
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.retain(|entry| entry.id != id);
            }
        })
    }

    /// Emit `updater(current)` if the observable has fired; no-op
    /// otherwise. Chainable.
    pub fn transform(&self, updater: impl FnOnce(&T) -> T) -> &Self {
        if let Some(current) = self.get() {
            self.emit(updater(&current));
        }
        self
    }

    /// Emit `updater(current)` if the observable has fired, or
    /// `updater(&default)` if it has not. Always emits. Chainable.
    pub fn transform_or(&self, updater: impl FnOnce(&T) -> T, default: T) -> &Self {
        let next = match self.get() {
            Some(current) => updater(&current),
            None => updater(&default),
        };
        self.emit(next);
        self
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

/// Detach handle returned by [`Observable::subscribe`].
///
/// `unsubscribe` removes the associated handler from the subscriber list,
/// keyed by the handler's registration token; the relative order of the
/// remaining handlers is untouched. The call is idempotent.
///
/// Dropping the handle does not detach: subscribers stay registered for the
/// observable's lifetime unless explicitly unsubscribed.
pub struct Subscription {
    active: Cell<bool>,
    detach: Box<dyn Fn()>,
}

impl Subscription {
    pub(crate) fn new(detach: impl Fn() + 'static) -> Self {
        Self {
            active: Cell::new(true),
            detach: Box::new(detach),
        }
    }

    /// True until the first `unsubscribe` call.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Remove the associated handler. Safe to call during an in-progress
    /// notification pass (removal takes effect for subsequent emits) and
    /// safe to call repeatedly (later calls are no-ops).
    pub fn unsubscribe(&self) {
        if self.active.replace(false) {
            (self.detach)();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
