#![forbid(unsafe_code)]

//! Background provisioning of eventual values.
//!
//! # Design
//!
//! [`Observable::provide`] runs a task on a spawned thread and records its
//! completion channel; the call returns immediately. The result re-enters
//! the core on the owning thread when the host pumps completions with
//! [`poll_provisions`](Observable::poll_provisions) (non-blocking) or
//! [`block_on_provisions`](Observable::block_on_provisions). A successful
//! task emits its value through the normal notification path; a failed task
//! is surfaced as a [`ProvisionError`] to registered failure handlers.
//!
//! # Invariants
//!
//! 1. `provide` never blocks and never emits synchronously.
//! 2. Completions are applied in the order the provisions were requested.
//! 3. A failure is never silently dropped: it reaches every failure
//!    handler, or a `tracing` warning when none is registered.
//!
//! # Failure Modes
//!
//! - **Task returns `Err`**: dispatched to failure handlers; no emit.
//! - **Task thread dies without completing** (panic): observed as a closed
//!   channel and dispatched as [`ProvisionError::Disconnected`].
//! - No cancellation is exposed; a pending provision stays pending until
//!   its channel settles or closes.

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::observable::{Observable, Subscription};

/// Completion channel of one in-flight `provide` task.
pub(crate) type PendingProvision<T> = Receiver<Result<T, ProvisionError>>;

/// One registered failure handler, token-keyed like value subscribers.
pub(crate) struct FailureEntry {
    pub(crate) id: u64,
    pub(crate) handler: Rc<dyn Fn(&ProvisionError)>,
}

/// Why an eventual value never arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// The provisioning task reported a failure.
    Failed(String),
    /// The provisioning task died without completing.
    Disconnected,
}

impl ProvisionError {
    /// Convenience constructor for task code.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

impl std::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "provision failed: {reason}"),
            Self::Disconnected => write!(f, "provision task disconnected before completing"),
        }
    }
}

impl std::error::Error for ProvisionError {}

impl<T: Clone + Send + 'static> Observable<T> {
    /// Run `task` on a background thread and emit its value once the host
    /// pumps completions. Returns immediately; chainable.
    pub fn provide<F>(&self, task: F) -> &Self
    where
        F: FnOnce() -> Result<T, ProvisionError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // A closed receiver just means the observable is gone.
            let _ = tx.send(task());
        });
        self.inner.borrow_mut().pending.push(rx);
        tracing::debug!(pending = self.pending_provisions(), "provision started");
        self
    }

    /// Apply every provision that has completed, in request order, without
    /// blocking. Returns how many were applied.
    pub fn poll_provisions(&self) -> usize {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending);
        let mut still_pending = Vec::new();
        let mut applied = 0;
        for rx in pending {
            match rx.try_recv() {
                Ok(outcome) => {
                    self.apply_provision(outcome);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => still_pending.push(rx),
                Err(TryRecvError::Disconnected) => {
                    self.apply_provision(Err(ProvisionError::Disconnected));
                    applied += 1;
                }
            }
        }
        // Provisions requested from inside a handler during the pump land
        // after the ones that were already pending.
        let mut inner = self.inner.borrow_mut();
        still_pending.append(&mut inner.pending);
        inner.pending = still_pending;
        applied
    }

    /// Block until every currently pending provision settles, applying each
    /// in request order. Returns how many were applied.
    pub fn block_on_provisions(&self) -> usize {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending);
        let mut applied = 0;
        for rx in pending {
            let outcome = rx.recv().unwrap_or(Err(ProvisionError::Disconnected));
            self.apply_provision(outcome);
            applied += 1;
        }
        applied
    }

    /// Number of provisions still waiting to settle.
    #[must_use]
    pub fn pending_provisions(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    fn apply_provision(&self, outcome: Result<T, ProvisionError>) {
        match outcome {
            Ok(value) => self.emit(value),
            Err(error) => {
                let handlers: Vec<Rc<dyn Fn(&ProvisionError)>> = self
                    .inner
                    .borrow()
                    .failure_handlers
                    .iter()
                    .map(|entry| Rc::clone(&entry.handler))
                    .collect();
                if handlers.is_empty() {
                    tracing::warn!(%error, "provision failed with no failure handler registered");
                }
                for handler in &handlers {
                    handler(&error);
                }
            }
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Register a handler for provision failures. Removal follows the same
    /// token-keyed, idempotent discipline as value subscriptions.
    pub fn on_provision_failure(
        &self,
        handler: impl Fn(&ProvisionError) + 'static,
    ) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.failure_handlers.push(FailureEntry {
                id,
                handler: Rc::new(handler),
            });
            id
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .failure_handlers
                    .retain(|entry| entry.id != id);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
