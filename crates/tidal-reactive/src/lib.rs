#![forbid(unsafe_code)]

//! Observable values with synchronous change notification.
//!
//! # Role in Tidal
//! `tidal-reactive` is the state layer. It owns the observable-value engine:
//! value storage with an explicit uninitialized/initialized lifecycle,
//! ordered subscriber notification, derived rendered views, and background
//! provisioning of values that arrive later.
//!
//! # Primary responsibilities
//! - [`Observable`]: a shared value container; `emit` is the single
//!   mutation path and notifies all subscribers synchronously, in
//!   registration order.
//! - [`Subscription`]: detach handle with idempotent, identity-keyed
//!   removal.
//! - [`ObservableArray`]: sequence-valued observable whose mutation helpers
//!   always derive a fresh vector, never touching prior snapshots.
//! - Provisioning: [`Observable::provide`] runs a task off-thread and emits
//!   its result when the host pumps completions; failures are surfaced as
//!   [`ProvisionError`], never dropped.
//! - Views: [`Observable::render`] binds a value to a live text node;
//!   [`Observable::map`] builds a [`MappedView`] that recomputes its node
//!   from the source's current value.
//!
//! # How it fits in the system
//! A host component tree holds the `tidal-render` nodes and slots this crate
//! refreshes. All notification is single-threaded and re-entrant; the only
//! background activity is a provision task, which re-enters the core solely
//! through its completion channel.

pub mod array;
pub mod observable;
pub mod provision;
pub mod view;

pub use array::{LookupError, ObservableArray};
pub use observable::{Observable, Subscription};
pub use provision::ProvisionError;
pub use view::MappedView;
