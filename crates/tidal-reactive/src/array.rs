#![forbid(unsafe_code)]

//! Sequence-valued observable with snapshot-preserving mutation helpers.
//!
//! # Design
//!
//! [`ObservableArray<T>`] wraps an [`Observable<Vec<T>>`]. Every mutation
//! helper derives a **new** vector from the current one and hands it to the
//! inherited [`emit`](Observable::emit); a snapshot captured before a
//! mutation is never altered by it. Reads (`find`, `filter`, `any`, ...)
//! delegate to the current vector and never emit.
//!
//! `Deref` exposes the full observable surface (`subscribe`, `render`,
//! `map`, ...) on the array directly.
//!
//! # Invariants
//!
//! 1. Mutators emit exactly once per call, including the cosmetic case:
//!    `pop`/`shift` on an empty array emit the unchanged empty vector.
//!    Subscribers counting notifications observe that emit.
//! 2. `splice` clamps `start` and `len` to the current bounds.
//! 3. `replace` is the only operation that treats a missing element as an
//!    error; `delete` reports absence with `false`.
//!
//! # Failure Modes
//!
//! - [`replace`](ObservableArray::replace) on an absent element returns
//!   [`LookupError::SourceItemNotFound`] and leaves the value unchanged.
//! - Everything else is total.

use std::ops::Deref;

use crate::observable::Observable;

/// Lookup failure from [`ObservableArray::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// The element to replace is not present in the current sequence.
    SourceItemNotFound,
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceItemNotFound => f.write_str("source item not found"),
        }
    }
}

impl std::error::Error for LookupError {}

/// An observable holding an ordered sequence, with mutation helpers that
/// always produce a fresh vector.
///
/// Cloning shares the underlying observable.
pub struct ObservableArray<T> {
    values: Observable<Vec<T>>,
}

impl<T> Clone for ObservableArray<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableArray")
            .field("values", &self.values)
            .finish()
    }
}

impl<T: Clone + 'static> Deref for ObservableArray<T> {
    type Target = Observable<Vec<T>>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T: Clone + 'static> From<Vec<T>> for ObservableArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone + 'static> ObservableArray<T> {
    /// Create an array observable with the given initial elements. The
    /// observable starts fired, like [`Observable::new`].
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            values: Observable::new(items),
        }
    }

    /// Snapshot of the current elements. The returned vector is detached:
    /// later mutations never alter it.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.values.get().unwrap_or_default()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.with(|v| v.map_or(0, Vec::len))
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one element.
    pub fn push(&self, item: T) {
        let mut next = self.items();
        next.push(item);
        self.values.emit(next);
    }

    /// Append every element of `items`.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let mut next = self.items();
        next.extend(items);
        self.values.emit(next);
    }

    /// Remove and return the last element. Emits even when the array was
    /// already empty (the notification is observable to subscribers).
    pub fn pop(&self) -> Option<T> {
        let mut next = self.items();
        let last = next.pop();
        self.values.emit(next);
        last
    }

    /// Remove and return the first element. Emits even when the array was
    /// already empty.
    pub fn shift(&self) -> Option<T> {
        let mut next = self.items();
        let first = if next.is_empty() {
            None
        } else {
            Some(next.remove(0))
        };
        self.values.emit(next);
        first
    }

    /// Prepend one element.
    pub fn unshift(&self, item: T) {
        let mut next = self.items();
        next.insert(0, item);
        self.values.emit(next);
    }

    /// Remove `len` elements starting at `start`, inserting `replacement`
    /// in their place. Indices past the end are clamped. Returns the
    /// removed elements.
    pub fn splice(&self, start: usize, len: usize, replacement: Vec<T>) -> Vec<T> {
        let mut next = self.items();
        let start = start.min(next.len());
        let end = start.saturating_add(len).min(next.len());
        let removed: Vec<T> = next.splice(start..end, replacement).collect();
        self.values.emit(next);
        removed
    }

    /// Remove every element matching `predicate`.
    pub fn delete_any(&self, predicate: impl Fn(&T) -> bool) {
        let next: Vec<T> = self
            .items()
            .into_iter()
            .filter(|item| !predicate(item))
            .collect();
        self.values.emit(next);
    }

    /// First element matching `predicate`, cloned. No emit.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.values
            .with(|v| v.and_then(|items| items.iter().find(|item| predicate(item)).cloned()))
    }

    /// Index of the first element matching `predicate`. No emit.
    #[must_use]
    pub fn find_index(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.values
            .with(|v| v.and_then(|items| items.iter().position(|item| predicate(item))))
    }

    /// Every element matching `predicate`, cloned. No emit.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.values.with(|v| {
            v.map_or_else(Vec::new, |items| {
                items.iter().filter(|item| predicate(item)).cloned().collect()
            })
        })
    }

    /// Whether any element matches `predicate`. No emit.
    #[must_use]
    pub fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.values
            .with(|v| v.is_some_and(|items| items.iter().any(|item| predicate(item))))
    }
}

impl<T: Clone + PartialEq + 'static> ObservableArray<T> {
    /// Remove the first element equal to `item`, via the splice path.
    /// Returns whether anything was removed.
    pub fn delete(&self, item: &T) -> bool {
        match self.find_index(|candidate| candidate == item) {
            Some(index) => {
                self.splice(index, 1, Vec::new());
                true
            }
            None => false,
        }
    }

    /// Substitute the first element equal to `current` with `updated`, at
    /// the same index.
    ///
    /// # Errors
    ///
    /// [`LookupError::SourceItemNotFound`] if `current` is absent; the
    /// sequence is left unchanged and nothing is emitted.
    pub fn replace(&self, current: &T, updated: T) -> Result<(), LookupError> {
        let mut next = self.items();
        let index = next
            .iter()
            .position(|item| item == current)
            .ok_or(LookupError::SourceItemNotFound)?;
        next[index] = updated;
        self.values.emit(next);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
