//! Observable ordered collection.
//!
//! `ObservableList<T>` is a mutable, dense, index-addressable sequence that
//! announces every structural mutation through its [`ChangeNotifier`]. Each
//! mutation emits the smallest event that describes it:
//!
//! | Operation                         | Event                              |
//! |-----------------------------------|------------------------------------|
//! | `push` / `insert(i, _)`           | `Inserted { start: i, count: 1 }`  |
//! | `extend` / `insert_all(i, n..)`   | `Inserted { start: i, count: n }`  |
//! | `remove(i)` / `remove_item`       | `Removed { start: i, count: 1 }`   |
//! | `clear`                           | `Removed { start: 0, count: len }` |
//! | `set(i, v)` with `v != old`       | `Changed { start: i, count: 1 }`   |
//! | `remove_all` / `retain_all` / ... | `Generic`                          |
//!
//! Mutations that change nothing (an equal `set`, an empty `extend`, `clear`
//! on an empty list) emit nothing.

use std::sync::Arc;

use horizon_adapter_core::logging::targets;
use horizon_adapter_core::{
    AdapterError, ChangeNotifier, ListChange, NotifyGate, Result, UiDispatcher,
};
use parking_lot::{RwLock, RwLockReadGuard};

/// A mutable ordered collection that notifies listeners of every change.
///
/// # Example
///
/// ```
/// use horizon_adapter::ObservableList;
/// use horizon_adapter_core::ListChange;
///
/// let list = ObservableList::from_vec(vec!["a", "b"]);
/// list.notifier().add_listener(|change| {
///     assert_eq!(*change, ListChange::Inserted { start: 2, count: 1 });
/// });
/// list.push("c");
/// assert_eq!(list.len(), 3);
/// ```
///
/// # Locking
///
/// The read guard returned by [`items`](Self::items) must be dropped before
/// the list is mutated from the same thread.
pub struct ObservableList<T> {
    items: RwLock<Vec<T>>,
    notifier: ChangeNotifier,
    gate: NotifyGate,
}

impl<T: Send + Sync + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> ObservableList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a list holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            notifier: ChangeNotifier::new(),
            gate: NotifyGate::new(),
        }
    }

    /// The subscribe point for change listeners.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Read-only access to the items.
    pub fn items(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read()
    }

    /// Calls `f` with a reference to the item at `index`.
    pub fn with_item<R, F>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let items = self.items.read();
        items
            .get(index)
            .map(f)
            .ok_or_else(|| AdapterError::out_of_range(index, items.len()))
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.write();
            items.push(item);
            items.len() - 1
        };
        self.emit(ListChange::Inserted {
            start: index,
            count: 1,
        });
    }

    /// Inserts an item at `index`, shifting later items up.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(AdapterError::out_of_range(index, items.len()));
            }
            items.insert(index, item);
        }
        self.emit(ListChange::Inserted {
            start: index,
            count: 1,
        });
        Ok(())
    }

    /// Appends every item of `iter`.
    pub fn extend<I>(&self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let (start, count) = {
            let mut items = self.items.write();
            let start = items.len();
            items.extend(iter);
            (start, items.len() - start)
        };
        if count > 0 {
            self.emit(ListChange::Inserted { start, count });
        }
    }

    /// Inserts every item of `iter` at `index`, preserving their order.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `index > len()`.
    pub fn insert_all<I>(&self, index: usize, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let count = {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(AdapterError::out_of_range(index, items.len()));
            }
            let before = items.len();
            items.splice(index..index, iter);
            items.len() - before
        };
        if count > 0 {
            self.emit(ListChange::Inserted {
                start: index,
                count,
            });
        }
        Ok(())
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove(&self, index: usize) -> Result<T> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return Err(AdapterError::out_of_range(index, items.len()));
            }
            items.remove(index)
        };
        self.emit(ListChange::Removed {
            start: index,
            count: 1,
        });
        Ok(removed)
    }

    /// Removes every item matching `keep == false`.
    ///
    /// Emits one generic change if anything was removed.
    pub fn retain<F>(&self, keep: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let removed = {
            let mut items = self.items.write();
            let before = items.len();
            items.retain(keep);
            before - items.len()
        };
        if removed > 0 {
            tracing::debug!(target: targets::LIST, removed, "bulk removal");
            self.emit(ListChange::Generic);
        }
        removed > 0
    }

    /// Removes every item.
    pub fn clear(&self) {
        let count = {
            let mut items = self.items.write();
            let count = items.len();
            items.clear();
            count
        };
        if count > 0 {
            self.emit(ListChange::Removed { start: 0, count });
        }
    }

    /// Replaces the whole content and emits a generic change.
    pub fn replace_all(&self, new_items: Vec<T>) {
        *self.items.write() = new_items;
        self.emit(ListChange::Generic);
    }

    /// Sorts the items and emits a generic change.
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items.write().sort_by(compare);
        self.emit(ListChange::Generic);
    }

    /// Emits a generic change without mutating anything.
    ///
    /// Use after mutating item contents through interior mutability.
    pub fn notify_data_set_changed(&self) {
        self.emit(ListChange::Generic);
    }

    /// Mutates the items on the calling (possibly background) thread and
    /// posts the resulting generic change to the UI thread.
    ///
    /// Only the notification is marshalled; the mutation itself happens
    /// immediately. Concurrent mutation from several threads is not
    /// supported.
    pub fn update_in_background<R, F>(self: &Arc<Self>, dispatcher: &UiDispatcher, f: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let result = {
            let mut items = self.items.write();
            f(&mut items)
        };
        let list = Arc::clone(self);
        dispatcher.post(move || list.notify_data_set_changed());
        result
    }

    /// Opens a transaction: granular events are suppressed until
    /// [`end_transaction`](Self::end_transaction).
    ///
    /// # Errors
    ///
    /// [`AdapterError::TransactionAlreadyOpen`] if one is already open.
    pub fn begin_transaction(&self) -> Result<()> {
        self.gate.begin()
    }

    /// Closes the transaction, emitting one generic change if anything was
    /// mutated while it was open.
    ///
    /// # Errors
    ///
    /// [`AdapterError::NoTransactionOpen`] if no transaction is open.
    pub fn end_transaction(&self) -> Result<()> {
        self.gate.end(&self.notifier).map(|_| ())
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.gate.is_open()
    }

    /// Runs `f` inside a transaction, closing it even if `f` fails.
    pub fn transaction<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        self.gate.scoped(&self.notifier, || f(self))
    }

    fn emit(&self, change: ListChange) {
        tracing::trace!(target: targets::LIST, ?change, "list changed");
        self.gate.dispatch(&self.notifier, change);
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableList<T> {
    /// Returns a clone of the item at `index`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.with_item(index, T::clone)
    }

    /// Returns a snapshot of all items.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Iterates over a snapshot of the items.
    ///
    /// The list may be mutated while the iterator is alive.
    pub fn iter_snapshot(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }
}

impl<T: PartialEq + Send + Sync + 'static> ObservableList<T> {
    /// Replaces the item at `index`, returning the previous value.
    ///
    /// Emits `Changed { start: index, count: 1 }` only if the new value
    /// differs from the old one.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let (old, changed) = {
            let mut items = self.items.write();
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or_else(|| AdapterError::out_of_range(index, len))?;
            let changed = *slot != item;
            (std::mem::replace(slot, item), changed)
        };
        if changed {
            self.emit(ListChange::Changed {
                start: index,
                count: 1,
            });
        }
        Ok(old)
    }

    /// Returns the index of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.read().iter().position(|other| other == item)
    }

    /// Returns `true` if some item equals `item`.
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Removes the first item equal to `item`. Returns whether one was found.
    pub fn remove_item(&self, item: &T) -> bool {
        let index = {
            let mut items = self.items.write();
            match items.iter().position(|other| other == item) {
                Some(index) => {
                    items.remove(index);
                    index
                }
                None => return false,
            }
        };
        self.emit(ListChange::Removed {
            start: index,
            count: 1,
        });
        true
    }

    /// Removes every item contained in `victims`.
    pub fn remove_all(&self, victims: &[T]) -> bool {
        self.retain(|item| !victims.contains(item))
    }

    /// Keeps only the items contained in `keep`.
    pub fn retain_all(&self, keep: &[T]) -> bool {
        self.retain(|item| keep.contains(item))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.read())
            .field("listeners", &self.notifier.listener_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(ObservableList<String>: Send, Sync);
