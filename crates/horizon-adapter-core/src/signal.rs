//! Multi-listener signals.
//!
//! A [`Signal<Args>`] fans a value out to every connected slot. Slots run
//! synchronously on the emitting thread, in connection order. Every change
//! notifier in the workspace is a `Signal<ListChange>` underneath.
//!
//! - [`Signal<Args>`]: the emitter
//! - [`ConnectionId`]: handle returned by [`Signal::connect`]
//! - [`ConnectionGuard`]: disconnects its slot on drop
//!
//! # Re-entrancy
//!
//! Emission snapshots the slot list and releases the lock before the first
//! slot runs. Slots may connect, disconnect or emit from inside a callback. A
//! slot disconnected by an earlier slot of the same emission still receives
//! that emission.
//!
//! # Example
//!
//! ```
//! use horizon_adapter_core::Signal;
//!
//! let row_count_changed = Signal::<usize>::new();
//! let id = row_count_changed.connect(|rows| println!("{rows} rows"));
//! row_count_changed.emit(12);
//! row_count_changed.disconnect(id);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle to one connected slot, for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connection storage: the slots plus the order they were connected in.
///
/// `SlotMap` reuses vacated slots, so its iteration order is not the
/// connection order; `order` is.
struct SlotTable<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> SlotTable<Args> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, slot: Slot<Args>) -> ConnectionId {
        let id = self.slots.insert(slot);
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        if self.slots.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    fn snapshot(&self) -> Vec<Slot<Args>> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).cloned())
            .collect()
    }
}

/// An emitter of `Args` values to any number of slots.
///
/// Slots receive `&Args`; use a tuple for several values. The signal itself
/// is `Send + Sync`, but slots always run on the emitting thread, and the
/// adapters restrict emission to their owner thread.
pub struct Signal<Args> {
    table: Arc<Mutex<SlotTable<Args>>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Creates a signal with no slots.
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(SlotTable::new())),
        }
    }

    /// Connects `slot`; it runs after every slot connected before it.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.table.lock().insert(Arc::new(slot))
    }

    /// Connects `slot` for as long as the returned guard lives.
    ///
    /// The guard only weakly references the signal and may outlive it.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            table: Arc::downgrade(&self.table),
            id,
        }
    }

    /// Disconnects one slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.table.lock().remove(id)
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.table.lock().slots.len()
    }

    /// Delivers `args` to every slot, in connection order.
    #[tracing::instrument(skip_all, target = "horizon_adapter_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots = self.table.lock().snapshot();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

/// Disconnects its slot when dropped. Returned by [`Signal::connect_scoped`].
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use horizon_adapter_core::Signal;
///
/// let resized = Signal::<usize>::new();
/// let total = Arc::new(AtomicUsize::new(0));
/// let guard = {
///     let total = total.clone();
///     resized.connect_scoped(move |&rows| {
///         total.fetch_add(rows, Ordering::SeqCst);
///     })
/// };
/// resized.emit(3);
/// drop(guard);
/// resized.emit(5);
/// assert_eq!(total.load(Ordering::SeqCst), 3);
/// ```
pub struct ConnectionGuard<Args> {
    table: Weak<Mutex<SlotTable<Args>>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.lock().remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn collector<T: Clone + Send + 'static>(signal: &Signal<T>) -> (ConnectionId, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = signal.connect(move |value: &T| sink.lock().push(value.clone()));
        (id, seen)
    }

    #[test]
    fn test_emit_reaches_every_slot() {
        let signal = Signal::<usize>::new();
        let (_, first) = collector(&signal);
        let (_, second) = collector(&signal);

        signal.emit(7);
        signal.emit(9);

        assert_eq!(*first.lock(), vec![7, 9]);
        assert_eq!(*second.lock(), vec![7, 9]);
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let signal = Signal::<usize>::new();
        let (id, seen) = collector(&signal);

        signal.emit(1);
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(2);

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_registration_order_survives_slot_reuse() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let make = |tag: &'static str| {
            let order = order.clone();
            move |_: &()| order.lock().push(tag)
        };

        let first = signal.connect(make("a"));
        signal.connect(make("b"));
        signal.disconnect(first);
        // Reuses the vacated slot, but must still run last.
        signal.connect(make("c"));

        signal.emit(());
        assert_eq!(*order.lock(), vec!["b", "c"]);
    }

    #[test]
    fn test_scoped_connection_ends_with_guard() {
        let signal = Signal::<usize>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let guard = {
            let hits = hits.clone();
            signal.connect_scoped(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(signal.connection_count(), 1);
        signal.emit(0);
        drop(guard);
        signal.emit(0);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_guard_may_outlive_signal() {
        let signal = Signal::<usize>::new();
        let guard = signal.connect_scoped(|_| {});
        drop(signal);
        drop(guard);
    }

    #[test]
    fn test_slot_may_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&signal);
        let calls_clone = calls.clone();
        let own_id_clone = own_id.clone();
        let id = signal.connect(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if let (Some(signal), Some(id)) = (weak.upgrade(), *own_id_clone.lock()) {
                signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_slot_may_connect_during_emit() {
        let signal = Arc::new(Signal::<usize>::new());
        let weak = Arc::downgrade(&signal);
        signal.connect(move |_| {
            if let Some(signal) = weak.upgrade() {
                signal.connect(|_| {});
            }
        });

        signal.emit(0);
        assert_eq!(signal.connection_count(), 2);
    }
}
