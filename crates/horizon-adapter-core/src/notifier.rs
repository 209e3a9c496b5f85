//! Change notification primitive.
//!
//! A [`ChangeNotifier`] records item-range change, insert and remove events
//! plus "generic" (full refresh) events, and dispatches them synchronously to
//! every registered listener in registration order. It performs no batching;
//! subjects that support transactions put a [`NotifyGate`](crate::NotifyGate)
//! in front of it.
//!
//! # Example
//!
//! ```
//! use horizon_adapter_core::{ChangeNotifier, ListChange};
//!
//! let notifier = ChangeNotifier::new();
//! notifier.add_listener(|change| match change {
//!     ListChange::Inserted { start, count } => println!("+{count} at {start}"),
//!     ListChange::Generic => println!("refresh"),
//!     _ => {}
//! });
//! notifier.notify_range_inserted(0, 2);
//! ```

use std::ops::Range;
use std::sync::Arc;

use crate::logging::targets;
use crate::signal::{ConnectionGuard, ConnectionId, Signal};

/// A single change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListChange {
    /// Items in `[start, start + count)` changed in place.
    Changed {
        /// First affected position.
        start: usize,
        /// Number of affected positions.
        count: usize,
    },
    /// `count` items were inserted at `start`.
    Inserted {
        /// Position of the first inserted item.
        start: usize,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items were removed starting at `start`.
    Removed {
        /// Position of the first removed item (before removal).
        start: usize,
        /// Number of removed items.
        count: usize,
    },
    /// Something changed; listeners should re-read everything.
    Generic,
}

impl ListChange {
    /// Returns the same change with its start position moved by `offset`.
    ///
    /// Generic changes carry no range and are returned unchanged.
    pub fn shifted(self, offset: usize) -> Self {
        match self {
            Self::Changed { start, count } => Self::Changed {
                start: start + offset,
                count,
            },
            Self::Inserted { start, count } => Self::Inserted {
                start: start + offset,
                count,
            },
            Self::Removed { start, count } => Self::Removed {
                start: start + offset,
                count,
            },
            Self::Generic => Self::Generic,
        }
    }

    /// The affected position range, or `None` for a generic change.
    pub fn range(&self) -> Option<Range<usize>> {
        match *self {
            Self::Changed { start, count }
            | Self::Inserted { start, count }
            | Self::Removed { start, count } => Some(start..start + count),
            Self::Generic => None,
        }
    }

    /// Returns `true` for [`ListChange::Generic`].
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }

    /// Returns `true` if the change can alter the number of items.
    pub fn changes_size(&self) -> bool {
        !matches!(self, Self::Changed { .. })
    }
}

/// Object-style listener, for callers that prefer one method per event kind.
///
/// Every method has an empty default so implementors only override what they
/// care about. Register with [`ChangeNotifier::add_observer`].
pub trait ListObserver: Send + Sync {
    /// Items in `[start, start + count)` changed.
    fn on_range_changed(&self, _start: usize, _count: usize) {}

    /// `count` items were inserted at `start`.
    fn on_range_inserted(&self, _start: usize, _count: usize) {}

    /// `count` items were removed at `start`.
    fn on_range_removed(&self, _start: usize, _count: usize) {}

    /// Everything may have changed.
    fn on_generic_change(&self) {}
}

/// Subject side of the observer relationship.
///
/// This is the subscribe point handed to the rendering layer (the "list
/// observer" of an adapter).
pub struct ChangeNotifier {
    signal: Signal<ListChange>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// Creates a notifier with no listeners.
    pub fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Registers a listener closure. Listeners run in registration order.
    pub fn add_listener<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&ListChange) + Send + Sync + 'static,
    {
        self.signal.connect(listener)
    }

    /// Registers a listener that is removed when the returned guard drops.
    pub fn add_scoped_listener<F>(&self, listener: F) -> ConnectionGuard<ListChange>
    where
        F: Fn(&ListChange) + Send + Sync + 'static,
    {
        self.signal.connect_scoped(listener)
    }

    /// Registers an object-style observer.
    pub fn add_observer(&self, observer: Arc<dyn ListObserver>) -> ConnectionId {
        self.add_listener(move |change| match *change {
            ListChange::Changed { start, count } => observer.on_range_changed(start, count),
            ListChange::Inserted { start, count } => observer.on_range_inserted(start, count),
            ListChange::Removed { start, count } => observer.on_range_removed(start, count),
            ListChange::Generic => observer.on_generic_change(),
        })
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ConnectionId) -> bool {
        self.signal.disconnect(id)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.signal.connection_count()
    }

    /// Dispatches `change` to every listener.
    pub fn notify(&self, change: ListChange) {
        tracing::trace!(target: targets::NOTIFIER, ?change, "notify");
        self.signal.emit(change);
    }

    /// Notifies that `[start, start + count)` changed.
    pub fn notify_range_changed(&self, start: usize, count: usize) {
        self.notify(ListChange::Changed { start, count });
    }

    /// Notifies that `count` items were inserted at `start`.
    pub fn notify_range_inserted(&self, start: usize, count: usize) {
        self.notify(ListChange::Inserted { start, count });
    }

    /// Notifies that `count` items were removed at `start`.
    pub fn notify_range_removed(&self, start: usize, count: usize) {
        self.notify(ListChange::Removed { start, count });
    }

    /// Notifies a full refresh.
    pub fn notify_generic_change(&self) {
        self.notify(ListChange::Generic);
    }
}
