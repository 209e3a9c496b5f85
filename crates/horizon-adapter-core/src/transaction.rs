//! Transactional batching of change notifications.
//!
//! Every subject (list, framed adapter, composite adapter) owns a
//! [`NotifyGate`] and routes its granular events through it. While a
//! transaction is open the gate swallows events and only remembers that
//! something happened; closing the transaction emits at most one generic
//! change.

use parking_lot::Mutex;

use crate::error::{AdapterError, Result};
use crate::logging::targets;
use crate::notifier::{ChangeNotifier, ListChange};
use crate::thread_check::ThreadAffinity;

#[derive(Debug, Default, Clone, Copy)]
struct GateState {
    open: bool,
    modified: bool,
}

/// The transaction gate placed in front of a subject's [`ChangeNotifier`].
#[derive(Debug)]
pub struct NotifyGate {
    state: Mutex<GateState>,
    affinity: ThreadAffinity,
}

impl Default for NotifyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyGate {
    /// Creates a closed gate owned by the current thread.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            affinity: ThreadAffinity::current(),
        }
    }

    /// The owner thread recorded when the gate was created.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Returns `true` while a transaction is open.
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Opens a transaction and clears the modified flag.
    ///
    /// # Errors
    ///
    /// [`AdapterError::TransactionAlreadyOpen`] if one is already open.
    pub fn begin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.open {
            return Err(AdapterError::TransactionAlreadyOpen);
        }
        *state = GateState {
            open: true,
            modified: false,
        };
        tracing::trace!(target: targets::TRANSACTION, "transaction opened");
        Ok(())
    }

    /// Closes the transaction, emitting one generic change on `notifier` if
    /// any event was swallowed while it was open.
    ///
    /// Returns whether a generic change was emitted.
    ///
    /// # Errors
    ///
    /// [`AdapterError::NoTransactionOpen`] if no transaction is open.
    pub fn end(&self, notifier: &ChangeNotifier) -> Result<bool> {
        let modified = {
            let mut state = self.state.lock();
            if !state.open {
                return Err(AdapterError::NoTransactionOpen);
            }
            let modified = state.modified;
            *state = GateState::default();
            modified
        };

        tracing::trace!(target: targets::TRANSACTION, modified, "transaction closed");
        if modified {
            self.affinity.debug_assert_same_thread();
            notifier.notify_generic_change();
        }
        Ok(modified)
    }

    /// Delivers `change` to `notifier`, or records it if a transaction is open.
    ///
    /// Returns `true` if the change was delivered immediately.
    pub fn dispatch(&self, notifier: &ChangeNotifier, change: ListChange) -> bool {
        {
            let mut state = self.state.lock();
            if state.open {
                state.modified = true;
                return false;
            }
        }
        self.affinity.debug_assert_same_thread();
        notifier.notify(change);
        true
    }

    /// Runs `f` inside a transaction.
    ///
    /// The transaction is closed even if `f` returns an error; the error from
    /// `f` takes precedence.
    pub fn scoped<R, F>(&self, notifier: &ChangeNotifier, f: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.begin()?;
        let result = f();
        let closed = self.end(notifier);
        let value = result?;
        closed?;
        Ok(value)
    }
}
