//! Owner-thread verification for adapter graphs.
//!
//! An adapter graph (lists, framed adapters, composites) has a single logical
//! owner: the thread that drives the UI. The library takes no fine-grained
//! locks to make concurrent mutation safe; instead every subject records a
//! [`ThreadAffinity`] when it is created and checks it on the paths that must
//! stay on that thread (dispatching notifications, creating and binding
//! holders).
//!
//! Checks run in debug builds by default. Call
//! [`set_thread_checks_enabled`] to force them on or off.
//!
//! # Example
//!
//! ```
//! use horizon_adapter_core::thread_check::ThreadAffinity;
//!
//! struct Counter {
//!     affinity: ThreadAffinity,
//!     value: std::cell::Cell<i32>,
//! }
//!
//! impl Counter {
//!     fn bump(&self) {
//!         self.affinity.debug_assert_same_thread();
//!         self.value.set(self.value.get() + 1);
//!     }
//! }
//!
//! let counter = Counter { affinity: ThreadAffinity::current(), value: Default::default() };
//! counter.bump();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Turns owner-thread checks on or off for the whole process.
///
/// Defaults to on in debug builds and off in release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Returns `true` if owner-thread checks run.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The owner thread of a subject, captured at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Captures the calling thread as owner.
    #[inline]
    pub fn current() -> Self {
        Self {
            owner: std::thread::current().id(),
        }
    }

    /// The owner thread.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.owner
    }

    /// Returns `true` on the owner thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Panics with `msg` unless called on the owner thread.
    ///
    /// Unconditional: ignores the build profile and the global switch.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.violation(msg);
        }
    }

    /// Panics unless called on the owner thread, when checks are enabled.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        self.debug_assert_same_thread_with_msg("adapter graph accessed from a thread other than its owner");
    }

    /// [`debug_assert_same_thread`](Self::debug_assert_same_thread) with a
    /// custom message.
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        if are_thread_checks_enabled() {
            self.assert_same_thread_with_msg(msg);
        }
    }

    #[cold]
    #[inline(never)]
    fn violation(&self, msg: &str) -> ! {
        let caller = std::thread::current();
        panic!(
            "owner thread violation: {msg}\n\
            owner: {:?}\n\
            caller: {:?} ({:?})\n\
            Mutate adapters on their owner thread, or mutate in the background with \
            `ObservableList::update_in_background` and let the UI dispatcher deliver \
            the notification.",
            self.owner,
            caller.name().unwrap_or("<unnamed>"),
            caller.id(),
        )
    }
}
