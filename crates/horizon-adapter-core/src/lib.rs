//! Core systems for Horizon Adapter.
//!
//! This crate provides the primitives the adapter layers are built from:
//!
//! - **Signal/Slot System**: Type-safe, synchronous multi-listener signals
//! - **Change Notification**: Range and generic list change events
//! - **Transactions**: Coalescing many granular events into one refresh
//! - **Thread Affinity**: Single-owner-thread enforcement for adapter graphs
//! - **UI Dispatch**: Posting deferred work to the UI-owning thread
//!
//! # Change Notification Example
//!
//! ```
//! use horizon_adapter_core::{ChangeNotifier, ListChange, NotifyGate};
//!
//! let notifier = ChangeNotifier::new();
//! let gate = NotifyGate::new();
//!
//! notifier.add_listener(|change| println!("{change:?}"));
//!
//! // Delivered immediately.
//! gate.dispatch(&notifier, ListChange::Inserted { start: 0, count: 1 });
//!
//! // Coalesced into a single `ListChange::Generic`.
//! gate.begin()?;
//! gate.dispatch(&notifier, ListChange::Inserted { start: 1, count: 1 });
//! gate.dispatch(&notifier, ListChange::Removed { start: 0, count: 1 });
//! gate.end(&notifier)?;
//! # Ok::<(), horizon_adapter_core::AdapterError>(())
//! ```

mod dispatch;
mod error;
pub mod logging;
pub mod notifier;
pub mod signal;
pub mod thread_check;
pub mod transaction;

pub use dispatch::{TaskId, UiDispatcher};
pub use error::{AdapterError, Result};
pub use notifier::{ChangeNotifier, ListChange, ListObserver};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::{ThreadAffinity, are_thread_checks_enabled, set_thread_checks_enabled};
pub use transaction::NotifyGate;
