//! Horizon Adapter - header/footer framing and composite merging of
//! observable lists for list-like UI containers.
//!
//! This is the main crate; it re-exports the public API of
//! `horizon-adapter-core`.
//!
//! The layers, bottom-up:
//!
//! - [`ObservableList`]: a mutable collection that announces every change
//! - [`FramedAdapter`]: a list plus header and footer holders in one flat
//!   index space with disjoint view types
//! - [`CompositeAdapter`]: several adapters concatenated, with child change
//!   events translated into the merged index space
//!
//! Change events flow the same way, each layer shifting positions before
//! re-emitting.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use horizon_adapter::{Adapter, CompositeAdapter, FnBinder, FramedAdapter, ListChange, ViewId};
//!
//! let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
//! let news = Arc::new(
//!     FramedAdapter::builder(binder)
//!         .items(vec!["headline".to_string()])
//!         .header(ViewId::next())
//!         .build(),
//! );
//!
//! let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
//! let sports = Arc::new(FramedAdapter::new(vec!["score".to_string()], binder));
//!
//! let feed = CompositeAdapter::new();
//! feed.add_adapter(news)?;
//! feed.add_adapter(sports.clone())?;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//! feed.notifier().add_listener(move |change| seen_clone.lock().unwrap().push(*change));
//!
//! sports.list().insert(0, "breaking".to_string())?;
//! assert_eq!(*seen.lock().unwrap(), vec![ListChange::Inserted { start: 2, count: 1 }]);
//! assert_eq!(feed.get::<String>(2)?, "breaking");
//! # Ok::<(), horizon_adapter_core::AdapterError>(())
//! ```

pub use horizon_adapter_core::*;

pub mod adapter;
pub mod binder;
pub mod composite;
pub mod debug;
pub mod framed;
pub mod observable;
pub mod platform;

pub use adapter::{Adapter, NO_ID, Section};
pub use binder::{FnBinder, ItemBinder};
pub use composite::{CompositeAdapter, PieceAt, PieceLayout};
pub use framed::{
    FrameClickListener, FrameLongClickListener, FramedAdapter, FramedAdapterBuilder,
    FramedConfig, ItemClickListener, ItemLongClickListener,
};
pub use observable::ObservableList;
pub use platform::{
    ContainerKind, MemoryTagStore, TagKey, TagKeys, TagStore, TagValue, ViewHolder, ViewId,
    ViewParent, cached_holder, recycle_or_create,
};
