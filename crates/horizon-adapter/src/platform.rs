//! The contract consumed from the platform (rendering) layer.
//!
//! The adapters never touch real views. They see:
//!
//! - [`ViewId`]: the identity of a platform view
//! - [`ViewParent`]: the container a holder is created for
//! - [`ViewHolder`]: whatever the rendering layer uses to cache a view's
//!   sub-views; the only requirement is that it can name its root view
//! - [`TagStore`]: key/value attachment on platform views, keyed by view
//!   identity (the moral equivalent of view tags)
//!
//! [`recycle_or_create`] is the convenience path list-style containers use
//! when handed a recycled ("convert") view.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_adapter_core::Result;
use horizon_adapter_core::logging::targets;
use parking_lot::RwLock;

use crate::adapter::Adapter;

/// A global counter for allocating view identities.
static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a platform view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    /// Wraps an identity handed out by the platform.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocates a fresh identity, for platforms that do not have their own.
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identity value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// The kind of container an adapter is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerKind {
    /// A scrolling list with recycled rows.
    #[default]
    List,
    /// A recycling grid.
    Grid,
    /// A pager showing one position at a time.
    Pager,
    /// A plain view group that inflates every position.
    Plain,
    /// A spinner-style drop-down (uses the drop-down bind path).
    DropDown,
}

/// The parent container a holder is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewParent {
    /// What kind of container this is.
    pub kind: ContainerKind,
    /// The container's own view identity.
    pub id: ViewId,
}

impl ViewParent {
    /// Creates a parent description.
    pub fn new(kind: ContainerKind, id: ViewId) -> Self {
        Self { kind, id }
    }

    /// A list container with a freshly allocated identity.
    pub fn list() -> Self {
        Self::new(ContainerKind::List, ViewId::next())
    }
}

/// A rendering-layer holder for one on-screen view.
///
/// Holders are cheap handles (typically an `Arc` around platform objects), so
/// header and footer holders are handed out by cloning.
pub trait ViewHolder: Clone + Send + Sync + 'static {
    /// The root view this holder manages.
    fn view(&self) -> ViewId;
}

/// A bare view is its own holder.
impl ViewHolder for ViewId {
    fn view(&self) -> ViewId {
        *self
    }
}

/// Key under which a value is attached to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagKey(pub u32);

/// The tag keys an adapter uses.
///
/// These are configuration, not constants: platforms with their own key
/// allocation (resource IDs) pass theirs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagKeys {
    /// Key for the cached [`ViewHolder`] of a recycled view.
    pub holder: TagKey,
    /// Key for the adjusted body position a view was last bound to.
    pub position: TagKey,
}

impl Default for TagKeys {
    fn default() -> Self {
        Self {
            holder: TagKey(0x7f0b_0001),
            position: TagKey(0x7f0b_0002),
        }
    }
}

/// A value attached to a view.
pub type TagValue = Arc<dyn Any + Send + Sync>;

/// Key/value attachment on platform views.
pub trait TagStore: Send + Sync {
    /// Attaches `value` to `view` under `key`, replacing any previous value.
    fn set_tag(&self, view: ViewId, key: TagKey, value: TagValue);

    /// Returns the value attached to `view` under `key`.
    fn tag(&self, view: ViewId, key: TagKey) -> Option<TagValue>;

    /// Detaches and returns the value attached to `view` under `key`.
    fn remove_tag(&self, view: ViewId, key: TagKey) -> Option<TagValue>;
}

/// In-memory [`TagStore`], for hosts without native view tags and for tests.
#[derive(Default)]
pub struct MemoryTagStore {
    tags: RwLock<HashMap<(ViewId, TagKey), TagValue>>,
}

impl MemoryTagStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached values.
    pub fn len(&self) -> usize {
        self.tags.read().len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.tags.read().is_empty()
    }
}

impl TagStore for MemoryTagStore {
    fn set_tag(&self, view: ViewId, key: TagKey, value: TagValue) {
        self.tags.write().insert((view, key), value);
    }

    fn tag(&self, view: ViewId, key: TagKey) -> Option<TagValue> {
        self.tags.read().get(&(view, key)).cloned()
    }

    fn remove_tag(&self, view: ViewId, key: TagKey) -> Option<TagValue> {
        self.tags.write().remove(&(view, key))
    }
}

impl std::fmt::Debug for MemoryTagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTagStore")
            .field("len", &self.len())
            .finish()
    }
}

/// Reads back a typed holder cached on `view`.
///
/// A value of the wrong type is treated as a cache miss.
pub fn cached_holder<H: ViewHolder>(tags: &dyn TagStore, keys: &TagKeys, view: ViewId) -> Option<H> {
    let value = tags.tag(view, keys.holder)?;
    match value.downcast_ref::<H>() {
        Some(holder) => Some(holder.clone()),
        None => {
            tracing::debug!(
                target: targets::PLATFORM,
                view = view.as_u64(),
                "cached holder has a different type, treating as a miss"
            );
            None
        }
    }
}

/// Produces a bound holder for `position`, reusing the holder cached on
/// `convert_view` when there is one.
///
/// On a miss (no convert view, nothing cached, or a holder of another type)
/// a fresh holder is created for the position's view type and cached on its
/// own view.
pub fn recycle_or_create<H, A>(
    adapter: &A,
    tags: &dyn TagStore,
    keys: &TagKeys,
    parent: &ViewParent,
    convert_view: Option<ViewId>,
    position: usize,
) -> Result<H>
where
    H: ViewHolder,
    A: Adapter<H> + ?Sized,
{
    let recycled = convert_view.and_then(|view| cached_holder::<H>(tags, keys, view));
    let mut holder = match recycled {
        Some(holder) => holder,
        None => {
            let view_type = adapter.internal_item_view_type(position)?;
            let holder = adapter.create_view_holder(parent, view_type)?;
            tags.set_tag(holder.view(), keys.holder, Arc::new(holder.clone()));
            holder
        }
    };

    if parent.kind == ContainerKind::DropDown {
        adapter.bind_drop_down_view_holder(&mut holder, position)?;
    } else {
        adapter.bind_view_holder(&mut holder, position)?;
    }
    Ok(holder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Holder(ViewId);

    impl ViewHolder for Holder {
        fn view(&self) -> ViewId {
            self.0
        }
    }

    #[derive(Debug, Clone)]
    struct OtherHolder(ViewId);

    impl ViewHolder for OtherHolder {
        fn view(&self) -> ViewId {
            self.0
        }
    }

    #[test]
    fn test_view_ids_are_unique() {
        assert_ne!(ViewId::next(), ViewId::next());
        assert_eq!(ViewId::from_raw(7).as_u64(), 7);
    }

    #[test]
    fn test_memory_tag_store() {
        let store = MemoryTagStore::new();
        let view = ViewId::next();
        let keys = TagKeys::default();

        store.set_tag(view, keys.position, Arc::new(3usize));
        let value = store.tag(view, keys.position).unwrap();
        assert_eq!(value.downcast_ref::<usize>(), Some(&3));
        assert!(store.tag(view, keys.holder).is_none());

        assert!(store.remove_tag(view, keys.position).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_cached_holder_type_mismatch_is_a_miss() {
        let store = MemoryTagStore::new();
        let keys = TagKeys::default();
        let view = ViewId::next();

        store.set_tag(view, keys.holder, Arc::new(OtherHolder(view)));
        assert!(cached_holder::<Holder>(&store, &keys, view).is_none());

        store.set_tag(view, keys.holder, Arc::new(Holder(view)));
        assert_eq!(cached_holder::<Holder>(&store, &keys, view), Some(Holder(view)));
    }
}
