//! Header/body/footer framing of an observable list.
//!
//! A [`FramedAdapter`] lays `H` header holders, the `B` items of an
//! [`ObservableList`] and `F` footer holders out in one flat index space:
//!
//! ```text
//! position:  0 .. H        H .. H+B                H+B .. H+B+F
//! section:   headers       body                    footers
//! view type: p             binder_type + H         (p-H-B) + H + body_types
//! ```
//!
//! Body change events from the list are re-emitted on the adapter's own
//! notifier shifted by `H`. Headers and footers can only be added until the
//! adapter is first handed to a rendering surface.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_adapter_core::logging::targets;
use horizon_adapter_core::{
    AdapterError, ChangeNotifier, ConnectionGuard, ListChange, NotifyGate, Result,
};
use parking_lot::{Mutex, RwLock};

use crate::adapter::{Adapter, NO_ID, Section};
use crate::binder::ItemBinder;
use crate::observable::ObservableList;
use crate::platform::{TagKeys, TagStore, ViewHolder, ViewId, ViewParent};

/// Listener for body item clicks: `(body_position, item, holder)`.
pub type ItemClickListener<T, H> = Arc<dyn Fn(usize, &T, &H) + Send + Sync>;

/// Listener for body item long clicks. Returns whether the click was consumed.
pub type ItemLongClickListener<T, H> = Arc<dyn Fn(usize, &T, &H) -> bool + Send + Sync>;

/// Listener for header or footer clicks: `(header_or_footer_index, holder)`.
pub type FrameClickListener<H> = Arc<dyn Fn(usize, &H) + Send + Sync>;

/// Listener for header or footer long clicks.
pub type FrameLongClickListener<H> = Arc<dyn Fn(usize, &H) -> bool + Send + Sync>;

/// Configuration for a [`FramedAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramedConfig {
    /// Keys used when tagging views in the adapter's [`TagStore`].
    pub tag_keys: TagKeys,
    /// Whether binding a body position tags the holder's view with it.
    pub tag_positions: bool,
}

impl Default for FramedConfig {
    fn default() -> Self {
        Self {
            tag_keys: TagKeys::default(),
            tag_positions: true,
        }
    }
}

impl FramedConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag keys.
    pub fn with_tag_keys(mut self, keys: TagKeys) -> Self {
        self.tag_keys = keys;
        self
    }

    /// Enables or disables position tagging on bind.
    pub fn with_tag_positions(mut self, enabled: bool) -> Self {
        self.tag_positions = enabled;
        self
    }
}

#[derive(Clone)]
struct FrameSlot<H> {
    holder: H,
    selectable: bool,
}

/// Header/footer state shared with the list forwarder.
struct Frame<H> {
    headers: RwLock<Vec<FrameSlot<H>>>,
    footers: RwLock<Vec<FrameSlot<H>>>,
    notifier: ChangeNotifier,
    gate: NotifyGate,
}

impl<H> Frame<H> {
    fn header_count(&self) -> usize {
        self.headers.read().len()
    }

    fn footer_count(&self) -> usize {
        self.footers.read().len()
    }

    fn emit(&self, change: ListChange) {
        tracing::trace!(target: targets::FRAMED, ?change, "adapter changed");
        self.gate.dispatch(&self.notifier, change);
    }
}

struct ClickListeners<T, H> {
    item: RwLock<Option<ItemClickListener<T, H>>>,
    item_long: RwLock<Option<ItemLongClickListener<T, H>>>,
    header: RwLock<Option<FrameClickListener<H>>>,
    header_long: RwLock<Option<FrameLongClickListener<H>>>,
    footer: RwLock<Option<FrameClickListener<H>>>,
    footer_long: RwLock<Option<FrameLongClickListener<H>>>,
}

impl<T, H> Default for ClickListeners<T, H> {
    fn default() -> Self {
        Self {
            item: RwLock::new(None),
            item_long: RwLock::new(None),
            header: RwLock::new(None),
            header_long: RwLock::new(None),
            footer: RwLock::new(None),
            footer_long: RwLock::new(None),
        }
    }
}

impl<T, H> ClickListeners<T, H> {
    fn clear(&self) {
        *self.item.write() = None;
        *self.item_long.write() = None;
        *self.header.write() = None;
        *self.header_long.write() = None;
        *self.footer.write() = None;
        *self.footer_long.write() = None;
    }
}

/// An observable list framed by header and footer holders.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_adapter::{Adapter, FnBinder, FramedAdapter, ViewId};
///
/// let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
/// let adapter = FramedAdapter::builder(binder)
///     .items(vec!["a".to_string(), "b".to_string()])
///     .header(ViewId::next())
///     .footer(ViewId::next())
///     .build();
///
/// assert_eq!(adapter.internal_count(), 4);
/// assert_eq!(adapter.internal_item_view_type(0)?, 0); // header
/// assert_eq!(adapter.internal_item_view_type(1)?, 1); // body
/// assert_eq!(adapter.internal_item_view_type(3)?, 2); // footer
/// assert_eq!(adapter.get(0)?, "a");
/// # Ok::<(), horizon_adapter_core::AdapterError>(())
/// ```
///
/// # Threading
///
/// Render-facing calls and notifications belong to the thread that created
/// the adapter. The body list may be mutated elsewhere only through
/// [`ObservableList::update_in_background`].
pub struct FramedAdapter<T, H> {
    list: Arc<ObservableList<T>>,
    binder: Arc<dyn ItemBinder<T, H>>,
    frame: Arc<Frame<H>>,
    listeners: ClickListeners<T, H>,
    tags: Option<Arc<dyn TagStore>>,
    config: FramedConfig,
    bound: AtomicBool,
    merged: AtomicBool,
    subscription: Mutex<Option<ConnectionGuard<ListChange>>>,
}

impl<T, H> FramedAdapter<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: ViewHolder,
{
    /// Creates an adapter owning a new list of `items`.
    pub fn new<B>(items: Vec<T>, binder: B) -> Self
    where
        B: ItemBinder<T, H> + 'static,
    {
        Self::builder(binder).items(items).build()
    }

    /// Creates an adapter over an externally owned list.
    pub fn with_list<B>(list: Arc<ObservableList<T>>, binder: B) -> Self
    where
        B: ItemBinder<T, H> + 'static,
    {
        Self::builder(binder).list(list).build()
    }

    /// Starts building an adapter.
    pub fn builder<B>(binder: B) -> FramedAdapterBuilder<T, H>
    where
        B: ItemBinder<T, H> + 'static,
    {
        FramedAdapterBuilder::new(Arc::new(binder))
    }

    fn from_builder(builder: FramedAdapterBuilder<T, H>) -> Self {
        let list = match builder.source {
            ListSource::Owned(items) => Arc::new(ObservableList::from_vec(items)),
            ListSource::Shared(list) => list,
        };

        let frame = Arc::new(Frame {
            headers: RwLock::new(builder.headers),
            footers: RwLock::new(builder.footers),
            notifier: ChangeNotifier::new(),
            gate: NotifyGate::new(),
        });

        let subscription = list
            .notifier()
            .add_scoped_listener(forward_body_changes(Arc::downgrade(&frame)));

        tracing::debug!(
            target: targets::FRAMED,
            headers = frame.header_count(),
            body = list.len(),
            footers = frame.footer_count(),
            "framed adapter created"
        );

        Self {
            list,
            binder: builder.binder,
            frame,
            listeners: ClickListeners::default(),
            tags: builder.tags,
            config: builder.config,
            bound: AtomicBool::new(false),
            merged: AtomicBool::new(false),
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// The body list.
    pub fn list(&self) -> &Arc<ObservableList<T>> {
        &self.list
    }

    /// The configuration in use.
    pub fn config(&self) -> &FramedConfig {
        &self.config
    }

    /// Body item at body position `position`.
    pub fn get(&self, position: usize) -> Result<T> {
        self.list.get(position)
    }

    /// Body item at flat position `position`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::NotABodyPosition`] for header and footer positions.
    pub fn body_item_at(&self, position: usize) -> Result<T> {
        match self.resolve(position)? {
            Section::Body(index) => self.list.get(index),
            _ => Err(AdapterError::NotABodyPosition { position }),
        }
    }

    /// Number of body items.
    pub fn count(&self) -> usize {
        self.list.len()
    }

    /// Number of headers.
    pub fn header_count(&self) -> usize {
        self.frame.header_count()
    }

    /// Number of footers.
    pub fn footer_count(&self) -> usize {
        self.frame.footer_count()
    }

    /// Flat position of the first footer.
    pub fn footer_start(&self) -> usize {
        self.header_count() + self.count()
    }

    /// Resolves a flat position to its section.
    pub fn resolve(&self, position: usize) -> Result<Section> {
        Section::resolve(
            position,
            self.header_count(),
            self.count(),
            self.footer_count(),
        )
    }

    /// Returns `true` once a rendering surface has started using the adapter.
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    /// Returns `true` once the adapter has been merged into a composite.
    pub fn is_merged(&self) -> bool {
        self.merged.load(Ordering::Acquire)
    }

    /// Appends a selectable header.
    pub fn add_header_holder(&self, holder: H) -> Result<()> {
        self.add_header(holder, true)
    }

    /// Appends a selectable footer.
    pub fn add_footer_holder(&self, holder: H) -> Result<()> {
        self.add_footer(holder, true)
    }

    /// Appends a selectable header built from a platform view.
    pub fn add_header_view<V: Into<H>>(&self, view: V) -> Result<()> {
        self.add_header(view.into(), true)
    }

    /// Appends a selectable footer built from a platform view.
    pub fn add_footer_view<V: Into<H>>(&self, view: V) -> Result<()> {
        self.add_footer(view.into(), true)
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// [`AdapterError::AlreadyBound`] once the adapter is bound.
    pub fn add_header(&self, holder: H, selectable: bool) -> Result<()> {
        self.ensure_unbound()?;
        let start = {
            let mut headers = self.frame.headers.write();
            headers.push(FrameSlot { holder, selectable });
            headers.len() - 1
        };
        tracing::debug!(target: targets::FRAMED, index = start, selectable, "header added");
        self.frame.emit(ListChange::Inserted { start, count: 1 });
        Ok(())
    }

    /// Appends a footer.
    ///
    /// # Errors
    ///
    /// [`AdapterError::AlreadyBound`] once the adapter is bound.
    pub fn add_footer(&self, holder: H, selectable: bool) -> Result<()> {
        self.ensure_unbound()?;
        let index = {
            let mut footers = self.frame.footers.write();
            footers.push(FrameSlot { holder, selectable });
            footers.len() - 1
        };
        tracing::debug!(target: targets::FRAMED, index, selectable, "footer added");
        self.frame.emit(ListChange::Inserted {
            start: self.footer_start() + index,
            count: 1,
        });
        Ok(())
    }

    /// Whether header `index` is selectable.
    pub fn is_header_enabled(&self, index: usize) -> bool {
        self.frame
            .headers
            .read()
            .get(index)
            .is_some_and(|slot| slot.selectable)
    }

    /// Whether footer `index` is selectable.
    pub fn is_footer_enabled(&self, index: usize) -> bool {
        self.frame
            .footers
            .read()
            .get(index)
            .is_some_and(|slot| slot.selectable)
    }

    /// Whether body item `index` is enabled according to the binder.
    pub fn is_body_enabled(&self, index: usize) -> bool {
        self.list
            .with_item(index, |item| self.binder.is_enabled(item, index))
            .unwrap_or(false)
    }

    /// Body position a view was last bound to, read back from the tag store.
    pub fn position_for_view(&self, view: ViewId) -> Option<usize> {
        let tags = self.tags.as_ref()?;
        let value = tags.tag(view, self.config.tag_keys.position)?;
        value.downcast_ref::<usize>().copied()
    }

    /// Sets the body click listener, replacing any previous one.
    pub fn set_item_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &T, &H) + Send + Sync + 'static,
    {
        *self.listeners.item.write() = Some(Arc::new(listener));
    }

    /// Sets the body long-click listener, replacing any previous one.
    pub fn set_item_long_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &T, &H) -> bool + Send + Sync + 'static,
    {
        *self.listeners.item_long.write() = Some(Arc::new(listener));
    }

    /// Sets the header click listener, replacing any previous one.
    pub fn set_header_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &H) + Send + Sync + 'static,
    {
        *self.listeners.header.write() = Some(Arc::new(listener));
    }

    /// Sets the header long-click listener, replacing any previous one.
    pub fn set_header_long_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &H) -> bool + Send + Sync + 'static,
    {
        *self.listeners.header_long.write() = Some(Arc::new(listener));
    }

    /// Sets the footer click listener, replacing any previous one.
    pub fn set_footer_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &H) + Send + Sync + 'static,
    {
        *self.listeners.footer.write() = Some(Arc::new(listener));
    }

    /// Sets the footer long-click listener, replacing any previous one.
    pub fn set_footer_long_clicked_listener<F>(&self, listener: F)
    where
        F: Fn(usize, &H) -> bool + Send + Sync + 'static,
    {
        *self.listeners.footer_long.write() = Some(Arc::new(listener));
    }

    /// Removes every click listener.
    pub fn clear_click_listeners(&self) {
        self.listeners.clear();
    }

    /// Opens a transaction on the adapter's own notifier.
    pub fn begin_transaction(&self) -> Result<()> {
        self.frame.gate.begin()
    }

    /// Closes the transaction, emitting one generic change if anything
    /// changed while it was open.
    pub fn end_transaction(&self) -> Result<()> {
        self.frame.gate.end(&self.frame.notifier).map(|_| ())
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.frame.gate.is_open()
    }

    /// Stops forwarding body changes from the list.
    ///
    /// Called automatically on drop; only needed when the list outlives the
    /// adapter's usefulness but not the adapter itself.
    pub fn cleanup(&self) {
        if self.subscription.lock().take().is_some() {
            tracing::debug!(target: targets::FRAMED, "detached from body list");
        }
    }

    fn ensure_unbound(&self) -> Result<()> {
        if self.is_bound() {
            Err(AdapterError::AlreadyBound)
        } else {
            Ok(())
        }
    }

    fn mark_bound(&self) {
        if !self.bound.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                target: targets::FRAMED,
                headers = self.header_count(),
                footers = self.footer_count(),
                "adapter bound, frame is now fixed"
            );
        }
    }

    fn body_view_type(&self, index: usize) -> Result<usize> {
        let count = self.binder.view_type_count();
        let view_type = self
            .list
            .with_item(index, |item| self.binder.item_view_type(item, index))?;
        if view_type >= count {
            return Err(AdapterError::ViewTypeOutOfRange { view_type, count });
        }
        Ok(view_type)
    }

    fn bind(&self, holder: &mut H, position: usize, drop_down: bool) -> Result<()> {
        self.mark_bound();
        let Section::Body(index) = self.resolve(position)? else {
            return Ok(());
        };

        let item = self.list.get(index)?;
        if drop_down {
            self.binder.bind_drop_down_holder(holder, &item, index);
        } else {
            self.binder.bind_holder(holder, &item, index);
        }

        if self.config.tag_positions
            && let Some(tags) = &self.tags
        {
            tags.set_tag(holder.view(), self.config.tag_keys.position, Arc::new(index));
        }
        Ok(())
    }
}

fn forward_body_changes<H>(frame: Weak<Frame<H>>) -> impl Fn(&ListChange) + Send + Sync + 'static
where
    H: Send + Sync + 'static,
{
    move |change: &ListChange| {
        if let Some(frame) = frame.upgrade() {
            frame.emit(change.shifted(frame.header_count()));
        }
    }
}

impl<T, H> Adapter<H> for FramedAdapter<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: ViewHolder,
{
    fn internal_count(&self) -> usize {
        self.header_count() + self.count() + self.footer_count()
    }

    fn internal_item_view_type(&self, position: usize) -> Result<usize> {
        let headers = self.header_count();
        match self.resolve(position)? {
            Section::Header(index) => Ok(index),
            Section::Body(index) => Ok(self.body_view_type(index)? + headers),
            Section::Footer(index) => Ok(index + headers + self.binder.view_type_count()),
        }
    }

    fn internal_item_view_type_count(&self) -> usize {
        self.mark_bound();
        self.header_count() + self.footer_count() + self.binder.view_type_count()
    }

    fn create_view_holder(&self, parent: &ViewParent, view_type: usize) -> Result<H> {
        self.mark_bound();
        self.frame
            .gate
            .affinity()
            .debug_assert_same_thread_with_msg("create_view_holder called off the owner thread");

        let headers = self.header_count();
        let body_types = self.binder.view_type_count();

        if view_type < headers {
            if let Some(slot) = self.frame.headers.read().get(view_type) {
                return Ok(slot.holder.clone());
            }
        } else if view_type < headers + body_types {
            return Ok(self.binder.create_holder(parent, view_type - headers));
        } else if let Some(slot) = self
            .frame
            .footers
            .read()
            .get(view_type - headers - body_types)
        {
            return Ok(slot.holder.clone());
        }
        Err(AdapterError::UnknownViewType { view_type })
    }

    fn bind_view_holder(&self, holder: &mut H, position: usize) -> Result<()> {
        self.bind(holder, position, false)
    }

    fn bind_drop_down_view_holder(&self, holder: &mut H, position: usize) -> Result<()> {
        self.bind(holder, position, true)
    }

    fn item_id(&self, position: usize) -> Result<u64> {
        match self.resolve(position)? {
            Section::Body(index) => self
                .list
                .with_item(index, |item| self.binder.item_id(item, index)),
            _ => Ok(NO_ID),
        }
    }

    fn is_enabled(&self, position: usize) -> bool {
        match self.resolve(position) {
            Ok(Section::Header(index)) => self.is_header_enabled(index),
            Ok(Section::Body(index)) => self.is_body_enabled(index),
            Ok(Section::Footer(index)) => self.is_footer_enabled(index),
            Err(_) => false,
        }
    }

    fn notifier(&self) -> &ChangeNotifier {
        &self.frame.notifier
    }

    fn on_item_clicked(&self, position: usize, holder: &H) -> Result<()> {
        let section = self.resolve(position)?;
        if !self.is_enabled(position) {
            return Ok(());
        }
        tracing::trace!(target: targets::FRAMED, position, ?section, "click");

        match section {
            Section::Header(index) => {
                let listener = self.listeners.header.read().clone();
                if let Some(listener) = listener {
                    listener(index, holder);
                }
            }
            Section::Body(index) => {
                let listener = self.listeners.item.read().clone();
                if let Some(listener) = listener {
                    let item = self.list.get(index)?;
                    listener(index, &item, holder);
                }
            }
            Section::Footer(index) => {
                let listener = self.listeners.footer.read().clone();
                if let Some(listener) = listener {
                    listener(index, holder);
                }
            }
        }
        Ok(())
    }

    fn on_item_long_clicked(&self, position: usize, holder: &H) -> Result<bool> {
        let section = self.resolve(position)?;
        if !self.is_enabled(position) {
            return Ok(false);
        }
        tracing::trace!(target: targets::FRAMED, position, ?section, "long click");

        let consumed = match section {
            Section::Header(index) => {
                let listener = self.listeners.header_long.read().clone();
                listener.is_some_and(|listener| listener(index, holder))
            }
            Section::Body(index) => {
                let listener = self.listeners.item_long.read().clone();
                match listener {
                    Some(listener) => {
                        let item = self.list.get(index)?;
                        listener(index, &item, holder)
                    }
                    None => false,
                }
            }
            Section::Footer(index) => {
                let listener = self.listeners.footer_long.read().clone();
                listener.is_some_and(|listener| listener(index, holder))
            }
        };
        Ok(consumed)
    }

    fn attach_to_parent(&self) -> Result<()> {
        if self.merged.swap(true, Ordering::AcqRel) {
            return Err(AdapterError::AlreadyMerged);
        }
        tracing::debug!(target: targets::FRAMED, "merged into composite");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T, H> std::fmt::Debug for FramedAdapter<T, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedAdapter")
            .field("headers", &self.frame.headers.read().len())
            .field("footers", &self.frame.footers.read().len())
            .field("bound", &self.bound.load(Ordering::Relaxed))
            .field("merged", &self.merged.load(Ordering::Relaxed))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

enum ListSource<T> {
    Owned(Vec<T>),
    Shared(Arc<ObservableList<T>>),
}

/// Builder for [`FramedAdapter`].
///
/// Headers and footers given here are present from the start and emit no
/// change events.
pub struct FramedAdapterBuilder<T, H> {
    binder: Arc<dyn ItemBinder<T, H>>,
    source: ListSource<T>,
    headers: Vec<FrameSlot<H>>,
    footers: Vec<FrameSlot<H>>,
    tags: Option<Arc<dyn TagStore>>,
    config: FramedConfig,
}

impl<T, H> FramedAdapterBuilder<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: ViewHolder,
{
    /// Creates a builder with an empty owned list.
    pub fn new(binder: Arc<dyn ItemBinder<T, H>>) -> Self {
        Self {
            binder,
            source: ListSource::Owned(Vec::new()),
            headers: Vec::new(),
            footers: Vec::new(),
            tags: None,
            config: FramedConfig::default(),
        }
    }

    /// Uses a new list owning `items`.
    pub fn items(mut self, items: Vec<T>) -> Self {
        self.source = ListSource::Owned(items);
        self
    }

    /// Uses an externally owned list.
    pub fn list(mut self, list: Arc<ObservableList<T>>) -> Self {
        self.source = ListSource::Shared(list);
        self
    }

    /// Appends a selectable header.
    pub fn header(self, holder: H) -> Self {
        self.header_with(holder, true)
    }

    /// Appends a header with explicit selectability.
    pub fn header_with(mut self, holder: H, selectable: bool) -> Self {
        self.headers.push(FrameSlot { holder, selectable });
        self
    }

    /// Appends a selectable footer.
    pub fn footer(self, holder: H) -> Self {
        self.footer_with(holder, true)
    }

    /// Appends a footer with explicit selectability.
    pub fn footer_with(mut self, holder: H, selectable: bool) -> Self {
        self.footers.push(FrameSlot { holder, selectable });
        self
    }

    /// Sets the tag store used for position tagging.
    pub fn tag_store(mut self, tags: Arc<dyn TagStore>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the tag keys.
    pub fn tag_keys(mut self, keys: TagKeys) -> Self {
        self.config.tag_keys = keys;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: FramedConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the adapter.
    pub fn build(self) -> FramedAdapter<T, H> {
        FramedAdapter::from_builder(self)
    }
}

static_assertions::assert_impl_all!(FramedAdapter<String, ViewId>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::FnBinder;
    use crate::platform::MemoryTagStore;

    fn recorder(notifier: &ChangeNotifier) -> Arc<Mutex<Vec<ListChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        notifier.add_listener(move |change| log_clone.lock().push(*change));
        log
    }

    fn text_binder() -> FnBinder<String, ViewId> {
        FnBinder::new(|_, _| ViewId::next(), |_, _, _| {})
    }

    fn framed(items: &[&str], headers: usize, footers: usize) -> FramedAdapter<String, ViewId> {
        let mut builder = FramedAdapter::builder(text_binder())
            .items(items.iter().map(|s| s.to_string()).collect());
        for _ in 0..headers {
            builder = builder.header(ViewId::next());
        }
        for _ in 0..footers {
            builder = builder.footer(ViewId::next());
        }
        builder.build()
    }

    #[test]
    fn test_layout_and_view_types() {
        let adapter = framed(&["a", "b"], 1, 1);

        assert_eq!(adapter.count(), 2);
        assert_eq!(adapter.internal_count(), 4);
        assert_eq!(adapter.internal_item_view_type(0), Ok(0));
        assert_eq!(adapter.internal_item_view_type(1), Ok(1));
        assert_eq!(adapter.internal_item_view_type(3), Ok(2));
        assert_eq!(adapter.internal_item_view_type_count(), 3);
        assert_eq!(adapter.get(0), Ok("a".to_string()));
        assert_eq!(adapter.body_item_at(2), Ok("b".to_string()));
        assert_eq!(
            adapter.body_item_at(0),
            Err(AdapterError::NotABodyPosition { position: 0 })
        );
    }

    #[test]
    fn test_footer_boundary() {
        let adapter = framed(&["a", "b", "c"], 2, 2);
        let footer_start = adapter.footer_start();
        assert_eq!(footer_start, 5);
        assert_eq!(adapter.resolve(footer_start - 1), Ok(Section::Body(2)));
        assert_eq!(adapter.resolve(footer_start), Ok(Section::Footer(0)));
    }

    #[test]
    fn test_body_events_are_shifted_by_headers() {
        let adapter = framed(&["a"], 2, 1);
        let log = recorder(adapter.notifier());

        adapter.list().push("b".to_string());
        adapter.list().remove(0).unwrap();
        adapter.list().notify_data_set_changed();

        assert_eq!(
            *log.lock(),
            vec![
                ListChange::Inserted { start: 3, count: 1 },
                ListChange::Removed { start: 2, count: 1 },
                ListChange::Generic,
            ]
        );
    }

    #[test]
    fn test_add_header_after_bind_fails() {
        let adapter = framed(&["a"], 0, 0);
        let log = recorder(adapter.notifier());

        adapter.add_header_holder(ViewId::next()).unwrap();
        adapter.add_footer_holder(ViewId::next()).unwrap();
        assert_eq!(
            *log.lock(),
            vec![
                ListChange::Inserted { start: 0, count: 1 },
                ListChange::Inserted { start: 2, count: 1 },
            ]
        );

        adapter.internal_item_view_type_count();
        assert!(adapter.is_bound());
        assert_eq!(
            adapter.add_header_holder(ViewId::next()),
            Err(AdapterError::AlreadyBound)
        );
        assert_eq!(
            adapter.add_footer_view(ViewId::next()),
            Err(AdapterError::AlreadyBound)
        );
    }

    #[test]
    fn test_create_view_holder_by_section() {
        let header = ViewId::next();
        let footer = ViewId::next();
        let adapter = FramedAdapter::builder(text_binder())
            .items(vec!["a".to_string()])
            .header(header)
            .footer(footer)
            .build();
        let parent = ViewParent::list();

        assert_eq!(adapter.create_view_holder(&parent, 0), Ok(header));
        assert_eq!(adapter.create_view_holder(&parent, 2), Ok(footer));
        assert!(adapter.create_view_holder(&parent, 1).is_ok());
        assert_eq!(
            adapter.create_view_holder(&parent, 3),
            Err(AdapterError::UnknownViewType { view_type: 3 })
        );
    }

    #[test]
    fn test_binder_view_type_out_of_range() {
        let binder: FnBinder<String, ViewId> =
            FnBinder::new(|_, _| ViewId::next(), |_, _, _| {}).with_view_types(1, |_, _| 4);
        let adapter = FramedAdapter::new(vec!["a".to_string()], binder);

        assert_eq!(
            adapter.internal_item_view_type(0),
            Err(AdapterError::ViewTypeOutOfRange {
                view_type: 4,
                count: 1
            })
        );
    }

    #[test]
    fn test_bind_tags_body_position() {
        let tags = Arc::new(MemoryTagStore::new());
        let adapter = FramedAdapter::builder(text_binder())
            .items(vec!["a".to_string(), "b".to_string()])
            .header(ViewId::next())
            .tag_store(tags.clone())
            .build();

        let mut holder = ViewId::next();
        adapter.bind_view_holder(&mut holder, 2).unwrap();
        assert_eq!(adapter.position_for_view(holder), Some(1));

        let mut header = ViewId::next();
        adapter.bind_view_holder(&mut header, 0).unwrap();
        assert_eq!(adapter.position_for_view(header), None);
    }

    #[test]
    fn test_click_dispatch() {
        let adapter = FramedAdapter::builder(text_binder())
            .items(vec!["a".to_string(), "b".to_string()])
            .header_with(ViewId::next(), false)
            .footer(ViewId::next())
            .build();
        let clicks = Arc::new(Mutex::new(Vec::new()));

        let log = clicks.clone();
        adapter.set_item_clicked_listener(move |index, item, _| {
            log.lock().push(format!("item {index} {item}"));
        });
        let log = clicks.clone();
        adapter.set_header_clicked_listener(move |index, _| {
            log.lock().push(format!("header {index}"));
        });
        let log = clicks.clone();
        adapter.set_footer_clicked_listener(move |index, _| {
            log.lock().push(format!("footer {index}"));
        });

        let holder = ViewId::next();
        adapter.on_item_clicked(0, &holder).unwrap();
        adapter.on_item_clicked(2, &holder).unwrap();
        adapter.on_item_clicked(3, &holder).unwrap();
        assert!(adapter.on_item_clicked(4, &holder).is_err());

        assert_eq!(
            *clicks.lock(),
            vec!["item 1 b".to_string(), "footer 0".to_string()]
        );
    }

    #[test]
    fn test_long_click_last_listener_wins() {
        let adapter = framed(&["a"], 0, 0);
        let holder = ViewId::next();

        assert_eq!(adapter.on_item_long_clicked(0, &holder), Ok(false));
        adapter.set_item_long_clicked_listener(|_, _, _| false);
        adapter.set_item_long_clicked_listener(|_, _, _| true);
        assert_eq!(adapter.on_item_long_clicked(0, &holder), Ok(true));

        adapter.clear_click_listeners();
        assert_eq!(adapter.on_item_long_clicked(0, &holder), Ok(false));
    }

    #[test]
    fn test_item_ids() {
        let adapter = framed(&["a", "b"], 1, 0);
        assert_eq!(adapter.item_id(0), Ok(NO_ID));
        assert_eq!(adapter.item_id(2), Ok(1));
    }

    #[test]
    fn test_transaction_coalesces() {
        let adapter = framed(&["a"], 1, 0);
        let log = recorder(adapter.notifier());

        adapter.begin_transaction().unwrap();
        adapter.list().push("b".to_string());
        adapter.list().push("c".to_string());
        adapter.end_transaction().unwrap();

        assert_eq!(*log.lock(), vec![ListChange::Generic]);
        assert_eq!(
            adapter.end_transaction(),
            Err(AdapterError::NoTransactionOpen)
        );
    }

    #[test]
    fn test_cleanup_stops_forwarding() {
        let list = Arc::new(ObservableList::from_vec(vec!["a".to_string()]));
        let adapter = FramedAdapter::with_list(list.clone(), text_binder());
        let log = recorder(adapter.notifier());

        assert_eq!(list.notifier().listener_count(), 1);
        adapter.cleanup();
        assert_eq!(list.notifier().listener_count(), 0);

        list.push("b".to_string());
        assert!(log.lock().is_empty());
        assert_eq!(adapter.count(), 2);
    }

    #[test]
    fn test_drop_unsubscribes_from_shared_list() {
        let list = Arc::new(ObservableList::from_vec(vec![1, 2, 3]));
        let binder: FnBinder<i32, ViewId> = FnBinder::new(|_, _| ViewId::next(), |_, _, _| {});
        let adapter = FramedAdapter::with_list(list.clone(), binder);
        assert_eq!(list.notifier().listener_count(), 1);
        drop(adapter);
        assert_eq!(list.notifier().listener_count(), 0);
    }

    #[test]
    fn test_merge_once() {
        let adapter = framed(&[], 0, 0);
        assert!(adapter.attach_to_parent().is_ok());
        assert_eq!(adapter.attach_to_parent(), Err(AdapterError::AlreadyMerged));
        assert!(adapter.is_merged());
    }
}
