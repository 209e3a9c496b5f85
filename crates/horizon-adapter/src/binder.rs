//! Body item binding.
//!
//! An [`ItemBinder`] is the rendering layer's half of a framed adapter: it
//! declares how many body view types exist, picks one per item, creates
//! holders for them and binds items into holders. Headers and footers never
//! reach the binder.

use std::sync::Arc;

use crate::platform::ViewParent;

/// Creates and binds holders for body items.
///
/// Query methods (`item_view_type`, `item_id`, `is_enabled`) run while the
/// item list is read-locked and must not mutate the list. `bind_holder`
/// receives a clone of the item and may do anything.
///
/// # Example
///
/// ```ignore
/// use horizon_adapter::{ItemBinder, ViewParent};
///
/// struct RowBinder;
///
/// impl ItemBinder<String, RowHolder> for RowBinder {
///     fn create_holder(&self, parent: &ViewParent, _view_type: usize) -> RowHolder {
///         RowHolder::inflate(parent)
///     }
///
///     fn bind_holder(&self, holder: &mut RowHolder, item: &String, _position: usize) {
///         holder.set_text(item);
///     }
/// }
/// ```
pub trait ItemBinder<T, H>: Send + Sync {
    /// Number of distinct body view types. Must be at least one.
    fn view_type_count(&self) -> usize {
        1
    }

    /// View type of `item`, in `[0, view_type_count())`.
    fn item_view_type(&self, _item: &T, _position: usize) -> usize {
        0
    }

    /// Creates an unbound holder for `view_type`.
    fn create_holder(&self, parent: &ViewParent, view_type: usize) -> H;

    /// Binds `item` (at body position `position`) into `holder`.
    fn bind_holder(&self, holder: &mut H, item: &T, position: usize);

    /// Binds for a spinner-style drop-down. Defaults to [`bind_holder`](Self::bind_holder).
    fn bind_drop_down_holder(&self, holder: &mut H, item: &T, position: usize) {
        self.bind_holder(holder, item, position);
    }

    /// Stable identifier of `item`. Defaults to the body position.
    fn item_id(&self, _item: &T, position: usize) -> u64 {
        position as u64
    }

    /// Whether `item` reacts to clicks.
    fn is_enabled(&self, _item: &T, _position: usize) -> bool {
        true
    }
}

/// Type alias for a holder factory.
pub type CreateFn<H> = Arc<dyn Fn(&ViewParent, usize) -> H + Send + Sync>;

/// Type alias for a bind function.
pub type BindFn<T, H> = Arc<dyn Fn(&mut H, &T, usize) + Send + Sync>;

/// Type alias for a view type selector.
pub type ViewTypeFn<T> = Arc<dyn Fn(&T, usize) -> usize + Send + Sync>;

/// An [`ItemBinder`] assembled from closures.
///
/// # Example
///
/// ```ignore
/// let binder = FnBinder::new(
///     |parent, _view_type| RowHolder::inflate(parent),
///     |holder, item: &String, _position| holder.set_text(item),
/// )
/// .with_view_types(2, |item, _position| usize::from(item.starts_with('#')));
/// ```
pub struct FnBinder<T, H> {
    create: CreateFn<H>,
    bind: BindFn<T, H>,
    view_type: Option<ViewTypeFn<T>>,
    view_type_count: usize,
}

impl<T, H> FnBinder<T, H> {
    /// Creates a single-view-type binder.
    pub fn new<C, B>(create: C, bind: B) -> Self
    where
        C: Fn(&ViewParent, usize) -> H + Send + Sync + 'static,
        B: Fn(&mut H, &T, usize) + Send + Sync + 'static,
    {
        Self {
            create: Arc::new(create),
            bind: Arc::new(bind),
            view_type: None,
            view_type_count: 1,
        }
    }

    /// Declares `count` body view types chosen by `select`.
    pub fn with_view_types<F>(mut self, count: usize, select: F) -> Self
    where
        F: Fn(&T, usize) -> usize + Send + Sync + 'static,
    {
        self.view_type_count = count.max(1);
        self.view_type = Some(Arc::new(select));
        self
    }
}

impl<T, H> ItemBinder<T, H> for FnBinder<T, H> {
    fn view_type_count(&self) -> usize {
        self.view_type_count
    }

    fn item_view_type(&self, item: &T, position: usize) -> usize {
        self.view_type
            .as_ref()
            .map_or(0, |select| select(item, position))
    }

    fn create_holder(&self, parent: &ViewParent, view_type: usize) -> H {
        (self.create)(parent, view_type)
    }

    fn bind_holder(&self, holder: &mut H, item: &T, position: usize) {
        (self.bind)(holder, item, position);
    }
}
