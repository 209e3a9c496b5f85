//! The flat index space contract.
//!
//! Every adapter the rendering layer talks to (a [`FramedAdapter`] or a
//! [`CompositeAdapter`]) exposes one dense "internal" index space covering
//! headers, body items and footers, plus a disjoint range of view types. The
//! [`Adapter`] trait is that contract; it is object safe so composites can
//! hold heterogeneous pieces as `Arc<dyn Adapter<H>>`.
//!
//! [`FramedAdapter`]: crate::FramedAdapter
//! [`CompositeAdapter`]: crate::CompositeAdapter

use std::any::Any;

use horizon_adapter_core::{AdapterError, ChangeNotifier, Result};

use crate::platform::ViewParent;

/// Identifier reported for positions without a stable id (headers and footers).
pub const NO_ID: u64 = u64::MAX;

/// A flat position resolved to the section that owns it.
///
/// The payload is the position adjusted into that section's own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Header at the given header index.
    Header(usize),
    /// Body item at the given body index.
    Body(usize),
    /// Footer at the given footer index.
    Footer(usize),
}

impl Section {
    /// Resolves `position` for a frame with `headers` headers, `body` body
    /// items and `footers` footers.
    ///
    /// Footers start at `headers + body`; a position equal to that is the
    /// first footer.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `position` is past the last footer.
    pub fn resolve(position: usize, headers: usize, body: usize, footers: usize) -> Result<Self> {
        let footer_start = headers + body;
        if position < headers {
            Ok(Self::Header(position))
        } else if position < footer_start {
            Ok(Self::Body(position - headers))
        } else if position < footer_start + footers {
            Ok(Self::Footer(position - footer_start))
        } else {
            Err(AdapterError::out_of_range(position, footer_start + footers))
        }
    }

    /// The position within the owning section.
    pub fn adjusted(self) -> usize {
        match self {
            Self::Header(i) | Self::Body(i) | Self::Footer(i) => i,
        }
    }

    /// Returns `true` for body positions.
    pub fn is_body(self) -> bool {
        matches!(self, Self::Body(_))
    }
}

/// A flat, view-typed index space that a rendering surface can display.
///
/// Render-facing calls (`internal_item_view_type_count`,
/// `create_view_holder`, `bind_view_holder`) mark the adapter as bound; from
/// then on its header/footer layout is frozen.
pub trait Adapter<H>: Send + Sync {
    /// Total number of positions, headers and footers included.
    fn internal_count(&self) -> usize;

    /// View type of the given flat position.
    fn internal_item_view_type(&self, position: usize) -> Result<usize>;

    /// Number of distinct view types this adapter can produce.
    fn internal_item_view_type_count(&self) -> usize;

    /// Creates a holder for `view_type`.
    fn create_view_holder(&self, parent: &ViewParent, view_type: usize) -> Result<H>;

    /// Binds the item at `position` into `holder`.
    fn bind_view_holder(&self, holder: &mut H, position: usize) -> Result<()>;

    /// Binds the item at `position` for a drop-down surface.
    fn bind_drop_down_view_holder(&self, holder: &mut H, position: usize) -> Result<()> {
        self.bind_view_holder(holder, position)
    }

    /// Stable identifier of the item at `position`, or [`NO_ID`].
    fn item_id(&self, position: usize) -> Result<u64>;

    /// Whether the position reacts to clicks. Out-of-range positions are not.
    fn is_enabled(&self, position: usize) -> bool;

    /// The notifier carrying this adapter's flat-index change events.
    fn notifier(&self) -> &ChangeNotifier;

    /// Dispatches a click at `position`.
    fn on_item_clicked(&self, position: usize, holder: &H) -> Result<()>;

    /// Dispatches a long click at `position`. Returns whether it was consumed.
    fn on_item_long_clicked(&self, position: usize, holder: &H) -> Result<bool>;

    /// Records that this adapter became a piece of a composite.
    ///
    /// # Errors
    ///
    /// [`AdapterError::AlreadyMerged`] on the second call.
    fn attach_to_parent(&self) -> Result<()>;

    /// Upcast used for typed lookups through a composite.
    fn as_any(&self) -> &dyn Any;
}
