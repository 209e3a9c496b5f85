//! Merging several adapters into one flat index space.
//!
//! A [`CompositeAdapter`] concatenates *pieces*: each piece is any
//! [`Adapter`] (a framed adapter or another composite). For piece `k`:
//!
//! - `start_position` is the sum of the internal counts of pieces `0..k`
//! - `view_type_offset` is the sum of the view type counts of pieces `0..k`
//!
//! The stored placements are recomputed whenever a piece reports a change.
//! Position lookups sum live piece counts instead, so they agree with
//! [`CompositeAdapter::count`] even while a piece holds its events back in a
//! transaction. Change events of a piece are re-emitted on the composite's
//! notifier shifted by the piece's start position, so an insert at local
//! position 0 of the second piece is observed as an insert at the first
//! piece's count.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use horizon_adapter_core::logging::targets;
use horizon_adapter_core::{
    AdapterError, ChangeNotifier, ConnectionGuard, ListChange, NotifyGate, Result,
};
use parking_lot::RwLock;

use crate::adapter::Adapter;
use crate::framed::FramedAdapter;
use crate::platform::{ViewHolder, ViewParent};

struct Piece<H> {
    id: u64,
    adapter: Arc<dyn Adapter<H>>,
    start_position: usize,
    view_type_offset: usize,
    view_type_count: usize,
    cached_view_types: BTreeSet<usize>,
    _subscription: ConnectionGuard<ListChange>,
}

impl<H> Piece<H> {
    fn count(&self) -> usize {
        self.adapter.internal_count()
    }

    fn view_types(&self) -> usize {
        self.adapter.internal_item_view_type_count()
    }

    fn refresh_view_types(&mut self) {
        let mut types = BTreeSet::new();
        for position in 0..self.adapter.internal_count() {
            match self.adapter.internal_item_view_type(position) {
                Ok(view_type) => {
                    types.insert(view_type);
                }
                Err(error) => tracing::warn!(
                    target: targets::COMPOSITE,
                    piece = self.id,
                    position,
                    %error,
                    "piece failed to report a view type"
                ),
            }
        }
        self.cached_view_types = types;
    }
}

fn recompute_offsets<H>(pieces: &mut [Piece<H>]) {
    let mut start = 0;
    let mut view_type_offset = 0;
    for piece in pieces.iter_mut() {
        piece.start_position = start;
        piece.view_type_offset = view_type_offset;
        piece.view_type_count = piece.view_types();
        start += piece.count();
        view_type_offset += piece.view_type_count;
    }
    tracing::trace!(
        target: targets::COMPOSITE,
        pieces = pieces.len(),
        total = start,
        view_types = view_type_offset,
        "offsets recomputed"
    );
}

/// Finds the piece covering `position` from live piece counts.
fn locate<H>(pieces: &[Piece<H>], position: usize) -> Result<PieceAt<H>> {
    let mut start = 0;
    let mut view_type_offset = 0;
    for (index, piece) in pieces.iter().enumerate() {
        let count = piece.count();
        if position < start + count {
            return Ok(PieceAt {
                index,
                adapter: Arc::clone(&piece.adapter),
                start_position: start,
                view_type_offset,
            });
        }
        start += count;
        view_type_offset += piece.view_types();
    }
    Err(AdapterError::out_of_range(position, start))
}

/// State shared with the per-piece forwarders.
struct CompositeShared<H> {
    pieces: RwLock<Vec<Piece<H>>>,
    notifier: ChangeNotifier,
    gate: NotifyGate,
}

impl<H> CompositeShared<H> {
    fn emit(&self, change: ListChange) {
        tracing::trace!(target: targets::COMPOSITE, ?change, "composite changed");
        self.gate.dispatch(&self.notifier, change);
    }

    fn forward(&self, piece_id: u64, change: ListChange) {
        let start = {
            let mut pieces = self.pieces.write();
            recompute_offsets(&mut pieces);
            let Some(piece) = pieces.iter_mut().find(|piece| piece.id == piece_id) else {
                tracing::warn!(
                    target: targets::COMPOSITE,
                    piece = piece_id,
                    "change from a piece that is no longer registered"
                );
                return;
            };
            piece.refresh_view_types();
            piece.start_position
        };

        self.emit(change.shifted(start));

        // Listeners may have grown or shrunk pieces while being notified.
        recompute_offsets(&mut self.pieces.write());
    }
}

/// The piece owning a composite position.
pub struct PieceAt<H> {
    index: usize,
    adapter: Arc<dyn Adapter<H>>,
    start_position: usize,
    view_type_offset: usize,
}

impl<H> PieceAt<H> {
    /// Index of the piece within the composite.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The piece's adapter.
    pub fn adapter(&self) -> &Arc<dyn Adapter<H>> {
        &self.adapter
    }

    /// First composite position covered by the piece.
    pub fn start_position(&self) -> usize {
        self.start_position
    }

    /// First composite view type owned by the piece.
    pub fn view_type_offset(&self) -> usize {
        self.view_type_offset
    }

    /// Converts a composite position into the piece's own index space.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if `position` lies before the piece.
    pub fn adjusted_position(&self, position: usize) -> Result<usize> {
        position
            .checked_sub(self.start_position)
            .ok_or(AdapterError::out_of_range(position, self.start_position))
    }
}

impl<H> Clone for PieceAt<H> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            adapter: Arc::clone(&self.adapter),
            start_position: self.start_position,
            view_type_offset: self.view_type_offset,
        }
    }
}

impl<H> std::fmt::Debug for PieceAt<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieceAt")
            .field("index", &self.index)
            .field("start_position", &self.start_position)
            .field("view_type_offset", &self.view_type_offset)
            .finish_non_exhaustive()
    }
}

/// A snapshot of one piece's placement, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceLayout {
    /// Index of the piece within its composite.
    pub index: usize,
    /// First composite position covered by the piece.
    pub start_position: usize,
    /// Number of positions covered.
    pub count: usize,
    /// First composite view type owned by the piece.
    pub view_type_offset: usize,
    /// Number of view types owned.
    pub view_type_count: usize,
    /// Piece-local view types currently produced.
    pub cached_view_types: Vec<usize>,
    /// Layout of the piece's own pieces, when it is a composite.
    pub children: Vec<PieceLayout>,
}

/// Several adapters concatenated into one.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_adapter::{Adapter, CompositeAdapter, FnBinder, FramedAdapter, ViewId};
///
/// fn piece(items: &[&str]) -> Arc<FramedAdapter<String, ViewId>> {
///     let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
///     Arc::new(FramedAdapter::new(items.iter().map(|s| s.to_string()).collect(), binder))
/// }
///
/// let composite = CompositeAdapter::new();
/// composite.add_adapter(piece(&["a", "b", "c", "d"]))?;
/// composite.add_adapter(piece(&["e", "f"]))?;
///
/// assert_eq!(composite.count(), 6);
/// let at = composite.get_piece_at(4)?;
/// assert_eq!(at.index(), 1);
/// assert_eq!(at.adjusted_position(4)?, 0);
/// assert_eq!(composite.get::<String>(4)?, "e");
/// # Ok::<(), horizon_adapter_core::AdapterError>(())
/// ```
pub struct CompositeAdapter<H> {
    shared: Arc<CompositeShared<H>>,
    next_piece_id: AtomicU64,
    merged: AtomicBool,
}

impl<H: ViewHolder> Default for CompositeAdapter<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ViewHolder> CompositeAdapter<H> {
    /// Creates an empty composite.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(CompositeShared {
                pieces: RwLock::new(Vec::new()),
                notifier: ChangeNotifier::new(),
                gate: NotifyGate::new(),
            }),
            next_piece_id: AtomicU64::new(1),
            merged: AtomicBool::new(false),
        }
    }

    /// Appends `adapter` as the last piece.
    ///
    /// # Errors
    ///
    /// [`AdapterError::AlreadyMerged`] if `adapter` is already a piece of a
    /// composite.
    pub fn add_adapter<A>(&self, adapter: Arc<A>) -> Result<()>
    where
        A: Adapter<H> + 'static,
    {
        self.add_shared_adapter(adapter)
    }

    /// Appends an adapter already erased to a trait object.
    pub fn add_shared_adapter(&self, adapter: Arc<dyn Adapter<H>>) -> Result<()> {
        let index = self.piece_count();
        self.insert_shared_adapter(index, adapter)
    }

    /// Inserts `adapter` as piece `index`.
    ///
    /// Emits `Inserted(piece_start, piece_count)` unless the piece is empty.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::IndexOutOfRange`] if `index > piece_count()`
    /// - [`AdapterError::AlreadyMerged`] if `adapter` is already a piece
    /// - [`AdapterError::CompositeCycle`] if `adapter` is this composite or
    ///   contains it
    pub fn insert_adapter<A>(&self, index: usize, adapter: Arc<A>) -> Result<()>
    where
        A: Adapter<H> + 'static,
    {
        self.insert_shared_adapter(index, adapter)
    }

    /// Inserts an adapter already erased to a trait object.
    pub fn insert_shared_adapter(&self, index: usize, adapter: Arc<dyn Adapter<H>>) -> Result<()> {
        let piece_count = self.piece_count();
        if index > piece_count {
            return Err(AdapterError::out_of_range(index, piece_count));
        }
        if self.reaches_self(adapter.as_ref()) {
            tracing::warn!(target: targets::COMPOSITE, index, "refusing to merge a composite into itself");
            return Err(AdapterError::CompositeCycle);
        }
        adapter.attach_to_parent()?;

        let id = self.next_piece_id.fetch_add(1, Ordering::Relaxed);
        let subscription = adapter
            .notifier()
            .add_scoped_listener(forward_piece_changes(Arc::downgrade(&self.shared), id));
        let mut piece = Piece {
            id,
            view_type_count: adapter.internal_item_view_type_count(),
            adapter,
            start_position: 0,
            view_type_offset: 0,
            cached_view_types: BTreeSet::new(),
            _subscription: subscription,
        };
        piece.refresh_view_types();

        let (start, count) = {
            let mut pieces = self.shared.pieces.write();
            // Pieces are only added from the owner thread.
            let index = index.min(pieces.len());
            pieces.insert(index, piece);
            recompute_offsets(&mut pieces);
            let piece = &pieces[index];
            tracing::debug!(
                target: targets::COMPOSITE,
                index,
                start = piece.start_position,
                count = piece.count(),
                view_type_offset = piece.view_type_offset,
                view_types = piece.view_type_count,
                "piece merged"
            );
            (piece.start_position, piece.count())
        };

        if count > 0 {
            self.shared.emit(ListChange::Inserted { start, count });
        }
        Ok(())
    }

    /// Returns `true` if `adapter` is this composite or contains it at any
    /// depth.
    fn reaches_self(&self, adapter: &dyn Adapter<H>) -> bool {
        let Some(nested) = adapter.as_any().downcast_ref::<CompositeAdapter<H>>() else {
            return false;
        };
        if Arc::ptr_eq(&nested.shared, &self.shared) {
            return true;
        }
        let children: Vec<_> = nested
            .shared
            .pieces
            .read()
            .iter()
            .map(|piece| Arc::clone(&piece.adapter))
            .collect();
        children.iter().any(|child| self.reaches_self(child.as_ref()))
    }

    /// Number of pieces.
    pub fn piece_count(&self) -> usize {
        self.shared.pieces.read().len()
    }

    /// Total number of positions across all pieces.
    pub fn count(&self) -> usize {
        self.shared.pieces.read().iter().map(Piece::count).sum()
    }

    /// Finds the piece covering `position`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::IndexOutOfRange`] if no piece covers it.
    pub fn get_piece_at(&self, position: usize) -> Result<PieceAt<H>> {
        locate(&self.shared.pieces.read(), position)
    }

    /// Body item at composite `position`, typed.
    ///
    /// Looks through nested composites.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::NotABodyPosition`] for a header or footer position
    /// - [`AdapterError::ItemTypeMismatch`] if the piece holds another item
    ///   type
    pub fn get<T>(&self, position: usize) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let piece = self.get_piece_at(position)?;
        let local = piece.adjusted_position(position)?;
        let any = piece.adapter().as_any();

        if let Some(framed) = any.downcast_ref::<FramedAdapter<T, H>>() {
            return framed.body_item_at(local).map_err(|error| match error {
                AdapterError::NotABodyPosition { .. } => AdapterError::NotABodyPosition { position },
                other => other,
            });
        }
        if let Some(nested) = any.downcast_ref::<CompositeAdapter<H>>() {
            return nested.get(local).map_err(|error| match error {
                AdapterError::NotABodyPosition { .. } => AdapterError::NotABodyPosition { position },
                other => other,
            });
        }
        Err(AdapterError::ItemTypeMismatch)
    }

    /// View type of composite `position`.
    pub fn item_view_type(&self, position: usize) -> Result<usize> {
        let piece = self.get_piece_at(position)?;
        let local = piece
            .adapter()
            .internal_item_view_type(piece.adjusted_position(position)?)?;
        Ok(piece.view_type_offset() + local)
    }

    /// Total number of view types across all pieces.
    pub fn item_view_type_count(&self) -> usize {
        self.shared
            .pieces
            .read()
            .iter()
            .map(Piece::view_types)
            .sum()
    }

    /// Opens a transaction on the composite's notifier.
    pub fn begin_transaction(&self) -> Result<()> {
        self.shared.gate.begin()
    }

    /// Closes the transaction, emitting one generic change if any piece
    /// changed while it was open.
    pub fn end_transaction(&self) -> Result<()> {
        self.shared.gate.end(&self.shared.notifier).map(|_| ())
    }

    /// Returns `true` while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.shared.gate.is_open()
    }

    /// Snapshot of every piece's placement, nested composites included.
    pub fn layout(&self) -> Vec<PieceLayout> {
        let pieces = self.shared.pieces.read();
        let mut start_position = 0;
        let mut view_type_offset = 0;
        let mut layout = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.iter().enumerate() {
            let count = piece.count();
            let view_type_count = piece.view_types();
            layout.push(PieceLayout {
                index,
                start_position,
                count,
                view_type_offset,
                view_type_count,
                cached_view_types: piece.cached_view_types.iter().copied().collect(),
                children: piece
                    .adapter
                    .as_any()
                    .downcast_ref::<CompositeAdapter<H>>()
                    .map(CompositeAdapter::layout)
                    .unwrap_or_default(),
            });
            start_position += count;
            view_type_offset += view_type_count;
        }
        layout
    }
}

fn forward_piece_changes<H>(
    shared: Weak<CompositeShared<H>>,
    piece_id: u64,
) -> impl Fn(&ListChange) + Send + Sync + 'static
where
    H: 'static,
{
    move |change: &ListChange| {
        if let Some(shared) = shared.upgrade() {
            shared.forward(piece_id, *change);
        }
    }
}

impl<H: ViewHolder> Adapter<H> for CompositeAdapter<H> {
    fn internal_count(&self) -> usize {
        self.count()
    }

    fn internal_item_view_type(&self, position: usize) -> Result<usize> {
        self.item_view_type(position)
    }

    fn internal_item_view_type_count(&self) -> usize {
        self.item_view_type_count()
    }

    fn create_view_holder(&self, parent: &ViewParent, view_type: usize) -> Result<H> {
        let owner = {
            let pieces = self.shared.pieces.read();
            let mut offset = 0;
            let mut owner = None;
            for piece in pieces.iter() {
                let count = piece.view_types();
                if (offset..offset + count).contains(&view_type)
                    && piece.cached_view_types.contains(&(view_type - offset))
                {
                    owner = Some((Arc::clone(&piece.adapter), view_type - offset));
                    break;
                }
                offset += count;
            }
            owner
        };
        match owner {
            Some((adapter, local)) => adapter.create_view_holder(parent, local),
            None => Err(AdapterError::UnknownViewType { view_type }),
        }
    }

    fn bind_view_holder(&self, holder: &mut H, position: usize) -> Result<()> {
        let piece = self.get_piece_at(position)?;
        piece
            .adapter()
            .bind_view_holder(holder, piece.adjusted_position(position)?)
    }

    fn bind_drop_down_view_holder(&self, holder: &mut H, position: usize) -> Result<()> {
        let piece = self.get_piece_at(position)?;
        piece
            .adapter()
            .bind_drop_down_view_holder(holder, piece.adjusted_position(position)?)
    }

    fn item_id(&self, position: usize) -> Result<u64> {
        let piece = self.get_piece_at(position)?;
        piece.adapter().item_id(piece.adjusted_position(position)?)
    }

    fn is_enabled(&self, position: usize) -> bool {
        self.get_piece_at(position).is_ok_and(|piece| {
            piece
                .adjusted_position(position)
                .is_ok_and(|local| piece.adapter().is_enabled(local))
        })
    }

    fn notifier(&self) -> &ChangeNotifier {
        &self.shared.notifier
    }

    fn on_item_clicked(&self, position: usize, holder: &H) -> Result<()> {
        let piece = self.get_piece_at(position)?;
        piece
            .adapter()
            .on_item_clicked(piece.adjusted_position(position)?, holder)
    }

    fn on_item_long_clicked(&self, position: usize, holder: &H) -> Result<bool> {
        let piece = self.get_piece_at(position)?;
        piece
            .adapter()
            .on_item_long_clicked(piece.adjusted_position(position)?, holder)
    }

    fn attach_to_parent(&self) -> Result<()> {
        if self.merged.swap(true, Ordering::AcqRel) {
            return Err(AdapterError::AlreadyMerged);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<H> std::fmt::Debug for CompositeAdapter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pieces = self.shared.pieces.read();
        f.debug_struct("CompositeAdapter")
            .field("pieces", &pieces.len())
            .field("count", &pieces.iter().map(Piece::count).sum::<usize>())
            .field("merged", &self.merged.load(Ordering::Relaxed))
            .finish()
    }
}

static_assertions::assert_impl_all!(CompositeAdapter<crate::platform::ViewId>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::FnBinder;
    use crate::platform::ViewId;
    use horizon_adapter_core::UiDispatcher;
    use parking_lot::Mutex;

    fn piece(items: &[&str]) -> Arc<FramedAdapter<String, ViewId>> {
        let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
        Arc::new(FramedAdapter::new(
            items.iter().map(|s| s.to_string()).collect(),
            binder,
        ))
    }

    fn recorder(notifier: &ChangeNotifier) -> Arc<Mutex<Vec<ListChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        notifier.add_listener(move |change| log_clone.lock().push(*change));
        log
    }

    #[test]
    fn test_add_adapter_emits_insert_at_previous_total() {
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        let log = recorder(composite.notifier());

        composite.add_adapter(piece(&["a", "b", "c"])).unwrap();
        composite.add_adapter(piece(&[])).unwrap();
        composite.add_adapter(piece(&["d"])).unwrap();

        assert_eq!(composite.piece_count(), 3);
        assert_eq!(
            *log.lock(),
            vec![
                ListChange::Inserted { start: 0, count: 3 },
                ListChange::Inserted { start: 3, count: 1 },
            ]
        );
    }

    #[test]
    fn test_insert_adapter_in_the_middle() {
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(piece(&["a", "b"])).unwrap();
        composite.add_adapter(piece(&["e"])).unwrap();
        let log = recorder(composite.notifier());

        composite.insert_adapter(1, piece(&["c", "d"])).unwrap();

        assert_eq!(*log.lock(), vec![ListChange::Inserted { start: 2, count: 2 }]);
        assert_eq!(composite.get::<String>(4), Ok("e".to_string()));
        assert_eq!(
            composite.insert_adapter(9, piece(&["x"])),
            Err(AdapterError::out_of_range(9, 3))
        );
    }

    #[test]
    fn test_merge_twice_fails() {
        let shared = piece(&["a"]);
        let first: CompositeAdapter<ViewId> = CompositeAdapter::new();
        let second: CompositeAdapter<ViewId> = CompositeAdapter::new();

        first.add_adapter(shared.clone()).unwrap();
        assert_eq!(second.add_adapter(shared), Err(AdapterError::AlreadyMerged));
        assert_eq!(second.piece_count(), 0);
    }

    #[test]
    fn test_forwarded_events_are_translated() {
        let first = piece(&["a", "b"]);
        let second = piece(&["c"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        composite.add_adapter(second.clone()).unwrap();
        let log = recorder(composite.notifier());

        second.list().insert(0, "x".to_string()).unwrap();
        first.list().set(1, "B".to_string()).unwrap();
        second.list().clear();

        assert_eq!(
            *log.lock(),
            vec![
                ListChange::Inserted { start: 2, count: 1 },
                ListChange::Changed { start: 1, count: 1 },
                ListChange::Removed { start: 2, count: 2 },
            ]
        );
    }

    #[test]
    fn test_offsets_follow_growth() {
        let first = piece(&["a", "b"]);
        let second = piece(&["c"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        composite.add_adapter(second).unwrap();

        assert_eq!(composite.get::<String>(2), Ok("c".to_string()));
        first.list().extend(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(composite.get_piece_at(4).unwrap().start_position(), 4);
        assert_eq!(composite.get::<String>(4), Ok("c".to_string()));
    }

    #[test]
    fn test_view_type_offsets_and_create() {
        let header = ViewId::next();
        let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &String, _| {});
        let framed = Arc::new(
            FramedAdapter::builder(binder)
                .items(vec!["a".to_string()])
                .header(header)
                .build(),
        );
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(piece(&["x"])).unwrap();
        composite.add_adapter(framed).unwrap();

        // piece 0 owns type 0, piece 1 owns types 1 (header) and 2 (body)
        assert_eq!(composite.item_view_type_count(), 3);
        assert_eq!(composite.item_view_type(1), Ok(1));
        assert_eq!(composite.item_view_type(2), Ok(2));

        let parent = ViewParent::list();
        assert_eq!(composite.create_view_holder(&parent, 1), Ok(header));
        assert_eq!(
            composite.create_view_holder(&parent, 7),
            Err(AdapterError::UnknownViewType { view_type: 7 })
        );
    }

    #[test]
    fn test_typed_get_errors() {
        let binder = FnBinder::new(|_, _| ViewId::next(), |_, _: &i32, _| {});
        let numbers = Arc::new(
            FramedAdapter::builder(binder)
                .items(vec![1, 2])
                .footer(ViewId::next())
                .build(),
        );
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(numbers).unwrap();

        assert_eq!(composite.get::<i32>(1), Ok(2));
        assert_eq!(composite.get::<String>(0), Err(AdapterError::ItemTypeMismatch));
        assert_eq!(
            composite.get::<i32>(2),
            Err(AdapterError::NotABodyPosition { position: 2 })
        );
        assert!(composite.get::<i32>(3).is_err());
    }

    #[test]
    fn test_nested_composites() {
        let inner: Arc<CompositeAdapter<ViewId>> = Arc::new(CompositeAdapter::new());
        let leaf = piece(&["b"]);
        inner.add_adapter(leaf.clone()).unwrap();

        let outer: CompositeAdapter<ViewId> = CompositeAdapter::new();
        outer.add_adapter(piece(&["a"])).unwrap();
        outer.add_adapter(inner.clone()).unwrap();
        let log = recorder(outer.notifier());

        leaf.list().push("c".to_string());

        assert_eq!(*log.lock(), vec![ListChange::Inserted { start: 2, count: 1 }]);
        assert_eq!(outer.get::<String>(2), Ok("c".to_string()));
        assert_eq!(outer.layout()[1].children.len(), 1);
    }

    #[test]
    fn test_generic_change_is_forwarded() {
        let first = piece(&["a"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        let log = recorder(composite.notifier());

        first.list().replace_all(vec!["x".to_string(), "y".to_string()]);

        assert_eq!(*log.lock(), vec![ListChange::Generic]);
        assert_eq!(composite.count(), 2);
    }

    #[test]
    fn test_composite_transaction() {
        let first = piece(&["a"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        let log = recorder(composite.notifier());

        composite.begin_transaction().unwrap();
        first.list().push("b".to_string());
        first.list().push("c".to_string());
        assert_eq!(
            composite.begin_transaction(),
            Err(AdapterError::TransactionAlreadyOpen)
        );
        composite.end_transaction().unwrap();

        assert_eq!(*log.lock(), vec![ListChange::Generic]);
        assert_eq!(composite.get::<String>(2), Ok("c".to_string()));
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all_items(composite: &CompositeAdapter<ViewId>) -> Vec<String> {
        (0..composite.count())
            .map(|position| composite.get::<String>(position).unwrap())
            .collect()
    }

    #[test]
    fn test_lookups_follow_growth_inside_piece_transaction() {
        let first = piece(&["a0", "a1"]);
        let second = piece(&["b0", "b1", "b2"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        composite.add_adapter(second).unwrap();
        let log = recorder(composite.notifier());

        first.begin_transaction().unwrap();
        first.list().extend(strings(&["x", "x", "x", "x"]));

        assert!(log.lock().is_empty());
        assert_eq!(composite.count(), 9);
        assert_eq!(
            all_items(&composite),
            strings(&["a0", "a1", "x", "x", "x", "x", "b0", "b1", "b2"])
        );
        assert_eq!(composite.get_piece_at(6).unwrap().start_position(), 6);
        assert_eq!(composite.layout()[1].start_position, 6);

        first.end_transaction().unwrap();
        assert_eq!(*log.lock(), vec![ListChange::Generic]);
        assert_eq!(composite.get::<String>(8), Ok("b2".to_string()));
    }

    #[test]
    fn test_lookups_follow_background_update_before_drain() {
        let dispatcher = UiDispatcher::new();
        let first = piece(&["a0", "a1"]);
        let second = piece(&["b0", "b1", "b2"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        composite.add_adapter(second).unwrap();

        first
            .list()
            .update_in_background(&dispatcher, |items| items.push("x".to_string()));

        assert_eq!(composite.count(), 6);
        assert_eq!(composite.get::<String>(3), Ok("b0".to_string()));
        assert_eq!(composite.get::<String>(5), Ok("b2".to_string()));
        assert_eq!(composite.item_view_type(5), Ok(1));

        assert_eq!(dispatcher.run_pending(), 1);
        assert_eq!(all_items(&composite), strings(&["a0", "a1", "x", "b0", "b1", "b2"]));
    }

    #[test]
    fn test_merging_into_itself_fails() {
        let composite: Arc<CompositeAdapter<ViewId>> = Arc::new(CompositeAdapter::new());
        composite.add_adapter(piece(&["a"])).unwrap();

        assert_eq!(
            composite.add_adapter(composite.clone()),
            Err(AdapterError::CompositeCycle)
        );
        assert_eq!(composite.piece_count(), 1);
        assert_eq!(composite.count(), 1);
    }

    #[test]
    fn test_mutual_merge_fails() {
        let outer: Arc<CompositeAdapter<ViewId>> = Arc::new(CompositeAdapter::new());
        let middle: Arc<CompositeAdapter<ViewId>> = Arc::new(CompositeAdapter::new());
        let inner: Arc<CompositeAdapter<ViewId>> = Arc::new(CompositeAdapter::new());
        outer.add_adapter(middle.clone()).unwrap();
        middle.add_adapter(inner.clone()).unwrap();

        assert_eq!(
            inner.add_adapter(outer.clone()),
            Err(AdapterError::CompositeCycle)
        );
        assert_eq!(
            middle.add_adapter(outer.clone()),
            Err(AdapterError::CompositeCycle)
        );
        assert_eq!(inner.piece_count(), 0);

        // A refused merge leaves the adapter free to merge elsewhere.
        let other: CompositeAdapter<ViewId> = CompositeAdapter::new();
        assert_eq!(other.add_adapter(outer), Ok(()));
    }

    #[test]
    fn test_adjusted_position_rejects_earlier_positions() {
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(piece(&["a", "b"])).unwrap();
        composite.add_adapter(piece(&["c"])).unwrap();

        let at = composite.get_piece_at(2).unwrap();
        assert_eq!(at.adjusted_position(2), Ok(0));
        assert_eq!(at.adjusted_position(1), Err(AdapterError::out_of_range(1, 2)));
    }

    #[test]
    fn test_dropping_composite_detaches_forwarders() {
        let first = piece(&["a"]);
        let composite: CompositeAdapter<ViewId> = CompositeAdapter::new();
        composite.add_adapter(first.clone()).unwrap();
        assert_eq!(first.notifier().listener_count(), 1);

        drop(composite);
        assert_eq!(first.notifier().listener_count(), 0);
    }
}
