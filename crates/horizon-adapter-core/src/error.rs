//! Error types for Horizon Adapter.
//!
//! Every variant is a programmer contract violation: it means the adapter
//! graph was driven in a way that would otherwise corrupt index arithmetic.
//! Callers (usually the rendering layer) should treat these as fatal for the
//! operation that produced them.

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised by lists, framed adapters and composite adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// `begin_transaction` was called while a transaction was already open.
    #[error("a transaction is already open")]
    TransactionAlreadyOpen,

    /// `end_transaction` was called without a matching `begin_transaction`.
    #[error("no transaction is open")]
    NoTransactionOpen,

    /// Headers or footers were added after the adapter was attached to a
    /// rendering surface.
    #[error("adapter is already bound to a rendering surface; headers and footers are frozen")]
    AlreadyBound,

    /// The adapter has already been merged into a composite adapter.
    #[error("adapter is already merged into a composite adapter")]
    AlreadyMerged,

    /// Merging the adapter would make a composite contain itself.
    #[error("merging this adapter would make a composite contain itself")]
    CompositeCycle,

    /// An index was outside `[0, len)` (or `[0, len]` for insertion).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the index space at the time of the call.
        len: usize,
    },

    /// No header, body slot, footer or piece owns the requested view type.
    #[error("no owner for view type {view_type}")]
    UnknownViewType {
        /// The requested view type.
        view_type: usize,
    },

    /// An item binder reported a view type outside its declared count.
    #[error("binder produced view type {view_type}, but declares only {count} view types")]
    ViewTypeOutOfRange {
        /// The view type the binder produced.
        view_type: usize,
        /// The binder's declared view type count.
        count: usize,
    },

    /// A body item was requested at a header or footer position.
    #[error("position {position} is a header or footer, not a body item")]
    NotABodyPosition {
        /// The flat position that was requested.
        position: usize,
    },

    /// A typed lookup reached a piece whose item type is different.
    #[error("piece item type does not match the requested type")]
    ItemTypeMismatch,
}

impl AdapterError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Returns `true` for errors caused by misuse of the transaction protocol.
    pub fn is_transaction_error(&self) -> bool {
        matches!(self, Self::TransactionAlreadyOpen | Self::NoTransactionOpen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AdapterError::out_of_range(5, 3).to_string(),
            "index 5 out of range for length 3"
        );
        assert_eq!(
            AdapterError::UnknownViewType { view_type: 9 }.to_string(),
            "no owner for view type 9"
        );
    }

    #[test]
    fn test_cycle_message() {
        assert_eq!(
            AdapterError::CompositeCycle.to_string(),
            "merging this adapter would make a composite contain itself"
        );
    }

    #[test]
    fn test_transaction_classification() {
        assert!(AdapterError::TransactionAlreadyOpen.is_transaction_error());
        assert!(AdapterError::NoTransactionOpen.is_transaction_error());
        assert!(!AdapterError::AlreadyBound.is_transaction_error());
    }
}
