use thiserror::Error;

/// Failure modes a query iterator can report.
///
/// Every other tree operation is infallible; these two are the only
/// checked failure paths a caller can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The tree was mutated after an iterator was constructed (or after
    /// its last successful advance) and before the next advance.
    #[error("tree was mutated during iteration")]
    ConcurrentModification,

    /// The current element was read before the first advance, or after
    /// the iterator was exhausted.
    #[error("iterator has no current element")]
    InvalidIteratorState,
}
