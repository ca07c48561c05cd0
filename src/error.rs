use thiserror::Error;

/// Every fallible public operation on a [`Pruner`](crate::Pruner) returns
/// `Result<_, PrunerError>`. The pruner never silently truncates input: a
/// malformed batch is rejected wholesale rather than partially applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrunerError {
  /// Raised at construction time: an unknown sense, a non-positive `maxCuts`
  /// other than the unbounded sentinel `-1`, or a variant parameter outside
  /// its valid range (e.g. `lambda` not in `(0, 1)`).
  #[error("invalid pruner configuration: {0}")]
  Configuration(String),

  /// Raised when an incoming batch's dimensions don't line up: row count of
  /// `A` disagrees with the length of `b` or `is_my_cut`, the column count
  /// isn't `d`, or an index set refers to a slot that doesn't exist.
  #[error("inconsistent shapes: {0}")]
  Shape(String),

  /// An internal assertion failed. This should be unreachable; if it is
  /// ever observed the pruner is poisoned (see [`Pruner::is_poisoned`](crate::Pruner::is_poisoned))
  /// and every subsequent mutating call returns this same error without
  /// touching state.
  #[error("internal invariant violated, pruner is poisoned: {0}")]
  InvariantViolation(String),
}
