use thiserror::Error;

use crate::board::BoardVec;

/// Errors raised while building or accessing a [`Field`](crate::Field).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
  /// Width or height exceeds [`MAX_DIMENSION`](crate::MAX_DIMENSION).
  #[error("field size {width}x{height} exceeds the maximum of {max}x{max}", max = crate::MAX_DIMENSION)]
  InvalidDimensions { width: u32, height: u32 },

  /// More bombs were requested than there are free cells.
  #[error("too many bombs: {bombs} requested, only {capacity} cells available")]
  TooManyBombs { bombs: u32, capacity: u32 },

  /// A coordinate lies outside the grid.
  #[error("position {pos:?} is outside the {width}x{height} field")]
  OutOfBounds { pos: BoardVec, width: u32, height: u32 },
}
