//! Chunk error types.

use crate::coords::ChunkCoord;

/// Errors returned by chunk and chunk-store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// The chunk was already disposed; no further reads or writes are valid.
    #[error("chunk {0:?} has been disposed")]
    Disposed(ChunkCoord),

    /// A chunk is already loaded at this coordinate.
    #[error("chunk {0:?} is already loaded")]
    AlreadyLoaded(ChunkCoord),

    /// No chunk is loaded at this coordinate.
    #[error("chunk {0:?} is not loaded")]
    NotLoaded(ChunkCoord),

    /// A voxel buffer does not hold `size³` entries.
    #[error("voxel array has {actual} entries, expected {expected}")]
    ArraySizeMismatch { expected: usize, actual: usize },
}
