//! Dense voxel storage for one chunk.
//!
//! A [`VoxelArray`] is a flat `size³` buffer of [`VoxelTypeId`]s. Index order
//! is `(i, j, k) -> i*size² + j*size + k`, so `k` varies fastest and a row of
//! constant `(i, j)` is contiguous.

use crate::coords::LocalPos;
use crate::error::ChunkError;
use crate::registry::VoxelTypeId;

/// Flat `size × size × size` voxel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelArray {
    data: Vec<VoxelTypeId>,
    size: usize,
}

impl VoxelArray {
    /// Creates an all-air array.
    pub fn new(size: usize) -> Self {
        Self::filled(size, VoxelTypeId::AIR)
    }

    /// Creates an array with every voxel set to `fill`.
    pub fn filled(size: usize, fill: VoxelTypeId) -> Self {
        Self {
            data: vec![fill; size * size * size],
            size,
        }
    }

    /// Wraps an existing buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::ArraySizeMismatch`] if `data.len() != size³`.
    pub fn from_vec(size: usize, data: Vec<VoxelTypeId>) -> Result<Self, ChunkError> {
        let expected = size * size * size;
        if data.len() != expected {
            return Err(ChunkError::ArraySizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// An array with no storage, used for disposed chunks.
    pub(crate) fn released() -> Self {
        Self {
            data: Vec::new(),
            size: 0,
        }
    }

    /// Side length in voxels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of voxels (`size³`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Converts `(i, j, k)` to a linear offset.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(
            i < self.size && j < self.size && k < self.size,
            "voxel ({i}, {j}, {k}) out of range for size {}",
            self.size
        );
        (i * self.size + j) * self.size + k
    }

    #[inline]
    pub fn get(&self, pos: LocalPos) -> VoxelTypeId {
        self.data[self.index(pos.i, pos.j, pos.k)]
    }

    /// Writes `id` at `pos` and returns the previous value.
    #[inline]
    pub fn set(&mut self, pos: LocalPos, id: VoxelTypeId) -> VoxelTypeId {
        let idx = self.index(pos.i, pos.j, pos.k);
        std::mem::replace(&mut self.data[idx], id)
    }

    /// Overwrites every voxel with `id`.
    pub fn fill(&mut self, id: VoxelTypeId) {
        self.data.fill(id);
    }

    pub fn as_slice(&self) -> &[VoxelTypeId] {
        &self.data
    }
}
