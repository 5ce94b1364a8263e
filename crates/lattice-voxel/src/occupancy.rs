//! Derived occupancy flags: full, empty, and per-layer uniform voxel.
//!
//! These flags only ever move in one direction between full scans. A single
//! voxel write can make a chunk "not full", "not empty", or a layer "mixed",
//! but only [`Occupancy::from_scan`] can establish the opposite. The two paths
//! are kept as separate functions so incremental code has no way to set a
//! flag to `true`.

use crate::registry::VoxelTypeId;

/// Result of a full pass over a chunk's voxels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanSummary {
    /// Every voxel was opaque.
    pub fully_opaque: bool,
    /// Every voxel was air.
    pub fully_air: bool,
    /// Uniform voxel per layer `j`, or `None` for a mixed layer.
    pub layers: Vec<Option<VoxelTypeId>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    is_full: bool,
    is_empty: bool,
    /// `None` is the "mixed" sentinel.
    whole_layer: Vec<Option<VoxelTypeId>>,
}

impl Occupancy {
    /// Flags before the first scan: nothing is known.
    pub fn unknown(size: usize) -> Self {
        Self {
            is_full: false,
            is_empty: false,
            whole_layer: vec![None; size],
        }
    }

    /// Authoritative recompute from a full scan.
    pub fn from_scan(summary: ScanSummary) -> Self {
        Self {
            is_full: summary.fully_opaque,
            is_empty: summary.fully_air,
            whole_layer: summary.layers,
        }
    }

    /// Conservative update after one voxel in `layer` became `new_id`.
    pub fn note_write(&mut self, layer: usize, new_id: VoxelTypeId, new_is_opaque: bool) {
        if !new_is_opaque {
            self.is_full = false;
        }
        if !new_id.is_air() {
            self.is_empty = false;
        }
        if let Some(slot) = self.whole_layer.get_mut(layer)
            && *slot != Some(new_id)
        {
            *slot = None;
        }
    }

    /// Resets every layer hint to `fill` (or mixed when `None`).
    ///
    /// Only valid when the voxel store has just been filled with the same ID.
    pub fn seed_layers(&mut self, fill: Option<VoxelTypeId>) {
        self.whole_layer.fill(fill);
    }

    pub fn is_full(&self) -> bool {
        self.is_full
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Uniform voxel of layer `j`, or `None` if mixed (or out of range).
    pub fn whole_layer_voxel(&self, j: usize) -> Option<VoxelTypeId> {
        self.whole_layer.get(j).copied().flatten()
    }

    pub fn layers(&self) -> &[Option<VoxelTypeId>] {
        &self.whole_layer
    }

    /// Releases the layer cache for a disposed chunk.
    pub(crate) fn release(&mut self) {
        self.whole_layer = Vec::new();
        self.is_full = false;
        self.is_empty = false;
    }
}
