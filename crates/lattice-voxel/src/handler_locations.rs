//! Registry of voxels whose type carries block handlers.
//!
//! Lets a chunk fire unload events (and re-fire load events) without scanning
//! every voxel. Positions are stored densely for fast iteration, with a side
//! index for O(1) removal.

use rustc_hash::FxHashMap;

use crate::coords::LocalPos;

/// Unordered set of local positions with O(1) insert, remove, and lookup.
#[derive(Clone, Debug, Default)]
pub struct HandlerLocations {
    positions: Vec<LocalPos>,
    slots: FxHashMap<LocalPos, usize>,
}

impl HandlerLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `pos`. Returns `false` if it was already present.
    pub fn insert(&mut self, pos: LocalPos) -> bool {
        if self.slots.contains_key(&pos) {
            return false;
        }
        self.slots.insert(pos, self.positions.len());
        self.positions.push(pos);
        true
    }

    /// Removes `pos`. Returns `false` if it was not present.
    pub fn remove(&mut self, pos: LocalPos) -> bool {
        let Some(slot) = self.slots.remove(&pos) else {
            return false;
        };
        self.positions.swap_remove(slot);
        if let Some(&moved) = self.positions.get(slot) {
            self.slots.insert(moved, slot);
        }
        true
    }

    pub fn contains(&self, pos: LocalPos) -> bool {
        self.slots.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LocalPos> + '_ {
        self.positions.iter().copied()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.slots.clear();
    }
}
