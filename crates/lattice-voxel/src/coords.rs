//! Coordinate types for the chunk lattice.
//!
//! Three spaces are in play: [`ChunkCoord`] addresses a chunk in the lattice,
//! [`LocalPos`] addresses a voxel inside one chunk, and [`WorldPos`] is the
//! absolute voxel coordinate that block handlers receive.

use serde::{Deserialize, Serialize};

/// Identifies a chunk's position in the lattice.
///
/// A chunk at `(i, j, k)` covers world voxels `[i*size, (i+1)*size)` on each
/// axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Lattice X coordinate.
    pub i: i64,
    /// Lattice Y coordinate.
    pub j: i64,
    /// Lattice Z coordinate.
    pub k: i64,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(i: i64, j: i64, k: i64) -> Self {
        Self { i, j, k }
    }

    /// Returns the coordinate of the chunk offset by `(di, dj, dk)`.
    pub fn offset(self, di: i64, dj: i64, dk: i64) -> Self {
        Self {
            i: self.i + di,
            j: self.j + dj,
            k: self.k + dk,
        }
    }

    /// World-space position of this chunk's `(0, 0, 0)` voxel.
    pub fn origin(self, size: usize) -> WorldPos {
        let s = size as i64;
        WorldPos::new(self.i * s, self.j * s, self.k * s)
    }

    /// Returns the chunk that contains the given world voxel.
    pub fn containing(pos: WorldPos, size: usize) -> Self {
        let s = size as i64;
        Self {
            i: pos.x.div_euclid(s),
            j: pos.y.div_euclid(s),
            k: pos.z.div_euclid(s),
        }
    }
}

/// Voxel coordinate inside a chunk, each component in `[0, size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalPos {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl LocalPos {
    /// Creates a new local position.
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// Returns `true` if this position lies on any of the six chunk faces.
    pub fn is_on_face(self, size: usize) -> bool {
        let edge = size.saturating_sub(1);
        self.i == 0
            || self.j == 0
            || self.k == 0
            || self.i == edge
            || self.j == edge
            || self.k == edge
    }
}

/// Absolute voxel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl WorldPos {
    /// Creates a new world position.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Offsets this world position by a local position.
    pub fn add_local(self, local: LocalPos) -> Self {
        Self {
            x: self.x + local.i as i64,
            y: self.y + local.j as i64,
            z: self.z + local.k as i64,
        }
    }

    /// Returns this position relative to its containing chunk.
    pub fn local_in(self, size: usize) -> LocalPos {
        let s = size as i64;
        LocalPos {
            i: self.x.rem_euclid(s) as usize,
            j: self.y.rem_euclid(s) as usize,
            k: self.z.rem_euclid(s) as usize,
        }
    }
}
