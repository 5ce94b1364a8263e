//! Collaborator contracts consumed by [`Chunk`](crate::Chunk).
//!
//! The chunk never builds geometry itself. It tells the terrain and object
//! meshers when per-chunk state should be allocated or released, when an
//! object-type voxel appears or disappears, and when a rebuild is due.

use crate::chunk::Chunk;
use crate::coords::{ChunkCoord, LocalPos};
use crate::registry::{VoxelTypeId, VoxelTypeRegistry};
use crate::remesh::RemeshScheduler;

/// Builds the solid/opaque geometry of one chunk.
pub trait TerrainMesher {
    /// A chunk was created (or its voxel array replaced).
    fn init_chunk(&mut self, chunk: &Chunk);
    /// Release any per-chunk mesh state.
    fn dispose_chunk(&mut self, chunk: &Chunk);
    /// Rebuild this chunk's terrain mesh from its current voxels.
    fn mesh_chunk(&mut self, chunk: &Chunk);
}

/// Places instanced meshes for object-type voxels.
pub trait ObjectMesher {
    fn init_chunk(&mut self, chunk: &Chunk);
    fn dispose_chunk(&mut self, chunk: &Chunk);
    /// Record that `id` now occupies `pos`. [`VoxelTypeId::AIR`] clears it.
    fn set_object_block(&mut self, chunk: ChunkCoord, id: VoxelTypeId, pos: LocalPos);
    /// Rebuild the batched instance meshes. Global, not chunk-scoped.
    fn build_object_meshes(&mut self);
}

/// Everything a chunk operation needs from the outside world.
pub struct ChunkContext<'a> {
    pub registry: &'a VoxelTypeRegistry,
    pub terrain: &'a mut dyn TerrainMesher,
    pub objects: &'a mut dyn ObjectMesher,
    pub remesh: &'a mut dyn RemeshScheduler,
}

impl<'a> ChunkContext<'a> {
    pub fn new(
        registry: &'a VoxelTypeRegistry,
        terrain: &'a mut dyn TerrainMesher,
        objects: &'a mut dyn ObjectMesher,
        remesh: &'a mut dyn RemeshScheduler,
    ) -> Self {
        Self {
            registry,
            terrain,
            objects,
            remesh,
        }
    }
}
