//! Stand-in meshers that count work and log it instead of building geometry.

use std::sync::Arc;

use lattice_voxel::{Chunk, ChunkCoord, LocalPos, ObjectMesher, TerrainMesher, VoxelTypeId, VoxelTypeRegistry};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Counts opaque voxels per chunk on every rebuild.
pub struct CountingTerrainMesher {
    registry: Arc<VoxelTypeRegistry>,
    opaque_counts: FxHashMap<ChunkCoord, usize>,
    pub rebuilds: u64,
}

impl CountingTerrainMesher {
    pub fn new(registry: Arc<VoxelTypeRegistry>) -> Self {
        Self {
            registry,
            opaque_counts: FxHashMap::default(),
            rebuilds: 0,
        }
    }

    /// Opaque voxel count from the most recent rebuild of `coord`.
    pub fn opaque_count(&self, coord: ChunkCoord) -> Option<usize> {
        self.opaque_counts.get(&coord).copied()
    }
}

impl TerrainMesher for CountingTerrainMesher {
    fn init_chunk(&mut self, chunk: &Chunk) {
        self.opaque_counts.insert(chunk.coord(), 0);
    }

    fn dispose_chunk(&mut self, chunk: &Chunk) {
        self.opaque_counts.remove(&chunk.coord());
    }

    fn mesh_chunk(&mut self, chunk: &Chunk) {
        let opaque = if chunk.is_full() {
            chunk.voxels().len()
        } else {
            chunk
                .voxels()
                .as_slice()
                .iter()
                .filter(|&&id| self.registry.is_opaque(id))
                .count()
        };
        self.opaque_counts.insert(chunk.coord(), opaque);
        self.rebuilds += 1;
        trace!(coord = ?chunk.coord(), opaque, "terrain rebuilt");
    }
}

/// Tracks object-type voxels per chunk.
#[derive(Default)]
pub struct InstanceMesher {
    instances: FxHashMap<ChunkCoord, FxHashMap<LocalPos, VoxelTypeId>>,
    pub batches_built: u64,
}

impl InstanceMesher {
    pub fn instance_count(&self) -> usize {
        self.instances.values().map(FxHashMap::len).sum()
    }
}

impl ObjectMesher for InstanceMesher {
    fn init_chunk(&mut self, chunk: &Chunk) {
        self.instances.entry(chunk.coord()).or_default();
    }

    fn dispose_chunk(&mut self, chunk: &Chunk) {
        self.instances.remove(&chunk.coord());
    }

    fn set_object_block(&mut self, chunk: ChunkCoord, id: VoxelTypeId, pos: LocalPos) {
        let slots = self.instances.entry(chunk).or_default();
        if id.is_air() {
            slots.remove(&pos);
        } else {
            slots.insert(pos, id);
        }
    }

    fn build_object_meshes(&mut self) {
        self.batches_built += 1;
        debug!(instances = self.instance_count(), "object batches rebuilt");
    }
}
