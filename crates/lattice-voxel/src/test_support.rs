//! Recording collaborators and a small block palette for unit tests.

use std::sync::{Arc, Mutex};

use crate::chunk::Chunk;
use crate::coords::{ChunkCoord, LocalPos, WorldPos};
use crate::handlers::{BlockEvent, BlockHandlers};
use crate::mesher::{ChunkContext, ObjectMesher, TerrainMesher};
use crate::registry::{Transparency, VoxelTypeDef, VoxelTypeId, VoxelTypeRegistry};
use crate::remesh::RemeshScheduler;

pub const STONE: VoxelTypeId = VoxelTypeId(1);
pub const GLASS: VoxelTypeId = VoxelTypeId(2);
pub const FLOWER: VoxelTypeId = VoxelTypeId(3);
pub const TORCH: VoxelTypeId = VoxelTypeId(4);
pub const DIRT: VoxelTypeId = VoxelTypeId(5);

pub type EventLog = Arc<Mutex<Vec<(BlockEvent, WorldPos)>>>;

#[derive(Default)]
pub struct RecordingTerrain {
    pub inits: Vec<ChunkCoord>,
    pub disposes: Vec<ChunkCoord>,
    pub meshed: Vec<ChunkCoord>,
}

impl TerrainMesher for RecordingTerrain {
    fn init_chunk(&mut self, chunk: &Chunk) {
        self.inits.push(chunk.coord());
    }
    fn dispose_chunk(&mut self, chunk: &Chunk) {
        self.disposes.push(chunk.coord());
    }
    fn mesh_chunk(&mut self, chunk: &Chunk) {
        self.meshed.push(chunk.coord());
    }
}

#[derive(Default)]
pub struct RecordingObjects {
    pub inits: Vec<ChunkCoord>,
    pub disposes: Vec<ChunkCoord>,
    pub blocks: Vec<(ChunkCoord, VoxelTypeId, LocalPos)>,
    pub builds: usize,
}

impl ObjectMesher for RecordingObjects {
    fn init_chunk(&mut self, chunk: &Chunk) {
        self.inits.push(chunk.coord());
    }
    fn dispose_chunk(&mut self, chunk: &Chunk) {
        self.disposes.push(chunk.coord());
    }
    fn set_object_block(&mut self, chunk: ChunkCoord, id: VoxelTypeId, pos: LocalPos) {
        self.blocks.push((chunk, id, pos));
    }
    fn build_object_meshes(&mut self) {
        self.builds += 1;
    }
}

#[derive(Default)]
pub struct RecordingScheduler {
    pub queued: Vec<ChunkCoord>,
}

impl RemeshScheduler for RecordingScheduler {
    fn queue_chunk_for_remesh(&mut self, chunk: ChunkCoord) {
        self.queued.push(chunk);
    }
}

/// Registry with stone, glass, flower (object), torch (handlers), dirt.
pub fn test_registry(log: &EventLog) -> VoxelTypeRegistry {
    let mut registry = VoxelTypeRegistry::new();
    registry.register(VoxelTypeDef::solid("stone")).unwrap();
    registry
        .register(VoxelTypeDef::solid("glass").with_transparency(Transparency::SemiTransparent))
        .unwrap();
    registry
        .register(
            VoxelTypeDef::solid("flower")
                .with_solid(false)
                .with_transparency(Transparency::FullyTransparent)
                .as_object(),
        )
        .unwrap();

    let handlers = [
        BlockEvent::Load,
        BlockEvent::Set,
        BlockEvent::Unset,
        BlockEvent::Unload,
    ]
    .into_iter()
    .fold(BlockHandlers::new(), |h, event| {
        let log = Arc::clone(log);
        let record = move |pos: WorldPos| log.lock().unwrap().push((event, pos));
        match event {
            BlockEvent::Load => h.on_load(record),
            BlockEvent::Set => h.on_set(record),
            BlockEvent::Unset => h.on_unset(record),
            BlockEvent::Unload => h.on_unload(record),
        }
    });
    registry
        .register(
            VoxelTypeDef::solid("torch")
                .with_solid(false)
                .with_transparency(Transparency::FullyTransparent)
                .with_handlers(handlers),
        )
        .unwrap();
    registry.register(VoxelTypeDef::solid("dirt")).unwrap();
    registry
}

pub struct Harness {
    pub registry: VoxelTypeRegistry,
    pub terrain: RecordingTerrain,
    pub objects: RecordingObjects,
    pub scheduler: RecordingScheduler,
    pub log: EventLog,
}

impl Harness {
    pub fn new() -> Self {
        let log = EventLog::default();
        Self {
            registry: test_registry(&log),
            terrain: RecordingTerrain::default(),
            objects: RecordingObjects::default(),
            scheduler: RecordingScheduler::default(),
            log,
        }
    }

    pub fn ctx(&mut self) -> ChunkContext<'_> {
        ChunkContext::new(
            &self.registry,
            &mut self.terrain,
            &mut self.objects,
            &mut self.scheduler,
        )
    }

    pub fn events(&self) -> Vec<(BlockEvent, WorldPos)> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.log.lock().unwrap().clear();
    }
}
