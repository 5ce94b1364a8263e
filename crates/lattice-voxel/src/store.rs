//! Central owner for all loaded chunks, keyed by [`ChunkCoord`].
//!
//! The [`ChunkStore`] is the arena that [`Chunk`]'s neighbor slots point
//! into. It wires the 26 slots symmetrically when a chunk is inserted, clears
//! them when it is removed, and resolves them when a boundary edit must
//! invalidate adjacent chunks. It also owns the [`RemeshQueue`] and the two
//! meshers, and drains the queue on request.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::chunk::{Chunk, SetOutcome, UserData, neighbor_offsets};
use crate::coords::{ChunkCoord, LocalPos, WorldPos};
use crate::error::ChunkError;
use crate::mesher::{ChunkContext, ObjectMesher, TerrainMesher};
use crate::registry::{VoxelTypeId, VoxelTypeRegistry};
use crate::remesh::RemeshQueue;
use crate::voxels::VoxelArray;

pub struct ChunkStore<T, O> {
    registry: Arc<VoxelTypeRegistry>,
    chunk_size: usize,
    chunks: FxHashMap<ChunkCoord, Chunk>,
    remesh: RemeshQueue,
    terrain: T,
    objects: O,
}

impl<T: TerrainMesher, O: ObjectMesher> ChunkStore<T, O> {
    /// Creates an empty store for chunks of `chunk_size³` voxels.
    pub fn new(registry: Arc<VoxelTypeRegistry>, chunk_size: usize, terrain: T, objects: O) -> Self {
        Self {
            registry,
            chunk_size,
            chunks: FxHashMap::default(),
            remesh: RemeshQueue::new(),
            terrain,
            objects,
        }
    }

    /// Splits the store into the chunk map and a context over everything else.
    fn parts(&mut self) -> (&mut FxHashMap<ChunkCoord, Chunk>, ChunkContext<'_>) {
        let ctx = ChunkContext::new(
            &self.registry,
            &mut self.terrain,
            &mut self.objects,
            &mut self.remesh,
        );
        (&mut self.chunks, ctx)
    }

    /// Constructs a chunk at `coord`, wires it to its loaded neighbors, and
    /// queues its first mesh build if it has any content.
    ///
    /// # Errors
    ///
    /// [`ChunkError::AlreadyLoaded`] if `coord` is occupied, or
    /// [`ChunkError::ArraySizeMismatch`] if `voxels` is not `chunk_size³`.
    pub fn insert_chunk(
        &mut self,
        coord: ChunkCoord,
        request_id: u64,
        voxels: VoxelArray,
        fill: Option<VoxelTypeId>,
    ) -> Result<(), ChunkError> {
        if self.chunks.contains_key(&coord) {
            return Err(ChunkError::AlreadyLoaded(coord));
        }
        if voxels.size() != self.chunk_size {
            return Err(ChunkError::ArraySizeMismatch {
                expected: self.chunk_size.pow(3),
                actual: voxels.len(),
            });
        }

        let (chunks, mut ctx) = self.parts();
        let mut chunk = Chunk::new(&mut ctx, request_id, coord, voxels, fill);

        for (di, dj, dk) in neighbor_offsets() {
            let other = coord.offset(di, dj, dk);
            if let Some(nab) = chunks.get_mut(&other) {
                nab.set_neighbor(-di, -dj, -dk, Some(coord));
                chunk.set_neighbor(di, dj, dk, Some(other));
            }
        }

        chunk.queue_if_dirty(ctx.remesh);
        tracing::debug!(?coord, neighbors = chunk.neighbor_count(), "chunk inserted");
        chunks.insert(coord, chunk);
        Ok(())
    }

    /// Unwires, disposes, and returns the chunk at `coord`.
    ///
    /// Pending remesh requests for it are dropped. A chunk that is already
    /// disposed is unwired and returned without a second dispose.
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> Result<Chunk, ChunkError> {
        let (chunks, mut ctx) = self.parts();
        let mut chunk = chunks.remove(&coord).ok_or(ChunkError::NotLoaded(coord))?;

        // Disposal drops the slots, so unwire from the neighbors' side.
        for (di, dj, dk) in neighbor_offsets() {
            if let Some(nab) = chunks.get_mut(&coord.offset(di, dj, dk)) {
                nab.set_neighbor(-di, -dj, -dk, None);
            }
        }
        if !chunk.is_disposed() {
            chunk.dispose(&mut ctx)?;
        }

        self.remesh.remove(coord);
        tracing::debug!(?coord, "chunk removed");
        Ok(chunk)
    }

    /// Swaps in a new voxel array for a loaded chunk and queues a rebuild.
    pub fn replace_chunk_voxels(
        &mut self,
        coord: ChunkCoord,
        voxels: VoxelArray,
        fill: Option<VoxelTypeId>,
    ) -> Result<(), ChunkError> {
        let (chunks, mut ctx) = self.parts();
        let chunk = chunks.get_mut(&coord).ok_or(ChunkError::NotLoaded(coord))?;
        chunk.replace_voxels(&mut ctx, voxels, fill)?;
        chunk.queue_if_dirty(ctx.remesh);
        Ok(())
    }

    /// Writes one voxel and invalidates neighbors when the chunk asks for it.
    pub fn set_voxel(
        &mut self,
        coord: ChunkCoord,
        pos: LocalPos,
        id: VoxelTypeId,
    ) -> Result<SetOutcome, ChunkError> {
        let (chunks, mut ctx) = self.parts();
        let chunk = chunks.get_mut(&coord).ok_or(ChunkError::NotLoaded(coord))?;
        let outcome = chunk.set(&mut ctx, pos, id)?;

        if outcome.neighbors_affected {
            let neighbors: Vec<ChunkCoord> = chunk.boundary_neighbors().collect();
            for other in neighbors {
                if let Some(nab) = chunks.get_mut(&other) {
                    nab.invalidate_from_neighbor(ctx.remesh);
                }
            }
        }
        Ok(outcome)
    }

    /// Writes the voxel at an absolute world position.
    pub fn set_block(&mut self, pos: WorldPos, id: VoxelTypeId) -> Result<SetOutcome, ChunkError> {
        let coord = ChunkCoord::containing(pos, self.chunk_size);
        self.set_voxel(coord, pos.local_in(self.chunk_size), id)
    }

    /// Reads the voxel at an absolute world position, `None` if unloaded.
    pub fn get_block(&self, pos: WorldPos) -> Option<VoxelTypeId> {
        let coord = ChunkCoord::containing(pos, self.chunk_size);
        self.chunks
            .get(&coord)
            .map(|c| c.get(pos.local_in(self.chunk_size)))
    }

    /// Runs `update_meshes` for up to `budget` queued chunks.
    ///
    /// Requests for chunks that are gone or no longer pending are skipped
    /// without counting against the budget. Returns the number of chunks
    /// processed.
    pub fn process_remesh_queue(&mut self, budget: usize) -> usize {
        let mut processed = 0;
        while processed < budget {
            let Some(coord) = self.remesh.pop() else {
                break;
            };
            let (chunks, mut ctx) = self.parts();
            let Some(chunk) = chunks.get_mut(&coord) else {
                continue;
            };
            if !chunk.is_pending_remesh() {
                continue;
            }
            match chunk.update_meshes(&mut ctx) {
                Ok(()) => processed += 1,
                Err(e) => tracing::warn!(?coord, error = %e, "remesh skipped"),
            }
        }
        if processed > 0 {
            tracing::trace!(processed, remaining = self.remesh.len(), "remesh pass");
        }
        processed
    }

    /// Immutable access to a loaded chunk.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Collaborator data attached to a loaded chunk.
    pub fn user_data_mut(&mut self, coord: ChunkCoord) -> Option<&mut (dyn Any + Send + Sync)> {
        self.chunks.get_mut(&coord)?.user_data_mut()
    }

    /// Attaches collaborator data to a loaded chunk, returning the previous value.
    ///
    /// Hands `data` back as the error if `coord` is not loaded.
    pub fn set_user_data(
        &mut self,
        coord: ChunkCoord,
        data: UserData,
    ) -> Result<Option<UserData>, UserData> {
        match self.chunks.get_mut(&coord) {
            Some(chunk) => Ok(chunk.set_user_data(data)),
            None => Err(data),
        }
    }

    /// Number of currently loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over all loaded chunk coordinates.
    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Iterates over all loaded `(coord, chunk)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    pub fn queue(&self) -> &RemeshQueue {
        &self.remesh
    }

    pub fn terrain_mesher(&self) -> &T {
        &self.terrain
    }

    pub fn object_mesher(&self) -> &O {
        &self.objects
    }

    pub fn registry(&self) -> &Arc<VoxelTypeRegistry> {
        &self.registry
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
