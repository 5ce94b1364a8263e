//! One cubical region of the voxel lattice and its bookkeeping.
//!
//! A [`Chunk`] owns a dense [`VoxelArray`] plus the state derived from it:
//! occupancy flags, dirty flags, the set of voxels with block handlers, and
//! the 3×3×3 neighbor slots. All mutation goes through [`Chunk::set`] (single
//! voxel) or [`Chunk::replace_voxels`] (whole array), which keep the derived
//! state consistent and talk to the collaborators in [`ChunkContext`].
//!
//! Neighbor slots hold lattice coordinates, not references. Whoever owns the
//! chunks (see [`ChunkStore`](crate::ChunkStore)) wires them and resolves
//! them when [`SetOutcome::neighbors_affected`] asks for cross-chunk
//! invalidation.

mod scan;

use std::any::Any;
use std::fmt;

use crate::coords::{ChunkCoord, LocalPos, WorldPos};
use crate::error::ChunkError;
use crate::handler_locations::HandlerLocations;
use crate::handlers::BlockEvent;
use crate::mesher::ChunkContext;
use crate::occupancy::Occupancy;
use crate::registry::{VoxelTypeId, VoxelTypeRegistry};
use crate::remesh::RemeshScheduler;
use crate::voxels::VoxelArray;

/// Number of slots in the 3×3×3 neighborhood.
const NEIGHBORHOOD: usize = 27;
/// Slot of offset `(0, 0, 0)`.
const CENTER: usize = 13;

/// Opaque data attached by collaborators.
pub type UserData = Box<dyn Any + Send + Sync>;

/// What a [`Chunk::set`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOutcome {
    /// The voxel value actually changed.
    pub changed: bool,
    /// A boundary voxel changed solidity or opacity, so every populated
    /// neighbor slot must be invalidated.
    pub neighbors_affected: bool,
}

/// Offsets of the 26 neighbor slots, excluding the center.
pub fn neighbor_offsets() -> impl Iterator<Item = (i64, i64, i64)> {
    (-1..=1i64).flat_map(|di| {
        (-1..=1i64).flat_map(move |dj| {
            (-1..=1i64)
                .map(move |dk| (di, dj, dk))
                .filter(|&o| o != (0, 0, 0))
        })
    })
}

fn neighbor_slot(di: i64, dj: i64, dk: i64) -> usize {
    debug_assert!((-1..=1).contains(&di) && (-1..=1).contains(&dj) && (-1..=1).contains(&dk));
    ((di + 1) * 9 + (dj + 1) * 3 + (dk + 1)) as usize
}

pub struct Chunk {
    request_id: u64,
    coord: ChunkCoord,
    size: usize,
    origin: WorldPos,
    voxels: VoxelArray,
    occupancy: Occupancy,
    terrain_dirty: bool,
    objects_dirty: bool,
    pending_remesh: bool,
    /// Flat 3×3×3 neighborhood; empty once disposed.
    neighbors: Vec<Option<ChunkCoord>>,
    handler_locations: HandlerLocations,
    times_meshed: u64,
    user_data: Option<UserData>,
    is_disposed: bool,
}

impl Chunk {
    /// Builds a chunk around `voxels`, notifies both meshers, and runs the
    /// initial scan.
    ///
    /// With `fill`, the whole array is overwritten with that ID first, which
    /// lets the scan classify each layer without visiting its voxels.
    pub fn new(
        ctx: &mut ChunkContext<'_>,
        request_id: u64,
        coord: ChunkCoord,
        mut voxels: VoxelArray,
        fill: Option<VoxelTypeId>,
    ) -> Self {
        let size = voxels.size();
        let mut occupancy = Occupancy::unknown(size);
        if let Some(id) = fill {
            voxels.fill(id);
            occupancy.seed_layers(Some(id));
        }

        let mut neighbors = vec![None; NEIGHBORHOOD];
        neighbors[CENTER] = Some(coord);

        let mut chunk = Self {
            request_id,
            coord,
            size,
            origin: coord.origin(size),
            voxels,
            occupancy,
            terrain_dirty: false,
            objects_dirty: false,
            pending_remesh: false,
            neighbors,
            handler_locations: HandlerLocations::new(),
            times_meshed: 0,
            user_data: None,
            is_disposed: false,
        };

        ctx.terrain.init_chunk(&chunk);
        ctx.objects.init_chunk(&chunk);
        chunk.scan_voxel_data(ctx);

        tracing::debug!(
            ?coord,
            request_id,
            size,
            full = chunk.is_full(),
            empty = chunk.is_empty(),
            handlers = chunk.handler_locations.len(),
            "chunk created"
        );
        chunk
    }

    /// Allocates an all-air voxel array for a chunk of the given size.
    pub fn create_voxel_array(size: usize) -> VoxelArray {
        VoxelArray::new(size)
    }

    /// Swaps in a new voxel array while keeping identity and neighbor wiring.
    ///
    /// Equivalent to disposing the old content and constructing the new one:
    /// unload events fire for the old handler voxels, both meshers are torn
    /// down and re-initialized, and a full scan classifies the new array.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] after disposal, or
    /// [`ChunkError::ArraySizeMismatch`] if `voxels` has a different size.
    pub fn replace_voxels(
        &mut self,
        ctx: &mut ChunkContext<'_>,
        mut voxels: VoxelArray,
        fill: Option<VoxelTypeId>,
    ) -> Result<(), ChunkError> {
        self.ensure_live()?;
        if voxels.size() != self.size {
            return Err(ChunkError::ArraySizeMismatch {
                expected: self.size * self.size * self.size,
                actual: voxels.len(),
            });
        }

        self.fire_all(ctx.registry, BlockEvent::Unload);
        ctx.objects.dispose_chunk(self);
        ctx.terrain.dispose_chunk(self);

        if let Some(id) = fill {
            voxels.fill(id);
        }
        self.voxels = voxels;
        self.terrain_dirty = false;
        self.objects_dirty = false;
        self.handler_locations.clear();
        ctx.objects.init_chunk(self);
        ctx.terrain.init_chunk(self);

        self.occupancy.seed_layers(fill);
        self.scan_voxel_data(ctx);

        tracing::debug!(coord = ?self.coord, "chunk voxel array replaced");
        Ok(())
    }

    /// Returns the voxel at `pos`, or air (with a warning) if disposed.
    pub fn get(&self, pos: LocalPos) -> VoxelTypeId {
        if self.is_disposed {
            tracing::warn!(coord = ?self.coord, ?pos, "read from disposed chunk");
            return VoxelTypeId::AIR;
        }
        self.voxels.get(pos)
    }

    pub fn get_solidity_at(&self, registry: &VoxelTypeRegistry, pos: LocalPos) -> bool {
        registry.is_solid(self.get(pos))
    }

    /// Writes one voxel and updates all derived state.
    ///
    /// Writing the value already present is a no-op. Otherwise this updates
    /// occupancy, fires unset/set handlers, informs the object mesher, marks
    /// the chunk dirty, and queues it for remeshing if it was not pending.
    /// Neighbor invalidation is reported through the returned [`SetOutcome`].
    ///
    /// Out-of-range `pos` is a caller bug (debug assertion / slice panic).
    pub fn set(
        &mut self,
        ctx: &mut ChunkContext<'_>,
        pos: LocalPos,
        new_id: VoxelTypeId,
    ) -> Result<SetOutcome, ChunkError> {
        self.ensure_live()?;

        let old_id = self.voxels.get(pos);
        if old_id == new_id {
            return Ok(SetOutcome::default());
        }

        let reg = ctx.registry;
        self.voxels.set(pos, new_id);
        self.occupancy.note_write(pos.j, new_id, reg.is_opaque(new_id));

        let world = self.origin.add_local(pos);
        if let Some(h) = reg.handlers(old_id) {
            h.call(BlockEvent::Unset, world);
        }
        match reg.handlers(new_id) {
            Some(h) => {
                h.call(BlockEvent::Set, world);
                self.handler_locations.insert(pos);
            }
            None => {
                self.handler_locations.remove(pos);
            }
        }

        let old_object = reg.is_object(old_id);
        let new_object = reg.is_object(new_id);
        if old_object {
            ctx.objects.set_object_block(self.coord, VoxelTypeId::AIR, pos);
        }
        if new_object {
            ctx.objects.set_object_block(self.coord, new_id, pos);
        }

        let solidity_changed = reg.is_solid(old_id) != reg.is_solid(new_id);
        let opacity_changed = reg.is_opaque(old_id) != reg.is_opaque(new_id);
        let was_terrain = !old_object && !old_id.is_air();
        let now_terrain = !new_object && !new_id.is_air();

        if old_object || new_object {
            self.objects_dirty = true;
        }
        if solidity_changed || opacity_changed || was_terrain || now_terrain {
            self.terrain_dirty = true;
        }
        self.queue_if_dirty(ctx.remesh);

        Ok(SetOutcome {
            changed: true,
            neighbors_affected: (solidity_changed || opacity_changed)
                && pos.is_on_face(self.size),
        })
    }

    /// Queues this chunk for remeshing if it is dirty and not yet pending.
    ///
    /// Returns `true` if a request was issued.
    pub fn queue_if_dirty(&mut self, scheduler: &mut dyn RemeshScheduler) -> bool {
        if self.is_disposed || self.pending_remesh || !(self.terrain_dirty || self.objects_dirty) {
            return false;
        }
        self.pending_remesh = true;
        scheduler.queue_chunk_for_remesh(self.coord);
        true
    }

    /// Called on a neighbor whose boundary voxel changed solidity or opacity.
    ///
    /// Marks the terrain dirty and queues the chunk unless a remesh is
    /// already pending. Returns `true` if a request was issued.
    pub fn invalidate_from_neighbor(&mut self, scheduler: &mut dyn RemeshScheduler) -> bool {
        if self.is_disposed {
            return false;
        }
        self.terrain_dirty = true;
        self.queue_if_dirty(scheduler)
    }

    /// Runs pending mesh rebuilds and clears `pending_remesh`.
    pub fn update_meshes(&mut self, ctx: &mut ChunkContext<'_>) -> Result<(), ChunkError> {
        self.ensure_live()?;
        if self.terrain_dirty {
            ctx.terrain.mesh_chunk(self);
            self.times_meshed += 1;
            self.terrain_dirty = false;
            tracing::trace!(coord = ?self.coord, times = self.times_meshed, "terrain meshed");
        }
        if self.objects_dirty {
            ctx.objects.build_object_meshes();
            self.objects_dirty = false;
        }
        self.pending_remesh = false;
        Ok(())
    }

    /// Fires unload handlers, releases mesher state and storage, and marks
    /// the chunk disposed. Terminal.
    pub fn dispose(&mut self, ctx: &mut ChunkContext<'_>) -> Result<(), ChunkError> {
        self.ensure_live()?;

        self.fire_all(ctx.registry, BlockEvent::Unload);
        self.handler_locations.clear();

        ctx.objects.dispose_chunk(self);
        ctx.terrain.dispose_chunk(self);

        self.voxels = VoxelArray::released();
        self.neighbors = Vec::new();
        self.occupancy.release();
        self.terrain_dirty = false;
        self.objects_dirty = false;
        self.pending_remesh = false;
        self.is_disposed = true;

        tracing::debug!(coord = ?self.coord, "chunk disposed");
        Ok(())
    }

    /// Fires `event` for every tracked handler voxel, using its current type.
    fn fire_all(&self, registry: &VoxelTypeRegistry, event: BlockEvent) {
        for pos in self.handler_locations.iter() {
            let id = self.voxels.get(pos);
            if let Some(h) = registry.handlers(id) {
                h.call(event, self.origin.add_local(pos));
            }
        }
    }

    fn ensure_live(&self) -> Result<(), ChunkError> {
        if self.is_disposed {
            tracing::warn!(coord = ?self.coord, "operation on disposed chunk");
            return Err(ChunkError::Disposed(self.coord));
        }
        Ok(())
    }

    // -- neighbor slots -----------------------------------------------------

    /// Coordinate bound at offset `(di, dj, dk)`, each in `-1..=1`.
    ///
    /// `(0, 0, 0)` is this chunk. Always `None` once disposed.
    pub fn neighbor(&self, di: i64, dj: i64, dk: i64) -> Option<ChunkCoord> {
        self.neighbors
            .get(neighbor_slot(di, dj, dk))
            .copied()
            .flatten()
    }

    /// Binds or clears the neighbor slot at `(di, dj, dk)`.
    ///
    /// The center slot is fixed and cannot be rebound.
    pub fn set_neighbor(&mut self, di: i64, dj: i64, dk: i64, neighbor: Option<ChunkCoord>) {
        let slot = neighbor_slot(di, dj, dk);
        if slot == CENTER {
            return;
        }
        if let Some(s) = self.neighbors.get_mut(slot) {
            *s = neighbor;
        }
    }

    /// Populated non-center neighbor slots.
    pub fn boundary_neighbors(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        neighbor_offsets().filter_map(|(di, dj, dk)| self.neighbor(di, dj, dk))
    }

    /// Number of populated non-center neighbor slots.
    pub fn neighbor_count(&self) -> usize {
        self.boundary_neighbors().count()
    }

    // -- accessors ----------------------------------------------------------

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// World position of local voxel `(0, 0, 0)`.
    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn voxels(&self) -> &VoxelArray {
        &self.voxels
    }

    pub fn is_full(&self) -> bool {
        self.occupancy.is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }

    /// Uniform voxel of horizontal layer `j`, or `None` if mixed.
    pub fn whole_layer_voxel(&self, j: usize) -> Option<VoxelTypeId> {
        self.occupancy.whole_layer_voxel(j)
    }

    pub fn is_terrain_dirty(&self) -> bool {
        self.terrain_dirty
    }

    pub fn is_objects_dirty(&self) -> bool {
        self.objects_dirty
    }

    pub fn is_pending_remesh(&self) -> bool {
        self.pending_remesh
    }

    pub fn handler_locations(&self) -> &HandlerLocations {
        &self.handler_locations
    }

    pub fn times_meshed(&self) -> u64 {
        self.times_meshed
    }

    pub fn is_disposed(&self) -> bool {
        self.is_disposed
    }

    pub fn user_data(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.user_data.as_deref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        self.user_data.as_deref_mut()
    }

    pub fn set_user_data(&mut self, data: UserData) -> Option<UserData> {
        self.user_data.replace(data)
    }

    pub fn take_user_data(&mut self) -> Option<UserData> {
        self.user_data.take()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("request_id", &self.request_id)
            .field("coord", &self.coord)
            .field("size", &self.size)
            .field("is_full", &self.is_full())
            .field("is_empty", &self.is_empty())
            .field("terrain_dirty", &self.terrain_dirty)
            .field("objects_dirty", &self.objects_dirty)
            .field("pending_remesh", &self.pending_remesh)
            .field("handlers", &self.handler_locations.len())
            .field("times_meshed", &self.times_meshed)
            .field("is_disposed", &self.is_disposed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DIRT, FLOWER, GLASS, Harness, STONE, TORCH};

    const ORIGIN: ChunkCoord = ChunkCoord::new(0, 0, 0);

    fn air_chunk(h: &mut Harness, size: usize) -> Chunk {
        Chunk::new(&mut h.ctx(), 1, ORIGIN, VoxelArray::new(size), Some(VoxelTypeId::AIR))
    }

    #[test]
    fn test_construction_notifies_meshers_before_scan() {
        let mut h = Harness::new();
        let mut voxels = VoxelArray::new(4);
        voxels.set(LocalPos::new(1, 1, 1), FLOWER);
        let chunk = Chunk::new(&mut h.ctx(), 7, ORIGIN, voxels, None);

        assert_eq!(chunk.request_id(), 7);
        assert_eq!(h.terrain.inits, vec![ORIGIN]);
        assert_eq!(h.objects.inits, vec![ORIGIN]);
        assert_eq!(h.objects.blocks, vec![(ORIGIN, FLOWER, LocalPos::new(1, 1, 1))]);
        assert!(chunk.is_objects_dirty());
        assert_eq!(chunk.neighbor(0, 0, 0), Some(ORIGIN));
        assert_eq!(chunk.neighbor_count(), 0);
        // Construction does not queue; the owner decides.
        assert!(h.scheduler.queued.is_empty());
        assert!(!chunk.is_pending_remesh());
    }

    #[test]
    fn test_set_into_air_chunk_scenario() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 16);
        assert!(chunk.is_empty());

        let outcome = chunk.set(&mut h.ctx(), LocalPos::new(0, 0, 0), DIRT).unwrap();
        assert!(outcome.changed);
        assert!(outcome.neighbors_affected);

        assert!(!chunk.is_empty());
        assert!(!chunk.is_full());
        assert!(chunk.is_terrain_dirty());
        assert!(chunk.is_pending_remesh());
        assert_eq!(h.scheduler.queued, vec![ORIGIN]);
        assert_eq!(chunk.whole_layer_voxel(0), None);
        assert_eq!(chunk.whole_layer_voxel(1), Some(VoxelTypeId::AIR));
    }

    #[test]
    fn test_same_id_write_is_strict_noop() {
        let mut h = Harness::new();
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, VoxelArray::new(4), Some(TORCH));
        chunk.update_meshes(&mut h.ctx()).unwrap();
        let events_before = h.events().len();

        let outcome = chunk.set(&mut h.ctx(), LocalPos::new(2, 2, 2), TORCH).unwrap();
        assert_eq!(outcome, SetOutcome::default());
        assert!(!chunk.is_terrain_dirty());
        assert!(!chunk.is_objects_dirty());
        assert!(!chunk.is_pending_remesh());
        assert!(h.scheduler.queued.is_empty());
        assert_eq!(h.events().len(), events_before);
    }

    #[test]
    fn test_non_opaque_write_breaks_full_chunk() {
        let mut h = Harness::new();
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, VoxelArray::new(8), Some(STONE));
        assert!(chunk.is_full());
        chunk.update_meshes(&mut h.ctx()).unwrap();
        assert!(!chunk.is_terrain_dirty());

        chunk.set(&mut h.ctx(), LocalPos::new(4, 4, 4), GLASS).unwrap();
        assert!(!chunk.is_full());
        assert!(chunk.is_terrain_dirty());
        assert_eq!(chunk.whole_layer_voxel(4), None);
        assert_eq!(chunk.whole_layer_voxel(3), Some(STONE));
    }

    #[test]
    fn test_flags_never_recover_incrementally() {
        let mut h = Harness::new();
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, VoxelArray::new(4), Some(STONE));
        let p = LocalPos::new(1, 1, 1);
        chunk.set(&mut h.ctx(), p, VoxelTypeId::AIR).unwrap();
        chunk.set(&mut h.ctx(), p, STONE).unwrap();
        // Content is all stone again, but only a scan may say so.
        assert!(!chunk.is_full());
        assert_eq!(chunk.whole_layer_voxel(1), None);
    }

    #[test]
    fn test_handler_voxel_set_then_clear() {
        let mut h = Harness::new();
        let mut chunk = Chunk::new(
            &mut h.ctx(),
            1,
            ChunkCoord::new(1, 0, -1),
            VoxelArray::new(4),
            None,
        );
        let p = LocalPos::new(1, 2, 3);
        let world = WorldPos::new(5, 2, -1);

        chunk.set(&mut h.ctx(), p, TORCH).unwrap();
        assert!(chunk.handler_locations().contains(p));
        assert_eq!(chunk.handler_locations().len(), 1);

        chunk.set(&mut h.ctx(), p, VoxelTypeId::AIR).unwrap();
        assert!(!chunk.handler_locations().contains(p));
        assert!(chunk.handler_locations().is_empty());

        assert_eq!(
            h.events(),
            vec![(BlockEvent::Set, world), (BlockEvent::Unset, world)]
        );
    }

    #[test]
    fn test_object_swap_notifies_object_mesher() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        let p = LocalPos::new(1, 1, 1);

        chunk.set(&mut h.ctx(), p, FLOWER).unwrap();
        assert!(chunk.is_objects_dirty());
        // Flower is not terrain and matches air's solidity and opacity.
        assert!(!chunk.is_terrain_dirty());

        chunk.set(&mut h.ctx(), p, VoxelTypeId::AIR).unwrap();
        assert_eq!(
            h.objects.blocks,
            vec![(ORIGIN, FLOWER, p), (ORIGIN, VoxelTypeId::AIR, p)]
        );
        // Still only queued once.
        assert_eq!(h.scheduler.queued, vec![ORIGIN]);
    }

    #[test]
    fn test_recolor_between_terrain_blocks_marks_terrain_only() {
        let mut h = Harness::new();
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, VoxelArray::new(4), Some(STONE));
        chunk.update_meshes(&mut h.ctx()).unwrap();

        let outcome = chunk.set(&mut h.ctx(), LocalPos::new(0, 1, 1), DIRT).unwrap();
        assert!(chunk.is_terrain_dirty());
        assert!(!chunk.is_objects_dirty());
        // Same solidity and opacity: no cross-chunk effect even on a face.
        assert!(!outcome.neighbors_affected);
    }

    #[test]
    fn test_interior_opacity_change_does_not_affect_neighbors() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 8);
        let outcome = chunk.set(&mut h.ctx(), LocalPos::new(3, 3, 3), STONE).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.neighbors_affected);
    }

    #[test]
    fn test_update_meshes_dispatch() {
        let mut h = Harness::new();
        let mut voxels = VoxelArray::new(4);
        voxels.set(LocalPos::new(0, 0, 0), STONE);
        voxels.set(LocalPos::new(3, 3, 3), FLOWER);
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, voxels, None);
        assert!(chunk.queue_if_dirty(h.ctx().remesh));
        assert!(!chunk.queue_if_dirty(h.ctx().remesh));

        chunk.update_meshes(&mut h.ctx()).unwrap();
        assert_eq!(chunk.times_meshed(), 1);
        assert_eq!(h.terrain.meshed, vec![ORIGIN]);
        assert_eq!(h.objects.builds, 1);
        assert!(!chunk.is_terrain_dirty());
        assert!(!chunk.is_objects_dirty());
        assert!(!chunk.is_pending_remesh());

        // Nothing dirty: no rebuild, but pending is still cleared.
        chunk.update_meshes(&mut h.ctx()).unwrap();
        assert_eq!(chunk.times_meshed(), 1);
        assert_eq!(h.objects.builds, 1);
    }

    #[test]
    fn test_invalidate_from_neighbor_respects_pending() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        assert!(chunk.invalidate_from_neighbor(h.ctx().remesh));
        assert!(chunk.is_terrain_dirty());
        assert!(chunk.is_pending_remesh());
        assert!(!chunk.invalidate_from_neighbor(h.ctx().remesh));
        assert_eq!(h.scheduler.queued, vec![ORIGIN]);
    }

    #[test]
    fn test_neighbor_invalidation_upgrades_object_only_pending() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        chunk.set(&mut h.ctx(), LocalPos::new(1, 1, 1), FLOWER).unwrap();
        assert!(chunk.is_pending_remesh());
        assert!(chunk.is_objects_dirty());
        assert!(!chunk.is_terrain_dirty());

        // Already pending, so no new request, but the terrain still rebuilds.
        assert!(!chunk.invalidate_from_neighbor(h.ctx().remesh));
        assert!(chunk.is_terrain_dirty());
        assert_eq!(h.scheduler.queued, vec![ORIGIN]);

        chunk.update_meshes(&mut h.ctx()).unwrap();
        assert_eq!(h.terrain.meshed, vec![ORIGIN]);
        assert_eq!(h.objects.builds, 1);
        assert_eq!(chunk.times_meshed(), 1);
    }

    #[test]
    fn test_dispose_fires_unload_once_per_handler() {
        let mut h = Harness::new();
        let mut voxels = VoxelArray::new(4);
        voxels.set(LocalPos::new(0, 0, 0), TORCH);
        voxels.set(LocalPos::new(3, 1, 2), TORCH);
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ORIGIN, voxels, None);
        h.clear_events();

        chunk.dispose(&mut h.ctx()).unwrap();

        let mut events = h.events();
        events.sort_by_key(|&(_, p)| p);
        assert_eq!(
            events,
            vec![
                (BlockEvent::Unload, WorldPos::new(0, 0, 0)),
                (BlockEvent::Unload, WorldPos::new(3, 1, 2)),
            ]
        );
        assert!(chunk.is_disposed());
        assert!(chunk.handler_locations().is_empty());
        assert!(chunk.voxels().is_empty());
        assert_eq!(chunk.neighbor(0, 0, 0), None);
        assert_eq!(h.objects.disposes, vec![ORIGIN]);
        assert_eq!(h.terrain.disposes, vec![ORIGIN]);
    }

    #[test]
    fn test_disposed_chunk_rejects_operations() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        chunk.dispose(&mut h.ctx()).unwrap();

        let err = chunk.set(&mut h.ctx(), LocalPos::new(0, 0, 0), STONE).unwrap_err();
        assert_eq!(err, ChunkError::Disposed(ORIGIN));
        assert!(chunk.update_meshes(&mut h.ctx()).is_err());
        assert!(chunk.dispose(&mut h.ctx()).is_err());
        assert!(chunk.replace_voxels(&mut h.ctx(), VoxelArray::new(4), None).is_err());
        assert_eq!(chunk.get(LocalPos::new(0, 0, 0)), VoxelTypeId::AIR);
        assert!(!chunk.invalidate_from_neighbor(h.ctx().remesh));
    }

    #[test]
    fn test_replace_voxels_reinitializes() {
        let mut h = Harness::new();
        let mut voxels = VoxelArray::new(4);
        voxels.set(LocalPos::new(1, 1, 1), TORCH);
        let mut chunk = Chunk::new(&mut h.ctx(), 1, ChunkCoord::new(0, 1, 0), voxels, None);
        chunk.set_neighbor(1, 0, 0, Some(ChunkCoord::new(1, 1, 0)));
        h.clear_events();

        let mut next = VoxelArray::new(4);
        next.set(LocalPos::new(2, 2, 2), TORCH);
        chunk.replace_voxels(&mut h.ctx(), next, None).unwrap();

        assert_eq!(
            h.events(),
            vec![
                (BlockEvent::Unload, WorldPos::new(1, 5, 1)),
                (BlockEvent::Load, WorldPos::new(2, 6, 2)),
            ]
        );
        assert_eq!(
            chunk.handler_locations().iter().collect::<Vec<_>>(),
            vec![LocalPos::new(2, 2, 2)]
        );
        assert_eq!(h.terrain.inits.len(), 2);
        assert_eq!(h.terrain.disposes.len(), 1);
        assert_eq!(h.objects.inits.len(), 2);
        assert_eq!(chunk.coord(), ChunkCoord::new(0, 1, 0));
        assert_eq!(chunk.neighbor(1, 0, 0), Some(ChunkCoord::new(1, 1, 0)));
    }

    #[test]
    fn test_replace_with_fill_rescans() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        chunk
            .replace_voxels(&mut h.ctx(), VoxelArray::new(4), Some(STONE))
            .unwrap();
        assert!(chunk.is_full());
        assert!(chunk.is_terrain_dirty());
        assert!((0..4).all(|j| chunk.whole_layer_voxel(j) == Some(STONE)));
        assert_eq!(chunk.get(LocalPos::new(3, 3, 3)), STONE);
    }

    #[test]
    fn test_replace_rejects_wrong_size() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 4);
        let err = chunk
            .replace_voxels(&mut h.ctx(), VoxelArray::new(2), None)
            .unwrap_err();
        assert_eq!(
            err,
            ChunkError::ArraySizeMismatch {
                expected: 64,
                actual: 8
            }
        );
    }

    #[test]
    fn test_user_data_slot() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 2);
        assert!(chunk.user_data().is_none());
        chunk.set_user_data(Box::new(42u32));
        assert_eq!(
            chunk.user_data().and_then(|d| d.downcast_ref::<u32>()),
            Some(&42)
        );
        assert!(chunk.take_user_data().is_some());
        assert!(chunk.user_data().is_none());
    }

    #[test]
    fn test_neighbor_offsets_cover_26_slots() {
        let offsets: Vec<_> = neighbor_offsets().collect();
        assert_eq!(offsets.len(), 26);
        assert!(!offsets.contains(&(0, 0, 0)));
        let mut slots: Vec<_> = offsets
            .iter()
            .map(|&(a, b, c)| neighbor_slot(a, b, c))
            .collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), 26);
    }

    #[test]
    fn test_center_slot_cannot_be_rebound() {
        let mut h = Harness::new();
        let mut chunk = air_chunk(&mut h, 2);
        chunk.set_neighbor(0, 0, 0, Some(ChunkCoord::new(9, 9, 9)));
        assert_eq!(chunk.neighbor(0, 0, 0), Some(ORIGIN));
    }
}
