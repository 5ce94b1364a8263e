//! Full classification pass over a chunk's voxels.
//!
//! Runs once at construction and once per voxel-array replacement. This is
//! the only code that can set `is_full`/`is_empty` to `true` or derive a
//! whole-layer value from scratch.

use super::Chunk;
use crate::coords::LocalPos;
use crate::handlers::BlockEvent;
use crate::mesher::ChunkContext;
use crate::occupancy::{Occupancy, ScanSummary};

impl Chunk {
    /// Classifies every voxel, registers object blocks and handler voxels,
    /// and recomputes occupancy and terrain dirtiness.
    ///
    /// Layers whose occupancy hint already names a uniform ID (seeded when
    /// the array was just filled) are classified without visiting their
    /// voxels, as long as that ID needs no per-voxel registration.
    pub(super) fn scan_voxel_data(&mut self, ctx: &mut ChunkContext<'_>) {
        let reg = ctx.registry;
        let size = self.size;

        let mut fully_opaque = true;
        let mut fully_air = true;
        let mut layers = Vec::with_capacity(size);

        for j in 0..size {
            let hinted = self
                .occupancy
                .whole_layer_voxel(j)
                .filter(|&id| !reg.is_object(id) && reg.handlers(id).is_none());
            if let Some(id) = hinted {
                if id.is_air() {
                    fully_opaque = false;
                } else {
                    fully_air = false;
                    fully_opaque &= reg.is_opaque(id);
                }
                layers.push(Some(id));
                continue;
            }

            let constant = self.voxels.get(LocalPos::new(0, j, 0));
            let mut layer_const = true;

            for i in 0..size {
                let base = self.voxels.index(i, j, 0);
                for k in 0..size {
                    let id = self.voxels.as_slice()[base + k];
                    if layer_const && id != constant {
                        layer_const = false;
                    }

                    if id.is_air() {
                        fully_opaque = false;
                        continue;
                    }
                    fully_air = false;
                    if reg.is_plain(id) {
                        continue;
                    }
                    fully_opaque &= reg.is_opaque(id);

                    let pos = LocalPos::new(i, j, k);
                    if reg.is_object(id) {
                        ctx.objects.set_object_block(self.coord, id, pos);
                        self.objects_dirty = true;
                    }
                    if let Some(h) = reg.handlers(id) {
                        self.handler_locations.insert(pos);
                        h.call(BlockEvent::Load, self.origin.add_local(pos));
                    }
                }
            }

            layers.push(layer_const.then_some(constant));
        }

        self.occupancy = Occupancy::from_scan(ScanSummary {
            fully_opaque,
            fully_air,
            layers,
        });
        // Any terrain at all needs an initial mesh build.
        self.terrain_dirty = !self.occupancy.is_empty();
    }
}
