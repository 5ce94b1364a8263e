//! Chunk core for a voxel world: dense per-chunk storage, incremental dirty
//! tracking, cross-chunk invalidation, and block event hooks.
//!
//! Meshing, registry contents, and scheduling policy live elsewhere and are
//! reached through the traits in [`mesher`] and [`remesh`].

pub mod chunk;
pub mod coords;
pub mod error;
pub mod handler_locations;
pub mod handlers;
pub mod mesher;
pub mod occupancy;
pub mod registry;
pub mod remesh;
pub mod store;
pub mod voxels;

#[cfg(test)]
pub(crate) mod test_support;

pub use chunk::{Chunk, SetOutcome, UserData, neighbor_offsets};
pub use coords::{ChunkCoord, LocalPos, WorldPos};
pub use error::ChunkError;
pub use handler_locations::HandlerLocations;
pub use handlers::{BlockEvent, BlockHandlers, HandlerFn};
pub use mesher::{ChunkContext, ObjectMesher, TerrainMesher};
pub use registry::{RegistryError, Transparency, VoxelTypeDef, VoxelTypeId, VoxelTypeRegistry};
pub use remesh::{RemeshQueue, RemeshScheduler};
pub use store::ChunkStore;
pub use voxels::VoxelArray;
