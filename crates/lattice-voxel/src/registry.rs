//! Voxel type registry: maps compact [`VoxelTypeId`] values to block metadata.
//!
//! The registry is built once during startup and then shared immutably with
//! every chunk. Air is always ID 0 so that zero-initialized voxel memory
//! represents empty space.
//!
//! Chunks never look at [`VoxelTypeDef`] directly on their hot paths. Instead
//! the registry keeps dense per-ID lookup tables (solidity, opacity, plain,
//! object-ness, handlers) that are filled in at registration time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handlers::BlockHandlers;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelTypeId(pub u16);

impl VoxelTypeId {
    /// The reserved empty voxel.
    pub const AIR: Self = Self(0);

    /// Returns `true` for [`VoxelTypeId::AIR`].
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Transparency mode for a voxel type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    /// Fully blocks visibility; neighbors' faces against it are culled.
    Opaque,
    /// Partially transparent (e.g. water, stained glass).
    SemiTransparent,
    /// Completely transparent (e.g. air).
    FullyTransparent,
}

/// Full descriptor for a voxel type.
#[derive(Clone, Debug)]
pub struct VoxelTypeDef {
    /// Human-readable name (e.g. "stone", "glass", "torch").
    pub name: String,
    /// Whether entities collide with this voxel.
    pub solid: bool,
    /// Transparency mode.
    pub transparency: Transparency,
    /// Rendered by the object mesher as an instance instead of terrain.
    pub object: bool,
    /// Optional load/set/unset/unload callbacks.
    pub handlers: Option<BlockHandlers>,
}

impl VoxelTypeDef {
    /// A solid, opaque terrain block with no handlers.
    pub fn solid(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: true,
            transparency: Transparency::Opaque,
            object: false,
            handlers: None,
        }
    }

    pub fn with_transparency(mut self, transparency: Transparency) -> Self {
        self.transparency = transparency;
        self
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn as_object(mut self) -> Self {
        self.object = true;
        self
    }

    pub fn with_handlers(mut self, handlers: BlockHandlers) -> Self {
        self.handlers = Some(handlers);
        self
    }

    fn is_opaque(&self) -> bool {
        self.transparency == Transparency::Opaque
    }

    /// Simple blocks that need no per-voxel bookkeeping beyond "present".
    fn is_plain(&self) -> bool {
        self.solid
            && self.is_opaque()
            && !self.object
            && self.handlers.as_ref().is_none_or(BlockHandlers::is_empty)
    }
}

/// Errors that can occur during voxel type registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A type with the same name has already been registered.
    #[error("duplicate voxel type name: {0}")]
    DuplicateName(String),
    /// All 65 535 user-defined slots have been consumed.
    #[error("voxel type registry is full (max 65536 types)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`VoxelTypeId`] → [`VoxelTypeDef`] with O(1) lookup tables by ID and
/// O(1) reverse lookup by name.
pub struct VoxelTypeRegistry {
    /// Dense array where `index == VoxelTypeId.0`.
    types: Vec<VoxelTypeDef>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, VoxelTypeId>,
    solidity: Vec<bool>,
    opacity: Vec<bool>,
    plain: Vec<bool>,
    object: Vec<bool>,
    handlers: Vec<Option<BlockHandlers>>,
}

impl VoxelTypeRegistry {
    /// Creates a new registry with Air pre-registered as ID 0.
    pub fn new() -> Self {
        let air = VoxelTypeDef {
            name: "air".to_string(),
            solid: false,
            transparency: Transparency::FullyTransparent,
            object: false,
            handlers: None,
        };

        let mut registry = Self {
            types: Vec::new(),
            name_to_id: HashMap::new(),
            solidity: Vec::new(),
            opacity: Vec::new(),
            plain: Vec::new(),
            object: Vec::new(),
            handlers: Vec::new(),
        };
        registry.push(air);
        registry
    }

    /// Registers a new voxel type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is Air).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a type with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all 65 536 slots
    /// are consumed.
    pub fn register(&mut self, def: VoxelTypeDef) -> Result<VoxelTypeId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.types.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }
        Ok(self.push(def))
    }

    fn push(&mut self, def: VoxelTypeDef) -> VoxelTypeId {
        let id = VoxelTypeId(self.types.len() as u16);
        self.solidity.push(def.solid);
        self.opacity.push(def.is_opaque());
        self.plain.push(def.is_plain());
        self.object.push(def.object);
        self.handlers
            .push(def.handlers.clone().filter(|h| !h.is_empty()));
        self.name_to_id.insert(def.name.clone(), id);
        self.types.push(def);
        id
    }

    /// Returns the definition for a given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range. IDs are only produced by the registry
    /// itself, so this indicates a programming error.
    pub fn get(&self, id: VoxelTypeId) -> &VoxelTypeDef {
        &self.types[id.0 as usize]
    }

    /// Returns the ID for a named voxel type, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<VoxelTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including Air).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if only Air is registered.
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 1
    }

    // Lookup tables. Unknown IDs answer like air.

    #[inline]
    pub fn is_solid(&self, id: VoxelTypeId) -> bool {
        self.solidity.get(id.0 as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_opaque(&self, id: VoxelTypeId) -> bool {
        self.opacity.get(id.0 as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_plain(&self, id: VoxelTypeId) -> bool {
        self.plain.get(id.0 as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_object(&self, id: VoxelTypeId) -> bool {
        self.object.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// Returns the handler record for `id`, or `None` if it has no callbacks.
    #[inline]
    pub fn handlers(&self, id: VoxelTypeId) -> Option<&BlockHandlers> {
        self.handlers.get(id.0 as usize).and_then(Option::as_ref)
    }
}

impl Default for VoxelTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
