//! Per-block-type event callbacks.
//!
//! A voxel type may register up to four callbacks that fire when a voxel of
//! that type is loaded, placed, removed, or unloaded. Callbacks receive the
//! absolute [`WorldPos`] of the voxel and nothing else, so they cannot reach
//! back into the chunk that is firing them.

use std::fmt;
use std::sync::Arc;

use crate::coords::WorldPos;

/// Callback signature shared by all four handler slots.
pub type HandlerFn = Arc<dyn Fn(WorldPos) + Send + Sync>;

/// Which lifecycle moment a handler is being fired for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockEvent {
    /// The voxel became live because its chunk was scanned.
    Load,
    /// The voxel was written by `set`.
    Set,
    /// The voxel was overwritten by `set`.
    Unset,
    /// The voxel's chunk is being disposed or replaced.
    Unload,
}

/// Optional callbacks for a voxel type.
#[derive(Clone, Default)]
pub struct BlockHandlers {
    on_load: Option<HandlerFn>,
    on_set: Option<HandlerFn>,
    on_unset: Option<HandlerFn>,
    on_unload: Option<HandlerFn>,
}

impl BlockHandlers {
    /// Creates an empty handler set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, f: impl Fn(WorldPos) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Arc::new(f));
        self
    }

    pub fn on_set(mut self, f: impl Fn(WorldPos) + Send + Sync + 'static) -> Self {
        self.on_set = Some(Arc::new(f));
        self
    }

    pub fn on_unset(mut self, f: impl Fn(WorldPos) + Send + Sync + 'static) -> Self {
        self.on_unset = Some(Arc::new(f));
        self
    }

    pub fn on_unload(mut self, f: impl Fn(WorldPos) + Send + Sync + 'static) -> Self {
        self.on_unload = Some(Arc::new(f));
        self
    }

    /// Returns the callback registered for `event`, if any.
    pub fn get(&self, event: BlockEvent) -> Option<&HandlerFn> {
        match event {
            BlockEvent::Load => self.on_load.as_ref(),
            BlockEvent::Set => self.on_set.as_ref(),
            BlockEvent::Unset => self.on_unset.as_ref(),
            BlockEvent::Unload => self.on_unload.as_ref(),
        }
    }

    /// Fires the callback for `event` at `pos`. Absent slots are skipped.
    pub fn call(&self, event: BlockEvent, pos: WorldPos) {
        if let Some(f) = self.get(event) {
            f(pos);
        }
    }

    /// Returns `true` if no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.on_load.is_none()
            && self.on_set.is_none()
            && self.on_unset.is_none()
            && self.on_unload.is_none()
    }
}

impl fmt::Debug for BlockHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHandlers")
            .field("on_load", &self.on_load.is_some())
            .field("on_set", &self.on_set.is_some())
            .field("on_unset", &self.on_unset.is_some())
            .field("on_unload", &self.on_unload.is_some())
            .finish()
    }
}
