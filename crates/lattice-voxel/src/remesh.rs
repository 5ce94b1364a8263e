//! Remesh scheduling.
//!
//! A chunk asks to be remeshed through [`RemeshScheduler`]; the owner later
//! calls [`Chunk::update_meshes`](crate::Chunk::update_meshes). Deduplication
//! is not the queue's job: a chunk only enqueues itself when its
//! `pending_remesh` flag was clear, and that flag stays set until the rebuild
//! has run.

use std::collections::VecDeque;

use crate::coords::ChunkCoord;

/// Accepts remesh requests for later processing.
pub trait RemeshScheduler {
    fn queue_chunk_for_remesh(&mut self, chunk: ChunkCoord);
}

/// FIFO remesh queue.
#[derive(Clone, Debug, Default)]
pub struct RemeshQueue {
    queue: VecDeque<ChunkCoord>,
}

impl RemeshQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the oldest request.
    pub fn pop(&mut self) -> Option<ChunkCoord> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, chunk: ChunkCoord) -> bool {
        self.queue.contains(&chunk)
    }

    /// Drops every request for `chunk` (e.g. when it is unloaded).
    pub fn remove(&mut self, chunk: ChunkCoord) -> usize {
        let before = self.queue.len();
        self.queue.retain(|&c| c != chunk);
        before - self.queue.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.queue.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.queue.drain(..)
    }
}

impl RemeshScheduler for RemeshQueue {
    fn queue_chunk_for_remesh(&mut self, chunk: ChunkCoord) {
        tracing::trace!(?chunk, "queued for remesh");
        self.queue.push_back(chunk);
    }
}
