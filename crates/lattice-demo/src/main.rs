//! Headless demo that drives a small chunk world through a scripted session.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p lattice-demo -- --chunk-size 16 --remesh-budget 4`.

mod meshers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use lattice_config::{CliArgs, Config};
use lattice_voxel::{
    BlockHandlers, ChunkCoord, ChunkError, ChunkStore, LocalPos, Transparency, VoxelArray,
    VoxelTypeDef, VoxelTypeId, VoxelTypeRegistry, WorldPos,
};
use tracing::{info, warn};

use crate::meshers::{CountingTerrainMesher, InstanceMesher};

type DemoStore = ChunkStore<CountingTerrainMesher, InstanceMesher>;

struct Palette {
    stone: VoxelTypeId,
    glass: VoxelTypeId,
    torch: VoxelTypeId,
    flower: VoxelTypeId,
}

/// Live torch count, maintained by the torch's block handlers.
static LIT_TORCHES: AtomicUsize = AtomicUsize::new(0);

fn build_registry() -> (VoxelTypeRegistry, Palette) {
    let mut registry = VoxelTypeRegistry::new();

    let torch_handlers = BlockHandlers::new()
        .on_load(|pos| {
            LIT_TORCHES.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?pos, "torch loaded");
        })
        .on_set(|pos| {
            LIT_TORCHES.fetch_add(1, Ordering::Relaxed);
            info!(?pos, "torch placed");
        })
        .on_unset(|pos| {
            LIT_TORCHES.fetch_sub(1, Ordering::Relaxed);
            info!(?pos, "torch removed");
        })
        .on_unload(|pos| {
            LIT_TORCHES.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!(?pos, "torch unloaded");
        });

    let defs = [
        VoxelTypeDef::solid("stone"),
        VoxelTypeDef::solid("glass").with_transparency(Transparency::SemiTransparent),
        VoxelTypeDef::solid("torch")
            .with_solid(false)
            .with_transparency(Transparency::FullyTransparent)
            .with_handlers(torch_handlers),
        VoxelTypeDef::solid("flower")
            .with_solid(false)
            .with_transparency(Transparency::FullyTransparent)
            .as_object(),
    ];
    let mut ids = Vec::with_capacity(defs.len());
    for def in defs {
        let name = def.name.clone();
        match registry.register(def) {
            Ok(id) => ids.push(id),
            Err(e) => warn!(%name, error = %e, "failed to register voxel type"),
        }
    }

    let lookup = |name: &str| registry.lookup_by_name(name).unwrap_or(VoxelTypeId::AIR);
    let palette = Palette {
        stone: lookup("stone"),
        glass: lookup("glass"),
        torch: lookup("torch"),
        flower: lookup("flower"),
    };
    info!(types = registry.len(), registered = ids.len(), "voxel registry ready");
    (registry, palette)
}

/// Terrain for one chunk: solid below the world origin, a stone floor with a
/// flower and a torch in the origin layer, air above.
fn generate(coord: ChunkCoord, size: usize, p: &Palette) -> (VoxelArray, Option<VoxelTypeId>) {
    match coord.j {
        j if j < 0 => (VoxelArray::filled(size, p.stone), Some(p.stone)),
        j if j > 0 => (VoxelArray::new(size), Some(VoxelTypeId::AIR)),
        _ => {
            let mut voxels = VoxelArray::new(size);
            for i in 0..size {
                for k in 0..size {
                    voxels.set(LocalPos::new(i, 0, k), p.stone);
                }
            }
            if size > 2 {
                voxels.set(LocalPos::new(size / 2, 1, size / 2), p.flower);
                voxels.set(LocalPos::new(1, 1, 1), p.torch);
            }
            (voxels, None)
        }
    }
}

fn preload(store: &mut DemoStore, radius: i64, p: &Palette) -> Result<(), ChunkError> {
    let size = store.chunk_size();
    let mut request_id = 0;
    for i in -radius..=radius {
        for j in -radius..=radius {
            for k in -radius..=radius {
                let coord = ChunkCoord::new(i, j, k);
                let (voxels, fill) = generate(coord, size, p);
                store.insert_chunk(coord, request_id, voxels, fill)?;
                request_id += 1;
            }
        }
    }
    info!(
        loaded = store.loaded_count(),
        queued = store.queue().len(),
        "preload complete"
    );
    Ok(())
}

/// A handful of edits across chunk faces and interiors.
fn scripted_edits(store: &mut DemoStore, p: &Palette) -> Result<(), ChunkError> {
    let size = store.chunk_size() as i64;
    let edits = [
        // A glass window on the face shared by two chunks.
        (WorldPos::new(size - 1, 2, 3), p.glass),
        (WorldPos::new(size, 2, 3), p.glass),
        // Dig into the solid layer below.
        (WorldPos::new(4, -1, 4), VoxelTypeId::AIR),
        // Interior decoration.
        (WorldPos::new(size / 2, 2, size / 2), p.torch),
        (WorldPos::new(size / 2 + 1, 1, size / 2), p.flower),
        // Replace the generated torch with stone.
        (WorldPos::new(1, 1, 1), p.stone),
    ];
    for (pos, id) in edits {
        let outcome = match store.set_block(pos, id) {
            Ok(outcome) => outcome,
            Err(ChunkError::NotLoaded(coord)) => {
                warn!(?pos, ?coord, "edit outside loaded area");
                continue;
            }
            Err(e) => return Err(e),
        };
        info!(
            ?pos,
            id = id.0,
            changed = outcome.changed,
            neighbors = outcome.neighbors_affected,
            queued = store.queue().len(),
            "edit"
        );
    }
    Ok(())
}

fn drain(store: &mut DemoStore, budget: usize) -> usize {
    let mut ticks = 0;
    while !store.queue().is_empty() {
        let processed = store.process_remesh_queue(budget.max(1));
        ticks += 1;
        info!(tick = ticks, processed, remaining = store.queue().len(), "remesh tick");
    }
    ticks
}

fn log_chunk_stats(store: &DemoStore) {
    let mut coords: Vec<ChunkCoord> = store.coords().copied().collect();
    coords.sort_by_key(|c| (c.j, c.i, c.k));
    for coord in coords {
        let Some(chunk) = store.chunk(coord) else {
            continue;
        };
        info!(
            ?coord,
            full = chunk.is_full(),
            empty = chunk.is_empty(),
            handlers = chunk.handler_locations().len(),
            meshed = chunk.times_meshed(),
            opaque = store.terrain_mesher().opaque_count(coord),
            "chunk"
        );
    }
}

fn run(config: &Config) -> Result<(), ChunkError> {
    if config.chunk.size == 0 {
        warn!("chunk size is zero, nothing to do");
        return Ok(());
    }
    let (registry, palette) = build_registry();
    let registry = Arc::new(registry);
    let mut store = ChunkStore::new(
        Arc::clone(&registry),
        config.chunk.size,
        CountingTerrainMesher::new(Arc::clone(&registry)),
        InstanceMesher::default(),
    );

    preload(&mut store, config.chunk.preload_radius.max(0), &palette)?;
    let ticks = drain(&mut store, config.chunk.remesh_budget);
    info!(ticks, "initial meshing done");

    scripted_edits(&mut store, &palette)?;
    let ticks = drain(&mut store, config.chunk.remesh_budget);
    info!(ticks, "edit meshing done");

    if config.debug.log_chunk_stats {
        log_chunk_stats(&store);
    }

    if config.chunk.preload_radius > 0 {
        store.remove_chunk(ChunkCoord::new(0, config.chunk.preload_radius, 0))?;
    }
    let origin = store.remove_chunk(ChunkCoord::new(0, 0, 0))?;
    info!(coord = ?origin.coord(), disposed = origin.is_disposed(), "origin chunk unloaded");

    info!(
        loaded = store.loaded_count(),
        terrain_rebuilds = store.terrain_mesher().rebuilds,
        object_batches = store.object_mesher().batches_built,
        instances = store.object_mesher().instance_count(),
        lit_torches = LIT_TORCHES.load(Ordering::Relaxed),
        "session finished"
    );
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("lattice")
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    lattice_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        chunk_size = config.chunk.size,
        remesh_budget = config.chunk.remesh_budget,
        preload_radius = config.chunk.preload_radius,
        "lattice demo starting"
    );

    if let Err(e) = run(&config) {
        tracing::error!(error = %e, "demo session failed");
        std::process::exit(1);
    }
}
