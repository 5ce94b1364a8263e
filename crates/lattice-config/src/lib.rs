//! Configuration for the lattice chunk runtime.
//!
//! Settings persist to disk as `config.ron`, accept CLI overrides via clap,
//! and tolerate missing or unknown fields so old files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{ChunkConfig, Config, DebugConfig};
pub use error::ConfigError;
