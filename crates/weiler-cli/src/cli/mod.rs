//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `clip` - Intersect a subject polygon with a clipper
//! - `benchmark` - Time clipping on random star polygons

pub mod common;
pub mod error;
pub mod job;
pub mod render;
pub mod clip;
pub mod benchmark;

pub use clip::cmd_clip;
pub use benchmark::cmd_benchmark;
pub use error::CliError;
