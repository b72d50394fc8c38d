//! Command-line interface for select-forge.
//!
//! Provides commands for running selections on candidate files, trying the
//! pipeline on synthetic pools, and inspecting presets.

mod commands;
mod demo;

pub use commands::{parse_cli, resolve_config, run_with_cli, Cli, Commands, ConfigArgs};
pub use demo::generate_demo_pool;
