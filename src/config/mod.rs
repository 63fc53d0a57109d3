//! Configuration module for PatchForge
//!
//! Provides CLI argument parsing and the immutable configuration values
//! passed into each component's constructor. There is no process-wide
//! configuration state.

mod settings;

pub use settings::*;
