//! Version bookkeeping module
//!
//! Tracks the two-part publish version across runs. The persisted
//! version file is the only local state that survives a run.

mod store;

pub use store::*;
