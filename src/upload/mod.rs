//! Upload coordination module
//!
//! Publishes a change set to the remote store with bounded parallelism:
//! a pool of store connections, a worker pool of exactly N threads, and
//! best-effort per-task failure handling with aggregate results.

mod coordinator;
mod pool;

pub use coordinator::*;
pub use pool::*;
