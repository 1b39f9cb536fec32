//! In-process adapters.

mod in_memory_points_store;
mod row_locks;

pub use in_memory_points_store::{InMemoryPointsStore, InMemoryTransaction};
