//! Host system queries.

pub mod memory;

pub use memory::{DEFAULT_MEMORY_FRACTION, detect_available_memory, memory_budget};
