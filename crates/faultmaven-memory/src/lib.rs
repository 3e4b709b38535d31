//! Hierarchical hot/warm/cold prompt memory (`spec.md` §4.4).

pub mod error;
pub mod manager;

pub use error::MemoryError;
pub use manager::{MemoryManager, HOT_WINDOW_TURNS};
