//! Portico Store: in-memory collections, cascades and the network projection.

pub mod graph;
pub mod memory;
pub mod types;

pub use graph::NetworkGraph;
pub use memory::MemStore;
pub use types::*;
