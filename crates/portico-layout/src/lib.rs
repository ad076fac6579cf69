//! Portico Layout: the network view without a browser.
//!
//! Placement, a d3-compatible force simulation, drag/click/zoom handling,
//! persisted node positions and viewport, and the filter/search reduction.

pub mod config;
pub mod filter;
pub mod forces;
pub mod interaction;
pub mod placement;
pub mod positions;
pub mod session;
pub mod simulation;
pub mod storage;
pub mod types;
pub mod view;
pub mod viewport;

pub use config::LayoutConfig;
pub use filter::NetworkFilter;
pub use interaction::GraphEvent;
pub use positions::{PositionCache, PositionMap};
pub use session::SessionFlags;
pub use simulation::Simulation;
pub use storage::{FileStorage, LayoutError, LayoutStorage, MemoryStorage};
pub use types::{NodeKind, NodeState, Point, ZoomTransform};
pub use view::GraphView;
