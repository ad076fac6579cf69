//! Store-level value types.

use serde::{Deserialize, Serialize};

/// One of the clusters every fresh process starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCluster {
    pub name: &'static str,
    pub color: &'static str,
}

/// Seeded at boot with ids 1-4.
pub const DEFAULT_CLUSTERS: [SeedCluster; 4] = [
    SeedCluster {
        name: "Marketing",
        color: "rgba(173, 216, 230, 0.45)",
    },
    SeedCluster {
        name: "Finanzen",
        color: "rgba(144, 238, 144, 0.45)",
    },
    SeedCluster {
        name: "Technologie",
        color: "rgba(221, 160, 221, 0.45)",
    },
    SeedCluster {
        name: "Vertrieb",
        color: "rgba(255, 255, 224, 0.45)",
    },
];

/// Collection sizes plus the size of the projection graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub clusters: usize,
    pub contacts: usize,
    pub connections: usize,
    pub nodes: usize,
    pub links: usize,
}
