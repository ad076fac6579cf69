//! Geometry and node classification shared by the layout modules.

use serde::{Deserialize, Serialize};

use portico_core::{EntityKind, NetworkNode};

/// Layout role of a node. The hub is the one node the view always pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Hub,
    Cluster,
    Contact,
}

impl NodeKind {
    pub fn of(node: &NetworkNode) -> Self {
        if node.is_hub() {
            Self::Hub
        } else {
            match node.node_type {
                EntityKind::Cluster => Self::Cluster,
                EntityKind::Contact => Self::Contact,
            }
        }
    }
}

/// Interaction state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Position governed by the simulation.
    Free,
    /// Pinned to the pointer.
    Dragging,
    /// Fixed until the stored position is forgotten.
    Pinned,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pan/zoom transform: `screen = graph * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn screen_to_graph(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    pub fn graph_to_screen(&self, graph: Point) -> Point {
        Point::new(graph.x * self.k + self.x, graph.y * self.k + self.y)
    }

    /// Usable as a view transform: finite and positively scaled.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite() && self.k > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_inverse() {
        let t = ZoomTransform {
            x: 40.0,
            y: -10.0,
            k: 2.0,
        };
        let p = Point::new(12.5, 7.0);
        let back = t.screen_to_graph(t.graph_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
        assert!(!ZoomTransform { k: 0.0, ..t }.is_valid());
    }

    #[test]
    fn test_node_kind() {
        assert_eq!(NodeKind::of(&NetworkNode::hub()), NodeKind::Hub);
    }
}
