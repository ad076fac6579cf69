//! Layout tuning constants.

use serde::{Deserialize, Serialize};

use crate::types::NodeKind;

/// Width and height halves of a node's drawn box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfExtent {
    pub w: f64,
    pub h: f64,
}

/// Everything the simulation, placement and viewport math is tuned by.
///
/// Forces only need the right relative magnitudes; the defaults reproduce
/// the reference look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub link_distance: f64,
    pub charge_hub: f64,
    pub charge_cluster: f64,
    pub charge_contact: f64,
    pub center_strength: f64,
    pub collide_hub: f64,
    pub collide_cluster: f64,
    pub collide_contact: f64,
    pub extent_hub: HalfExtent,
    pub extent_cluster: HalfExtent,
    pub extent_contact: HalfExtent,
    pub cluster_ring_radius: f64,
    pub contact_ring_radius: f64,
    pub pin_clusters: bool,

    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// Alpha target while a node is being dragged.
    pub drag_alpha_target: f64,

    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Scale change per wheel notch, applied as `factor` or `1/factor`.
    pub wheel_factor: f64,
    pub fit_padding: f64,
    pub fit_max_fraction: f64,
    /// Pointer travel (screen px) beyond which a press becomes a drag.
    pub click_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 150.0,
            charge_hub: -100.0,
            charge_cluster: -100.0,
            charge_contact: -400.0,
            center_strength: 0.1,
            collide_hub: 120.0,
            collide_cluster: 90.0,
            collide_contact: 85.0,
            extent_hub: HalfExtent { w: 100.0, h: 70.0 },
            extent_cluster: HalfExtent { w: 90.0, h: 60.0 },
            extent_contact: HalfExtent { w: 85.0, h: 55.0 },
            cluster_ring_radius: 250.0,
            contact_ring_radius: 450.0,
            pin_clusters: true,

            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001f64.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,

            min_zoom: 0.3,
            max_zoom: 3.0,
            zoom_in_factor: 1.3,
            zoom_out_factor: 0.7,
            wheel_factor: 1.1,
            fit_padding: 50.0,
            fit_max_fraction: 0.9,
            click_distance: 0.0,
        }
    }
}

impl LayoutConfig {
    pub fn charge(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Hub => self.charge_hub,
            NodeKind::Cluster => self.charge_cluster,
            NodeKind::Contact => self.charge_contact,
        }
    }

    pub fn collision_radius(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Hub => self.collide_hub,
            NodeKind::Cluster => self.collide_cluster,
            NodeKind::Contact => self.collide_contact,
        }
    }

    pub fn half_extent(&self, kind: NodeKind) -> HalfExtent {
        match kind {
            NodeKind::Hub => self.extent_hub,
            NodeKind::Cluster => self.extent_cluster,
            NodeKind::Contact => self.extent_contact,
        }
    }

    pub fn clamp_zoom(&self, k: f64) -> f64 {
        k.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_magnitudes() {
        let c = LayoutConfig::default();
        assert!(c.charge(NodeKind::Contact) < c.charge(NodeKind::Cluster));
        assert!(c.collision_radius(NodeKind::Hub) > c.collision_radius(NodeKind::Cluster));
        assert!(c.collision_radius(NodeKind::Cluster) > c.collision_radius(NodeKind::Contact));
        assert!(c.contact_ring_radius > c.cluster_ring_radius);
        // 300 ticks from alpha 1 down to alpha_min.
        let alpha = (1.0 - c.alpha_decay).powi(300);
        assert!((alpha - c.alpha_min).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_zoom() {
        let c = LayoutConfig::default();
        assert_eq!(c.clamp_zoom(10.0), 3.0);
        assert_eq!(c.clamp_zoom(0.01), 0.3);
        assert_eq!(c.clamp_zoom(1.2), 1.2);
    }
}
