//! Initial node placement.
//!
//! Clusters sit on a ring around the hub at equal angles; each contact
//! shares its cluster's angular sector with its siblings on a wider ring.
//! Saved positions win over both.

use std::collections::HashMap;
use std::f64::consts::PI;

use portico_core::NetworkData;

use crate::config::LayoutConfig;
use crate::positions::PositionMap;
use crate::types::{NodeKind, Point};

/// Where a node starts and whether it starts pinned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub pinned: bool,
}

const PHYLLOTAXIS_RADIUS: f64 = 10.0;

/// d3's default spot for the `i`-th node without a position.
fn phyllotaxis(center: Point, i: usize) -> Point {
    let angle = PI * (3.0 - 5f64.sqrt());
    let r = PHYLLOTAXIS_RADIUS * (0.5 + i as f64).sqrt();
    let a = i as f64 * angle;
    Point::new(center.x + r * a.cos(), center.y + r * a.sin())
}

fn on_ring(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Static sector-based radial layout of every node, in node order.
///
/// Pure: ignores saved positions. Used to seed the simulation and as the
/// fallback when no simulation runs.
pub fn sector_layout(
    data: &NetworkData,
    width: f64,
    height: f64,
    config: &LayoutConfig,
) -> Vec<(String, Point)> {
    let center = Point::new(width / 2.0, height / 2.0);

    let clusters: Vec<i64> = data
        .nodes
        .iter()
        .filter(|n| NodeKind::of(n) == NodeKind::Cluster)
        .filter_map(|n| n.original_id)
        .collect();
    let sector = if clusters.is_empty() {
        2.0 * PI
    } else {
        2.0 * PI / clusters.len() as f64
    };
    let cluster_angle: HashMap<i64, f64> = clusters
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as f64 * sector))
        .collect();

    let mut siblings: HashMap<i64, usize> = HashMap::new();
    for node in &data.nodes {
        if NodeKind::of(node) == NodeKind::Contact {
            if let Some(cid) = node.cluster_id {
                *siblings.entry(cid).or_insert(0) += 1;
            }
        }
    }

    let mut seen: HashMap<i64, usize> = HashMap::new();
    let mut orphans = 0usize;
    data.nodes
        .iter()
        .map(|node| {
            let pos = match NodeKind::of(node) {
                NodeKind::Hub => center,
                NodeKind::Cluster => match node.original_id.and_then(|id| cluster_angle.get(&id)) {
                    Some(&angle) => on_ring(center, config.cluster_ring_radius, angle),
                    None => {
                        orphans += 1;
                        phyllotaxis(center, orphans - 1)
                    }
                },
                NodeKind::Contact => {
                    let angle = node
                        .cluster_id
                        .and_then(|cid| cluster_angle.get(&cid).map(|a| (cid, *a)));
                    match angle {
                        Some((cid, theta)) => {
                            let m = siblings.get(&cid).copied().unwrap_or(1).max(1);
                            let k = seen.entry(cid).or_insert(0);
                            let a = theta - sector / 2.0 + sector * (*k as f64 + 0.5) / m as f64;
                            *k += 1;
                            on_ring(center, config.contact_ring_radius, a)
                        }
                        None => {
                            orphans += 1;
                            phyllotaxis(center, orphans - 1)
                        }
                    }
                }
            };
            (node.id.clone(), pos)
        })
        .collect()
}

/// Starting placement for the simulation, in node order.
///
/// Hub: pinned at the center. Saved position: pinned there. Otherwise the
/// sector layout, with clusters pinned when `pin_clusters` is set.
pub fn initial_placement(
    data: &NetworkData,
    width: f64,
    height: f64,
    saved: &PositionMap,
    config: &LayoutConfig,
) -> Vec<Placement> {
    let center = Point::new(width / 2.0, height / 2.0);
    let sectors = sector_layout(data, width, height, config);

    data.nodes
        .iter()
        .zip(sectors)
        .map(|(node, (_, sector_pos))| match NodeKind::of(node) {
            NodeKind::Hub => Placement {
                position: center,
                pinned: true,
            },
            kind => match saved.get(&node.id) {
                Some(&position) => Placement {
                    position,
                    pinned: true,
                },
                None => Placement {
                    position: sector_pos,
                    pinned: kind == NodeKind::Cluster && config.pin_clusters,
                },
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{Cluster, Contact, NewContact};

    fn data(cluster_ids: &[i64], contacts: &[(i64, i64)]) -> NetworkData {
        let clusters: Vec<Cluster> = cluster_ids
            .iter()
            .map(|&id| Cluster {
                id,
                name: format!("C{id}"),
                color: "red".into(),
            })
            .collect();
        let contacts: Vec<Contact> = contacts
            .iter()
            .map(|&(id, cluster_id)| {
                Contact::from_new(
                    id,
                    NewContact {
                        name: format!("P{id}"),
                        role: "r".into(),
                        cluster_id,
                        ..Default::default()
                    },
                )
            })
            .collect();
        NetworkData::project(&clusters, &contacts)
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance(&b) < 1e-6
    }

    #[test]
    fn test_clusters_on_ring() {
        let d = data(&[1, 2, 3, 4], &[]);
        let layout = sector_layout(&d, 800.0, 600.0, &LayoutConfig::default());
        assert!(close(layout[0].1, Point::new(400.0, 300.0)));
        assert!(close(layout[1].1, Point::new(650.0, 300.0)));
        assert!(close(layout[2].1, Point::new(400.0, 550.0)));
        assert!(close(layout[3].1, Point::new(150.0, 300.0)));
    }

    #[test]
    fn test_contacts_share_sector() {
        // Two clusters: sector width pi. Cluster 1 at angle 0.
        let d = data(&[1, 2], &[(1, 1), (2, 1)]);
        let layout = sector_layout(&d, 0.0, 0.0, &LayoutConfig::default());
        let first = layout[3].1;
        let second = layout[4].1;
        let a1 = first.y.atan2(first.x);
        let a2 = second.y.atan2(second.x);
        assert!((a1 + PI / 4.0).abs() < 1e-9);
        assert!((a2 - PI / 4.0).abs() < 1e-9);
        assert!((first.distance(&Point::default()) - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_orphan_contact_spirals() {
        let d = data(&[1], &[(1, 9)]);
        let layout = sector_layout(&d, 0.0, 0.0, &LayoutConfig::default());
        let orphan = layout[2].1;
        assert!((orphan.distance(&Point::default()) - 10.0 * 0.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_saved_positions_pin() {
        let d = data(&[1], &[(1, 1)]);
        let mut saved = PositionMap::new();
        saved.insert("contact-1".into(), Point::new(120.0, 340.0));
        saved.insert("portico".into(), Point::new(1.0, 1.0));
        let placement = initial_placement(&d, 800.0, 600.0, &saved, &LayoutConfig::default());

        assert_eq!(placement[0].position, Point::new(400.0, 300.0));
        assert!(placement[0].pinned);
        assert!(placement[1].pinned);
        assert_eq!(placement[2].position, Point::new(120.0, 340.0));
        assert!(placement[2].pinned);
    }

    #[test]
    fn test_free_contacts_without_saved_position() {
        let d = data(&[1], &[(1, 1)]);
        let config = LayoutConfig {
            pin_clusters: false,
            ..LayoutConfig::default()
        };
        let placement = initial_placement(&d, 800.0, 600.0, &PositionMap::new(), &config);
        assert!(!placement[1].pinned);
        assert!(!placement[2].pinned);
    }
}
