//! Graph view of the network projection using petgraph.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use portico_core::{EntityKind, NetworkData};

/// Node weight: the projection node id and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub kind: EntityKind,
}

/// Directed graph built from a `NetworkData` snapshot.
pub struct NetworkGraph {
    graph: DiGraph<GraphNode, String>,
    node_index: HashMap<String, NodeIndex>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Links whose endpoints are not in the node list are skipped.
    pub fn from_data(data: &NetworkData) -> Self {
        let mut g = Self::new();
        for node in &data.nodes {
            let idx = g.graph.add_node(GraphNode {
                id: node.id.clone(),
                kind: node.node_type,
            });
            g.node_index.insert(node.id.clone(), idx);
        }
        for link in &data.links {
            let (Some(&s), Some(&t)) = (g.node_index.get(&link.source), g.node_index.get(&link.target))
            else {
                continue;
            };
            g.graph.add_edge(s, t, link.id.clone());
        }
        g
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Ids adjacent to `id` in either direction.
    pub fn neighbors(&self, id: &str) -> Vec<String> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .graph
            .neighbors_undirected(idx)
            .map(|n| self.graph[n].id.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Number of incident edges, both directions.
    pub fn degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_index.get(id) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }
}

impl Default for NetworkGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{Cluster, Contact, NetworkLink, NewContact};

    fn sample() -> NetworkData {
        let clusters = vec![
            Cluster {
                id: 1,
                name: "A".into(),
                color: "red".into(),
            },
            Cluster {
                id: 2,
                name: "B".into(),
                color: "blue".into(),
            },
        ];
        let contacts: Vec<Contact> = (1..=3)
            .map(|i| {
                Contact::from_new(
                    i,
                    NewContact {
                        name: format!("C{i}"),
                        role: "r".into(),
                        cluster_id: 1,
                        ..Default::default()
                    },
                )
            })
            .collect();
        NetworkData::project(&clusters, &contacts)
    }

    #[test]
    fn test_graph_stats_and_degree() {
        let g = NetworkGraph::from_data(&sample());
        assert_eq!(g.stats().node_count, 6);
        assert_eq!(g.stats().edge_count, 5);
        assert_eq!(g.degree("cluster-1"), 4);
        assert_eq!(g.degree("cluster-2"), 1);
        assert_eq!(g.degree("portico"), 2);
        assert_eq!(g.degree("nope"), 0);
        assert_eq!(
            g.neighbors("cluster-1"),
            vec!["contact-1", "contact-2", "contact-3", "portico"]
        );
    }

    #[test]
    fn test_dangling_links_skipped() {
        let mut data = sample();
        data.links.push(NetworkLink {
            id: "ghost".into(),
            source: "cluster-9".into(),
            target: "contact-1".into(),
            source_type: EntityKind::Cluster,
            target_type: EntityKind::Contact,
        });
        let g = NetworkGraph::from_data(&data);
        assert_eq!(g.stats().edge_count, 5);
        assert!(!g.contains("cluster-9"));
    }
}
