//! Cluster toggles and search narrowing the visible network.

use std::collections::{BTreeSet, HashSet};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use portico_core::NetworkData;

use crate::types::NodeKind;

/// Minimum skim score per query character for a fuzzy hit.
const FUZZY_MIN_SCORE_PER_CHAR: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct NetworkFilter {
    active: BTreeSet<i64>,
    known: BTreeSet<i64>,
    search: String,
    fuzzy: bool,
}

impl NetworkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter with every given cluster active.
    pub fn with_clusters(ids: impl IntoIterator<Item = i64>) -> Self {
        let mut filter = Self::new();
        filter.sync_clusters(ids);
        filter
    }

    /// Track the current cluster list: clusters never seen before become
    /// active, clusters the user switched off stay off, deleted ones are
    /// forgotten.
    pub fn sync_clusters(&mut self, ids: impl IntoIterator<Item = i64>) {
        let current: BTreeSet<i64> = ids.into_iter().collect();
        for id in &current {
            if self.known.insert(*id) {
                self.active.insert(*id);
            }
        }
        self.known.retain(|id| current.contains(id));
        self.active.retain(|id| current.contains(id));
    }

    /// Flip a cluster. Returns whether it is active afterwards.
    pub fn toggle(&mut self, cluster_id: i64) -> bool {
        self.known.insert(cluster_id);
        if !self.active.remove(&cluster_id) {
            self.active.insert(cluster_id);
            true
        } else {
            false
        }
    }

    pub fn set_active(&mut self, cluster_id: i64, active: bool) {
        self.known.insert(cluster_id);
        if active {
            self.active.insert(cluster_id);
        } else {
            self.active.remove(&cluster_id);
        }
    }

    pub fn is_active(&self, cluster_id: i64) -> bool {
        self.active.contains(&cluster_id)
    }

    pub fn active_clusters(&self) -> impl Iterator<Item = i64> + '_ {
        self.active.iter().copied()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
    }

    fn matches(&self, matcher: &SkimMatcherV2, name: &str, role: Option<&str>) -> bool {
        let term = self.search.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        let fields = [Some(name), role];
        if fields
            .iter()
            .flatten()
            .any(|f| f.to_lowercase().contains(&needle))
        {
            return true;
        }
        if !self.fuzzy {
            return false;
        }
        let min_score = FUZZY_MIN_SCORE_PER_CHAR * needle.chars().count() as i64;
        fields.iter().flatten().any(|f| {
            matcher
                .fuzzy_match(&f.to_lowercase(), &needle)
                .is_some_and(|score| score >= min_score)
        })
    }

    /// Visible subset of `data`. Pure: same inputs, same output.
    pub fn apply(&self, data: &NetworkData) -> NetworkData {
        let matcher = SkimMatcherV2::default();
        let nodes: Vec<_> = data
            .nodes
            .iter()
            .filter(|node| match NodeKind::of(node) {
                NodeKind::Hub => true,
                NodeKind::Cluster => node.original_id.is_some_and(|id| self.is_active(id)),
                NodeKind::Contact => {
                    node.cluster_id.is_some_and(|id| self.is_active(id))
                        && self.matches(&matcher, &node.name, node.role.as_deref())
                }
            })
            .cloned()
            .collect();

        let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let links = data
            .links
            .iter()
            .filter(|l| visible.contains(l.source.as_str()) && visible.contains(l.target.as_str()))
            .cloned()
            .collect();

        NetworkData { nodes, links }
    }
}
