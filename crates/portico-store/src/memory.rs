//! In-memory store for clusters, contacts and connections.
//!
//! All three collections live behind one `RwLock`, so cascades and the
//! checked create/update variants are atomic to every other caller.
//! `BTreeMap` keys are monotonic ids, so iteration is ascending id order.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use portico_core::{
    Cluster, ClusterPatch, Connection, Contact, ContactPatch, EntityKind, Error, NetworkData,
    NewCluster, NewConnection, NewContact, Result,
};

use crate::graph::NetworkGraph;
use crate::types::{StoreStats, DEFAULT_CLUSTERS};

pub const CLUSTER_REFERENCE_MISSING: &str = "Specified cluster does not exist";

struct Inner {
    clusters: BTreeMap<i64, Cluster>,
    contacts: BTreeMap<i64, Contact>,
    connections: BTreeMap<i64, Connection>,
    next_cluster_id: i64,
    next_contact_id: i64,
    next_connection_id: i64,
}

impl Inner {
    fn empty() -> Self {
        Self {
            clusters: BTreeMap::new(),
            contacts: BTreeMap::new(),
            connections: BTreeMap::new(),
            next_cluster_id: 1,
            next_contact_id: 1,
            next_connection_id: 1,
        }
    }

    fn insert_cluster(&mut self, input: NewCluster) -> Cluster {
        let id = self.next_cluster_id;
        self.next_cluster_id += 1;
        let cluster = Cluster {
            id,
            name: input.name,
            color: input.color,
        };
        self.clusters.insert(id, cluster.clone());
        cluster
    }

    fn insert_connection(&mut self, input: NewConnection) -> Connection {
        let id = self.next_connection_id;
        self.next_connection_id += 1;
        let connection = Connection {
            id,
            source_id: input.source_id,
            target_id: input.target_id,
            source_type: input.source_type,
            target_type: input.target_type,
        };
        self.connections.insert(id, connection.clone());
        connection
    }

    fn insert_contact(&mut self, input: NewContact) -> Contact {
        let id = self.next_contact_id;
        self.next_contact_id += 1;
        let contact = Contact::from_new(id, input);
        self.contacts.insert(id, contact.clone());
        self.insert_connection(NewConnection::membership(contact.cluster_id, id));
        contact
    }

    fn patch_contact(&mut self, id: i64, patch: ContactPatch) -> Option<Contact> {
        let contact = self.contacts.get_mut(&id)?;
        let old_cluster = contact.cluster_id;
        contact.apply(patch);
        let updated = contact.clone();

        if updated.cluster_id != old_cluster {
            self.connections
                .retain(|_, c| !c.is_membership(old_cluster, id));
            self.insert_connection(NewConnection::membership(updated.cluster_id, id));
            debug!(
                "Contact {} moved from cluster {} to {}",
                id, old_cluster, updated.cluster_id
            );
        }
        Some(updated)
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        let wanted = name.trim().to_lowercase();
        self.clusters
            .values()
            .any(|c| Some(c.id) != except && c.name.trim().to_lowercase() == wanted)
    }

    fn project(&self) -> NetworkData {
        NetworkData::project(self.clusters.values(), self.contacts.values())
    }
}

/// Process-lifetime store. Created once at boot and shared by reference.
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    /// Empty store; every id counter starts at 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::empty()),
        }
    }

    /// Store seeded with the default clusters (ids 1-4).
    pub fn with_default_clusters() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for seed in DEFAULT_CLUSTERS {
                inner.insert_cluster(NewCluster {
                    name: seed.name.to_string(),
                    color: seed.color.to_string(),
                });
            }
        }
        info!("MemStore seeded with {} default clusters", DEFAULT_CLUSTERS.len());
        store
    }

    // ---------------------------------------------------------------
    // Clusters
    // ---------------------------------------------------------------

    pub fn clusters(&self) -> Vec<Cluster> {
        self.inner.read().clusters.values().cloned().collect()
    }

    pub fn cluster(&self, id: i64) -> Option<Cluster> {
        self.inner.read().clusters.get(&id).cloned()
    }

    /// Insert a cluster. Duplicate names are accepted.
    pub fn create_cluster(&self, input: NewCluster) -> Cluster {
        let cluster = self.inner.write().insert_cluster(input);
        info!("Created cluster {} ({})", cluster.id, cluster.name);
        cluster
    }

    /// Insert a cluster unless another one already has the same name
    /// (trimmed, case-insensitive). Check and insert share one write lock.
    pub fn create_cluster_unique(&self, input: NewCluster) -> Result<Cluster> {
        let mut inner = self.inner.write();
        if inner.name_taken(&input.name, None) {
            return Err(duplicate_name(&input.name));
        }
        let cluster = inner.insert_cluster(input);
        info!("Created cluster {} ({})", cluster.id, cluster.name);
        Ok(cluster)
    }

    /// Merge a partial update. `None` when the id is unknown.
    pub fn update_cluster(&self, id: i64, patch: ClusterPatch) -> Option<Cluster> {
        let mut inner = self.inner.write();
        let cluster = inner.clusters.get_mut(&id)?;
        cluster.apply(patch);
        Some(cluster.clone())
    }

    /// `update_cluster` that refuses a rename onto another cluster's name.
    pub fn rename_cluster_unique(&self, id: i64, patch: ClusterPatch) -> Result<Cluster> {
        let mut inner = self.inner.write();
        if !inner.clusters.contains_key(&id) {
            return Err(Error::not_found("Cluster"));
        }
        if let Some(name) = &patch.name {
            if inner.name_taken(name, Some(id)) {
                return Err(duplicate_name(name));
            }
        }
        let cluster = inner
            .clusters
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Cluster"))?;
        cluster.apply(patch);
        Ok(cluster.clone())
    }

    /// Delete a cluster together with its contacts and every connection
    /// touching any of them. Returns whether the cluster existed.
    pub fn delete_cluster(&self, id: i64) -> bool {
        let mut inner = self.inner.write();
        if !inner.clusters.contains_key(&id) {
            return false;
        }

        let doomed: Vec<i64> = inner
            .contacts
            .values()
            .filter(|c| c.cluster_id == id)
            .map(|c| c.id)
            .collect();
        for contact_id in &doomed {
            inner.contacts.remove(contact_id);
        }

        let before = inner.connections.len();
        inner.connections.retain(|_, conn| {
            !conn.touches(EntityKind::Cluster, id)
                && !doomed.iter().any(|cid| conn.touches(EntityKind::Contact, *cid))
        });
        let dropped = before - inner.connections.len();

        inner.clusters.remove(&id);
        info!(
            "Deleted cluster {} ({} contacts, {} connections cascaded)",
            id,
            doomed.len(),
            dropped
        );
        true
    }

    // ---------------------------------------------------------------
    // Contacts
    // ---------------------------------------------------------------

    pub fn contacts(&self) -> Vec<Contact> {
        self.inner.read().contacts.values().cloned().collect()
    }

    pub fn contact(&self, id: i64) -> Option<Contact> {
        self.inner.read().contacts.get(&id).cloned()
    }

    pub fn contacts_by_cluster(&self, cluster_id: i64) -> Vec<Contact> {
        self.inner
            .read()
            .contacts
            .values()
            .filter(|c| c.cluster_id == cluster_id)
            .cloned()
            .collect()
    }

    /// Insert a contact and its membership connection.
    ///
    /// The cluster reference is not checked here; see `try_create_contact`.
    pub fn create_contact(&self, input: NewContact) -> Contact {
        let contact = self.inner.write().insert_contact(input);
        info!("Created contact {} in cluster {}", contact.id, contact.cluster_id);
        contact
    }

    /// Insert a contact only if its cluster exists.
    pub fn try_create_contact(&self, input: NewContact) -> Result<Contact> {
        let mut inner = self.inner.write();
        if !inner.clusters.contains_key(&input.cluster_id) {
            return Err(Error::validation(CLUSTER_REFERENCE_MISSING));
        }
        let contact = inner.insert_contact(input);
        info!("Created contact {} in cluster {}", contact.id, contact.cluster_id);
        Ok(contact)
    }

    /// Merge a partial update, moving the membership connection when the
    /// cluster changes. `None` when the id is unknown.
    pub fn update_contact(&self, id: i64, patch: ContactPatch) -> Option<Contact> {
        self.inner.write().patch_contact(id, patch)
    }

    /// `update_contact` that rejects a move to a cluster that does not exist.
    pub fn try_update_contact(&self, id: i64, patch: ContactPatch) -> Result<Contact> {
        let mut inner = self.inner.write();
        if let Some(cluster_id) = patch.cluster_id {
            if !inner.clusters.contains_key(&cluster_id) {
                return Err(Error::validation(CLUSTER_REFERENCE_MISSING));
            }
        }
        inner
            .patch_contact(id, patch)
            .ok_or_else(|| Error::not_found("Contact"))
    }

    /// Delete a contact and every connection referencing it.
    pub fn delete_contact(&self, id: i64) -> bool {
        let mut inner = self.inner.write();
        if inner.contacts.remove(&id).is_none() {
            return false;
        }
        inner
            .connections
            .retain(|_, conn| !conn.touches(EntityKind::Contact, id));
        info!("Deleted contact {}", id);
        true
    }

    // ---------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------

    pub fn connections(&self) -> Vec<Connection> {
        self.inner.read().connections.values().cloned().collect()
    }

    pub fn create_connection(&self, input: NewConnection) -> Connection {
        let connection = self.inner.write().insert_connection(input);
        info!(
            "Created connection {} ({} {} -> {} {})",
            connection.id,
            connection.source_type,
            connection.source_id,
            connection.target_type,
            connection.target_id
        );
        connection
    }

    pub fn delete_connection(&self, id: i64) -> bool {
        let removed = self.inner.write().connections.remove(&id).is_some();
        if removed {
            info!("Deleted connection {}", id);
        }
        removed
    }

    // ---------------------------------------------------------------
    // Projection
    // ---------------------------------------------------------------

    /// Derive the network projection from the current collections.
    pub fn network_data(&self) -> NetworkData {
        let data = self.inner.read().project();
        debug!(
            "Network projection: {} nodes, {} links",
            data.nodes.len(),
            data.links.len()
        );
        data
    }

    pub fn graph(&self) -> NetworkGraph {
        NetworkGraph::from_data(&self.network_data())
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        let graph = NetworkGraph::from_data(&inner.project()).stats();
        StoreStats {
            clusters: inner.clusters.len(),
            contacts: inner.contacts.len(),
            connections: inner.connections.len(),
            nodes: graph.node_count,
            links: graph.edge_count,
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_name(name: &str) -> Error {
    Error::conflict(format!("A cluster named \"{}\" already exists", name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str) -> NewCluster {
        NewCluster {
            name: name.into(),
            color: "rgba(1,2,3,0.4)".into(),
        }
    }

    fn contact(name: &str, cluster_id: i64) -> NewContact {
        NewContact {
            name: name.into(),
            role: "Rep".into(),
            cluster_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_seeded_ids() {
        let store = MemStore::with_default_clusters();
        let names: Vec<String> = store.clusters().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Marketing", "Finanzen", "Technologie", "Vertrieb"]);

        let sales = store.create_cluster(cluster("Sales"));
        assert_eq!(sales.id, 5);
        let jo = store.create_contact(contact("Jo", 5));
        assert_eq!(jo.id, 1);
    }

    #[test]
    fn test_cluster_ids_never_reused() {
        let store = MemStore::new();
        let a = store.create_cluster(cluster("A"));
        let b = store.create_cluster(cluster("B"));
        assert!(store.delete_cluster(b.id));
        let c = store.create_cluster(cluster("C"));
        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn test_duplicate_names_allowed_unchecked() {
        let store = MemStore::new();
        store.create_cluster(cluster("Sales"));
        store.create_cluster(cluster("Sales"));
        assert_eq!(store.clusters().len(), 2);
    }

    #[test]
    fn test_unique_cluster_names() {
        let store = MemStore::new();
        store.create_cluster_unique(cluster("Sales")).unwrap();
        let err = store.create_cluster_unique(cluster("  sales ")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.clusters().len(), 1);

        let other = store.create_cluster_unique(cluster("Ops")).unwrap();
        let err = store
            .rename_cluster_unique(
                other.id,
                ClusterPatch {
                    name: Some("SALES".into()),
                    color: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // Renaming onto its own name is fine.
        let same = store
            .rename_cluster_unique(
                other.id,
                ClusterPatch {
                    name: Some("ops".into()),
                    color: None,
                },
            )
            .unwrap();
        assert_eq!(same.name, "ops");

        let missing = store.rename_cluster_unique(99, ClusterPatch::default());
        assert_eq!(missing.unwrap_err().to_string(), "Cluster not found");
    }

    #[test]
    fn test_update_cluster() {
        let store = MemStore::new();
        let c = store.create_cluster(cluster("A"));
        let updated = store
            .update_cluster(
                c.id,
                ClusterPatch {
                    name: None,
                    color: Some("red".into()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "A");
        assert_eq!(updated.color, "red");
        assert!(store.update_cluster(42, ClusterPatch::default()).is_none());
    }

    #[test]
    fn test_create_contact_adds_membership() {
        let store = MemStore::new();
        let c = store.create_cluster(cluster("A"));
        let jo = store.create_contact(contact("Jo", c.id));
        let conns = store.connections();
        assert_eq!(conns.len(), 1);
        assert!(conns[0].is_membership(c.id, jo.id));
    }

    #[test]
    fn test_try_create_contact_rejects_unknown_cluster() {
        let store = MemStore::new();
        let err = store.try_create_contact(contact("Jo", 9)).unwrap_err();
        assert_eq!(err.to_string(), CLUSTER_REFERENCE_MISSING);
        assert!(store.contacts().is_empty());
        assert!(store.connections().is_empty());
    }

    #[test]
    fn test_update_contact_moves_membership() {
        let store = MemStore::new();
        let a = store.create_cluster(cluster("A"));
        let b = store.create_cluster(cluster("B"));
        let jo = store.create_contact(contact("Jo", a.id));

        let moved = store
            .update_contact(
                jo.id,
                ContactPatch {
                    cluster_id: Some(b.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.cluster_id, b.id);

        let conns = store.connections();
        assert_eq!(conns.len(), 1);
        assert!(conns[0].is_membership(b.id, jo.id));

        assert!(store.update_contact(99, ContactPatch::default()).is_none());
        let err = store
            .try_update_contact(
                jo.id,
                ContactPatch {
                    cluster_id: Some(77),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_delete_cluster_cascades() {
        let store = MemStore::new();
        let a = store.create_cluster(cluster("A"));
        let b = store.create_cluster(cluster("B"));
        let jo = store.create_contact(contact("Jo", a.id));
        store.create_contact(contact("Al", a.id));
        let keep = store.create_contact(contact("Bo", b.id));
        store.create_connection(NewConnection {
            source_id: jo.id.to_string(),
            target_id: keep.id.to_string(),
            source_type: EntityKind::Contact,
            target_type: EntityKind::Contact,
        });

        assert!(store.delete_cluster(a.id));
        assert!(!store.delete_cluster(a.id));

        let contacts = store.contacts();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, keep.id);
        let conns = store.connections();
        assert_eq!(conns.len(), 1);
        assert!(conns[0].is_membership(b.id, keep.id));
    }

    #[test]
    fn test_delete_contact_removes_connections() {
        let store = MemStore::new();
        let a = store.create_cluster(cluster("A"));
        let jo = store.create_contact(contact("Jo", a.id));
        assert!(store.delete_contact(jo.id));
        assert!(!store.delete_contact(jo.id));
        assert!(store.connections().is_empty());
    }

    #[test]
    fn test_connections_crud() {
        let store = MemStore::new();
        let conn = store.create_connection(NewConnection::membership(1, 2));
        assert_eq!(conn.id, 1);
        assert!(store.delete_connection(conn.id));
        assert!(!store.delete_connection(conn.id));
    }

    #[test]
    fn test_contacts_by_cluster() {
        let store = MemStore::new();
        let a = store.create_cluster(cluster("A"));
        let b = store.create_cluster(cluster("B"));
        store.create_contact(contact("Jo", a.id));
        store.create_contact(contact("Bo", b.id));
        let only_a = store.contacts_by_cluster(a.id);
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].name, "Jo");
        assert!(store.contacts_by_cluster(99).is_empty());
    }

    #[test]
    fn test_network_data_idempotent() {
        let store = MemStore::with_default_clusters();
        let sales = store.create_cluster(cluster("Sales"));
        store.create_contact(contact("Jo", sales.id));

        let first = store.network_data();
        let second = store.network_data();
        assert_eq!(first, second);
        assert_eq!(first.nodes.iter().filter(|n| n.is_hub()).count(), 1);
        assert_eq!(first.nodes.len(), 1 + 5 + 1);
        assert_eq!(first.links.len(), 5 + 1);
        assert!(first
            .links
            .iter()
            .any(|l| l.source == "cluster-5" && l.target == "contact-1"));
    }

    #[test]
    fn test_stats() {
        let store = MemStore::with_default_clusters();
        store.create_contact(contact("Jo", 1));
        let stats = store.stats();
        assert_eq!(stats.clusters, 4);
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.connections, 1);
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.links, 5);
    }
}
