//! Network projection: the node-link view derived from clusters and contacts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Address, Cluster, Contact, EntityKind};

/// Id of the fixed hub node every cluster hangs off.
pub const HUB_NODE_ID: &str = "portico";
pub const HUB_NODE_NAME: &str = "Portico";
pub const HUB_NODE_COLOR: &str = "rgba(255, 144, 104, 0.6)";

pub fn cluster_node_id(cluster_id: i64) -> String {
    format!("cluster-{cluster_id}")
}

pub fn contact_node_id(contact_id: i64) -> String {
    format!("contact-{contact_id}")
}

/// Numeric cluster id from a `cluster-{id}` node id.
pub fn parse_cluster_node_id(node_id: &str) -> Option<i64> {
    node_id.strip_prefix("cluster-")?.parse().ok()
}

/// Numeric contact id from a `contact-{id}` node id.
pub fn parse_contact_node_id(node_id: &str) -> Option<i64> {
    node_id.strip_prefix("contact-")?.parse().ok()
}

/// A node of the projection. Contact nodes carry every extended contact
/// field plus `originalId` for back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: EntityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<i64>,
}

impl NetworkNode {
    fn bare(id: String, node_type: EntityKind, name: String) -> Self {
        Self {
            id,
            node_type,
            name,
            role: None,
            color: None,
            cluster_id: None,
            email: None,
            phone: None,
            notes: None,
            company: None,
            department: None,
            emails: None,
            phones: None,
            social_links: None,
            tags: None,
            address: None,
            first_contact: None,
            last_contact: None,
            next_follow_up: None,
            relationship_status: None,
            relationship_strength: None,
            profile_image: None,
            communication_preferences: None,
            custom_fields: None,
            original_id: None,
        }
    }

    pub fn hub() -> Self {
        let mut node = Self::bare(
            HUB_NODE_ID.to_string(),
            EntityKind::Cluster,
            HUB_NODE_NAME.to_string(),
        );
        node.color = Some(HUB_NODE_COLOR.to_string());
        node
    }

    pub fn from_cluster(cluster: &Cluster) -> Self {
        let mut node = Self::bare(
            cluster_node_id(cluster.id),
            EntityKind::Cluster,
            cluster.name.clone(),
        );
        node.color = Some(cluster.color.clone());
        node.original_id = Some(cluster.id);
        node
    }

    pub fn from_contact(contact: &Contact) -> Self {
        let mut node = Self::bare(
            contact_node_id(contact.id),
            EntityKind::Contact,
            contact.name.clone(),
        );
        node.role = Some(contact.role.clone());
        node.email = contact.email.clone();
        node.phone = contact.phone.clone();
        node.notes = contact.notes.clone();
        node.company = contact.company.clone();
        node.department = contact.department.clone();
        node.emails = Some(contact.emails.clone());
        node.phones = Some(contact.phones.clone());
        node.social_links = Some(contact.social_links.clone());
        node.tags = Some(contact.tags.clone());
        node.address = Some(contact.address.clone());
        node.first_contact = contact.first_contact.clone();
        node.last_contact = contact.last_contact.clone();
        node.next_follow_up = contact.next_follow_up.clone();
        node.relationship_status = contact.relationship_status.clone();
        node.relationship_strength = contact.relationship_strength;
        node.profile_image = contact.profile_image.clone();
        node.communication_preferences = Some(contact.communication_preferences.clone());
        node.custom_fields = Some(contact.custom_fields.clone());
        node.cluster_id = Some(contact.cluster_id);
        node.original_id = Some(contact.id);
        node
    }

    pub fn is_hub(&self) -> bool {
        self.id == HUB_NODE_ID
    }
}

/// A directed edge of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLink {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_type: EntityKind,
    pub target_type: EntityKind,
}

impl NetworkLink {
    pub fn membership(contact: &Contact) -> Self {
        Self {
            id: format!("link-cluster-contact-{}", contact.id),
            source: cluster_node_id(contact.cluster_id),
            target: contact_node_id(contact.id),
            source_type: EntityKind::Cluster,
            target_type: EntityKind::Contact,
        }
    }

    pub fn hub(cluster: &Cluster) -> Self {
        Self {
            id: format!("link-portico-cluster-{}", cluster.id),
            source: HUB_NODE_ID.to_string(),
            target: cluster_node_id(cluster.id),
            source_type: EntityKind::Cluster,
            target_type: EntityKind::Cluster,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

impl NetworkData {
    /// Assemble the projection from the authoritative collections.
    ///
    /// Node order: hub, clusters, contacts. Link order: membership links,
    /// then hub links. Both follow the iteration order of the inputs.
    pub fn project<'a>(
        clusters: impl IntoIterator<Item = &'a Cluster>,
        contacts: impl IntoIterator<Item = &'a Contact>,
    ) -> Self {
        let clusters: Vec<&Cluster> = clusters.into_iter().collect();
        let contacts: Vec<&Contact> = contacts.into_iter().collect();

        let mut nodes = Vec::with_capacity(1 + clusters.len() + contacts.len());
        nodes.push(NetworkNode::hub());
        nodes.extend(clusters.iter().map(|c| NetworkNode::from_cluster(c)));
        nodes.extend(contacts.iter().map(|c| NetworkNode::from_contact(c)));

        let mut links = Vec::with_capacity(clusters.len() + contacts.len());
        links.extend(contacts.iter().map(|c| NetworkLink::membership(c)));
        links.extend(clusters.iter().map(|c| NetworkLink::hub(c)));

        Self { nodes, links }
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
