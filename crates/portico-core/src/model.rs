//! Entity models: clusters, contacts, connections and their input shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The two entity types a connection can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Cluster,
    Contact,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Contact => "contact",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cluster" => Some(Self::Cluster),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------

/// A named, colored group of contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: i64,
    pub name: String,
    /// CSS color, usually `rgba(...)` with alpha.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCluster {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ClusterPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

impl Cluster {
    pub fn apply(&mut self, patch: ClusterPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

// ---------------------------------------------------------------
// Contact
// ---------------------------------------------------------------

/// Postal address of a contact. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.zip.is_none()
            && self.country.is_none()
            && self.timezone.is_none()
    }
}

/// A person assigned to exactly one cluster.
///
/// Optional scalars serialize as `null`; collection fields are always
/// present, empty when nothing was supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub first_contact: Option<String>,
    #[serde(default)]
    pub last_contact: Option<String>,
    #[serde(default)]
    pub next_follow_up: Option<String>,
    #[serde(default)]
    pub relationship_status: Option<String>,
    #[serde(default)]
    pub relationship_strength: Option<u8>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub communication_preferences: BTreeMap<String, bool>,
    #[serde(default)]
    pub custom_fields: Vec<String>,
    pub cluster_id: i64,
}

/// Input for creating a contact. Collections left as `None` default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_strength: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<String>>,
    pub cluster_id: i64,
}

/// Partial contact update.
///
/// Nullable fields are tri-state: `None` keeps the current value,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contact: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_strength: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_preferences: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<i64>,
}

/// Empty strings count as "not supplied".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn merge<T>(target: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *target = value;
    }
}

fn merge_text(target: &mut Option<String>, update: Option<Option<String>>) {
    if let Some(value) = update {
        *target = non_empty(value);
    }
}

impl Contact {
    /// Build a stored contact from create input, defaulting every collection.
    pub fn from_new(id: i64, input: NewContact) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            email: non_empty(input.email),
            phone: non_empty(input.phone),
            notes: non_empty(input.notes),
            company: non_empty(input.company),
            department: non_empty(input.department),
            emails: input.emails.unwrap_or_default(),
            phones: input.phones.unwrap_or_default(),
            social_links: input.social_links.unwrap_or_default(),
            tags: input.tags.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            first_contact: non_empty(input.first_contact),
            last_contact: non_empty(input.last_contact),
            next_follow_up: non_empty(input.next_follow_up),
            relationship_status: non_empty(input.relationship_status),
            relationship_strength: input.relationship_strength,
            profile_image: non_empty(input.profile_image),
            communication_preferences: input.communication_preferences.unwrap_or_default(),
            custom_fields: input.custom_fields.unwrap_or_default(),
            cluster_id: input.cluster_id,
        }
    }

    /// Merge a partial update. `cluster_id` is applied too; callers that
    /// maintain membership edges must compare before calling.
    pub fn apply(&mut self, patch: ContactPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        merge_text(&mut self.email, patch.email);
        merge_text(&mut self.phone, patch.phone);
        merge_text(&mut self.notes, patch.notes);
        merge_text(&mut self.company, patch.company);
        merge_text(&mut self.department, patch.department);
        if let Some(emails) = patch.emails {
            self.emails = emails;
        }
        if let Some(phones) = patch.phones {
            self.phones = phones;
        }
        if let Some(links) = patch.social_links {
            self.social_links = links;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        merge_text(&mut self.first_contact, patch.first_contact);
        merge_text(&mut self.last_contact, patch.last_contact);
        merge_text(&mut self.next_follow_up, patch.next_follow_up);
        merge_text(&mut self.relationship_status, patch.relationship_status);
        merge(&mut self.relationship_strength, patch.relationship_strength);
        merge_text(&mut self.profile_image, patch.profile_image);
        if let Some(prefs) = patch.communication_preferences {
            self.communication_preferences = prefs;
        }
        if let Some(fields) = patch.custom_fields {
            self.custom_fields = fields;
        }
        if let Some(cluster_id) = patch.cluster_id {
            self.cluster_id = cluster_id;
        }
    }
}

// ---------------------------------------------------------------
// Connection
// ---------------------------------------------------------------

/// A typed edge between two entities, referenced by the string form of their ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: i64,
    pub source_id: String,
    pub target_id: String,
    pub source_type: EntityKind,
    pub target_type: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConnection {
    pub source_id: String,
    pub target_id: String,
    pub source_type: EntityKind,
    pub target_type: EntityKind,
}

impl NewConnection {
    /// The membership edge created for every contact.
    pub fn membership(cluster_id: i64, contact_id: i64) -> Self {
        Self {
            source_id: cluster_id.to_string(),
            target_id: contact_id.to_string(),
            source_type: EntityKind::Cluster,
            target_type: EntityKind::Contact,
        }
    }
}

impl Connection {
    /// Whether either endpoint is the given entity.
    pub fn touches(&self, kind: EntityKind, id: i64) -> bool {
        let id = id.to_string();
        (self.source_type == kind && self.source_id == id)
            || (self.target_type == kind && self.target_id == id)
    }

    /// Whether this is the `cluster -> contact` membership edge for the pair.
    pub fn is_membership(&self, cluster_id: i64, contact_id: i64) -> bool {
        self.source_type == EntityKind::Cluster
            && self.target_type == EntityKind::Contact
            && self.source_id == cluster_id.to_string()
            && self.target_id == contact_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact(cluster_id: i64) -> NewContact {
        NewContact {
            name: "Jo".into(),
            role: "Rep".into(),
            cluster_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_new_defaults_collections() {
        let contact = Contact::from_new(1, new_contact(5));
        assert!(contact.emails.is_empty());
        assert!(contact.social_links.is_empty());
        assert!(contact.address.is_empty());
        assert_eq!(contact.email, None);

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["emails"], serde_json::json!([]));
        assert_eq!(json["socialLinks"], serde_json::json!({}));
        assert_eq!(json["address"], serde_json::json!({}));
        assert!(json["email"].is_null());
        assert_eq!(json["clusterId"], 5);
    }

    #[test]
    fn test_empty_strings_become_null() {
        let mut input = new_contact(1);
        input.email = Some(String::new());
        let contact = Contact::from_new(1, input);
        assert_eq!(contact.email, None);
    }

    #[test]
    fn test_patch_tristate() {
        let mut input = new_contact(1);
        input.email = Some("jo@example.com".into());
        input.phone = Some("123".into());
        let mut contact = Contact::from_new(1, input);

        contact.apply(ContactPatch {
            email: Some(None),
            role: Some("Lead".into()),
            ..Default::default()
        });
        assert_eq!(contact.email, None);
        assert_eq!(contact.phone.as_deref(), Some("123"));
        assert_eq!(contact.role, "Lead");
    }

    #[test]
    fn test_connection_touches() {
        let conn = Connection {
            id: 1,
            source_id: "3".into(),
            target_id: "7".into(),
            source_type: EntityKind::Cluster,
            target_type: EntityKind::Contact,
        };
        assert!(conn.touches(EntityKind::Cluster, 3));
        assert!(conn.touches(EntityKind::Contact, 7));
        assert!(!conn.touches(EntityKind::Contact, 3));
        assert!(conn.is_membership(3, 7));
        assert!(!conn.is_membership(7, 3));
    }
}
