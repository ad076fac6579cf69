//! Request body validation.
//!
//! Every parser walks the whole body and collects all field-level issues
//! before failing, so one 400 response names every problem at once:
//! `Validation error: Required at "name"; Expected string, received number at "color"`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{
    Address, ClusterPatch, ContactPatch, EntityKind, NewCluster, NewConnection, NewContact,
};

pub const MAX_RELATIONSHIP_STRENGTH: i64 = 5;
pub const MAX_CUSTOM_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Issue {
    path: String,
    message: String,
}

fn render(issues: &[Issue]) -> String {
    let parts: Vec<String> = issues
        .iter()
        .map(|i| {
            if i.path.is_empty() {
                i.message.clone()
            } else {
                format!("{} at \"{}\"", i.message, i.path)
            }
        })
        .collect();
    format!("Validation error: {}", parts.join("; "))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, got: &Value) -> String {
    format!("Expected {kind}, received {}", type_name(got))
}

fn is_iso_date(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(raw).is_ok()
}

/// Field reader over one JSON object that accumulates issues.
struct Reader<'a> {
    obj: &'a Map<String, Value>,
    issues: Vec<Issue>,
}

impl<'a> Reader<'a> {
    fn new(body: &'a Value) -> Result<Self> {
        match body {
            Value::Object(obj) => Ok(Self {
                obj,
                issues: Vec::new(),
            }),
            other => Err(Error::validation(render(&[Issue {
                path: String::new(),
                message: expected("object", other),
            }]))),
        }
    }

    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            path: path.into(),
            message: message.into(),
        });
    }

    fn finish<T>(self, value: T) -> Result<T> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(Error::validation(render(&self.issues)))
        }
    }

    /// The value under `key`, explicit `null` included; callers decide
    /// whether `null` is allowed.
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key)
    }

    fn string_value(&mut self, key: &str, value: &Value, non_empty: bool) -> Option<String> {
        match value {
            Value::String(s) if non_empty && s.trim().is_empty() => {
                self.issue(key, "String must contain at least 1 character(s)");
                None
            }
            Value::String(s) => Some(s.clone()),
            other => {
                self.issue(key, expected("string", other));
                None
            }
        }
    }

    fn required_string(&mut self, key: &str, non_empty: bool) -> Option<String> {
        match self.present(key) {
            None => {
                self.issue(key, "Required");
                None
            }
            Some(v) => self.string_value(key, v, non_empty),
        }
    }

    /// Absent keys yield `None`; present keys must hold a string.
    fn patch_string(&mut self, key: &str, non_empty: bool) -> Option<String> {
        let value = self.present(key)?;
        self.string_value(key, value, non_empty)
    }

    /// Tri-state optional string: absent, `null`, or a string.
    fn nullable_string(&mut self, key: &str) -> Option<Option<String>> {
        match self.present(key)? {
            Value::Null => Some(None),
            Value::String(s) => Some(Some(s.clone())),
            other => {
                let msg = expected("string", other);
                self.issue(key, msg);
                None
            }
        }
    }

    fn nullable_date(&mut self, key: &str) -> Option<Option<String>> {
        let value = self.nullable_string(key)?;
        if let Some(raw) = &value {
            if !raw.is_empty() && !is_iso_date(raw) {
                self.issue(key, "Invalid date");
                return None;
            }
        }
        Some(value)
    }

    fn integer_value(&mut self, key: &str, value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i),
                None => {
                    self.issue(key, "Expected integer, received float");
                    None
                }
            },
            other => {
                let msg = expected("number", other);
                self.issue(key, msg);
                None
            }
        }
    }

    fn required_integer(&mut self, key: &str) -> Option<i64> {
        match self.present(key) {
            None => {
                self.issue(key, "Required");
                None
            }
            Some(v) => self.integer_value(key, v),
        }
    }

    fn patch_integer(&mut self, key: &str) -> Option<i64> {
        let value = self.present(key)?;
        self.integer_value(key, value)
    }

    fn nullable_strength(&mut self, key: &str) -> Option<Option<u8>> {
        let value = self.present(key)?;
        if value.is_null() {
            return Some(None);
        }
        let n = self.integer_value(key, value)?;
        if n < 0 {
            self.issue(key, "Number must be greater than or equal to 0");
            return None;
        }
        if n > MAX_RELATIONSHIP_STRENGTH {
            self.issue(
                key,
                format!("Number must be less than or equal to {MAX_RELATIONSHIP_STRENGTH}"),
            );
            return None;
        }
        u8::try_from(n).ok().map(Some)
    }

    /// Optional string list. `null` reads as an empty list.
    fn string_list(&mut self, key: &str, max: Option<usize>) -> Option<Vec<String>> {
        let items = match self.present(key)? {
            Value::Null => return Some(Vec::new()),
            Value::Array(items) => items,
            other => {
                let msg = expected("array", other);
                self.issue(key, msg);
                return None;
            }
        };
        if let Some(max) = max {
            if items.len() > max {
                self.issue(key, format!("Array must contain at most {max} element(s)"));
                return None;
            }
        }
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                other => {
                    let msg = expected("string", other);
                    self.issue(format!("{key}.{i}"), msg);
                    ok = false;
                }
            }
        }
        ok.then_some(out)
    }

    fn map_of<T>(
        &mut self,
        key: &str,
        kind: &str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Option<BTreeMap<String, T>> {
        let entries = match self.present(key)? {
            Value::Null => return Some(BTreeMap::new()),
            Value::Object(entries) => entries,
            other => {
                let msg = expected("object", other);
                self.issue(key, msg);
                return None;
            }
        };
        let mut out = BTreeMap::new();
        let mut ok = true;
        for (name, value) in entries {
            match convert(value) {
                Some(v) => {
                    out.insert(name.clone(), v);
                }
                None => {
                    let msg = expected(kind, value);
                    self.issue(format!("{key}.{name}"), msg);
                    ok = false;
                }
            }
        }
        ok.then_some(out)
    }

    fn address(&mut self, key: &str) -> Option<Address> {
        let entries = match self.present(key)? {
            Value::Null => return Some(Address::default()),
            Value::Object(entries) => entries,
            other => {
                let msg = expected("object", other);
                self.issue(key, msg);
                return None;
            }
        };
        let mut address = Address::default();
        let mut ok = true;
        for (part, slot) in [
            ("street", &mut address.street),
            ("city", &mut address.city),
            ("zip", &mut address.zip),
            ("country", &mut address.country),
            ("timezone", &mut address.timezone),
        ] {
            match entries.get(part) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => *slot = Some(s.clone()).filter(|s| !s.is_empty()),
                Some(other) => {
                    self.issues.push(Issue {
                        path: format!("{key}.{part}"),
                        message: expected("string", other),
                    });
                    ok = false;
                }
            }
        }
        ok.then_some(address)
    }

    fn entity_kind(&mut self, key: &str) -> Option<EntityKind> {
        let raw = self.required_string(key, false)?;
        match EntityKind::parse(&raw) {
            Some(kind) => Some(kind),
            None => {
                self.issue(
                    key,
                    format!("Invalid enum value. Expected 'cluster' | 'contact', received '{raw}'"),
                );
                None
            }
        }
    }
}

fn string_map(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn bool_map(value: &Value) -> Option<bool> {
    value.as_bool()
}

// ---------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------

pub fn new_cluster(body: &Value) -> Result<NewCluster> {
    let mut r = Reader::new(body)?;
    let input = NewCluster {
        name: r.required_string("name", true).unwrap_or_default(),
        color: r.required_string("color", true).unwrap_or_default(),
    };
    r.finish(input)
}

pub fn cluster_patch(body: &Value) -> Result<ClusterPatch> {
    let mut r = Reader::new(body)?;
    let patch = ClusterPatch {
        name: r.patch_string("name", true),
        color: r.patch_string("color", true),
    };
    r.finish(patch)
}

// ---------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------

/// Fields shared by the create and update schemas.
struct ContactExtras {
    email: Option<Option<String>>,
    phone: Option<Option<String>>,
    notes: Option<Option<String>>,
    company: Option<Option<String>>,
    department: Option<Option<String>>,
    emails: Option<Vec<String>>,
    phones: Option<Vec<String>>,
    social_links: Option<BTreeMap<String, String>>,
    tags: Option<Vec<String>>,
    address: Option<Address>,
    first_contact: Option<Option<String>>,
    last_contact: Option<Option<String>>,
    next_follow_up: Option<Option<String>>,
    relationship_status: Option<Option<String>>,
    relationship_strength: Option<Option<u8>>,
    profile_image: Option<Option<String>>,
    communication_preferences: Option<BTreeMap<String, bool>>,
    custom_fields: Option<Vec<String>>,
}

fn contact_extras(r: &mut Reader<'_>) -> ContactExtras {
    ContactExtras {
        email: r.nullable_string("email"),
        phone: r.nullable_string("phone"),
        notes: r.nullable_string("notes"),
        company: r.nullable_string("company"),
        department: r.nullable_string("department"),
        emails: r.string_list("emails", None),
        phones: r.string_list("phones", None),
        social_links: r.map_of("socialLinks", "string", string_map),
        tags: r.string_list("tags", None),
        address: r.address("address"),
        first_contact: r.nullable_date("firstContact"),
        last_contact: r.nullable_date("lastContact"),
        next_follow_up: r.nullable_date("nextFollowUp"),
        relationship_status: r.nullable_string("relationshipStatus"),
        relationship_strength: r.nullable_strength("relationshipStrength"),
        profile_image: r.nullable_string("profileImage"),
        communication_preferences: r.map_of("communicationPreferences", "boolean", bool_map),
        custom_fields: r.string_list("customFields", Some(MAX_CUSTOM_FIELDS)),
    }
}

pub fn new_contact(body: &Value) -> Result<NewContact> {
    let mut r = Reader::new(body)?;
    let name = r.required_string("name", true);
    let role = r.required_string("role", false);
    let cluster_id = r.required_integer("clusterId");
    let extras = contact_extras(&mut r);

    let input = NewContact {
        name: name.unwrap_or_default(),
        role: role.unwrap_or_default(),
        email: extras.email.flatten(),
        phone: extras.phone.flatten(),
        notes: extras.notes.flatten(),
        company: extras.company.flatten(),
        department: extras.department.flatten(),
        emails: extras.emails,
        phones: extras.phones,
        social_links: extras.social_links,
        tags: extras.tags,
        address: extras.address,
        first_contact: extras.first_contact.flatten(),
        last_contact: extras.last_contact.flatten(),
        next_follow_up: extras.next_follow_up.flatten(),
        relationship_status: extras.relationship_status.flatten(),
        relationship_strength: extras.relationship_strength.flatten(),
        profile_image: extras.profile_image.flatten(),
        communication_preferences: extras.communication_preferences,
        custom_fields: extras.custom_fields,
        cluster_id: cluster_id.unwrap_or_default(),
    };
    r.finish(input)
}

pub fn contact_patch(body: &Value) -> Result<ContactPatch> {
    let mut r = Reader::new(body)?;
    let name = r.patch_string("name", true);
    let role = r.patch_string("role", false);
    let cluster_id = r.patch_integer("clusterId");
    let extras = contact_extras(&mut r);

    let patch = ContactPatch {
        name,
        role,
        email: extras.email,
        phone: extras.phone,
        notes: extras.notes,
        company: extras.company,
        department: extras.department,
        emails: extras.emails,
        phones: extras.phones,
        social_links: extras.social_links,
        tags: extras.tags,
        address: extras.address,
        first_contact: extras.first_contact,
        last_contact: extras.last_contact,
        next_follow_up: extras.next_follow_up,
        relationship_status: extras.relationship_status,
        relationship_strength: extras.relationship_strength,
        profile_image: extras.profile_image,
        communication_preferences: extras.communication_preferences,
        custom_fields: extras.custom_fields,
        cluster_id,
    };
    r.finish(patch)
}

// ---------------------------------------------------------------
// Connections
// ---------------------------------------------------------------

pub fn new_connection(body: &Value) -> Result<NewConnection> {
    let mut r = Reader::new(body)?;
    let source_id = r.required_string("sourceId", true);
    let target_id = r.required_string("targetId", true);
    let source_type = r.entity_kind("sourceType");
    let target_type = r.entity_kind("targetType");

    match (source_id, target_id, source_type, target_type) {
        (Some(source_id), Some(target_id), Some(source_type), Some(target_type)) => {
            r.finish(NewConnection {
                source_id,
                target_id,
                source_type,
                target_type,
            })
        }
        _ => Err(Error::validation(render(&r.issues))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: Error) -> String {
        match err {
            Error::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_cluster_ok() {
        let input = new_cluster(&json!({"name": "Sales", "color": "rgba(1,2,3,0.4)"})).unwrap();
        assert_eq!(input.name, "Sales");
        assert_eq!(input.color, "rgba(1,2,3,0.4)");
    }

    #[test]
    fn test_new_cluster_collects_all_issues() {
        let msg = message(new_cluster(&json!({"color": 7})).unwrap_err());
        assert_eq!(
            msg,
            "Validation error: Required at \"name\"; Expected string, received number at \"color\""
        );
    }

    #[test]
    fn test_body_must_be_object() {
        let msg = message(new_cluster(&json!([1, 2])).unwrap_err());
        assert_eq!(msg, "Validation error: Expected object, received array");
    }

    #[test]
    fn test_blank_cluster_name_rejected() {
        let msg = message(cluster_patch(&json!({"name": "  "})).unwrap_err());
        assert!(msg.contains("at \"name\""));
        assert!(cluster_patch(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_new_contact_minimal() {
        let input = new_contact(&json!({"name": "Jo", "role": "Rep", "clusterId": 5})).unwrap();
        assert_eq!(input.cluster_id, 5);
        assert_eq!(input.emails, None);
        assert_eq!(input.email, None);
    }

    #[test]
    fn test_new_contact_rules() {
        let body = json!({
            "name": "",
            "role": "Rep",
            "clusterId": 1.5,
            "relationshipStrength": 6,
            "customFields": ["a", "b", "c", "d", "e", "f"],
            "firstContact": "yesterday",
            "tags": ["ok", 3],
        });
        let msg = message(new_contact(&body).unwrap_err());
        assert!(msg.contains("at \"name\""));
        assert!(msg.contains("Expected integer, received float at \"clusterId\""));
        assert!(msg.contains("less than or equal to 5 at \"relationshipStrength\""));
        assert!(msg.contains("at most 5 element(s) at \"customFields\""));
        assert!(msg.contains("Invalid date at \"firstContact\""));
        assert!(msg.contains("at \"tags.1\""));
    }

    #[test]
    fn test_new_contact_full() {
        let body = json!({
            "name": "Ana García",
            "role": "CFO",
            "clusterId": 2,
            "email": null,
            "socialLinks": {"linkedin": "https://example.com/ana"},
            "communicationPreferences": {"email": true, "phone": false},
            "address": {"city": "Madrid", "zip": ""},
            "firstContact": "2024-03-01",
            "lastContact": "2024-05-02T10:00:00Z",
            "relationshipStrength": 4,
            "customFields": ["likes tea"],
        });
        let input = new_contact(&body).unwrap();
        assert_eq!(input.relationship_strength, Some(4));
        let address = input.address.unwrap();
        assert_eq!(address.city.as_deref(), Some("Madrid"));
        assert_eq!(address.zip, None);
        assert_eq!(input.communication_preferences.unwrap()["email"], true);
    }

    #[test]
    fn test_contact_patch_tristate() {
        let patch = contact_patch(&json!({"email": null, "phone": "123"})).unwrap();
        assert_eq!(patch.email, Some(None));
        assert_eq!(patch.phone, Some(Some("123".into())));
        assert_eq!(patch.notes, None);
        assert_eq!(patch.cluster_id, None);

        let msg = message(contact_patch(&json!({"name": null})).unwrap_err());
        assert_eq!(msg, "Validation error: Expected string, received null at \"name\"");
    }

    #[test]
    fn test_new_connection() {
        let conn = new_connection(&json!({
            "sourceId": "1", "targetId": "2",
            "sourceType": "cluster", "targetType": "contact"
        }))
        .unwrap();
        assert_eq!(conn.source_type, EntityKind::Cluster);

        let msg = message(
            new_connection(&json!({
                "sourceId": "1", "targetId": "2",
                "sourceType": "team", "targetType": "contact"
            }))
            .unwrap_err(),
        );
        assert!(msg.contains("received 'team' at \"sourceType\""));
    }

    #[test]
    fn test_explicit_null_is_not_absent() {
        let msg = message(new_cluster(&json!({"name": null, "color": "red"})).unwrap_err());
        assert_eq!(msg, "Validation error: Expected string, received null at \"name\"");

        let input = new_contact(&json!({
            "name": "Jo", "role": "Rep", "clusterId": 1, "email": null
        }))
        .unwrap();
        assert_eq!(input.email, None);
    }
}
