//! Client-side form checks run before a request is sent.
//!
//! The server validates again; these only give early, per-field feedback.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use portico_core::{Cluster, NewCluster, NewContact};

/// Colors offered when creating a cluster.
pub const CLUSTER_PALETTE: [&str; 8] = [
    "rgba(173, 216, 230, 0.45)",
    "rgba(144, 238, 144, 0.45)",
    "rgba(221, 160, 221, 0.45)",
    "rgba(255, 255, 224, 0.45)",
    "rgba(255, 182, 193, 0.45)",
    "rgba(240, 230, 140, 0.45)",
    "rgba(176, 224, 230, 0.45)",
    "rgba(255, 218, 185, 0.45)",
];

pub const DEFAULT_CLUSTER_COLOR: &str = CLUSTER_PALETTE[1];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap()
});

/// Field name to message, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, &'static str>);

impl FormErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterForm {
    pub name: String,
    pub color: String,
}

impl Default for ClusterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: DEFAULT_CLUSTER_COLOR.to_string(),
        }
    }
}

impl ClusterForm {
    /// Prefilled for editing an existing cluster.
    pub fn edit(cluster: &Cluster) -> Self {
        Self {
            name: cluster.name.clone(),
            color: cluster.color.clone(),
        }
    }

    pub fn validate(&self) -> Result<NewCluster, FormErrors> {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "Name ist erforderlich");
        }
        if self.color.trim().is_empty() {
            errors.add("color", "Farbe ist erforderlich");
        }
        errors.into_result(NewCluster {
            name: self.name.trim().to_string(),
            color: self.color.trim().to_string(),
        })
    }

    /// `validate` plus a best-effort duplicate check against a known list.
    /// The server enforces uniqueness atomically; this only warns early.
    pub fn validate_against(
        &self,
        existing: &[Cluster],
        editing: Option<i64>,
    ) -> Result<NewCluster, FormErrors> {
        let input = self.validate()?;
        let wanted = input.name.to_lowercase();
        let taken = existing
            .iter()
            .any(|c| Some(c.id) != editing && c.name.trim().to_lowercase() == wanted);
        if taken {
            let mut errors = FormErrors::default();
            errors.add("name", "Ein Bereich mit diesem Namen existiert bereits");
            return Err(errors);
        }
        Ok(input)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub role: String,
    /// Empty means no email.
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub cluster_id: Option<i64>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContact, FormErrors> {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "Name ist erforderlich");
        }
        if self.role.trim().is_empty() {
            errors.add("role", "Rolle ist erforderlich");
        }
        let email = self.email.trim();
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            errors.add("email", "Ungültige E-Mail-Adresse");
        }
        if self.cluster_id.is_none() {
            errors.add("clusterId", "Bitte wählen Sie einen Cluster aus");
        }
        errors.into_result(NewContact {
            name: self.name.trim().to_string(),
            role: self.role.trim().to_string(),
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            notes: non_empty(&self.notes),
            cluster_id: self.cluster_id.unwrap_or_default(),
            ..Default::default()
        })
    }
}
