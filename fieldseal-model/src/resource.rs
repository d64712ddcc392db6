//! Per-resource field classification and cascade relations.

use crate::error::{ModelError, ModelResult};
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Static per-resource settings, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// Resource name; also the cache namespace and event channel prefix.
    pub name: String,
    /// Fields encrypted with a random IV.
    #[serde(default)]
    pub encrypted_fields: Vec<String>,
    /// Fields encrypted with the zero IV, so they stay matchable by equality.
    #[serde(default)]
    pub deterministic_encrypted_fields: Vec<String>,
    /// Fields replaced by a one-way hash on write.
    #[serde(default)]
    pub hashed_fields: Vec<String>,
    /// Dependent resources deleted before a record of this one.
    #[serde(default)]
    pub foreign_key_constraints: Vec<ForeignKeyConstraint>,
    /// TTL for cached reads; the host default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

/// Which treatment a classified field receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    Encrypted,
    DeterministicEncrypted,
    Hashed,
}

impl FieldClass {
    pub const fn is_encrypted(&self) -> bool {
        matches!(self, FieldClass::Encrypted | FieldClass::DeterministicEncrypted)
    }
}

impl std::fmt::Display for FieldClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FieldClass::Encrypted => "encryptedFields",
            FieldClass::DeterministicEncrypted => "deterministicEncryptedFields",
            FieldClass::Hashed => "hashedFields",
        })
    }
}

impl ResourceConfig {
    /// A resource with no classified fields and no relations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn encrypted<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encrypted_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn deterministic<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deterministic_encrypted_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn hashed<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hashed_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Declares a dependent resource using the default foreign-key field.
    pub fn cascade(mut self, resource: impl Into<String>) -> Self {
        self.foreign_key_constraints
            .push(ForeignKeyConstraint::new(resource));
        self
    }

    /// Declares a dependent resource with an explicit foreign-key field.
    pub fn cascade_on(mut self, resource: impl Into<String>, field: impl Into<String>) -> Self {
        self.foreign_key_constraints
            .push(ForeignKeyConstraint::with_field(resource, field));
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// The class of `field`, if it is classified at all.
    pub fn classify(&self, field: &str) -> Option<FieldClass> {
        self.classified_fields()
            .find(|(name, _)| *name == field)
            .map(|(_, class)| class)
    }

    /// Every classified field with its class, in declaration order: random,
    /// then deterministic, then hashed.
    pub fn classified_fields(&self) -> impl Iterator<Item = (&str, FieldClass)> {
        let random = self
            .encrypted_fields
            .iter()
            .map(|f| (f.as_str(), FieldClass::Encrypted));
        let deterministic = self
            .deterministic_encrypted_fields
            .iter()
            .map(|f| (f.as_str(), FieldClass::DeterministicEncrypted));
        let hashed = self
            .hashed_fields
            .iter()
            .map(|f| (f.as_str(), FieldClass::Hashed));
        random.chain(deterministic).chain(hashed)
    }

    /// Whether any field needs the encryption key.
    pub fn has_encrypted_fields(&self) -> bool {
        !self.encrypted_fields.is_empty() || !self.deterministic_encrypted_fields.is_empty()
    }

    pub fn has_classified_fields(&self) -> bool {
        self.has_encrypted_fields() || !self.hashed_fields.is_empty()
    }

    /// Checks the configuration before it is put into service.
    ///
    /// The three field sets must be pairwise disjoint, and no set may list a
    /// field twice or classify `id`.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyResourceName);
        }

        let mut seen: HashMap<&str, FieldClass> = HashMap::new();
        for (field, class) in self.classified_fields() {
            if field.trim().is_empty() {
                return Err(self.invalid_field(field, "field name is empty"));
            }
            if field == "id" {
                return Err(self.invalid_field(field, "the id field cannot be classified"));
            }
            if let Some(first) = seen.insert(field, class) {
                return Err(ModelError::OverlappingField {
                    resource: self.name.clone(),
                    field: field.to_string(),
                    first,
                    second: class,
                });
            }
        }

        for constraint in &self.foreign_key_constraints {
            if constraint.resource.trim().is_empty() {
                return Err(ModelError::InvalidConstraint {
                    resource: self.name.clone(),
                    reason: "related resource name is empty".into(),
                });
            }
            if constraint.field.as_deref().is_some_and(|f| f.trim().is_empty()) {
                return Err(ModelError::InvalidConstraint {
                    resource: self.name.clone(),
                    reason: format!("foreign-key field for '{}' is empty", constraint.resource),
                });
            }
        }

        Ok(())
    }

    fn invalid_field(&self, field: &str, reason: &str) -> ModelError {
        ModelError::InvalidField {
            resource: self.name.clone(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A dependent resource whose records reference this resource's `id`.
///
/// Deserializes from either a bare resource name or
/// `{ "resource": ..., "field": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConstraintRepr")]
pub struct ForeignKeyConstraint {
    pub resource: String,
    /// Field on the dependent resource holding the parent id. Defaults to
    /// `<parent>Id` with the parent name camel-cased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintRepr {
    Name(String),
    Full {
        resource: String,
        #[serde(default)]
        field: Option<String>,
    },
}

impl From<ConstraintRepr> for ForeignKeyConstraint {
    fn from(repr: ConstraintRepr) -> Self {
        match repr {
            ConstraintRepr::Name(resource) => Self::new(resource),
            ConstraintRepr::Full { resource, field } => Self { resource, field },
        }
    }
}

impl ForeignKeyConstraint {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            field: None,
        }
    }

    pub fn with_field(resource: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            field: Some(field.into()),
        }
    }

    /// The foreign-key field on the dependent resource, given the parent's name.
    pub fn field_for(&self, parent: &str) -> String {
        self.field
            .clone()
            .unwrap_or_else(|| default_foreign_key(parent))
    }
}

/// `order` → `orderId`, `line-item` → `lineItemId`.
pub fn default_foreign_key(parent: &str) -> String {
    format!("{}Id", parent.to_case(Case::Camel))
}
