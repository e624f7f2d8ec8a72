//! The animal record and its identifier.
//!
//! An [`AnimalNode`] optionally points at exactly one ancestor. A node with a
//! non-empty scientific name is a *leaf species*; every other node is an
//! intermediate taxon (kingdom, class, genus, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::enrichment::EnrichmentStatus;
use crate::error::AncestryError;

/// Store-assigned animal identifier. Never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(u64);

impl AnimalId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an [`AnimalId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid animal id (expected a positive integer)")]
pub struct ParseAnimalIdError(String);

impl FromStr for AnimalId {
    type Err = ParseAnimalIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>() {
            Ok(raw) if raw > 0 => Ok(Self(raw)),
            _ => Err(ParseAnimalIdError(s.to_string())),
        }
    }
}

/// Descriptive attributes. None of them play a structural role except
/// `scientific_name`, whose presence marks a leaf species.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Attributes {
    /// Overwrite every field that is `Some` in `patch`; leave the rest.
    pub fn merge(&mut self, patch: Self) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.scientific_name, patch.scientific_name);
        take(&mut self.taxonomy_class, patch.taxonomy_class);
        take(&mut self.lifespan, patch.lifespan);
        take(&mut self.weight, patch.weight);
        take(&mut self.locations, patch.locations);
        take(&mut self.temperament, patch.temperament);
        take(&mut self.fun_fact, patch.fun_fact);
        take(&mut self.image_url, patch.image_url);
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn has_scientific_name(&self) -> bool {
        self.scientific_name
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// A single node of the ancestry forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalNode {
    pub id: AnimalId,
    pub name: String,
    #[serde(default)]
    pub ancestor_id: Option<AnimalId>,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(default)]
    pub enrichment: EnrichmentStatus,
}

impl AnimalNode {
    /// A leaf species is any node with a non-empty scientific name.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.attributes.has_scientific_name()
    }

    /// Returns `true` if the node declares no ancestor at all.
    ///
    /// A node whose ancestor was deleted is still not a root by this test;
    /// it is an *effective* root with a dangling link.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.ancestor_id.is_none()
    }

    #[must_use]
    pub fn scientific_name(&self) -> Option<&str> {
        self.attributes.scientific_name.as_deref()
    }
}

/// Input for creating a node. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAnimal {
    pub name: String,
    pub attributes: Attributes,
}

impl NewAnimal {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
        }
    }

    #[must_use]
    pub fn with_scientific_name(mut self, scientific_name: impl Into<String>) -> Self {
        self.attributes.scientific_name = Some(scientific_name.into());
        self
    }

    #[must_use]
    pub fn with_taxonomy_class(mut self, taxonomy_class: impl Into<String>) -> Self {
        self.attributes.taxonomy_class = Some(taxonomy_class.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Length limits applied to names on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameLimits {
    pub max_name_len: usize,
    pub max_scientific_len: usize,
}

impl Default for NameLimits {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_scientific_len: 200,
        }
    }
}

impl NameLimits {
    /// Trim and validate a display name, returning the stored form.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::Validation`] if the name is empty after
    /// trimming, too long, or contains control characters.
    pub fn check_name(&self, raw: &str) -> Result<String, AncestryError> {
        check_text("name", raw, self.max_name_len)
    }

    /// Validate the scientific name inside `attributes`, trimming it in place.
    ///
    /// # Errors
    ///
    /// Returns [`AncestryError::Validation`] if the scientific name is present
    /// but too long or contains control characters. A blank scientific name is
    /// normalized to `None`.
    pub fn check_attributes(&self, attributes: &mut Attributes) -> Result<(), AncestryError> {
        if let Some(raw) = attributes.scientific_name.take() {
            if raw.trim().is_empty() {
                return Ok(());
            }
            attributes.scientific_name =
                Some(check_text("scientific_name", &raw, self.max_scientific_len)?);
        }
        Ok(())
    }
}

fn check_text(field: &'static str, raw: &str, max_len: usize) -> Result<String, AncestryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AncestryError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(AncestryError::validation(
            field,
            format!("must be <= {max_len} characters"),
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(AncestryError::validation(
            field,
            "must not contain control characters",
        ));
    }
    Ok(trimmed.to_string())
}
