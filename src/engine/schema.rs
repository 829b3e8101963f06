//! Attribute Schema
//!
//! Immutable description of the model's output layout: the ordered attribute
//! identifiers, the exclusive groups partitioning a subset of the index space,
//! and optional human-readable display labels.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SchemaError;

/// A named set of mutually exclusive attribute indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusiveGroup {
    pub name: String,
    /// Declared order; first index wins probability ties
    pub indices: Vec<usize>,
}

impl ExclusiveGroup {
    pub fn new(name: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            indices,
        }
    }
}

/// On-disk schema layout (TOML)
#[derive(Debug, Deserialize)]
struct SchemaFile {
    attributes: Vec<String>,
    #[serde(default)]
    groups: Vec<ExclusiveGroup>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

/// Validated attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    attributes: Vec<String>,
    groups: Vec<ExclusiveGroup>,
    labels: HashMap<usize, String>,
    /// Group position for each attribute index, `None` when ungrouped
    group_of: Vec<Option<usize>>,
}

impl AttributeSchema {
    /// Build and validate a schema.
    ///
    /// Fails with [`SchemaError`] when an index is shared between groups,
    /// falls outside `0..N`, or when identifiers are missing or duplicated.
    pub fn new(
        attributes: Vec<String>,
        groups: Vec<ExclusiveGroup>,
        labels: HashMap<usize, String>,
    ) -> Result<Self, SchemaError> {
        if attributes.is_empty() {
            return Err(SchemaError::EmptyAttributes);
        }

        let mut seen_ids = HashSet::with_capacity(attributes.len());
        for id in &attributes {
            if !seen_ids.insert(id.as_str()) {
                return Err(SchemaError::DuplicateAttributeId { id: id.clone() });
            }
        }

        let len = attributes.len();
        let mut group_of: Vec<Option<usize>> = vec![None; len];

        for (pos, group) in groups.iter().enumerate() {
            if group.indices.is_empty() {
                return Err(SchemaError::EmptyGroup {
                    group: group.name.clone(),
                });
            }
            for &index in &group.indices {
                if index >= len {
                    return Err(SchemaError::IndexOutOfRange {
                        group: group.name.clone(),
                        index,
                        len,
                    });
                }
                if let Some(owner) = group_of[index] {
                    return Err(SchemaError::DuplicateIndex {
                        index,
                        first: groups[owner].name.clone(),
                        second: group.name.clone(),
                    });
                }
                group_of[index] = Some(pos);
            }
        }

        if let Some(&index) = labels.keys().find(|&&i| i >= len) {
            return Err(SchemaError::LabelOutOfRange { index, len });
        }

        Ok(Self {
            attributes,
            groups,
            labels,
            group_of,
        })
    }

    /// Parse a schema from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile =
            toml::from_str(content).map_err(|e| SchemaError::Parse(e.to_string()))?;

        let mut labels = HashMap::with_capacity(file.labels.len());
        for (key, label) in file.labels {
            let index = key
                .trim()
                .parse::<usize>()
                .map_err(|_| SchemaError::Parse(format!("label key \"{}\" is not an index", key)))?;
            labels.insert(index, label);
        }

        Self::new(file.attributes, file.groups, labels)
    }

    /// Load and validate a schema file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let schema = Self::from_toml_str(&content)?;
        info!(
            "Loaded schema from {:?}: {} attributes, {} groups",
            path,
            schema.len(),
            schema.groups.len()
        );
        Ok(schema)
    }

    /// Number of attributes (N)
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn groups(&self) -> &[ExclusiveGroup] {
        &self.groups
    }

    pub fn labels(&self) -> &HashMap<usize, String> {
        &self.labels
    }

    pub fn attribute_id(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).map(String::as_str)
    }

    /// Configured display label, if any
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    /// Display key: label, falling back to the attribute id
    pub fn display_key(&self, index: usize) -> Option<&str> {
        self.label(index).or_else(|| self.attribute_id(index))
    }

    /// The group containing `index`, if any
    pub fn group_of(&self, index: usize) -> Option<&ExclusiveGroup> {
        self.group_of
            .get(index)
            .copied()
            .flatten()
            .map(|pos| &self.groups[pos])
    }

    pub fn is_grouped(&self, index: usize) -> bool {
        matches!(self.group_of.get(index), Some(Some(_)))
    }
}
