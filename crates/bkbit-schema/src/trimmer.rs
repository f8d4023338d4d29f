//! Trim a LinkML schema down to the elements reachable from a keep list

use crate::error::{Result, SchemaError};
use crate::linkml::SchemaDefinition;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

pub const TRIMMER_CREATED_BY: &str = "BICAN_bkbit_linkml-trimmer";

/// Overrides applied to the trimmed schema header
#[derive(Debug, Clone, Default)]
pub struct SchemaHeader {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
}

pub struct SchemaTrimmer {
    schema: SchemaDefinition,
}

impl SchemaTrimmer {
    pub fn new(schema: SchemaDefinition) -> Self {
        Self { schema }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(SchemaDefinition::from_path(path)?))
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Keep the named elements and everything they reference
    pub fn trim_model(
        &mut self,
        keep_classes: &[String],
        keep_slots: &[String],
        keep_enums: &[String],
    ) -> Result<()> {
        let mut stack: Vec<String> = Vec::new();
        for name in keep_classes.iter().chain(keep_slots).chain(keep_enums) {
            if !(self.schema.is_class(name) || self.schema.is_slot(name) || self.schema.is_enum(name))
            {
                return Err(SchemaError::NotFound(name.clone()));
            }
            stack.push(name.clone());
        }

        let mut visited: BTreeSet<String> = BTreeSet::new();
        while let Some(name) = stack.pop() {
            if visited.contains(&name) {
                continue;
            }

            if let Some(class) = self.schema.classes.get(&name) {
                for parent in class.parents() {
                    if self.schema.is_class(parent) {
                        stack.push(parent.to_string());
                    }
                }
                for slot in class.slot_names() {
                    if self.schema.is_slot(slot) {
                        stack.push(slot.to_string());
                    }
                }
                for (_, inline) in class.inline_slots() {
                    for range in inline.ranges() {
                        if self.schema.is_class(range) || self.schema.is_enum(range) {
                            stack.push(range.to_string());
                        }
                    }
                    for parent in inline.parents() {
                        if self.schema.is_slot(parent) {
                            stack.push(parent.to_string());
                        }
                    }
                }
            } else if let Some(slot) = self.schema.slots.get(&name) {
                for range in slot.ranges() {
                    if self.schema.is_class(range) || self.schema.is_enum(range) {
                        stack.push(range.to_string());
                    }
                }
                for parent in slot.parents() {
                    if self.schema.is_slot(parent) {
                        stack.push(parent.to_string());
                    }
                }
            } else if let Some(definition) = self.schema.enums.get(&name) {
                for parent in definition.parents() {
                    if self.schema.is_enum(parent) {
                        stack.push(parent.to_string());
                    }
                }
            } else {
                return Err(SchemaError::NotFound(name));
            }
            visited.insert(name);
        }

        let before = (
            self.schema.classes.len(),
            self.schema.slots.len(),
            self.schema.enums.len(),
        );
        self.schema.classes.retain(|name, _| visited.contains(name));
        self.schema.slots.retain(|name, _| visited.contains(name));
        self.schema.enums.retain(|name, _| visited.contains(name));
        debug!(
            classes_removed = before.0 - self.schema.classes.len(),
            slots_removed = before.1 - self.schema.slots.len(),
            enums_removed = before.2 - self.schema.enums.len(),
            "Trimmed schema"
        );
        Ok(())
    }

    /// Apply the header overrides and render the schema as YAML
    pub fn serialize(&mut self, header: &SchemaHeader) -> Result<String> {
        if let Some(id) = &header.id {
            self.schema.id = Some(id.clone());
        }
        if let Some(name) = &header.name {
            self.schema.name = Some(name.clone());
        }
        if let Some(title) = &header.title {
            self.schema.title = Some(title.clone());
        }
        self.schema.version = match &header.version {
            Some(version) => Some(version.clone()),
            None => match (&self.schema.name, &self.schema.version) {
                (Some(name), Some(version)) => Some(format!("{}-{}", name, version)),
                (Some(name), None) => Some(name.clone()),
                (None, version) => version.clone(),
            },
        };
        self.schema.extra.insert(
            "created_by".to_string(),
            serde_yaml::Value::from(TRIMMER_CREATED_BY),
        );
        self.schema.to_yaml_string()
    }
}
