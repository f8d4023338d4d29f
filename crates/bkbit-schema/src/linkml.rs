//! Typed subset of the LinkML metamodel
//!
//! Only the metaslots the schema tools read or write are typed. Every other
//! key lands in the `extra` map of its element and is written back unchanged.
//! YAML entries without a body (`Donor:`) load as empty definitions.

use crate::error::{Result, SchemaError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub type Extra = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(
        default,
        deserialize_with = "prefix_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_range: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub subsets: BTreeMap<String, SubsetDefinition>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, serde_yaml::Value>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub enums: BTreeMap<String, EnumDefinition>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub slots: BTreeMap<String, SlotDefinition>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub classes: BTreeMap<String, ClassDefinition>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_uri: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub in_subset: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub exact_mappings: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub slot_usage: BTreeMap<String, SlotDefinition>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub attributes: BTreeMap<String, SlotDefinition>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ClassDefinition {
    /// `is_a` followed by the mixins
    pub fn parents(&self) -> Vec<&str> {
        self.is_a
            .iter()
            .chain(self.mixins.iter())
            .map(String::as_str)
            .collect()
    }

    /// Slot names used by the class: `slots`, then attributes, then slot_usage
    pub fn slot_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .chain(self.attributes.keys())
            .chain(self.slot_usage.keys())
            .map(String::as_str)
            .collect()
    }

    /// Inline slot definitions: attributes followed by slot_usage
    pub fn inline_slots(&self) -> impl Iterator<Item = (&String, &SlotDefinition)> {
        self.attributes.iter().chain(self.slot_usage.iter())
    }
}

/// Range expression inside `any_of` / `exactly_one_of`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymousSlotExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl AnonymousSlotExpression {
    pub fn with_range(range: impl Into<String>) -> Self {
        Self {
            range: Some(range.into()),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalName {
    pub local_name_source: String,
    pub local_name_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<AnonymousSlotExpression>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<AnonymousSlotExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlined: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub in_subset: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub exact_mappings: Vec<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub local_names: BTreeMap<String, LocalName>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl SlotDefinition {
    /// `range` plus every range listed in `any_of` and `exactly_one_of`
    pub fn ranges(&self) -> Vec<&str> {
        self.range
            .iter()
            .map(String::as_str)
            .chain(
                self.any_of
                    .iter()
                    .chain(self.exactly_one_of.iter())
                    .filter_map(|expr| expr.range.as_deref()),
            )
            .collect()
    }

    pub fn parents(&self) -> Vec<&str> {
        self.is_a
            .iter()
            .chain(self.mixins.iter())
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissibleValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_uri: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_entries",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub permissible_values: BTreeMap<String, PermissibleValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl EnumDefinition {
    pub fn parents(&self) -> Vec<&str> {
        self.is_a
            .iter()
            .chain(self.mixins.iter())
            .map(String::as_str)
            .collect()
    }
}

impl SchemaDefinition {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn is_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }
}

fn or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_entries<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let entries: Option<BTreeMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(name, definition)| (name, definition.unwrap_or_default()))
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PrefixEntry {
    Reference(String),
    Expanded { prefix_reference: String },
}

fn prefix_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<BTreeMap<String, PrefixEntry>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(prefix, entry)| match entry {
            PrefixEntry::Reference(reference) | PrefixEntry::Expanded { prefix_reference: reference } => {
                (prefix, reference)
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
id: https://identifiers.org/brain-bican/library-generation-schema
name: library_generation
version: 1.0.0
created_by: someone
prefixes:
  bican: https://identifiers.org/brain-bican/vocab/
  linkml:
    prefix_prefix: linkml
    prefix_reference: https://w3id.org/linkml/
imports:
  - linkml:types
classes:
  Donor:
    is_a: ProvActivity
    mixins: [Thing]
    slots: [name]
    attributes:
      age_at_death:
        range: integer
    slot_usage:
      was_derived_from:
        any_of:
          - range: Specimen
          - range: string
    annotations:
      note: kept
  Thing:
slots:
  name:
  was_derived_from:
    exactly_one_of:
      - range: Donor
enums:
  Sex:
    permissible_values:
      Male:
        meaning: PATO:0000384
      Female:
"#;

    #[test]
    fn test_null_entries_become_empty_definitions() {
        let schema = SchemaDefinition::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.classes["Thing"], ClassDefinition::default());
        assert_eq!(schema.slots["name"], SlotDefinition::default());
        assert!(schema.enums["Sex"].permissible_values["Female"].meaning.is_none());
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let schema = SchemaDefinition::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.extra["created_by"], serde_yaml::Value::from("someone"));
        assert!(schema.classes["Donor"].extra.contains_key("annotations"));

        let text = schema.to_yaml_string().unwrap();
        let reloaded = SchemaDefinition::from_yaml_str(&text).unwrap();
        assert_eq!(reloaded, schema);
    }

    #[test]
    fn test_expanded_prefixes() {
        let schema = SchemaDefinition::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.prefixes["linkml"], "https://w3id.org/linkml/");
        assert_eq!(schema.prefixes["bican"], "https://identifiers.org/brain-bican/vocab/");
    }

    #[test]
    fn test_helpers() {
        let schema = SchemaDefinition::from_yaml_str(SCHEMA).unwrap();
        let donor = &schema.classes["Donor"];
        assert_eq!(donor.parents(), vec!["ProvActivity", "Thing"]);
        assert_eq!(donor.slot_names(), vec!["name", "age_at_death", "was_derived_from"]);
        assert_eq!(
            donor.slot_usage["was_derived_from"].ranges(),
            vec!["Specimen", "string"]
        );
        assert_eq!(schema.slots["was_derived_from"].ranges(), vec!["Donor"]);
        assert!(schema.enums["Sex"].parents().is_empty());
    }
}
