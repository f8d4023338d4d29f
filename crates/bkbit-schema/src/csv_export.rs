//! Export a LinkML schema as the CSV tables used to edit the BICAN model

use crate::error::{Result, SchemaError};
use crate::linkml::{AnonymousSlotExpression, SchemaDefinition, SlotDefinition};
use crate::sheets::SIMPLE_TYPES_NOSTR;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub const DEFAULT_OUTPUT_DIR: &str = "output_dir_cvs";

pub const PREFIXES_FILE: &str = "prefixes.csv";
pub const ENUMS_FILE: &str = "enums.csv";
pub const CLASSES_FILE: &str = "classes.csv";
pub const SLOTS_FILE: &str = "slots.csv";

/// Class carried by every schema and left out of the class table
const ROOT_CLASS: &str = "NamedThing";

type Header = (&'static str, &'static str, &'static str);

const CLASS_HEADERS: [Header; 6] = [
    ("Class Name", "> class", ">"),
    ("Inheritance: is_a", "is_a", ""),
    ("Inheritance: mixin", "mixins", "internal_separator: \"|\""),
    ("Subsets", "in_subset", "internal_separator: \"|\""),
    ("Description", "description", ""),
    ("NIMP Terminology NHash", "exact_mappings: {curie_prefix: NIMP}", ""),
];

const SLOT_HEADERS: [Header; 19] = [
    ("Proposed BICAN Field", "> alias", ">"),
    ("LinkML Slot or Attribute Name", "attribute", ""),
    ("BICAN UUID", "slot_uri: {curie_prefix: bican}", ""),
    ("SubGroup/LinkML Class Name", "class", ""),
    ("Definition", "description", ""),
    ("Required (True/False)", "is_required", ""),
    ("Multivalued (True/False)", "multivalued", ""),
    ("Data Type/Value Set", "range", ""),
    ("Data Examples", "ignore", ""),
    ("Min Value", "ignore", ""),
    ("Max Value", "ignore", ""),
    ("Unit", "ignore", ""),
    ("Statistical Type", "ignore", ""),
    ("Subsets", "in_subset", "internal_separator: \"|\""),
    ("Notes", "ignore", ""),
    ("NIMP Category", "ignore", ""),
    ("NIMP Terminology NHash", "exact_mappings: {curie_prefix: NIMP}", ""),
    ("Local Variable Name (e.g. NIMP)", "local_names", "inner_key: local_name_value"),
    ("Local Variable Source (e.g. NIMP)", "local_names", "inner_key: local_name_source"),
];

const ENUM_HEADERS: [Header; 4] = [
    ("Value Set Name", "> enum", ">"),
    ("Permissible Value", "permissible_value", ""),
    ("Description", "description", ""),
    ("NIMP Terminology NHash", "meaning: {curie_prefix: NIMP}", ""),
];

const PREFIX_HEADERS: [(&str, &str); 8] = [
    ("Schema Name", "> schema"),
    ("Title", "title"),
    ("Description", "description"),
    ("ID", "id"),
    ("Default Prefix", "default_prefix"),
    ("Imports", "imports"),
    ("Prefix", "prefix"),
    ("Prefix URI", "prefix_reference"),
];

type Rows = Vec<Vec<String>>;

fn header_rows(headers: &[Header]) -> Rows {
    vec![
        headers.iter().map(|h| h.0.to_string()).collect(),
        headers.iter().map(|h| h.1.to_string()).collect(),
        headers.iter().map(|h| h.2.to_string()).collect(),
    ]
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

/// Union ranges without the `string` added for id references
fn any_of_ranges(any_of: &[AnonymousSlotExpression]) -> Vec<String> {
    let mut ranges: Vec<String> = any_of.iter().filter_map(|expr| expr.range.clone()).collect();
    let has_simple = ranges
        .iter()
        .any(|range| SIMPLE_TYPES_NOSTR.contains(&range.as_str()));
    if !has_simple {
        if let Some(index) = ranges.iter().position(|range| range == "string") {
            ranges.remove(index);
        }
    }
    ranges
}

fn slot_range(slot: &SlotDefinition) -> String {
    if let Some(range) = &slot.range {
        range.clone()
    } else if !slot.any_of.is_empty() {
        any_of_ranges(&slot.any_of).join("|")
    } else {
        "string".to_string()
    }
}

pub fn prefix_rows(schema: &SchemaDefinition) -> Rows {
    let mut rows: Rows = vec![
        PREFIX_HEADERS.iter().map(|h| h.0.to_string()).collect(),
        PREFIX_HEADERS.iter().map(|h| h.1.to_string()).collect(),
    ];
    rows.push(vec![
        text(&schema.name),
        text(&schema.title),
        text(&schema.description),
        text(&schema.id),
        text(&schema.default_prefix),
        String::new(),
        String::new(),
        String::new(),
    ]);
    for import in schema.imports.iter().filter(|import| *import != "linkml:types") {
        let mut row = vec![String::new(); 8];
        row[5] = import.clone();
        rows.push(row);
    }
    for (prefix, reference) in &schema.prefixes {
        let mut row = vec![String::new(); 8];
        row[6] = prefix.clone();
        row[7] = reference.clone();
        rows.push(row);
    }
    rows
}

pub fn enum_rows(schema: &SchemaDefinition) -> Rows {
    let mut rows = header_rows(&ENUM_HEADERS);
    for (enum_name, definition) in &schema.enums {
        for (value_name, value) in &definition.permissible_values {
            rows.push(vec![
                enum_name.clone(),
                value_name.clone(),
                text(&value.title),
                text(&value.meaning),
            ]);
        }
    }
    rows
}

/// Class table and slot table; slot_usage entries override attributes
pub fn class_and_slot_rows(schema: &SchemaDefinition) -> (Rows, Rows) {
    let mut classes = header_rows(&CLASS_HEADERS);
    let mut slots = header_rows(&SLOT_HEADERS);

    for (class_name, class) in schema.classes.iter().filter(|(name, _)| *name != ROOT_CLASS) {
        classes.push(vec![
            class_name.clone(),
            text(&class.is_a),
            class.mixins.join("|"),
            class.in_subset.join("|"),
            text(&class.description),
            String::new(),
        ]);

        let mut class_slots: BTreeMap<&String, &SlotDefinition> = class.attributes.iter().collect();
        class_slots.extend(class.slot_usage.iter());
        for (slot_name, slot) in class_slots {
            let mut row = vec![
                String::new(),
                slot_name.clone(),
                text(&slot.slot_uri),
                class_name.clone(),
                text(&slot.description),
                flag(slot.required),
                flag(slot.multivalued),
                slot_range(slot),
            ];
            row.resize(SLOT_HEADERS.len(), String::new());
            slots.push(row);
        }
    }
    (classes, slots)
}

fn write_rows(path: &Path, rows: &Rows) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| SchemaError::io(path, e))
}

/// Write the four model tables into `output_dir`
pub fn yaml2csv(schema: &SchemaDefinition, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| SchemaError::io(output_dir, e))?;

    write_rows(&output_dir.join(PREFIXES_FILE), &prefix_rows(schema))?;
    write_rows(&output_dir.join(ENUMS_FILE), &enum_rows(schema))?;
    let (classes, slots) = class_and_slot_rows(schema);
    write_rows(&output_dir.join(CLASSES_FILE), &classes)?;
    write_rows(&output_dir.join(SLOTS_FILE), &slots)?;

    info!(dir = %output_dir.display(), "Wrote model tables");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
id: https://identifiers.org/brain-bican/donor
name: donor
title: Donor schema
default_prefix: bican
imports: [linkml:types, bican_core]
prefixes:
  bican: https://identifiers.org/brain-bican/vocab/
classes:
  NamedThing:
  Donor:
    is_a: NamedThing
    mixins: [Thing, Other]
    description: A donor
    attributes:
      age:
        range: integer
        required: true
      parent:
        any_of:
          - range: Donor
          - range: string
    slot_usage:
      age:
        range: float
        multivalued: false
      label:
        any_of:
          - range: integer
          - range: string
enums:
  Sex:
    permissible_values:
      Male:
        title: male
        meaning: NIMP:PV-1
      Female:
"#;

    fn schema() -> SchemaDefinition {
        SchemaDefinition::from_yaml_str(SCHEMA).unwrap()
    }

    #[test]
    fn test_prefix_rows() {
        let rows = prefix_rows(&schema());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1][0], "> schema");
        assert_eq!(rows[2][..5], ["donor", "Donor schema", "", "https://identifiers.org/brain-bican/donor", "bican"]);
        assert_eq!(rows[3][5], "bican_core");
        assert_eq!(rows[4][6..], ["bican", "https://identifiers.org/brain-bican/vocab/"]);
    }

    #[test]
    fn test_enum_rows() {
        let rows = enum_rows(&schema());
        assert_eq!(rows[3], vec!["Sex", "Female", "", ""]);
        assert_eq!(rows[4], vec!["Sex", "Male", "male", "NIMP:PV-1"]);
    }

    #[test]
    fn test_class_and_slot_rows() {
        let (classes, slots) = class_and_slot_rows(&schema());
        assert_eq!(classes.len(), 4);
        assert_eq!(classes[3], vec!["Donor", "NamedThing", "Thing|Other", "", "A donor", ""]);

        assert_eq!(slots.len(), 6);
        let by_name = |name: &str| slots.iter().find(|row| row[1] == name).unwrap().clone();
        let age = by_name("age");
        assert_eq!(age.len(), 19);
        assert_eq!(age[5..8], ["", "False", "float"]);
        assert_eq!(by_name("parent")[7], "Donor");
        assert_eq!(by_name("label")[7], "integer|string");
    }

    #[test]
    fn test_yaml2csv_writes_tables() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join(DEFAULT_OUTPUT_DIR);
        yaml2csv(&schema(), &output).unwrap();

        for file in [PREFIXES_FILE, ENUMS_FILE, CLASSES_FILE, SLOTS_FILE] {
            assert!(output.join(file).exists(), "{} missing", file);
        }
        let classes = std::fs::read_to_string(output.join(CLASSES_FILE)).unwrap();
        assert!(classes.starts_with("Class Name,Inheritance: is_a"));
        assert!(classes.contains("\"internal_separator: \"\"|\"\"\""));
    }
}
