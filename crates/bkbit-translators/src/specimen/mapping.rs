//! Mapping of portal records onto library generation classes
//!
//! Each class has a static table naming, for every schema field, the NIMP
//! field it is read from and how the raw JSON value is coerced. The resulting
//! attribute map is hashed into the object id before being deserialized into
//! the typed model.

use super::error::{Result, SpecimenError};
use super::types::NodeRecord;
use crate::models::library_generation::{
    AmplifiedCdna, BarcodedCellSample, BicanObject, BrainSlab, DissectionRoiPolygon,
    DissociatedCellSample, Donor, EnrichedCellSample, Library, LibraryAliquot, LibraryPool,
    TissueSample, AGE_AT_DEATH_REFERENCE_POINT_VALUES, AGE_AT_DEATH_UNIT_VALUES,
    CELL_PREP_TYPE_VALUES, PASS_FAIL_RESULT_VALUES,
};
use bkbit_common::object_id::generate_object_id;
use serde_json::{Map, Value};
use tracing::warn;

/// Prefix of cross references to portal records
pub const NIMP_PREFIX: &str = "NIMP:";

/// How a raw portal value is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Float,
    Bool,
    Enum(&'static [&'static str]),
}

/// Where a schema field's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// `NIMP:<record id>` cross reference
    RecordId,
    /// Parent NHash ids from the graph
    Parents,
    /// A field of the portal record
    Record(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub source: FieldSource,
    pub kind: FieldKind,
    pub multivalued: bool,
    pub required: bool,
}

const fn field(field: &'static str, nimp: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        field,
        source: FieldSource::Record(nimp),
        kind,
        multivalued: false,
        required: false,
    }
}

const fn list(field: &'static str, nimp: &'static str) -> FieldSpec {
    FieldSpec {
        field,
        source: FieldSource::Record(nimp),
        kind: FieldKind::Str,
        multivalued: true,
        required: false,
    }
}

const XREF: FieldSpec = FieldSpec {
    field: "xref",
    source: FieldSource::RecordId,
    kind: FieldKind::Str,
    multivalued: true,
    required: true,
};

const SINGLE_PARENT: FieldSpec = FieldSpec {
    field: "was_derived_from",
    source: FieldSource::Parents,
    kind: FieldKind::Str,
    multivalued: false,
    required: false,
};

const MULTI_PARENT: FieldSpec = FieldSpec {
    field: "was_derived_from",
    source: FieldSource::Parents,
    kind: FieldKind::Str,
    multivalued: true,
    required: false,
};

const PASS_FAIL: FieldKind = FieldKind::Enum(PASS_FAIL_RESULT_VALUES);

const DONOR_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "local_name", FieldKind::Str),
    field("biological_sex", "sex", FieldKind::Str),
    field("age_at_death_description", "age_at_death_description", FieldKind::Str),
    field(
        "age_at_death_reference_point",
        "age_at_death_reference_point",
        FieldKind::Enum(AGE_AT_DEATH_REFERENCE_POINT_VALUES),
    ),
    field("age_at_death_unit", "age_at_death_unit", FieldKind::Enum(AGE_AT_DEATH_UNIT_VALUES)),
    field("age_at_death_value", "age_of_death", FieldKind::Float),
    field("species", "donor_species", FieldKind::Str),
];

const BRAIN_SLAB_FIELDS: &[FieldSpec] =
    &[XREF, field("name", "slab_local_name", FieldKind::Str), SINGLE_PARENT];

const DISSECTION_ROI_POLYGON_FIELDS: &[FieldSpec] =
    &[XREF, field("name", "roi_local_name", FieldKind::Str), SINGLE_PARENT];

const TISSUE_SAMPLE_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "tissue_sample_local_name", FieldKind::Str),
    list("structure", "structure"),
    SINGLE_PARENT,
];

const DISSOCIATED_CELL_SAMPLE_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "dissociated_cell_sample_local_name", FieldKind::Str),
    field(
        "cell_prep_type",
        "dissociated_cell_sample_cell_prep_type",
        FieldKind::Enum(CELL_PREP_TYPE_VALUES),
    ),
    field(
        "cell_source_oligo_name",
        "dissociated_cell_sample_cell_label_barcode",
        FieldKind::Str,
    ),
    MULTI_PARENT,
];

const ENRICHED_CELL_SAMPLE_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "enriched_cell_sample_local_name", FieldKind::Str),
    field("enrichment_population", "enrichment_population", FieldKind::Str),
    field(
        "cell_source_oligo_name",
        "enriched_cell_sample_cell_label_barcode",
        FieldKind::Str,
    ),
    field("histone_modification_marker", "histone_modification_marker", FieldKind::Str),
    MULTI_PARENT,
];

const BARCODED_CELL_SAMPLE_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "barcoded_cell_sample_local_name", FieldKind::Str),
    field(
        "number_of_expected_cells",
        "barcoded_cell_sample_number_of_expected_cells",
        FieldKind::Int,
    ),
    MULTI_PARENT,
];

const AMPLIFIED_CDNA_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "amplified_cdna_local_name", FieldKind::Str),
    field("quantity_ng", "amplified_cdna_amplified_quantity_ng", FieldKind::Float),
    field("pass_fail_result", "amplified_cdna_rna_amplification_pass_fail", PASS_FAIL),
    field(
        "percent_cdna_longer_than_400bp",
        "amplified_cdna_percent_cdna_longer_than_400bp",
        FieldKind::Float,
    ),
    SINGLE_PARENT,
];

const LIBRARY_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "library_local_name", FieldKind::Str),
    field("average_size_bp", "library_avg_size_bp", FieldKind::Int),
    field("concentration_nm", "library_concentration_nm", FieldKind::Float),
    field("pass_fail_result", "library_prep_pass_fail", PASS_FAIL),
    field("quantity_fmol", "library_quantification_fmol", FieldKind::Float),
    field("quantity_ng", "library_quantification_ng", FieldKind::Float),
    field("r1_r2_index", "library_r1_r2_index", FieldKind::Str),
    SINGLE_PARENT,
];

const LIBRARY_ALIQUOT_FIELDS: &[FieldSpec] =
    &[XREF, field("name", "library_aliquot_local_name", FieldKind::Str), SINGLE_PARENT];

const LIBRARY_POOL_FIELDS: &[FieldSpec] = &[
    XREF,
    field("name", "library_pool_local_name", FieldKind::Str),
    field("local_tube_id", "library_pool_local_tube_id", FieldKind::Str),
    MULTI_PARENT,
];

/// Library generation classes a portal category can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecimenClass {
    Donor,
    BrainSlab,
    DissectionRoiPolygon,
    TissueSample,
    DissociatedCellSample,
    EnrichedCellSample,
    BarcodedCellSample,
    AmplifiedCdna,
    Library,
    LibraryAliquot,
    LibraryPool,
}

impl SpecimenClass {
    /// Class for a NIMP record category
    pub fn from_category(category: &str) -> Option<Self> {
        match category {
            "Library Pool" => Some(SpecimenClass::LibraryPool),
            "Library Aliquot" => Some(SpecimenClass::LibraryAliquot),
            "Library" => Some(SpecimenClass::Library),
            "Amplified cDNA" => Some(SpecimenClass::AmplifiedCdna),
            "Barcoded Cell Sample" => Some(SpecimenClass::BarcodedCellSample),
            "Enriched Cell Sample" => Some(SpecimenClass::EnrichedCellSample),
            "Dissociated Cell Sample" => Some(SpecimenClass::DissociatedCellSample),
            "Tissue" => Some(SpecimenClass::TissueSample),
            "Donor" => Some(SpecimenClass::Donor),
            "Specimen Dissected ROI" => Some(SpecimenClass::DissectionRoiPolygon),
            "Slab" => Some(SpecimenClass::BrainSlab),
            _ => None,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            SpecimenClass::Donor => "Donor",
            SpecimenClass::BrainSlab => "BrainSlab",
            SpecimenClass::DissectionRoiPolygon => "DissectionRoiPolygon",
            SpecimenClass::TissueSample => "TissueSample",
            SpecimenClass::DissociatedCellSample => "DissociatedCellSample",
            SpecimenClass::EnrichedCellSample => "EnrichedCellSample",
            SpecimenClass::BarcodedCellSample => "BarcodedCellSample",
            SpecimenClass::AmplifiedCdna => "AmplifiedCdna",
            SpecimenClass::Library => "Library",
            SpecimenClass::LibraryAliquot => "LibraryAliquot",
            SpecimenClass::LibraryPool => "LibraryPool",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            SpecimenClass::Donor => DONOR_FIELDS,
            SpecimenClass::BrainSlab => BRAIN_SLAB_FIELDS,
            SpecimenClass::DissectionRoiPolygon => DISSECTION_ROI_POLYGON_FIELDS,
            SpecimenClass::TissueSample => TISSUE_SAMPLE_FIELDS,
            SpecimenClass::DissociatedCellSample => DISSOCIATED_CELL_SAMPLE_FIELDS,
            SpecimenClass::EnrichedCellSample => ENRICHED_CELL_SAMPLE_FIELDS,
            SpecimenClass::BarcodedCellSample => BARCODED_CELL_SAMPLE_FIELDS,
            SpecimenClass::AmplifiedCdna => AMPLIFIED_CDNA_FIELDS,
            SpecimenClass::Library => LIBRARY_FIELDS,
            SpecimenClass::LibraryAliquot => LIBRARY_ALIQUOT_FIELDS,
            SpecimenClass::LibraryPool => LIBRARY_POOL_FIELDS,
        }
    }

    fn build(&self, attributes: Map<String, Value>) -> Result<BicanObject> {
        let value = Value::Object(attributes);
        Ok(match self {
            SpecimenClass::Donor => BicanObject::Donor(serde_json::from_value::<Donor>(value)?),
            SpecimenClass::BrainSlab => {
                BicanObject::BrainSlab(serde_json::from_value::<BrainSlab>(value)?)
            },
            SpecimenClass::DissectionRoiPolygon => BicanObject::DissectionRoiPolygon(
                serde_json::from_value::<DissectionRoiPolygon>(value)?,
            ),
            SpecimenClass::TissueSample => {
                BicanObject::TissueSample(serde_json::from_value::<TissueSample>(value)?)
            },
            SpecimenClass::DissociatedCellSample => BicanObject::DissociatedCellSample(
                serde_json::from_value::<DissociatedCellSample>(value)?,
            ),
            SpecimenClass::EnrichedCellSample => BicanObject::EnrichedCellSample(
                serde_json::from_value::<EnrichedCellSample>(value)?,
            ),
            SpecimenClass::BarcodedCellSample => BicanObject::BarcodedCellSample(
                serde_json::from_value::<BarcodedCellSample>(value)?,
            ),
            SpecimenClass::AmplifiedCdna => {
                BicanObject::AmplifiedCdna(serde_json::from_value::<AmplifiedCdna>(value)?)
            },
            SpecimenClass::Library => {
                BicanObject::Library(serde_json::from_value::<Library>(value)?)
            },
            SpecimenClass::LibraryAliquot => {
                BicanObject::LibraryAliquot(serde_json::from_value::<LibraryAliquot>(value)?)
            },
            SpecimenClass::LibraryPool => {
                BicanObject::LibraryPool(serde_json::from_value::<LibraryPool>(value)?)
            },
        })
    }
}

/// Build the typed object for a portal record
///
/// `parents` are the NHash ids of the record's parents; they are stored as-is
/// and rewritten to object ids once the whole graph has been generated.
pub fn generate_bican_object(node: &NodeRecord, parents: Option<&[String]>) -> Result<BicanObject> {
    let category = node.category.as_deref().unwrap_or_default();
    let class = SpecimenClass::from_category(category)
        .ok_or_else(|| SpecimenError::UnsupportedCategory(category.to_string()))?;

    let mut attributes = build_attributes(class.fields(), node, parents)?;
    attributes.insert(
        "category".to_string(),
        Value::Array(vec![Value::String(format!("bican:{}", class.class_name()))]),
    );

    let id = generate_object_id(&Value::Object(attributes.clone()));
    attributes.insert("id".to_string(), Value::String(id));

    class.build(attributes)
}

/// Attribute map for a record according to a field table; unset fields are null
pub fn build_attributes(
    fields: &[FieldSpec],
    node: &NodeRecord,
    parents: Option<&[String]>,
) -> Result<Map<String, Value>> {
    let mut attributes = Map::new();

    for spec in fields {
        let value = match spec.source {
            FieldSource::RecordId => {
                let id = node.id.as_deref().ok_or(SpecimenError::MissingRecordId)?;
                let xref = Value::String(format!("{}{}", NIMP_PREFIX, id));
                if spec.multivalued {
                    Value::Array(vec![xref])
                } else {
                    xref
                }
            },
            FieldSource::Parents => match parents {
                Some(parents) if spec.multivalued => {
                    Value::Array(parents.iter().cloned().map(Value::String).collect())
                },
                Some(parents) => parents
                    .first()
                    .cloned()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
                None => Value::Null,
            },
            FieldSource::Record(nimp_name) => match node.record.get(nimp_name) {
                None | Some(Value::Null) => Value::Null,
                Some(raw) => coerce(spec, raw)?,
            },
        };

        if value.is_null() && spec.required {
            return Err(SpecimenError::MissingRequiredField(spec.field.to_string()));
        }
        attributes.insert(spec.field.to_string(), value);
    }

    Ok(attributes)
}

fn coerce(spec: &FieldSpec, raw: &Value) -> Result<Value> {
    let invalid = || SpecimenError::InvalidValue {
        field: spec.field.to_string(),
        value: raw.to_string(),
    };

    match spec.kind {
        FieldKind::Str if spec.multivalued => match raw {
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| Value::String(display_value(item)))
                    .collect(),
            )),
            other => Ok(Value::Array(vec![Value::String(display_value(other))])),
        },
        FieldKind::Str => Ok(Value::String(display_value(raw))),
        FieldKind::Int => {
            let number = as_f64(raw).ok_or_else(invalid)?;
            Ok(Value::from(number.trunc() as i64))
        },
        FieldKind::Float => {
            let number = as_f64(raw).ok_or_else(invalid)?;
            serde_json::Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(invalid)
        },
        FieldKind::Bool => as_bool(raw).map(Value::Bool).ok_or_else(invalid),
        FieldKind::Enum(permissible) => {
            let text = display_value(raw);
            if permissible.contains(&text.as_str()) {
                Ok(Value::String(text))
            } else {
                warn!(field = spec.field, value = %text, "Value is not a member of the value set");
                Ok(Value::Null)
            }
        },
    }
}

/// Text form of a scalar the way the portal's Python clients render it
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::library_generation::{CellPrepType, PassFailResult};
    use serde_json::json;

    fn node(value: Value) -> NodeRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_library_pool() {
        let record = node(json!({
            "id": "LP-CVFLMQ819998",
            "category": "Library Pool",
            "record": {
                "library_pool_local_name": "ATX-16001",
                "library_pool_local_tube_id": "NY-AT16001",
                "library_pool_tube_barcode": "A1658809"
            }
        }));
        let parents = vec!["LA-QLULNC273557CVFLMQ819998".to_string()];
        let BicanObject::LibraryPool(pool) = generate_bican_object(&record, Some(&parents)).unwrap()
        else {
            panic!("expected a library pool");
        };
        assert_eq!(pool.xref, vec!["NIMP:LP-CVFLMQ819998"]);
        assert_eq!(pool.category, vec!["bican:LibraryPool"]);
        assert_eq!(pool.name.as_deref(), Some("ATX-16001"));
        assert_eq!(pool.local_tube_id.as_deref(), Some("NY-AT16001"));
        assert_eq!(pool.was_derived_from, Some(parents));
        assert!(pool.id.starts_with("urn:bkbit:"));
    }

    #[test]
    fn test_library_coerces_numbers_from_strings() {
        let record = node(json!({
            "id": "LI-SUSLVB268156",
            "category": "Library",
            "record": {
                "library_local_name": "L8XA_230516_01_D05",
                "library_avg_size_bp": "889.0",
                "library_concentration_nm": "102.26961812",
                "library_prep_pass_fail": "Pass",
                "library_quantification_fmol": 5097.33,
                "library_quantification_ng": 3.2,
                "library_r1_r2_index": "SI-NA-D5"
            }
        }));
        let parents = vec!["AC-ATDJAH472237".to_string(), "AC-OTHER".to_string()];
        let BicanObject::Library(library) = generate_bican_object(&record, Some(&parents)).unwrap()
        else {
            panic!("expected a library");
        };
        assert_eq!(library.average_size_bp, Some(889));
        assert_eq!(library.concentration_nm, Some(102.26961812));
        assert_eq!(library.pass_fail_result, Some(PassFailResult::Pass));
        assert_eq!(library.r1_r2_index.as_deref(), Some("SI-NA-D5"));
        assert_eq!(library.was_derived_from.as_deref(), Some("AC-ATDJAH472237"));
    }

    #[test]
    fn test_enum_outside_value_set_becomes_null() {
        let record = node(json!({
            "id": "DC-1",
            "category": "Dissociated Cell Sample",
            "record": {
                "dissociated_cell_sample_local_name": "DC",
                "dissociated_cell_sample_cell_prep_type": "Organoid"
            }
        }));
        let BicanObject::DissociatedCellSample(sample) = generate_bican_object(&record, None).unwrap()
        else {
            panic!("expected a dissociated cell sample");
        };
        assert_eq!(sample.cell_prep_type, None);
        assert_eq!(sample.was_derived_from, None);

        let record = node(json!({
            "id": "DC-2",
            "category": "Dissociated Cell Sample",
            "record": {"dissociated_cell_sample_cell_prep_type": "Nuclei"}
        }));
        let BicanObject::DissociatedCellSample(sample) = generate_bican_object(&record, None).unwrap()
        else {
            panic!("expected a dissociated cell sample");
        };
        assert_eq!(sample.cell_prep_type, Some(CellPrepType::Nuclei));
    }

    #[test]
    fn test_tissue_structure_is_list() {
        let record = node(json!({
            "id": "TI-1",
            "category": "Tissue",
            "record": {"tissue_sample_local_name": "T1", "structure": ["MBA:703"]}
        }));
        let BicanObject::TissueSample(tissue) = generate_bican_object(&record, Some(&[])).unwrap()
        else {
            panic!("expected a tissue sample");
        };
        assert_eq!(tissue.structure, Some(vec!["MBA:703".to_string()]));
        assert_eq!(tissue.was_derived_from, None);
    }

    #[test]
    fn test_donor() {
        let record = node(json!({
            "id": "DO-1",
            "category": "Donor",
            "record": {
                "local_name": "Donor 1",
                "sex": 2,
                "age_at_death_reference_point": "birth",
                "age_at_death_unit": "days",
                "age_of_death": 0,
                "donor_species": "NCBITaxon:10090"
            }
        }));
        let BicanObject::Donor(donor) = generate_bican_object(&record, None).unwrap() else {
            panic!("expected a donor");
        };
        assert_eq!(donor.biological_sex.as_deref(), Some("2"));
        assert_eq!(donor.age_at_death_value, Some(0.0));
        assert_eq!(donor.species.as_deref(), Some("NCBITaxon:10090"));
    }

    #[test]
    fn test_unsupported_category() {
        let record = node(json!({"id": "XX-1", "category": "Sequencing Run", "record": {}}));
        let err = generate_bican_object(&record, None).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported category: Sequencing Run.");
    }

    #[test]
    fn test_invalid_number_is_error() {
        let record = node(json!({
            "id": "BC-1",
            "category": "Barcoded Cell Sample",
            "record": {"barcoded_cell_sample_number_of_expected_cells": "many"}
        }));
        assert!(matches!(
            generate_bican_object(&record, None),
            Err(SpecimenError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_required_field_missing() {
        const FIELDS: &[FieldSpec] = &[FieldSpec {
            field: "name",
            source: FieldSource::Record("local_name"),
            kind: FieldKind::Str,
            multivalued: false,
            required: true,
        }];
        let record = node(json!({"id": "DO-1", "category": "Donor", "record": {}}));
        let err = build_attributes(FIELDS, &record, None).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: name");
    }

    #[test]
    fn test_same_record_same_id() {
        let record = node(json!({
            "id": "LA-1",
            "category": "Library Aliquot",
            "record": {"library_aliquot_local_name": "NY-AT16001-9"}
        }));
        let parents = vec!["LI-1".to_string()];
        let first = generate_bican_object(&record, Some(&parents)).unwrap();
        let second = generate_bican_object(&record, Some(&parents)).unwrap();
        assert_eq!(first.id(), second.id());

        let other = generate_bican_object(&record, None).unwrap();
        assert_ne!(first.id(), other.id());
    }
}
