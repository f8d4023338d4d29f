//! Library generation model: specimens from donor to sequenced library pool

use serde::{Deserialize, Serialize};

/// Reference point for a donor's age at death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeAtDeathReferencePoint {
    Birth,
    Conception,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeAtDeathUnit {
    Days,
    Weeks,
    Months,
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellPrepType {
    Nuclei,
    Cells,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassFailResult {
    Pass,
    Fail,
}

pub const AGE_AT_DEATH_REFERENCE_POINT_VALUES: &[&str] = &["birth", "conception"];
pub const AGE_AT_DEATH_UNIT_VALUES: &[&str] = &["days", "weeks", "months", "years"];
pub const CELL_PREP_TYPE_VALUES: &[&str] = &["Nuclei", "Cells"];
pub const PASS_FAIL_RESULT_VALUES: &[&str] = &["Pass", "Fail"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biological_sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_at_death_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_at_death_reference_point: Option<AgeAtDeathReferencePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_at_death_unit: Option<AgeAtDeathUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_at_death_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
}

/// Thick slice of brain tissue cut from a donor brain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainSlab {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

/// Region of interest polygon annotated on a brain slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissectionRoiPolygon {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueSample {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissociatedCellSample {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_prep_type: Option<CellPrepType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_source_oligo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCellSample {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_population: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_source_oligo_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histone_modification_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodedCellSample {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_expected_cells: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplifiedCdna {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_ng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_fail_result: Option<PassFailResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_cdna_longer_than_400bp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_size_bp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_nm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_fail_result: Option<PassFailResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_fmol: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_ng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r1_r2_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryAliquot {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryPool {
    pub id: String,
    pub category: Vec<String>,
    #[serde(default)]
    pub xref: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_tube_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_derived_from: Option<Vec<String>>,
}

/// Any node of the specimen provenance graph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BicanObject {
    Donor(Donor),
    BrainSlab(BrainSlab),
    DissectionRoiPolygon(DissectionRoiPolygon),
    TissueSample(TissueSample),
    DissociatedCellSample(DissociatedCellSample),
    EnrichedCellSample(EnrichedCellSample),
    BarcodedCellSample(BarcodedCellSample),
    AmplifiedCdna(AmplifiedCdna),
    Library(Library),
    LibraryAliquot(LibraryAliquot),
    LibraryPool(LibraryPool),
}

impl BicanObject {
    pub fn id(&self) -> &str {
        match self {
            BicanObject::Donor(o) => &o.id,
            BicanObject::BrainSlab(o) => &o.id,
            BicanObject::DissectionRoiPolygon(o) => &o.id,
            BicanObject::TissueSample(o) => &o.id,
            BicanObject::DissociatedCellSample(o) => &o.id,
            BicanObject::EnrichedCellSample(o) => &o.id,
            BicanObject::BarcodedCellSample(o) => &o.id,
            BicanObject::AmplifiedCdna(o) => &o.id,
            BicanObject::Library(o) => &o.id,
            BicanObject::LibraryAliquot(o) => &o.id,
            BicanObject::LibraryPool(o) => &o.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            BicanObject::Donor(o) => o.name.as_deref(),
            BicanObject::BrainSlab(o) => o.name.as_deref(),
            BicanObject::DissectionRoiPolygon(o) => o.name.as_deref(),
            BicanObject::TissueSample(o) => o.name.as_deref(),
            BicanObject::DissociatedCellSample(o) => o.name.as_deref(),
            BicanObject::EnrichedCellSample(o) => o.name.as_deref(),
            BicanObject::BarcodedCellSample(o) => o.name.as_deref(),
            BicanObject::AmplifiedCdna(o) => o.name.as_deref(),
            BicanObject::Library(o) => o.name.as_deref(),
            BicanObject::LibraryAliquot(o) => o.name.as_deref(),
            BicanObject::LibraryPool(o) => o.name.as_deref(),
        }
    }

    /// Parent references as currently stored
    pub fn was_derived_from(&self) -> Vec<&str> {
        match self {
            BicanObject::Donor(_) => Vec::new(),
            BicanObject::BrainSlab(o) => o.was_derived_from.iter().map(String::as_str).collect(),
            BicanObject::DissectionRoiPolygon(o) => {
                o.was_derived_from.iter().map(String::as_str).collect()
            },
            BicanObject::TissueSample(o) => o.was_derived_from.iter().map(String::as_str).collect(),
            BicanObject::AmplifiedCdna(o) => o.was_derived_from.iter().map(String::as_str).collect(),
            BicanObject::Library(o) => o.was_derived_from.iter().map(String::as_str).collect(),
            BicanObject::LibraryAliquot(o) => {
                o.was_derived_from.iter().map(String::as_str).collect()
            },
            BicanObject::DissociatedCellSample(o) => multi_refs(&o.was_derived_from),
            BicanObject::EnrichedCellSample(o) => multi_refs(&o.was_derived_from),
            BicanObject::BarcodedCellSample(o) => multi_refs(&o.was_derived_from),
            BicanObject::LibraryPool(o) => multi_refs(&o.was_derived_from),
        }
    }

    /// Rewrite parent references through `resolve`; unresolved parents are dropped
    pub fn relink_parents<F>(&mut self, resolve: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            BicanObject::Donor(_) => {},
            BicanObject::BrainSlab(o) => relink_single(&mut o.was_derived_from, &resolve),
            BicanObject::DissectionRoiPolygon(o) => {
                relink_single(&mut o.was_derived_from, &resolve)
            },
            BicanObject::TissueSample(o) => relink_single(&mut o.was_derived_from, &resolve),
            BicanObject::AmplifiedCdna(o) => relink_single(&mut o.was_derived_from, &resolve),
            BicanObject::Library(o) => relink_single(&mut o.was_derived_from, &resolve),
            BicanObject::LibraryAliquot(o) => relink_single(&mut o.was_derived_from, &resolve),
            BicanObject::DissociatedCellSample(o) => {
                relink_multi(&mut o.was_derived_from, &resolve)
            },
            BicanObject::EnrichedCellSample(o) => relink_multi(&mut o.was_derived_from, &resolve),
            BicanObject::BarcodedCellSample(o) => relink_multi(&mut o.was_derived_from, &resolve),
            BicanObject::LibraryPool(o) => relink_multi(&mut o.was_derived_from, &resolve),
        }
    }
}

fn multi_refs(refs: &Option<Vec<String>>) -> Vec<&str> {
    refs.iter().flatten().map(String::as_str).collect()
}

fn relink_single<F>(parent: &mut Option<String>, resolve: &F)
where
    F: Fn(&str) -> Option<String>,
{
    *parent = parent.as_deref().and_then(resolve);
}

fn relink_multi<F>(parents: &mut Option<Vec<String>>, resolve: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(list) = parents {
        *list = list.iter().filter_map(|p| resolve(p)).collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_fields_are_not_serialized() {
        let aliquot = BicanObject::LibraryAliquot(LibraryAliquot {
            id: "urn:bkbit:1".to_string(),
            category: vec!["bican:LibraryAliquot".to_string()],
            xref: vec!["NIMP:LA-1".to_string()],
            name: None,
            was_derived_from: None,
        });
        let value = serde_json::to_value(&aliquot).unwrap();
        assert_eq!(
            value,
            json!({"id": "urn:bkbit:1", "category": ["bican:LibraryAliquot"], "xref": ["NIMP:LA-1"]})
        );
    }

    #[test]
    fn test_relink_drops_unknown_parents() {
        let mut pool = BicanObject::LibraryPool(LibraryPool {
            id: "urn:bkbit:pool".to_string(),
            category: vec!["bican:LibraryPool".to_string()],
            xref: vec![],
            name: None,
            local_tube_id: None,
            was_derived_from: Some(vec!["LA-1".to_string(), "LA-2".to_string()]),
        });
        pool.relink_parents(|nhash| (nhash == "LA-1").then(|| "urn:bkbit:la1".to_string()));
        assert_eq!(pool.was_derived_from(), vec!["urn:bkbit:la1"]);

        let mut library = BicanObject::Library(Library {
            id: "urn:bkbit:lib".to_string(),
            category: vec!["bican:Library".to_string()],
            xref: vec![],
            name: None,
            average_size_bp: None,
            concentration_nm: None,
            pass_fail_result: None,
            quantity_fmol: None,
            quantity_ng: None,
            r1_r2_index: None,
            was_derived_from: Some("AC-1".to_string()),
        });
        library.relink_parents(|_| None);
        assert!(library.was_derived_from().is_empty());
    }

    #[test]
    fn test_enum_spelling() {
        assert_eq!(serde_json::to_value(AgeAtDeathUnit::Days).unwrap(), json!("days"));
        assert_eq!(serde_json::to_value(CellPrepType::Nuclei).unwrap(), json!("Nuclei"));
        assert_eq!(serde_json::to_value(PassFailResult::Pass).unwrap(), json!("Pass"));
    }
}
