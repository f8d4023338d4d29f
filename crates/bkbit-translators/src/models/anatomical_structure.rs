//! Anatomical structure model: spaces, annotation sets and parcellations

use serde::{Deserialize, Serialize};

/// Axis orientation of an image dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnatomicalDirection {
    LeftToRight,
    RightToLeft,
    PosteriorToAnterior,
    AnteriorToPosterior,
    InferiorToSuperior,
    SuperiorToInferior,
}

impl std::str::FromStr for AnatomicalDirection {
    type Err = String;

    /// Accepts both `left_to_right` and `left-to-right`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "left_to_right" => Ok(AnatomicalDirection::LeftToRight),
            "right_to_left" => Ok(AnatomicalDirection::RightToLeft),
            "posterior_to_anterior" => Ok(AnatomicalDirection::PosteriorToAnterior),
            "anterior_to_posterior" => Ok(AnatomicalDirection::AnteriorToPosterior),
            "inferior_to_superior" => Ok(AnatomicalDirection::InferiorToSuperior),
            "superior_to_inferior" => Ok(AnatomicalDirection::SuperiorToInferior),
            other => Err(format!("unknown anatomical direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Mm,
    Um,
    M,
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" => Ok(DistanceUnit::Mm),
            "um" => Ok(DistanceUnit::Um),
            "m" => Ok(DistanceUnit::M),
            other => Err(format!("unknown distance unit '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomicalSpace {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Image dataset the space is measured on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomicalAnnotationSet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameterizes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDataset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub x_direction: AnatomicalDirection,
    pub y_direction: AnatomicalDirection,
    pub z_direction: AnatomicalDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_resolution: Option<f64>,
    pub unit: DistanceUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationAtlas {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_anatomical_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_anatomical_annotation_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_parcellation_terminology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationAnnotation {
    pub internal_identifier: String,
    pub part_of_anatomical_annotation_set: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voxel_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationAnnotationTermMap {
    pub subject_parcellation_annotation: String,
    pub subject_parcellation_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationTerminology {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationTermSet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_parcellation_terminology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_parent_parcellation_term_set: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationTerm {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_parcellation_term_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_parent_parcellation_term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationColorScheme {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_parcellation_terminology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcellationColorAssignment {
    pub part_of_parcellation_color_scheme: String,
    pub subject_parcellation_term: String,
    pub color: String,
}
