//! Anatomical structure CSV translator
//!
//! Every CSV in the input directory describes one kind of object. The kind is
//! recognised from the header row: the set of column names must equal one of
//! the known column sets exactly, in any order.

use crate::models::anatomical_structure::{
    AnatomicalAnnotationSet, AnatomicalDirection, AnatomicalSpace, DistanceUnit, ImageDataset,
    ParcellationAnnotation, ParcellationAnnotationTermMap, ParcellationAtlas,
    ParcellationColorAssignment, ParcellationColorScheme, ParcellationTerm, ParcellationTermSet,
    ParcellationTerminology,
};
use anyhow::{anyhow, Context, Result};
use bkbit_common::jsonld::{JsonLdDocument, ANATOMICAL_STRUCTURE_CONTEXT};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    ParcellationAtlas,
    AnatomicalSpace,
    AnatomicalAnnotationSet,
    ParcellationAnnotation,
    ParcellationTerminology,
    ParcellationTermSet,
    ParcellationTerm,
    ParcellationAnnotationTermMap,
    ParcellationColorScheme,
    ParcellationColorAssignment,
    ImageDataset,
}

impl TableKind {
    pub const ALL: [TableKind; 11] = [
        TableKind::ParcellationAtlas,
        TableKind::AnatomicalSpace,
        TableKind::AnatomicalAnnotationSet,
        TableKind::ParcellationAnnotation,
        TableKind::ParcellationTerminology,
        TableKind::ParcellationTermSet,
        TableKind::ParcellationTerm,
        TableKind::ParcellationAnnotationTermMap,
        TableKind::ParcellationColorScheme,
        TableKind::ParcellationColorAssignment,
        TableKind::ImageDataset,
    ];

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::ParcellationAtlas => &[
                "label",
                "name",
                "description",
                "specialization_of",
                "revision_of",
                "version",
                "anatomical_space_label",
                "anatomical_annotation_set_label",
                "parcellation_terminology_label",
            ],
            TableKind::AnatomicalSpace => {
                &["label", "name", "description", "version", "image_dataset_label"]
            },
            TableKind::AnatomicalAnnotationSet => &[
                "label",
                "name",
                "description",
                "revision_of",
                "version",
                "anatomical_space_label",
            ],
            TableKind::ParcellationAnnotation => {
                &["internal_identifier", "anatomical_annotation_set_label", "voxel_count"]
            },
            TableKind::ParcellationTerminology => {
                &["label", "name", "description", "revision_of", "version"]
            },
            TableKind::ParcellationTermSet => &[
                "label",
                "name",
                "description",
                "parcellation_terminology_label",
                "parcellation_term_set_order",
                "parcellation_parent_term_set_label",
            ],
            TableKind::ParcellationTerm => &[
                "name",
                "symbol",
                "description",
                "parcellation_term_set_label",
                "parcellation_terminology_label",
                "parcellation_term_identifier",
                "parcellation_term_order",
                "parcellation_parent_term_set_label",
                "parcellation_parent_term_identifier",
            ],
            TableKind::ParcellationAnnotationTermMap => &[
                "internal_identifier",
                "anatomical_annotation_set_label",
                "parcellation_term_identifier",
                "parcellation_term_set_label",
                "parcellation_terminology_label",
            ],
            TableKind::ParcellationColorScheme => &[
                "label",
                "name",
                "description",
                "revision_of",
                "version",
                "parcellation_terminology_label",
            ],
            TableKind::ParcellationColorAssignment => &[
                "parcellation_color_scheme_label",
                "parcellation_term_identifier",
                "parcellation_terminology_label",
                "color_hex_triplet",
            ],
            TableKind::ImageDataset => &[
                "label",
                "name",
                "description",
                "revision_of",
                "version",
                "x_direction",
                "y_direction",
                "z_direction",
                "x_size",
                "y_size",
                "z_size",
                "x_resolution",
                "y_resolution",
                "z_resolution",
                "unit",
            ],
        }
    }

    /// Kind whose column set equals `header`
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Option<Self> {
        let header: BTreeSet<&str> = header.iter().map(AsRef::as_ref).collect();
        Self::ALL
            .into_iter()
            .find(|kind| kind.columns().iter().copied().collect::<BTreeSet<_>>() == header)
    }
}

/// One CSV row by column name; empty cells read as absent
struct Row<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Row<'a> {
    fn new(header: &'a [String], record: &'a csv::StringRecord) -> Self {
        let values = header
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .collect();
        Self { values }
    }

    fn opt(&self, column: &str) -> Option<String> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn req(&self, column: &str) -> Result<String> {
        self.opt(column)
            .ok_or_else(|| anyhow!("missing value for column '{}'", column))
    }

    fn int(&self, column: &str) -> Result<Option<i64>> {
        self.opt(column)
            .map(|v| {
                v.parse::<i64>()
                    .ok()
                    .or_else(|| whole_number(&v))
                    .ok_or_else(|| anyhow!("invalid integer '{}' in column '{}'", v, column))
            })
            .transpose()
    }

    fn float(&self, column: &str) -> Result<Option<f64>> {
        self.opt(column)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| anyhow!("invalid number '{}' in column '{}'", v, column))
            })
            .transpose()
    }

    fn direction(&self, column: &str) -> Result<AnatomicalDirection> {
        self.req(column)?.parse().map_err(|e: String| anyhow!(e))
    }
}

/// `"3.0"` and `"1e3"` are integers; fractions and values outside `i64` are not
fn whole_number(value: &str) -> Option<i64> {
    let f = value.parse::<f64>().ok()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

#[derive(Debug, Default)]
pub struct AnatomicalStructureTranslator {
    pub anatomical_annotation_sets: Vec<AnatomicalAnnotationSet>,
    pub anatomical_spaces: Vec<AnatomicalSpace>,
    pub image_datasets: Vec<ImageDataset>,
    pub parcellation_annotations: Vec<ParcellationAnnotation>,
    pub parcellation_annotation_term_maps: Vec<ParcellationAnnotationTermMap>,
    pub parcellation_atlases: Vec<ParcellationAtlas>,
    pub parcellation_color_assignments: Vec<ParcellationColorAssignment>,
    pub parcellation_color_schemes: Vec<ParcellationColorScheme>,
    pub parcellation_terminologies: Vec<ParcellationTerminology>,
    pub parcellation_term_sets: Vec<ParcellationTermSet>,
    pub parcellation_terms: Vec<ParcellationTerm>,
}

impl AnatomicalStructureTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every `*.csv` in `dir`, in file name order
    pub fn provide_data(&mut self, dir: &Path) -> Result<()> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort();

        for file in files {
            self.read_data(&file)?;
        }
        Ok(())
    }

    /// Translate one CSV file; returns the number of objects generated
    pub fn read_data(&mut self, path: &Path) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let header: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let Some(kind) = TableKind::from_header(&header) else {
            warn!(file = %path.display(), "Unrecognised column set, skipping file");
            return Ok(0);
        };
        debug!(file = %path.display(), kind = ?kind, "Reading anatomical structure table");

        let mut generated = 0;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let row = Row::new(&header, &record);
            match self.generate(kind, &row) {
                Ok(()) => generated += 1,
                Err(e) => warn!(file = %path.display(), row = index + 2, error = %e, "Skipping row"),
            }
        }
        info!(file = %path.display(), kind = ?kind, generated, "Translated table");
        Ok(generated)
    }

    fn generate(&mut self, kind: TableKind, row: &Row<'_>) -> Result<()> {
        match kind {
            TableKind::ParcellationAtlas => self.parcellation_atlases.push(ParcellationAtlas {
                id: row.req("label")?,
                name: row.opt("name"),
                description: row.opt("description"),
                specialization_of: row.opt("specialization_of"),
                revision_of: row.opt("revision_of"),
                version: row.opt("version"),
                has_anatomical_space: row.opt("anatomical_space_label"),
                has_anatomical_annotation_set: row.opt("anatomical_annotation_set_label"),
                has_parcellation_terminology: row.opt("parcellation_terminology_label"),
            }),
            TableKind::AnatomicalSpace => self.anatomical_spaces.push(AnatomicalSpace {
                id: row.req("label")?,
                name: row.opt("name"),
                description: row.opt("description"),
                version: row.opt("version"),
                measures: row.opt("image_dataset_label"),
            }),
            TableKind::AnatomicalAnnotationSet => {
                self.anatomical_annotation_sets.push(AnatomicalAnnotationSet {
                    id: row.req("label")?,
                    name: row.opt("name"),
                    description: row.opt("description"),
                    revision_of: row.opt("revision_of"),
                    version: row.opt("version"),
                    parameterizes: row.opt("anatomical_space_label"),
                })
            },
            TableKind::ParcellationAnnotation => {
                self.parcellation_annotations.push(ParcellationAnnotation {
                    internal_identifier: row.req("internal_identifier")?,
                    part_of_anatomical_annotation_set: row.req("anatomical_annotation_set_label")?,
                    voxel_count: row.int("voxel_count")?,
                })
            },
            TableKind::ParcellationTerminology => {
                self.parcellation_terminologies.push(ParcellationTerminology {
                    id: row.req("label")?,
                    name: row.opt("name"),
                    description: row.opt("description"),
                    revision_of: row.opt("revision_of"),
                    version: row.opt("version"),
                })
            },
            TableKind::ParcellationTermSet => self.parcellation_term_sets.push(ParcellationTermSet {
                id: row.req("label")?,
                name: row.opt("name"),
                description: row.opt("description"),
                part_of_parcellation_terminology: row.opt("parcellation_terminology_label"),
                ordinal: row.int("parcellation_term_set_order")?,
                has_parent_parcellation_term_set: row.opt("parcellation_parent_term_set_label"),
            }),
            TableKind::ParcellationTerm => self.parcellation_terms.push(ParcellationTerm {
                id: row.req("parcellation_term_identifier")?,
                name: row.opt("name"),
                symbol: row.opt("symbol"),
                description: row.opt("description"),
                part_of_parcellation_term_set: row.opt("parcellation_term_set_label"),
                ordinal: row.int("parcellation_term_order")?,
                has_parent_parcellation_term: row.opt("parcellation_parent_term_identifier"),
            }),
            TableKind::ParcellationAnnotationTermMap => {
                self.parcellation_annotation_term_maps
                    .push(ParcellationAnnotationTermMap {
                        subject_parcellation_annotation: row.req("internal_identifier")?,
                        subject_parcellation_term: row.req("parcellation_term_identifier")?,
                    })
            },
            TableKind::ParcellationColorScheme => {
                self.parcellation_color_schemes.push(ParcellationColorScheme {
                    id: row.req("label")?,
                    name: row.opt("name"),
                    description: row.opt("description"),
                    revision_of: row.opt("revision_of"),
                    version: row.opt("version"),
                    subject_parcellation_terminology: row.opt("parcellation_terminology_label"),
                })
            },
            TableKind::ParcellationColorAssignment => {
                self.parcellation_color_assignments
                    .push(ParcellationColorAssignment {
                        part_of_parcellation_color_scheme: row
                            .req("parcellation_color_scheme_label")?,
                        subject_parcellation_term: row.req("parcellation_term_identifier")?,
                        color: row.req("color_hex_triplet")?,
                    })
            },
            TableKind::ImageDataset => self.image_datasets.push(ImageDataset {
                id: row.req("label")?,
                name: row.opt("name"),
                description: row.opt("description"),
                revision_of: row.opt("revision_of"),
                version: row.opt("version"),
                x_direction: row.direction("x_direction")?,
                y_direction: row.direction("y_direction")?,
                z_direction: row.direction("z_direction")?,
                x_size: row.int("x_size")?,
                y_size: row.int("y_size")?,
                z_size: row.int("z_size")?,
                x_resolution: row.float("x_resolution")?,
                y_resolution: row.float("y_resolution")?,
                z_resolution: row.float("z_resolution")?,
                unit: row
                    .req("unit")?
                    .parse::<DistanceUnit>()
                    .map_err(|e| anyhow!(e))?,
            }),
        }
        Ok(())
    }

    pub fn to_jsonld(&self) -> Result<JsonLdDocument> {
        let mut document = JsonLdDocument::new(ANATOMICAL_STRUCTURE_CONTEXT);
        document.extend(&self.anatomical_annotation_sets)?;
        document.extend(&self.anatomical_spaces)?;
        document.extend(&self.image_datasets)?;
        document.extend(&self.parcellation_annotations)?;
        document.extend(&self.parcellation_annotation_term_maps)?;
        document.extend(&self.parcellation_atlases)?;
        document.extend(&self.parcellation_color_assignments)?;
        document.extend(&self.parcellation_color_schemes)?;
        document.extend(&self.parcellation_terminologies)?;
        document.extend(&self.parcellation_term_sets)?;
        document.extend(&self.parcellation_terms)?;
        Ok(document)
    }

    pub fn serialize_to_jsonld(&self) -> Result<String> {
        Ok(self.to_jsonld()?.to_pretty_string()?)
    }
}
