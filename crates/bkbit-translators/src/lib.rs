//! bkbit Translators
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Translators from BICAN data sources into JSON-LD graphs of the BICAN
//! LinkML models.
//!
//! # Overview
//!
//! - **Specimen portal**: NHash provenance graph walk into library generation objects ([`specimen`])
//! - **Genome annotation**: NCBI and Ensembl GFF3 releases into gene annotations ([`genome_annotation`])
//! - **NCBI taxonomy**: name tables used to label organisms ([`taxonomy`])
//! - **Anatomical structures**: parcellation CSV tables ([`anatomical_structure`])
//! - **Data catalog exports**: file manifests and specimen metadata ([`file_manifest`], [`specimen_metadata`])

pub mod anatomical_structure;
pub mod file_manifest;
pub mod genome_annotation;
pub mod models;
pub mod progress;
pub mod specimen;
pub mod specimen_metadata;
pub mod taxonomy;

// Re-export commonly used types
pub use anatomical_structure::AnatomicalStructureTranslator;
pub use genome_annotation::{GenomeAnnotationTranslator, Gff3Options};
pub use specimen::{SpecimenPortalClient, SpecimenTranslator, WalkDirection};
pub use taxonomy::TaxonomyLookup;
