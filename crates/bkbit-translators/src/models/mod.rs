//! Typed BICAN model classes
//!
//! Optional attributes are skipped when unset, so the emitted JSON-LD only
//! carries the values a translator actually assigned.

pub mod anatomical_structure;
pub mod genome_annotation;
pub mod library_generation;
