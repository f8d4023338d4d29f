//! Specimen portal translator
//!
//! Walks the NHash provenance graph of the BICAN specimen portal and maps its
//! records onto library generation objects.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod mapping;
pub mod translator;
pub mod types;

pub use client::{SpecimenPortalClient, SpecimenSource};
pub use error::{Result, SpecimenError};
pub use mapping::generate_bican_object;
pub use translator::{
    read_nhash_ids, translate_many, translate_one, SpecimenTranslator, WalkDirection,
    DEFAULT_CONCURRENCY,
};
pub use types::DonorQuery;
