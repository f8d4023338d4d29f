//! bkbit Schema Tools
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Editing and conversion of the BICAN LinkML models.
//!
//! - [`linkml`]: typed LinkML schema documents
//! - [`trimmer`]: cut a schema down to the parts reachable from chosen classes
//! - [`sheets`] and [`gsheet`]: build a schema from model spreadsheets
//! - [`csv_export`]: write a schema back out as model tables

pub mod csv_export;
pub mod error;
pub mod gsheet;
pub mod linkml;
pub mod sheets;
pub mod trimmer;

pub use error::{Result, SchemaError};
pub use linkml::SchemaDefinition;
pub use sheets::{schema2model, Schema2ModelOptions, TsvFixOptions};
pub use trimmer::{SchemaHeader, SchemaTrimmer};
