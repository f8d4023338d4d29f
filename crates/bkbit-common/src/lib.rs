//! bkbit Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared building blocks for the bkbit translators and schema tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`BkbitError`] and the crate [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Checksums**: single-pass MD5/SHA1/SHA256 digests
//! - **Object ids**: deterministic `urn:bkbit:` identifiers derived from attributes
//! - **JSON-LD**: the `@context`/`@graph` document every translator emits
//!
//! # Example
//!
//! ```no_run
//! use bkbit_common::object_id::generate_object_id;
//! use serde_json::json;
//!
//! let id = generate_object_id(&json!({"name": "Homo sapiens"}));
//! assert!(id.starts_with("urn:bkbit:"));
//! ```

pub mod checksum;
pub mod error;
pub mod jsonld;
pub mod logging;
pub mod object_id;

// Re-export commonly used types
pub use error::{BkbitError, Result};
pub use jsonld::JsonLdDocument;
