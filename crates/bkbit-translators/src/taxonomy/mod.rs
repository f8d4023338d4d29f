//! NCBI taxonomy name tables
//!
//! `download-ncbi-taxonomy` stores three JSON maps in the taxonomy directory;
//! the genome annotation translator reads them back through
//! [`TaxonomyLookup`].

pub mod download;
pub mod parser;

use anyhow::{Context, Result};
use parser::TaxonomyNames;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub use download::{TAXDMP_URL, DOWNLOAD_TIMEOUT_SECS};

pub const TAXID_TO_SCIENTIFIC_NAME_FILE: &str = "taxid_to_scientific_name.json";
pub const TAXID_TO_COMMON_NAME_FILE: &str = "taxid_to_common_name.json";
pub const SCIENTIFIC_NAME_TO_TAXID_FILE: &str = "scientific_name_to_taxid.json";

/// Environment variable overriding the taxonomy directory
pub const TAXONOMY_DIR_ENV: &str = "BKBIT_TAXONOMY_DIR";

/// `$BKBIT_TAXONOMY_DIR`, else `<data dir>/bkbit/ncbi_taxonomy`
pub fn default_taxonomy_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(TAXONOMY_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bkbit")
        .join("ncbi_taxonomy")
}

#[derive(Debug, Clone, Default)]
pub struct TaxonomyLookup {
    names: TaxonomyNames,
}

impl TaxonomyLookup {
    pub fn new(names: TaxonomyNames) -> Self {
        Self { names }
    }

    /// Build a lookup from `(taxid, scientific name, common name)` triples
    pub fn from_names<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>,
    {
        let mut names = TaxonomyNames::default();
        for (taxid, scientific, common) in entries {
            names
                .taxid_to_scientific_name
                .insert(taxid.to_string(), scientific.to_string());
            names
                .scientific_name_to_taxid
                .insert(scientific.to_string(), taxid.to_string());
            if let Some(common) = common {
                names
                    .taxid_to_common_name
                    .insert(taxid.to_string(), common.to_string());
            }
        }
        Self { names }
    }

    /// Load the three JSON maps written by [`save`](Self::save)
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<BTreeMap<String, String>> {
            let path = dir.join(file);
            let text = std::fs::read_to_string(&path).with_context(|| {
                format!(
                    "NCBI Taxonomy not downloaded ({} is missing). Run 'bkbit download-ncbi-taxonomy' command first.",
                    path.display()
                )
            })?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))
        };

        Ok(Self {
            names: TaxonomyNames {
                taxid_to_scientific_name: read(TAXID_TO_SCIENTIFIC_NAME_FILE)?,
                taxid_to_common_name: read(TAXID_TO_COMMON_NAME_FILE)?,
                scientific_name_to_taxid: read(SCIENTIFIC_NAME_TO_TAXID_FILE)?,
            },
        })
    }

    /// Write the three maps as 4-space indented JSON
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        write_json(&dir.join(TAXID_TO_SCIENTIFIC_NAME_FILE), &self.names.taxid_to_scientific_name)?;
        write_json(&dir.join(TAXID_TO_COMMON_NAME_FILE), &self.names.taxid_to_common_name)?;
        write_json(&dir.join(SCIENTIFIC_NAME_TO_TAXID_FILE), &self.names.scientific_name_to_taxid)?;
        Ok(())
    }

    pub fn scientific_name(&self, taxid: &str) -> Option<&str> {
        self.names.taxid_to_scientific_name.get(taxid).map(String::as_str)
    }

    pub fn common_name(&self, taxid: &str) -> Option<&str> {
        self.names.taxid_to_common_name.get(taxid).map(String::as_str)
    }

    pub fn taxid(&self, scientific_name: &str) -> Option<&str> {
        self.names.scientific_name_to_taxid.get(scientific_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.taxid_to_scientific_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.taxid_to_scientific_name.is_empty()
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    std::fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))
}

/// Download taxdmp.zip, parse `names.dmp` and save the name tables in `output_dir`
pub async fn download_ncbi_taxonomy(url: &str, output_dir: &Path) -> Result<TaxonomyLookup> {
    let content = download::download_names_dmp(url, Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)).await?;
    let lookup = TaxonomyLookup::new(parser::parse_names_dmp(&content));
    lookup.save(output_dir)?;
    info!(taxa = lookup.len(), dir = %output_dir.display(), "Saved NCBI taxonomy");
    Ok(lookup)
}
