//! File manifest translator
//!
//! A manifest lists one data file per row together with the specimen it was
//! derived from.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

/// Output file of `--list-library-aliquots`
pub const LIBRARY_ALIQUOTS_FILE: &str = "file_manifest_library_aliquots.txt";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct ManifestRow {
    #[serde(rename = "File Name")]
    file_name: String,
    #[serde(rename = "Checksum")]
    checksum: String,
    #[serde(rename = "File Type")]
    file_type: String,
    #[serde(rename = "Archive")]
    archive: String,
    #[serde(rename = "Archive URI")]
    archive_uri: String,
    #[serde(rename = "Project ID")]
    project_id: String,
    #[serde(rename = "Specimen ID")]
    specimen_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalObject {
    pub file_name: String,
    pub checksum: String,
    pub file_type: String,
    pub archive: String,
    pub archive_uri: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileManifest {
    pub digital_objects: Vec<DigitalObject>,
    pub specimen_ids: BTreeSet<String>,
}

impl FileManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut manifest = FileManifest::default();
        let mut reader = csv::Reader::from_reader(reader);

        for (index, row) in reader.deserialize::<ManifestRow>().enumerate() {
            let row = row.with_context(|| format!("Invalid manifest row {}", index + 2))?;
            manifest.specimen_ids.insert(row.specimen_id);
            manifest.digital_objects.push(DigitalObject {
                file_name: row.file_name,
                checksum: row.checksum,
                file_type: row.file_type,
                archive: row.archive,
                archive_uri: row.archive_uri,
                project_id: row.project_id,
            });
        }
        Ok(manifest)
    }

    /// Digital objects as a two-space indented JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.digital_objects)?)
    }

    /// Write the unique specimen ids one per line
    pub fn write_specimen_ids(&self, path: &Path) -> Result<()> {
        let mut text = String::new();
        for id in &self.specimen_ids {
            text.push_str(id);
            text.push('\n');
        }
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }
}
