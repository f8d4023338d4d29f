//! Library aliquot ids from a data catalog specimen metadata export

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

pub const SPECIMEN_ID_COLUMN: &str = "Specimen ID";
pub const LIBRARY_ALIQUOT_PREFIX: &str = "LA";

pub fn list_library_aliquots(path: &Path) -> Result<Vec<String>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    library_aliquots_from_reader(file)
}

/// Values of the `Specimen ID` column that are library aliquot NHash ids
pub fn library_aliquots_from_reader<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(reader);
    let Some(column) = reader.headers()?.iter().position(|h| h == SPECIMEN_ID_COLUMN) else {
        bail!("The CSV file does not contain the '{}' column.", SPECIMEN_ID_COLUMN);
    };

    let mut aliquots = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(id) = record.get(column) {
            if id.starts_with(LIBRARY_ALIQUOT_PREFIX) {
                aliquots.push(id.to_string());
            }
        }
    }
    Ok(aliquots)
}
