//! Data catalog exports: `bkbit filemanifest2jsonld` and `bkbit list-library-aliquots`

use crate::error::{CliError, Result};
use bkbit_translators::file_manifest::{FileManifest, LIBRARY_ALIQUOTS_FILE};
use bkbit_translators::specimen_metadata::list_library_aliquots;
use std::path::Path;
use tracing::info;

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::file_not_found(path.display().to_string()))
    }
}

/// Print the manifest's digital objects; optionally list its specimen ids
pub fn filemanifest2jsonld(path: &Path, list_aliquots: bool) -> Result<()> {
    require_file(path)?;
    let manifest = FileManifest::from_path(path)?;
    println!("{}", manifest.to_json()?);

    if list_aliquots {
        manifest.write_specimen_ids(Path::new(LIBRARY_ALIQUOTS_FILE))?;
        info!(file = LIBRARY_ALIQUOTS_FILE, "Wrote specimen ids");
    }
    Ok(())
}

pub fn library_aliquots(path: &Path) -> Result<()> {
    require_file(path)?;
    for aliquot in list_library_aliquots(path)? {
        println!("{}", aliquot);
    }
    Ok(())
}
