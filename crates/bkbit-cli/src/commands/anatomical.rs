//! `bkbit anatomical2jsonld`

use crate::error::{CliError, Result};
use bkbit_translators::AnatomicalStructureTranslator;
use std::path::Path;

pub fn run(dir_path: &Path) -> Result<()> {
    if !dir_path.is_dir() {
        return Err(CliError::file_not_found(dir_path.display().to_string()));
    }
    let mut translator = AnatomicalStructureTranslator::new();
    translator.provide_data(dir_path)?;
    println!("{}", translator.serialize_to_jsonld()?);
    Ok(())
}
