//! Model maintenance: `bkbit linkml-trimmer`, `bkbit schema2model`, `bkbit yaml2csv`

use crate::error::{CliError, Result};
use bkbit_schema::csv_export;
use bkbit_schema::gsheet::{download_gsheets, GsheetConfig, GSHEET_BASE_URL};
use bkbit_schema::{schema2model, Schema2ModelOptions, SchemaDefinition, SchemaHeader, SchemaTrimmer};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::file_not_found(path.display().to_string()))
    }
}

/// Keep lists for `linkml-trimmer`
#[derive(Debug, Clone, Default)]
pub struct KeepLists {
    pub classes: Vec<String>,
    pub slots: Vec<String>,
    pub enums: Vec<String>,
}

pub fn trim(schema_path: &Path, keep: &KeepLists, header: &SchemaHeader) -> Result<()> {
    require_file(schema_path)?;
    let mut trimmer = SchemaTrimmer::from_path(schema_path)?;
    trimmer.trim_model(&keep.classes, &keep.slots, &keep.enums)?;
    print!("{}", trimmer.serialize(header)?);
    Ok(())
}

/// Sheets named on the command line, downloading them first for `--gsheet`
async fn resolve_sheets(
    spreadsheets: &[PathBuf],
    gsheet: bool,
    download_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    for path in spreadsheets {
        require_file(path)?;
    }
    if !gsheet {
        return Ok(spreadsheets.to_vec());
    }

    let [config_path] = spreadsheets else {
        return Err(CliError::Other(anyhow::anyhow!(
            "--gsheet takes exactly one YAML file, got {}",
            spreadsheets.len()
        )));
    };
    let config = GsheetConfig::from_path(config_path)?;
    let download_dir = download_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.default_download_dir());
    info!(gsheet_id = %config.gsheet_id, dir = %download_dir.display(), "Downloading Google Sheets");
    Ok(download_gsheets(GSHEET_BASE_URL, &config, &download_dir).await?)
}

pub async fn schema_from_sheets(
    spreadsheets: &[PathBuf],
    gsheet: bool,
    gsheet_download_dir: Option<&Path>,
    options: &Schema2ModelOptions,
    output: Option<&Path>,
) -> Result<()> {
    let sheets = resolve_sheets(spreadsheets, gsheet, gsheet_download_dir).await?;
    let schema = schema2model(&sheets, options)?;
    let yaml = schema.to_yaml_string()?;

    match output {
        Some(path) => {
            std::fs::write(path, yaml)?;
            info!(path = %path.display(), "Wrote schema");
        },
        None => print!("{}", yaml),
    }
    Ok(())
}

pub fn yaml2csv(yaml_model: &Path, output_dir: &Path) -> Result<()> {
    require_file(yaml_model)?;
    let schema = SchemaDefinition::from_path(yaml_model)?;
    csv_export::yaml2csv(&schema, output_dir)?;
    println!(
        "{} model tables to {}",
        "Wrote".green().bold(),
        output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_sheets_passes_files_through() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("classes.tsv");
        std::fs::write(&sheet, "Class Name\n> class\n>\n").unwrap();

        let sheets = resolve_sheets(std::slice::from_ref(&sheet), false, None).await.unwrap();
        assert_eq!(sheets, vec![sheet]);
    }

    #[tokio::test]
    async fn test_resolve_sheets_missing_file() {
        let err = resolve_sheets(&[PathBuf::from("/nonexistent/classes.tsv")], false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_gsheet_takes_one_config() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yaml");
        let b = dir.path().join("b.yaml");
        std::fs::write(&a, "gsheet_id: x\nsheets: []\n").unwrap();
        std::fs::write(&b, "gsheet_id: y\nsheets: []\n").unwrap();

        let err = resolve_sheets(&[a, b], true, None).await.unwrap_err();
        assert!(err.to_string().contains("exactly one YAML file"));
    }
}
