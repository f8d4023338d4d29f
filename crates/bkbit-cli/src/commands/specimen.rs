//! `bkbit specimen2jsonld` and `bkbit specimen-donors`

use crate::config::Config;
use crate::error::{CliError, Result};
use bkbit_translators::specimen::translator::{read_nhash_ids, translate_many, translate_one};
use bkbit_translators::specimen::{DonorQuery, SpecimenPortalClient, WalkDirection};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn portal_client(config: &Config) -> Result<SpecimenPortalClient> {
    let token = config.require_jwt_token()?;
    let client = SpecimenPortalClient::new(&config.specimen_portal_url, token)?;
    Ok(match config.http_timeout {
        Some(timeout) => client.with_timeout(timeout),
        None => client,
    })
}

/// Translate one NHash id, or every id listed in a file
pub async fn specimen2jsonld(
    config: &Config,
    nhash_id: &str,
    descendants: bool,
    save: bool,
    output_dir: &Path,
    concurrency: usize,
) -> Result<()> {
    let client = portal_client(config)?;
    let direction = if descendants {
        WalkDirection::Descendants
    } else {
        WalkDirection::Ancestors
    };

    let input = Path::new(nhash_id);
    if input.is_file() {
        let nhash_ids = read_nhash_ids(input)?;
        info!(count = nhash_ids.len(), file = %input.display(), "Translating NHash ids");
        let written =
            translate_many(&client, &nhash_ids, direction, output_dir, concurrency).await?;
        if written.is_empty() && !nhash_ids.is_empty() {
            return Err(CliError::Other(anyhow::anyhow!(
                "None of the {} NHash ids in {} could be translated",
                nhash_ids.len(),
                input.display()
            )));
        }
        if written.len() < nhash_ids.len() {
            warn!(
                failed = nhash_ids.len() - written.len(),
                "Some NHash ids were not translated"
            );
        }
        println!(
            "{} {} of {} NHash ids to {}",
            "Wrote".green().bold(),
            written.len(),
            nhash_ids.len(),
            output_dir.display()
        );
        return Ok(());
    }

    let jsonld = translate_one(&client, nhash_id, direction).await?;
    if save {
        let path = save_jsonld(output_dir, nhash_id, &jsonld)?;
        info!(path = %path.display(), "Wrote JSON-LD");
    } else {
        println!("{}", jsonld);
    }
    Ok(())
}

fn save_jsonld(output_dir: &Path, nhash_id: &str, jsonld: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.jsonld", nhash_id));
    std::fs::write(&path, jsonld)?;
    Ok(path)
}

/// Print the donors matching the given filters as JSON
pub async fn donors(config: &Config, query: &DonorQuery) -> Result<()> {
    let client = portal_client(config)?;
    let donors = client.get_donors(query).await?;
    println!("{}", serde_json::to_string_pretty(&donors)?);
    Ok(())
}
