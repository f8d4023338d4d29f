//! `bkbit gff2jsonld` and `bkbit download-ncbi-taxonomy`

use crate::config::Config;
use crate::error::{CliError, Result};
use bkbit_translators::genome_annotation::{self, parse_url, Gff3Options};
use bkbit_translators::taxonomy::{download_ncbi_taxonomy, TaxonomyLookup};
use colored::Colorize;
use std::path::Path;

/// Translate one GFF3 release and print the JSON-LD
pub async fn gff2jsonld(config: &Config, content_url: &str, options: &Gff3Options) -> Result<()> {
    if parse_url(content_url).is_none() {
        return Err(CliError::Other(anyhow::anyhow!(
            "Unsupported GFF3 URL: {}. Expected an NCBI or Ensembl release file.",
            content_url
        )));
    }
    let taxonomy = TaxonomyLookup::load(&config.taxonomy_dir)?;
    let jsonld = genome_annotation::gff2jsonld(content_url, options, &taxonomy).await?;
    println!("{}", jsonld);
    Ok(())
}

pub async fn download_taxonomy(url: &str, output_dir: &Path) -> Result<()> {
    let lookup = download_ncbi_taxonomy(url, output_dir).await?;
    println!(
        "{} {} taxa to {}",
        "Saved".green().bold(),
        lookup.len(),
        output_dir.display()
    );
    Ok(())
}
