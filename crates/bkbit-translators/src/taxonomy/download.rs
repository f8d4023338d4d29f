//! NCBI taxdmp.zip download

use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::io::{Cursor, Read};
use std::time::Duration;
use tracing::{debug, info};
use zip::ZipArchive;

pub const TAXDMP_URL: &str = "https://ftp.ncbi.nih.gov/pub/taxonomy/taxdmp.zip";
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Download a taxdmp archive and return the text of its `names.dmp`
pub async fn download_names_dmp(url: &str, timeout: Duration) -> Result<String> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("bkbit/", env!("CARGO_PKG_VERSION")))
        .build()?;

    info!("Downloading NCBI taxonomy from: {}", url);
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        bail!("Failed to download file, status code: {}", response.status().as_u16());
    }
    let archive = response.bytes().await?;
    info!("Downloaded taxdmp archive ({} bytes)", archive.len());

    extract_names_dmp(&archive)
}

/// Read `names.dmp` out of an in-memory zip archive
pub fn extract_names_dmp(archive: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(archive)).context("Failed to open zip archive")?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).context("Failed to read zip entry")?;
        let filename = file.name().to_string();
        let basename = filename.split('/').next_back().unwrap_or(&filename);

        if basename == "names.dmp" {
            let mut content = String::new();
            file.read_to_string(&mut content)
                .context("Failed to read names.dmp")?;
            debug!("Extracted names.dmp ({} bytes)", content.len());
            return Ok(content);
        }
    }

    bail!("names.dmp not found in taxonomy archive")
}
