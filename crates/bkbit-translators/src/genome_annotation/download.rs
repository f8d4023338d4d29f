//! Streaming GFF3 download with checksums

use crate::progress;
use anyhow::{bail, Context, Result};
use bkbit_common::checksum::{DigestValues, MultiDigest};
use futures::StreamExt;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::info;

/// A downloaded file, removed from disk when dropped
pub struct DownloadedFile {
    pub file: NamedTempFile,
    pub digests: DigestValues,
    pub bytes: u64,
}

/// Download `url` to a temporary `.gz` file, hashing every chunk as it arrives
pub async fn download_gff_file(url: &str, timeout: Option<Duration>) -> Result<DownloadedFile> {
    let mut builder = Client::builder().user_agent(concat!("bkbit/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    info!("Downloading GFF file from: {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to request {}", url))?;

    if !response.status().is_success() {
        bail!("HTTP error {} downloading {}", response.status(), url);
    }

    let pb = progress::create_download_progress(response.content_length(), "Downloading GFF file");
    let mut file = tempfile::Builder::new()
        .suffix(".gz")
        .tempfile()
        .context("Failed to create temporary file")?;
    let mut digest = MultiDigest::new();

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk)?;
        digest.update(&chunk);
        pb.inc(chunk.len() as u64);
    }
    file.flush()?;
    pb.finish_and_clear();

    let bytes = digest.bytes_processed();
    info!("Downloaded {} to {}", progress::format_bytes(bytes), file.path().display());

    Ok(DownloadedFile {
        file,
        digests: digest.finalize(),
        bytes,
    })
}
