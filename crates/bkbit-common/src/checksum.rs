//! Checksum utilities for downloaded annotation files
//!
//! Digests are computed in a single streaming pass so a large GFF3 download
//! only has to be read once regardless of how many algorithms are requested.

use crate::error::{BkbitError, Result};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Digest algorithms supported for annotation checksums
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 3] =
        [DigestAlgorithm::Md5, DigestAlgorithm::Sha1, DigestAlgorithm::Sha256];
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = BkbitError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(BkbitError::UnsupportedDigest(s.to_string())),
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DigestAlgorithm::Md5 => write!(f, "MD5"),
            DigestAlgorithm::Sha1 => write!(f, "SHA1"),
            DigestAlgorithm::Sha256 => write!(f, "SHA256"),
        }
    }
}

/// Hex encoded digests of one byte stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestValues {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

impl DigestValues {
    /// Digest for a single algorithm
    pub fn get(&self, algorithm: DigestAlgorithm) -> &str {
        match algorithm {
            DigestAlgorithm::Md5 => &self.md5,
            DigestAlgorithm::Sha1 => &self.sha1,
            DigestAlgorithm::Sha256 => &self.sha256,
        }
    }
}

/// Incremental hasher feeding every supported algorithm at once
pub struct MultiDigest {
    md5: md5::Context,
    sha1: Sha1,
    sha256: Sha256,
    bytes: u64,
}

impl Default for MultiDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiDigest {
    pub fn new() -> Self {
        Self {
            md5: md5::Context::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
            bytes: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.md5.consume(data);
        self.sha1.update(data);
        self.sha256.update(data);
        self.bytes += data.len() as u64;
    }

    /// Number of bytes hashed so far
    pub fn bytes_processed(&self) -> u64 {
        self.bytes
    }

    pub fn finalize(self) -> DigestValues {
        DigestValues {
            md5: format!("{:x}", self.md5.compute()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
        }
    }
}

/// Compute all digests for any readable source
pub fn compute_digests<R: Read>(reader: &mut R) -> Result<DigestValues> {
    let mut hasher = MultiDigest::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Compute all digests for a file
pub fn compute_file_digests(path: impl AsRef<Path>) -> Result<DigestValues> {
    let mut file = std::fs::File::open(path)?;
    compute_digests(&mut file)
}
