//! Release metadata encoded in NCBI and Ensembl GFF3 download URLs

use crate::models::genome_annotation::AuthorityType;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const NCBI_PATH_PATTERN: &str = r"/genomes/all/annotation_releases/(\d+)(?:/(\d+))?/(GCF_\d+\.\d+)[_-]([^/]+)/(GCF_\d+\.\d+)[_-]([^/]+)_genomic\.gff\.gz";
const ENSEMBL_PATH_PATTERN: &str =
    r"/pub/release-(\d+)/gff3/([^/]+)/([^/.]+)\.([^/.]+)\.([^/.]+)\.gff3\.gz";

fn ncbi_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NCBI_PATH_PATTERN).ok()).as_ref()
}

fn ensembl_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENSEMBL_PATH_PATTERN).ok()).as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMetadata {
    pub authority: AuthorityType,
    pub release_version: String,
    pub assembly_name: String,
    /// NCBI only
    pub taxon_id: Option<String>,
    /// NCBI only
    pub assembly_accession: Option<String>,
    /// Ensembl only, with underscores as in the file name
    pub scientific_name: Option<String>,
}

/// Extract release metadata from a content URL
///
/// Returns `None` for hosts other than NCBI or Ensembl and for paths that do
/// not follow their release layouts.
pub fn parse_url(content_url: &str) -> Option<UrlMetadata> {
    let parsed = Url::parse(content_url).ok()?;
    let host = parsed.host_str().unwrap_or_default();
    let path = parsed.path();

    if host.contains("ncbi") {
        let caps = ncbi_regex()?.captures(path)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Some(UrlMetadata {
            authority: AuthorityType::Ncbi,
            release_version: group(2).or_else(|| group(4))?,
            assembly_name: group(6)?,
            taxon_id: group(1),
            assembly_accession: group(3),
            scientific_name: None,
        })
    } else if host.contains("ensembl") {
        let caps = ensembl_regex()?.captures(path)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Some(UrlMetadata {
            authority: AuthorityType::Ensembl,
            release_version: group(1)?,
            assembly_name: group(4)?,
            taxon_id: None,
            assembly_accession: None,
            scientific_name: group(3),
        })
    } else {
        None
    }
}
