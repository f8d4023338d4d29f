//! Genome annotation model: taxa, assemblies, annotation releases and genes

use bkbit_common::checksum::DigestAlgorithm;
use serde::{Deserialize, Serialize};

/// Organization that published an annotation release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityType {
    #[serde(rename = "NCBI")]
    Ncbi,
    #[serde(rename = "ENSEMBL")]
    Ensembl,
}

impl AuthorityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorityType::Ncbi => "NCBI",
            AuthorityType::Ensembl => "ENSEMBL",
        }
    }
}

impl std::fmt::Display for AuthorityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuthorityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NCBI" => Ok(AuthorityType::Ncbi),
            "ENSEMBL" => Ok(AuthorityType::Ensembl),
            _ => Err(format!(
                "Authority {} is not supported. Please use NCBI or Ensembl.",
                s
            )),
        }
    }
}

/// Checksum algorithm as an SPDX vocabulary term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestType {
    #[serde(rename = "spdx:checksumAlgorithm_md5")]
    Md5,
    #[serde(rename = "spdx:checksumAlgorithm_sha1")]
    Sha1,
    #[serde(rename = "spdx:checksumAlgorithm_sha256")]
    Sha256,
}

impl From<DigestAlgorithm> for DigestType {
    fn from(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => DigestType::Md5,
            DigestAlgorithm::Sha1 => DigestType::Sha1,
            DigestAlgorithm::Sha256 => DigestType::Sha256,
        }
    }
}

/// Gene biotype; values outside the known set are carried through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BioType {
    ProteinCoding,
    Lncrna,
    Ncrna,
    Pseudogene,
    Other(String),
}

impl From<String> for BioType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "protein_coding" => BioType::ProteinCoding,
            "lncRNA" => BioType::Lncrna,
            "ncRNA" => BioType::Ncrna,
            "pseudogene" => BioType::Pseudogene,
            _ => BioType::Other(value),
        }
    }
}

impl From<BioType> for String {
    fn from(value: BioType) -> Self {
        match value {
            BioType::ProteinCoding => "protein_coding".to_string(),
            BioType::Lncrna => "lncRNA".to_string(),
            BioType::Ncrna => "ncRNA".to_string(),
            BioType::Pseudogene => "pseudogene".to_string(),
            BioType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismTaxon {
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iri: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub xref: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeAssembly {
    pub id: String,
    pub in_taxon: Vec<String>,
    pub in_taxon_label: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain: Option<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub xref: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    pub id: String,
    pub checksum_algorithm: DigestType,
    pub value: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeAnnotation {
    pub id: String,
    pub digest: Vec<String>,
    pub content_url: Vec<String>,
    pub reference_assembly: String,
    pub version: String,
    pub in_taxon: Vec<String>,
    pub in_taxon_label: String,
    pub description: String,
    pub authority: AuthorityType,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub xref: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneAnnotation {
    pub id: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_type: Option<BioType>,
    pub referenced_in: String,
    pub in_taxon: Vec<String>,
    pub in_taxon_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub xref: Vec<String>,
}

impl GeneAnnotation {
    pub fn is_protein_coding(&self) -> bool {
        self.molecular_type == Some(BioType::ProteinCoding)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_biotype_round_trip_preserves_unknown() {
        let known: BioType = serde_json::from_value(json!("protein_coding")).unwrap();
        assert_eq!(known, BioType::ProteinCoding);
        let unknown: BioType = serde_json::from_value(json!("snoRNA")).unwrap();
        assert_eq!(serde_json::to_value(unknown).unwrap(), json!("snoRNA"));
    }

    #[test]
    fn test_digest_type_terms() {
        assert_eq!(
            serde_json::to_value(DigestType::from(DigestAlgorithm::Md5)).unwrap(),
            json!("spdx:checksumAlgorithm_md5")
        );
    }

    #[test]
    fn test_authority_parse() {
        assert_eq!("ensembl".parse::<AuthorityType>().unwrap(), AuthorityType::Ensembl);
        assert!("treeshrewdb".parse::<AuthorityType>().is_err());
        assert_eq!(serde_json::to_value(AuthorityType::Ncbi).unwrap(), json!("NCBI"));
    }
}
