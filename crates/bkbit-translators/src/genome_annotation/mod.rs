//! Genome annotation translator for NCBI and Ensembl GFF3 releases

pub mod download;
pub mod gff3;
pub mod translator;
pub mod url;

pub use translator::{gff2jsonld, GenomeAnnotationTranslator, Gff3Options, DEFAULT_FEATURE_FILTER};
pub use url::{parse_url, UrlMetadata};
