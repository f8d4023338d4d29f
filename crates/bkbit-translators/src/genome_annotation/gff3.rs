//! GFF3 reader
//!
//! Yields feature rows with their column 9 attributes merged into value sets.
//! Gzip input is detected by the `.gz` suffix or the gzip magic bytes.
//!
//! # Format
//!
//! ```text
//! ##gff-version 3
//! NC_000067.7	BestRefSeq	gene	3269956	3741733	.	-	.	ID=gene-Xkr4;Dbxref=GeneID:497097;Name=Xkr4
//! ```

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const GFF3_HEADER: &str = "##gff-version 3";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const EXPECTED_COLUMNS: usize = 9;

/// Attribute name to the set of its values
pub type Attributes = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRow {
    pub line_number: usize,
    pub seqid: String,
    pub source: String,
    pub feature_type: String,
    pub attributes: Attributes,
}

/// Open a GFF3 file, decompressing on the fly when it is gzip
pub fn open_gff3(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    let file = File::open(path)?;

    let is_gzip = path.extension().is_some_and(|ext| ext == "gz") || (read == 2 && magic == GZIP_MAGIC);
    if is_gzip {
        debug!("Reading {} as gzip", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Iterator over the feature rows of a GFF3 stream
pub struct FeatureRows<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> FeatureRows<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for FeatureRows<R> {
    type Item = Result<FeatureRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e).context("Failed to read GFF3 line")),
            };
            self.line_number += 1;
            let trimmed = line.trim();

            if self.line_number == 1 && !trimmed.starts_with(GFF3_HEADER) {
                warn!(
                    "\"{}\" missing from the first line of the file. The given file may not be a valid GFF3 file.",
                    GFF3_HEADER
                );
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line.split('\t').map(str::trim).collect();
            if tokens.len() != EXPECTED_COLUMNS {
                warn!(
                    "Line {}: Features are expected {} columns, found {}.",
                    self.line_number,
                    EXPECTED_COLUMNS,
                    tokens.len()
                );
                if tokens.len() < EXPECTED_COLUMNS {
                    continue;
                }
            }

            return Some(Ok(FeatureRow {
                line_number: self.line_number,
                seqid: tokens[0].to_string(),
                source: tokens[1].to_string(),
                feature_type: tokens[2].to_string(),
                attributes: parse_attributes(tokens[8]),
            }));
        }
    }
}

/// Split column 9 on `;` then `=`, collecting every value under its key
pub fn parse_attributes(column: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for pair in column.split(';') {
        let mut parts = pair.split('=');
        let key = parts.next().unwrap_or_default().trim();
        for value in parts {
            attributes
                .entry(key.to_string())
                .or_default()
                .insert(value.trim().to_string());
        }
    }
    attributes
}

fn source_note_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\[Source.*?\]").ok()).as_ref()
}

/// Single value of an attribute
///
/// Absent attributes, attributes with several values and values containing a
/// comma yield `None`. Descriptions are percent-decoded and stripped of
/// `[Source:...]` notes.
pub fn get_attribute(attributes: &Attributes, name: &str, line_number: usize) -> Option<String> {
    let Some(values) = attributes.get(name) else {
        debug!(
            "Line {}: {} not set for this row's GeneAnnotation object due to missing {} attribute.",
            line_number, name, name
        );
        return None;
    };

    let value = match values.iter().next() {
        Some(value) if values.len() == 1 => value,
        _ => {
            debug!(
                "Line {}: {} not set for this row's GeneAnnotation object due to more than one {} provided.",
                line_number, name, name
            );
            return None;
        },
    };

    if name == "description" {
        let decoded = match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                debug!(
                    "Line {}: {} attribute could not be percent-decoded ({}), keeping it as is.",
                    line_number, name, e
                );
                value.clone()
            },
        };
        return Some(match source_note_regex() {
            Some(re) => re.replace_all(&decoded, "").into_owned(),
            None => decoded,
        });
    }

    if value.contains(',') {
        debug!(
            "Line {}: {} not set for this row's GeneAnnotation object due to value of {} attribute containing \",\".",
            line_number, name, name
        );
        return None;
    }
    Some(value.clone())
}

/// Every comma-separated value of a multi-valued attribute
pub fn split_values(attributes: &Attributes, name: &str) -> BTreeSet<String> {
    attributes
        .get(name)
        .into_iter()
        .flatten()
        .flat_map(|value| value.split(','))
        .map(|value| value.trim().to_string())
        .collect()
}
