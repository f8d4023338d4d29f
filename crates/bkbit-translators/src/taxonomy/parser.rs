//! Parser for the NCBI taxonomy `names.dmp` file
//!
//! Rows look like `9606\t|\tHomo sapiens\t|\t\t|\tscientific name\t|`.

use std::collections::BTreeMap;
use tracing::debug;

pub const SCIENTIFIC_NAME: &str = "scientific name";
pub const GENBANK_COMMON_NAME: &str = "genbank common name";

/// Name tables built from `names.dmp`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyNames {
    pub taxid_to_scientific_name: BTreeMap<String, String>,
    pub taxid_to_common_name: BTreeMap<String, String>,
    pub scientific_name_to_taxid: BTreeMap<String, String>,
}

/// Keep the first scientific name and the first GenBank common name of every taxon
///
/// The unique name variant is preferred for scientific names when present.
/// Rows with fewer than four fields are ignored.
pub fn parse_names_dmp(content: &str) -> TaxonomyNames {
    let mut names = TaxonomyNames::default();
    let mut skipped = 0usize;

    for line in content.trim().lines() {
        let parts: Vec<&str> = line.trim().split('|').map(str::trim).collect();
        if parts.len() < 4 {
            skipped += 1;
            continue;
        }
        let (taxid, name, unique_name, name_class) = (parts[0], parts[1], parts[2], parts[3]);

        if name_class == SCIENTIFIC_NAME && !names.taxid_to_scientific_name.contains_key(taxid) {
            let scientific = if unique_name.is_empty() { name } else { unique_name };
            names
                .taxid_to_scientific_name
                .insert(taxid.to_string(), scientific.to_string());
            names
                .scientific_name_to_taxid
                .insert(scientific.to_string(), taxid.to_string());
        } else if name_class == GENBANK_COMMON_NAME
            && !names.taxid_to_common_name.contains_key(taxid)
        {
            names
                .taxid_to_common_name
                .insert(taxid.to_string(), name.to_string());
        }
    }

    debug!(
        taxa = names.taxid_to_scientific_name.len(),
        common_names = names.taxid_to_common_name.len(),
        skipped,
        "Parsed names.dmp"
    );
    names
}
