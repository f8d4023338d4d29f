//! bkbit CLI Library
//!
//! Command-line interface for translating BICAN data into JSON-LD and for
//! maintaining the BICAN LinkML models.
//!
//! # Overview
//!
//! - **Specimens**: walk the specimen portal graph (`bkbit specimen2jsonld`, `bkbit specimen-donors`)
//! - **Genome annotation**: GFF3 releases into gene annotations (`bkbit gff2jsonld`)
//! - **Taxonomy**: cache the NCBI name tables (`bkbit download-ncbi-taxonomy`)
//! - **Anatomy**: parcellation tables (`bkbit anatomical2jsonld`)
//! - **Data catalog**: file manifests and specimen metadata (`bkbit filemanifest2jsonld`, `bkbit list-library-aliquots`)
//! - **Models**: `bkbit linkml-trimmer`, `bkbit schema2model`, `bkbit yaml2csv`

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use bkbit_common::checksum::DigestAlgorithm;
use bkbit_common::logging::LogLevel;
use bkbit_schema::csv_export::DEFAULT_OUTPUT_DIR;
use bkbit_translators::specimen::endpoints::DEFAULT_PORTAL_URL;
use bkbit_translators::specimen::translator::DEFAULT_CONCURRENCY;
use bkbit_translators::taxonomy::TAXDMP_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bkbit - BICAN knowledge-base translation toolkit
#[derive(Parser, Debug)]
#[command(name = "bkbit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Print the full command reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,

    /// Specimen portal NHash API base URL
    #[arg(long, env = "BKBIT_SPECIMEN_PORTAL_URL", default_value = DEFAULT_PORTAL_URL, global = true)]
    pub portal_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a specimen and its provenance into library generation JSON-LD
    ///
    /// NHASH_ID is a single NHash id, or a file with one NHash id per line.
    Specimen2jsonld {
        /// NHash id or file of NHash ids
        nhash_id: String,

        /// Walk down to the descendants instead of up to the ancestors
        #[arg(short, long)]
        descendants: bool,

        /// Write `<nhash_id>.jsonld` instead of printing
        #[arg(long)]
        save: bool,

        /// Directory for saved JSON-LD files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Concurrent portal requests
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },

    /// Search the specimen portal donors
    SpecimenDonors {
        #[arg(long)]
        donor_local_id: Option<String>,

        #[arg(long)]
        donor_nhash_id: Option<String>,

        #[arg(long)]
        age_of_death: Option<String>,

        #[arg(long)]
        ethnicity: Option<String>,

        #[arg(long)]
        race: Option<String>,

        #[arg(long)]
        sex: Option<String>,

        #[arg(long)]
        species: Option<String>,
    },

    /// Translate an NCBI or Ensembl GFF3 release into genome annotation JSON-LD
    Gff2jsonld {
        /// URL of the gzipped GFF3 file
        content_url: String,

        /// Assembly accession (required for Ensembl)
        #[arg(short = 'a', long)]
        assembly_accession: Option<String>,

        /// Assembly strain
        #[arg(short = 's', long)]
        assembly_strain: Option<String>,

        /// Log level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
        #[arg(short = 'l', long, default_value = "WARNING")]
        log_level: LogLevel,

        /// Write logs to a file instead of the console
        #[arg(short = 'f', long)]
        log_to_file: bool,

        /// Digests of the GFF3 file to record (md5, sha1, sha256)
        #[arg(long, value_delimiter = ',', default_value = "md5")]
        hash_functions: Vec<DigestAlgorithm>,
    },

    /// Download the NCBI taxonomy name tables used by gff2jsonld
    DownloadNcbiTaxonomy {
        /// Directory for the name tables (defaults to BKBIT_TAXONOMY_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// taxdmp.zip location
        #[arg(long, default_value = TAXDMP_URL)]
        url: String,
    },

    /// Translate a directory of parcellation CSV tables into anatomical structure JSON-LD
    Anatomical2jsonld {
        /// Directory holding the CSV tables
        dir_path: PathBuf,
    },

    /// Convert a file manifest CSV into digital objects
    Filemanifest2jsonld {
        /// File manifest CSV
        path: PathBuf,

        /// Also write the unique specimen ids to file_manifest_library_aliquots.txt
        #[arg(long)]
        list_library_aliquots: bool,
    },

    /// Print the library aliquot ids of a specimen metadata CSV
    ListLibraryAliquots {
        /// Specimen metadata CSV
        path: PathBuf,
    },

    /// Trim a LinkML schema to the parts reachable from the given classes
    LinkmlTrimmer {
        /// LinkML schema YAML
        schema: PathBuf,

        /// Classes to keep
        #[arg(short, long, required = true, value_delimiter = ',')]
        classes: Vec<String>,

        /// Slots to keep
        #[arg(short, long, value_delimiter = ',')]
        slots: Vec<String>,

        /// Enums to keep
        #[arg(short, long, value_delimiter = ',')]
        enums: Vec<String>,

        /// Id of the trimmed schema
        #[arg(short = 'i', long)]
        schema_id: Option<String>,

        /// Name of the trimmed schema
        #[arg(short = 'n', long)]
        schema_name: Option<String>,

        /// Title of the trimmed schema
        #[arg(short = 't', long)]
        schema_title: Option<String>,

        /// Version of the trimmed schema
        #[arg(short = 'v', long)]
        schema_version: Option<String>,
    },

    /// Build a LinkML schema from model spreadsheets
    Schema2model {
        /// TSV sheets, or with --gsheet a YAML file naming Google Sheets
        #[arg(required = true)]
        spreadsheets: Vec<PathBuf>,

        /// Output YAML file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Schema merged into the result (defaults to classes_base.yaml beside the first sheet)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Read the sheets from Google Sheets
        #[arg(long)]
        gsheet: bool,

        /// Directory for downloaded Google Sheets
        #[arg(long)]
        gsheet_download_dir: Option<PathBuf>,

        /// Fix range columns before parsing (default)
        #[arg(long = "fix-tsv", visible_alias = "fix_tsv", overrides_with = "no_fix_tsv")]
        fix_tsv: bool,

        /// Skip fixing range columns before parsing
        #[arg(long = "no-fix-tsv", visible_alias = "no-fix_tsv", overrides_with = "fix_tsv")]
        no_fix_tsv: bool,

        /// Save the fixed sheets to fixed_sheets/
        #[arg(long, visible_alias = "fix_tsv_save")]
        fix_tsv_save: bool,

        /// Add slots referenced by classes but never defined (default)
        #[arg(long, overrides_with = "no_repair")]
        repair: bool,

        /// Skip adding slots referenced by classes but never defined
        #[arg(long = "no-repair", overrides_with = "repair")]
        no_repair: bool,

        /// Mark class-valued slots as inlined (default)
        #[arg(long, overrides_with = "no_inlined")]
        inlined: bool,

        /// Do not mark class-valued slots as inlined
        #[arg(long = "no-inlined", overrides_with = "inlined")]
        no_inlined: bool,

        /// Allow class-valued slots to hold references by id (default)
        #[arg(long = "ref-by-ind", visible_alias = "ref_by_ind", overrides_with = "no_ref_by_ind")]
        ref_by_ind: bool,

        /// Do not allow class-valued slots to hold references by id
        #[arg(long = "no-ref-by-ind", visible_alias = "no-ref_by_ind", overrides_with = "ref_by_ind")]
        no_ref_by_ind: bool,

        /// Apply the BICAN model clean-up (default)
        #[arg(
            long = "fix-bican-model",
            visible_alias = "fix_bican_model",
            overrides_with = "no_fix_bican_model"
        )]
        fix_bican_model: bool,

        /// Skip the BICAN model clean-up
        #[arg(
            long = "no-fix-bican-model",
            visible_alias = "no-fix_bican_model",
            overrides_with = "fix_bican_model"
        )]
        no_fix_bican_model: bool,
    },

    /// Export a LinkML schema as the BICAN model CSV tables
    Yaml2csv {
        /// LinkML schema YAML
        yaml_model: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    fn schema2model_switches(args: &[&str]) -> [bool; 5] {
        let cli = Cli::try_parse_from(["bkbit", "schema2model", "a.tsv"].iter().chain(args)).unwrap();
        match cli.command {
            Some(Commands::Schema2model {
                no_fix_tsv,
                no_repair,
                no_inlined,
                no_ref_by_ind,
                no_fix_bican_model,
                ..
            }) => [!no_fix_tsv, !no_repair, !no_inlined, !no_ref_by_ind, !no_fix_bican_model],
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_schema2model_flags_default_on() {
        assert_eq!(schema2model_switches(&[]), [true; 5]);
        assert_eq!(schema2model_switches(&["--no-inlined"]), [true, true, false, true, true]);
    }

    #[test]
    fn test_schema2model_last_flag_wins() {
        assert_eq!(
            schema2model_switches(&["--no-fix-tsv", "--fix_tsv", "--ref_by_ind", "--no-ref-by-ind"]),
            [true, true, true, false, true]
        );
        assert_eq!(
            schema2model_switches(&["--no-fix_bican_model", "--no-repair", "--repair"]),
            [true, true, true, true, false]
        );
    }

    #[test]
    fn test_trimmer_lists() {
        let cli = Cli::try_parse_from([
            "bkbit", "linkml-trimmer", "s.yaml", "-c", "Donor,Specimen", "-v", "1.0",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::LinkmlTrimmer {
                classes,
                schema_version,
                ..
            }) => {
                assert_eq!(classes, vec!["Donor", "Specimen"]);
                assert_eq!(schema_version.as_deref(), Some("1.0"));
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_gff_log_level_accepts_upper_case_aliases() {
        let cli = Cli::try_parse_from(["bkbit", "gff2jsonld", "https://x", "-l", "CRITICAL"]).unwrap();
        match cli.command {
            Some(Commands::Gff2jsonld {
                log_level,
                hash_functions,
                ..
            }) => {
                assert_eq!(log_level, LogLevel::Error);
                assert_eq!(hash_functions, vec![DigestAlgorithm::Md5]);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
