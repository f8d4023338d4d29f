//! bkbit CLI - Main entry point

use bkbit_cli::commands::schema::KeepLists;
use bkbit_cli::{Cli, Commands, Config};
use bkbit_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use bkbit_schema::{Schema2ModelOptions, SchemaHeader, TsvFixOptions};
use bkbit_translators::specimen::DonorQuery;
use bkbit_translators::Gff3Options;
use clap::Parser;
use std::process;
use tracing::error;

/// File prefix for `gff2jsonld --log-to-file`
const GFF_LOG_FILE_PREFIX: &str = "gff3_translator";

#[tokio::main]
async fn main() {
    // Variables from .env are visible to clap's `env` arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    let log_config = log_config(&cli);
    // LOG_* variables take precedence
    let log_config = match log_config.clone().merge_env() {
        Ok(merged) => merged,
        Err(e) => {
            eprintln!("Warning: ignoring LOG_* settings: {}", e);
            log_config
        },
    };
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn log_config(cli: &Cli) -> LogConfig {
    let verbose_or = |level: LogLevel| if cli.verbose { LogLevel::Debug } else { level };

    match &cli.command {
        Some(Commands::Gff2jsonld {
            log_level,
            log_to_file,
            ..
        }) => LogConfig::builder()
            .level(verbose_or(*log_level))
            .output(if *log_to_file {
                LogOutput::File
            } else {
                LogOutput::Console
            })
            .log_file_prefix(GFF_LOG_FILE_PREFIX)
            .build(),
        _ => LogConfig::builder()
            .level(verbose_or(LogLevel::Warn))
            .output(LogOutput::Console)
            .log_file_prefix("bkbit")
            .build(),
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> bkbit_cli::Result<()> {
    let Some(ref command) = cli.command else {
        unreachable!("Command should have been validated in main");
    };

    let mut config = Config::from_env()?;
    config.set_specimen_portal_url(cli.portal_url.clone());

    match command {
        Commands::Specimen2jsonld {
            nhash_id,
            descendants,
            save,
            output_dir,
            concurrency,
        } => {
            bkbit_cli::commands::specimen::specimen2jsonld(
                &config,
                nhash_id,
                *descendants,
                *save,
                output_dir,
                *concurrency,
            )
            .await
        },

        Commands::SpecimenDonors {
            donor_local_id,
            donor_nhash_id,
            age_of_death,
            ethnicity,
            race,
            sex,
            species,
        } => {
            let query = DonorQuery {
                donor_local_id: donor_local_id.clone(),
                donor_nhash_id: donor_nhash_id.clone(),
                age_of_death: age_of_death.clone(),
                ethnicity: ethnicity.clone(),
                race: race.clone(),
                sex: sex.clone(),
                species: species.clone(),
            };
            bkbit_cli::commands::specimen::donors(&config, &query).await
        },

        Commands::Gff2jsonld {
            content_url,
            assembly_accession,
            assembly_strain,
            hash_functions,
            ..
        } => {
            let options = Gff3Options {
                assembly_accession: assembly_accession.clone(),
                assembly_strain: assembly_strain.clone(),
                hash_functions: hash_functions.clone(),
                timeout: config.http_timeout,
                ..Default::default()
            };
            bkbit_cli::commands::genome::gff2jsonld(&config, content_url, &options).await
        },

        Commands::DownloadNcbiTaxonomy { output_dir, url } => {
            let output_dir = output_dir.clone().unwrap_or_else(|| config.taxonomy_dir.clone());
            bkbit_cli::commands::genome::download_taxonomy(url, &output_dir).await
        },

        Commands::Anatomical2jsonld { dir_path } => bkbit_cli::commands::anatomical::run(dir_path),

        Commands::Filemanifest2jsonld {
            path,
            list_library_aliquots,
        } => bkbit_cli::commands::catalog::filemanifest2jsonld(path, *list_library_aliquots),

        Commands::ListLibraryAliquots { path } => {
            bkbit_cli::commands::catalog::library_aliquots(path)
        },

        Commands::LinkmlTrimmer {
            schema,
            classes,
            slots,
            enums,
            schema_id,
            schema_name,
            schema_title,
            schema_version,
        } => {
            let keep = KeepLists {
                classes: classes.clone(),
                slots: slots.clone(),
                enums: enums.clone(),
            };
            let header = SchemaHeader {
                id: schema_id.clone(),
                name: schema_name.clone(),
                title: schema_title.clone(),
                version: schema_version.clone(),
            };
            bkbit_cli::commands::schema::trim(schema, &keep, &header)
        },

        Commands::Schema2model {
            spreadsheets,
            output,
            template,
            gsheet,
            gsheet_download_dir,
            no_fix_tsv,
            fix_tsv_save,
            no_repair,
            no_inlined,
            no_ref_by_ind,
            no_fix_bican_model,
            ..
        } => {
            let options = Schema2ModelOptions {
                fix_tsv: !*no_fix_tsv,
                fix_tsv_save: *fix_tsv_save,
                repair: !*no_repair,
                fix_bican_model: !*no_fix_bican_model,
                tsv_fix: TsvFixOptions {
                    inlined: !*no_inlined,
                    ref_by_ind: !*no_ref_by_ind,
                },
                template: template.clone(),
                ..Default::default()
            };
            bkbit_cli::commands::schema::schema_from_sheets(
                spreadsheets,
                *gsheet,
                gsheet_download_dir.as_deref(),
                &options,
                output.as_deref(),
            )
            .await
        },

        Commands::Yaml2csv {
            yaml_model,
            output_dir,
        } => bkbit_cli::commands::schema::yaml2csv(yaml_model, output_dir),
    }
}
