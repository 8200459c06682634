//! Command-line interface for oea-testdata
//!
//! # Usage Examples
//!
//! ## Test Data Generation
//! ```bash
//! oea-testdata generate intune --output-dir ./out --count 500 --seed 7
//! oea-testdata generate azure-ad --output-dir ./out --users-file users.json
//! oea-testdata generate ms-insights --output-dir ./out --schools 3 --clean
//! ```
//!
//! ## Pseudonymization
//! ```bash
//! oea-testdata --salt s3cret pseudonymize \
//!   --input students.csv --schema schemas.yaml --entity students \
//!   --output-dir ./pseudo
//! ```
//!
//! ## Stage Processing
//! ```bash
//! oea-testdata --storage-root ./lake land --source-folder contoso_sis --input ./test_data
//! oea-testdata --storage-root ./lake process --source-folder contoso_sis \
//!   --schema schemas.yaml --create-db
//! oea-testdata --storage-root ./lake process --source-folder ms_insights/M365/roster/2021-07-12 \
//!   --schema roster.yaml --entity Person --no-header
//! oea-testdata --storage-root ./lake stage ls stage2p/contoso_sis
//! oea-testdata stage parse abfss://stage2np@stoeaxyz.dfs.core.windows.net/ms_insights
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use oea::{TableFormat, WriteMode};
use oea_testdata::commands::process::ProcessOptions;
use oea_testdata::commands::{generate, process, pseudonymize, stage};
use oea_testdata::{GlobalOpts, LoggingContext, Settings};
use testdata_generator::Domain;
use testdata_populate::PopulateArgs;

#[derive(Parser)]
#[command(name = "oea-testdata")]
#[command(about = "Synthetic OEA test data generation and stage pseudonymization")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic test data for one domain
    Generate {
        /// Data domain
        #[arg(value_enum)]
        domain: DomainArg,

        #[command(flatten)]
        args: PopulateArgs,
    },

    /// Pseudonymize one CSV file against an entity schema
    Pseudonymize {
        /// Headed CSV file
        #[arg(long)]
        input: PathBuf,

        /// Schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Entity of the schema file describing the input
        #[arg(long)]
        entity: String,

        /// Directory receiving <entity>.csv and <entity>_lookup.csv
        #[arg(long, short = 'o')]
        output_dir: PathBuf,
    },

    /// Process a source folder from stage1np into stage 2
    Process {
        /// Folder under every stage, e.g. contoso_sis
        #[arg(long)]
        source_folder: String,

        /// Schema YAML file
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Entity to process (repeatable; default: every entity of the schema)
        #[arg(long = "entity", value_name = "NAME")]
        entities: Vec<String>,

        /// Format of the landed stage 1 files
        #[arg(long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// The landed CSV files have no header row; columns follow the schema order
        #[arg(long)]
        no_header: bool,

        /// Write sanitized data to stage2np instead of pseudonymizing
        #[arg(long)]
        no_pseudonymize: bool,

        /// How existing stage 2 tables are treated
        #[arg(long, value_enum, default_value = "overwrite")]
        write_mode: WriteModeArg,

        /// Register the stage 2 database afterwards
        #[arg(long)]
        create_db: bool,
    },

    /// Copy a local test data directory into stage1np
    Land {
        /// Folder under stage1np, e.g. ms_insights
        #[arg(long)]
        source_folder: String,

        /// Local directory to copy
        #[arg(long)]
        input: PathBuf,
    },

    /// Inspect and manage stage paths and databases
    Stage {
        #[command(subcommand)]
        command: StageCommand,
    },

    /// Print a starter schema for a CSV file in a stage
    SchemaStarter {
        /// Entity name for the schema entry
        #[arg(long)]
        entity: String,

        /// Stage path of the CSV file, e.g. stage1np/contoso_sis/students.csv
        #[arg(long)]
        input: String,
    },

    /// Print the complete lines at the start of a CSV file in a stage
    Sample {
        /// Stage path of the CSV file
        #[arg(long)]
        path: String,

        /// The file has no header row
        #[arg(long)]
        no_header: bool,
    },
}

/// Stage subcommands. PATH is a full URI or `<container>/<path>`.
#[derive(Subcommand)]
enum StageCommand {
    /// List folders and files under a path
    Ls { path: String },
    /// Show every folder of a stage with its entities
    Describe { path: String },
    /// Parse a stage path into its parts
    Parse { path: String },
    /// Register a database over a stage folder, one table per subfolder
    CreateDb {
        path: String,
        #[arg(long, value_enum, default_value = "jsonl")]
        format: FormatArg,
    },
    /// Drop a database from the catalog
    DropDb { name: String },
    /// Remove a path recursively if it exists
    Rm { path: String },
}

/// Data domain to generate
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DomainArg {
    Intune,
    #[value(name = "azure-ad")]
    AzureAd,
    #[value(name = "student-demographics")]
    StudentDemographics,
    #[value(name = "edfi")]
    EdFi,
    #[value(name = "ms-insights")]
    MsInsights,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Intune => Domain::Intune,
            DomainArg::AzureAd => Domain::AzureAd,
            DomainArg::StudentDemographics => Domain::StudentDemographics,
            DomainArg::EdFi => Domain::EdFi,
            DomainArg::MsInsights => Domain::MsInsights,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WriteModeArg {
    Overwrite,
    Append,
}

impl From<WriteModeArg> for WriteMode {
    fn from(arg: WriteModeArg) -> Self {
        match arg {
            WriteModeArg::Overwrite => WriteMode::Overwrite,
            WriteModeArg::Append => WriteMode::Append,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for TableFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => TableFormat::CSV,
            FormatArg::Jsonl => TableFormat::Jsonl,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.global).context("Failed to load configuration")?;
    let _logging = LoggingContext::init(&settings.log_level)?;
    tracing::debug!(
        "Storage root {:?}, account {}",
        settings.storage_root,
        settings.storage_account
    );

    match cli.command {
        Commands::Generate { domain, args } => {
            let metrics = generate::run_generate(domain.into(), &args)?;
            println!(
                "Wrote {} records to {} files under {}",
                metrics.records_written,
                metrics.files_written,
                args.output_dir.display()
            );
        }
        Commands::Pseudonymize {
            input,
            schema,
            entity,
            output_dir,
        } => {
            let output = pseudonymize::run_pseudonymize(
                &input,
                &schema,
                &entity,
                &output_dir,
                &settings.salt,
            )?;
            println!("{}", output.pseudonymized.display());
            if let Some(lookup) = output.lookup {
                println!("{}", lookup.display());
            }
        }
        Commands::Process {
            source_folder,
            schema,
            entities,
            format,
            no_header,
            no_pseudonymize,
            write_mode,
            create_db,
        } => {
            let format = match format {
                FormatArg::Csv => TableFormat::Csv { header: !no_header },
                FormatArg::Jsonl => TableFormat::Jsonl,
            };
            let options = ProcessOptions {
                source_folder: &source_folder,
                schema_file: &schema,
                entities: &entities,
                format,
                pseudonymize: !no_pseudonymize,
                write_mode: write_mode.into(),
                create_db,
            };
            let processed = process::run_process(&settings, &options)?;
            println!("Processed {processed} entities of {source_folder}");
        }
        Commands::Land {
            source_folder,
            input,
        } => {
            let destination = process::run_land(&settings, &source_folder, &input)?;
            println!("Landed {} in {destination}", input.display());
        }
        Commands::Stage { command } => {
            let output = match command {
                StageCommand::Ls { path } => stage::run_ls(&settings, &path)?,
                StageCommand::Describe { path } => stage::run_describe(&settings, &path)?,
                StageCommand::Parse { path } => stage::run_parse(&settings, &path)?,
                StageCommand::CreateDb { path, format } => {
                    stage::run_create_db(&settings, &path, format.into())?
                }
                StageCommand::DropDb { name } => stage::run_drop_db(&settings, &name)?,
                StageCommand::Rm { path } => stage::run_rm(&settings, &path)?,
            };
            print!("{}", with_newline(output));
        }
        Commands::SchemaStarter { entity, input } => {
            print!(
                "{}",
                with_newline(stage::run_schema_starter(&settings, &entity, &input)?)
            );
        }
        Commands::Sample { path, no_header } => {
            print!("{}", stage::run_sample(&settings, &path, !no_header)?);
        }
    }

    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
