mod import;
mod inspect;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heartcare-import")]
#[command(version)]
#[command(about = "Load legacy SQL Server dumps into the HeartCare store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import the primary dump and every .sql file of the data directory
    Import {
        /// Primary dump file [default: data.sql]
        dump: Option<PathBuf>,

        /// Directory of secondary .sql dumps [default: data]
        #[arg(short = 'D', long)]
        data_dir: Option<PathBuf>,

        /// DuckDB database file to load into [default: heartcare.duckdb]
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for synthetic rows (random if not specified)
        #[arg(long)]
        seed: Option<u64>,

        /// Never pad dumps with synthetic rows
        #[arg(long)]
        no_augment: bool,

        /// Show progress while importing files
        #[arg(short, long)]
        progress: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and map a dump without loading it; prints one JSON record per line
    Inspect {
        /// Dump file to inspect
        file: PathBuf,

        /// Seed for synthetic rows (random if not specified)
        #[arg(long)]
        seed: Option<u64>,

        /// Never pad the dump with synthetic rows
        #[arg(long)]
        no_augment: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Import {
            dump,
            data_dir,
            database,
            config,
            seed,
            no_augment,
            progress,
            json,
        } => import::run(
            dump, data_dir, database, config, seed, no_augment, progress, json,
        ),
        Commands::Inspect {
            file,
            seed,
            no_augment,
        } => inspect::run(file, seed, no_augment),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "heartcare-import",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
