//! plotcraft CLI - inspect and edit chart options from the command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use plotcraft_ui::EditorConfig;

mod edit;
mod templates;

#[derive(Parser)]
#[command(name = "plotcraft")]
#[command(version = plotcraft_ui::VERSION)]
#[command(about = "Metadata-driven chart options editor", long_about = None)]
struct Cli {
    /// Editor configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct MetaArgs {
    /// Category catalog (JSON)
    #[arg(long)]
    meta: PathBuf,

    /// Advanced option tree (JSON)
    #[arg(long)]
    advanced: Option<PathBuf>,

    /// Localization dictionary (JSON)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Chart options to edit (JSON)
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the form of a category, or the entries of an advanced node
    Inspect {
        #[command(flatten)]
        meta: MetaArgs,

        /// Category to show (defaults to the first one)
        #[arg(long)]
        category: Option<String>,

        /// Advanced tree node to show
        #[arg(long)]
        node: Option<String>,

        /// Array element for the advanced node
        #[arg(long, requires = "node")]
        index: Option<usize>,
    },

    /// Commit a value to a field and print the resulting options
    Set {
        #[command(flatten)]
        meta: MetaArgs,

        /// Field id (option path such as `title--text`)
        field: String,

        /// New value; parsed as JSON, falling back to a plain string
        value: String,

        /// Category the field lives in (searched when omitted)
        #[arg(long)]
        category: Option<String>,

        /// Array element edited by master-controlled groups
        #[arg(long)]
        index: Option<usize>,

        /// Write the options back to the --options file
        #[arg(long, requires = "options")]
        write: bool,
    },

    /// Browse chart templates
    Templates {
        /// Template catalog (JSON)
        file: PathBuf,

        /// Group to show (defaults to the first one)
        #[arg(long)]
        group: Option<String>,

        /// Select a template and print its configuration
        #[arg(long)]
        select: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("PLOTCRAFT_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
    Ok(match path {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::load(),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Inspect {
            meta,
            category,
            node,
            index,
        } => {
            let mut customizer = edit::open(&meta, config.customizer)?;
            print!("{}", edit::inspect(&mut customizer, category.as_deref(), node.as_deref(), index)?);
        }

        Commands::Set {
            meta,
            field,
            value,
            category,
            index,
            write,
        } => {
            let mut customizer = edit::open(&meta, config.customizer)?;
            let request = edit::SetRequest {
                field,
                value: edit::parse_value(&value),
                category,
                index,
            };
            let change = edit::set(&mut customizer, &request)?;
            tracing::info!(path = %change.path, index = ?change.index, "property changed");
            tracing::debug!(dirty = ?customizer.options().dirty_paths(), "options written");

            let output = serde_json::to_string_pretty(customizer.options().value())?;
            match (&meta.options, write) {
                (Some(path), true) => std::fs::write(path, output + "\n")?,
                _ => println!("{output}"),
            }
        }

        Commands::Templates { file, group, select } => {
            print!(
                "{}",
                templates::browse(&file, config.templates, group.as_deref(), select.as_deref())?
            );
        }
    }

    Ok(())
}
