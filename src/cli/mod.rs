pub mod detect;
pub mod handlers;
pub mod import;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use statement_import::settings::{load_settings_from, settings_path, Settings};

#[derive(Parser)]
#[command(name = "stmt", about = "Import bank statements into canonical transactions.")]
pub struct Cli {
    /// Settings file (default: ~/.config/statement-import/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn load_settings(&self) -> Settings {
        let path = self.settings.clone().unwrap_or_else(settings_path);
        load_settings_from(&path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a statement and print its transactions.
    Import {
        /// Path to a CSV, XLSX/XLS or PDF statement
        file: PathBuf,
        /// Append parsed transactions to this JSON-lines file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// List every skipped row with its reason
        #[arg(long)]
        show_diagnostics: bool,
        /// Print the full import report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Show which format and handler a file resolves to, without parsing it.
    Detect {
        file: PathBuf,
    },
    /// List registered handlers in priority order.
    Handlers,
}
