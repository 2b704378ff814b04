use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Merge, split, and convert PDF files.
#[derive(Debug, Parser)]
#[command(name = "folio", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every tool and where it runs
    Tools,

    /// Run one tool and write its outputs
    Run {
        /// Tool id (e.g. 'merge-pdf', 'split-pdf', 'ocr-pdf')
        #[arg(value_name = "TOOL")]
        tool: String,

        /// Input files, in order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Tool options as JSON (e.g. '{"mode":"range","start":1,"end":3}')
        #[arg(long)]
        options: Option<String>,

        /// Directory the outputs are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}
