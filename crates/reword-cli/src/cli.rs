use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reword::{EditorOptions, FontFallback};

/// Extract text fragments from PDF documents and write edited copies.
#[derive(Debug, Parser)]
#[command(name = "reword", about, version)]
pub struct Cli {
    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Refuse inputs larger than this many bytes (default: 20 MiB)
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_size: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the fragment model of a PDF as JSON
    Extract {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file. Default: stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Replace fragments and write the edited PDF
    Apply {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Edit set: {"page": {"fragment": "replacement"}}
        #[arg(value_name = "EDITS")]
        edits: PathBuf,

        /// Output PDF. Default: edited_<name>.pdf next to FILE
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        insertion: InsertionArgs,
    },

    /// List fragments with their indices
    Inspect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only this page (0-based, as in edit sets)
        #[arg(long)]
        page: Option<usize>,
    },
}

/// How replacement text is drawn.
#[derive(Debug, Clone, Args)]
pub struct InsertionArgs {
    /// Font used when a fragment reports none (default: helv)
    #[arg(long)]
    pub fallback_font: Option<String>,

    /// Size used when a fragment reports size 0 (default: 12)
    #[arg(long)]
    pub fallback_size: Option<f64>,

    /// Points to raise the baseline above the old box's bottom (default: 1)
    #[arg(long, allow_negative_numbers = true)]
    pub baseline_nudge: Option<f64>,

    /// Skip an edit instead of substituting a font outside the standard 14
    #[arg(long)]
    pub strict_fonts: bool,
}

impl InsertionArgs {
    /// Overlay these flags on `options`.
    pub fn apply_to(&self, options: &mut EditorOptions) {
        if let Some(font) = &self.fallback_font {
            options.fallback_font = font.clone();
        }
        if let Some(size) = self.fallback_size {
            options.fallback_size = size;
        }
        if let Some(nudge) = self.baseline_nudge {
            options.baseline_nudge = nudge;
        }
        if self.strict_fonts {
            options.font_fallback = FontFallback::Strict;
        }
    }
}
