// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use legajo_core::QualityProfile;

/// Convert, trim, compress and shred documents.
#[derive(Parser, Debug)]
#[command(name = "legajo", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to config.json in the data directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a Word document (.docx, .doc, .odt, .rtf) to PDF
    Convert {
        input: PathBuf,

        /// Output PDF (defaults to <name>_convertido.pdf next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a copy of a PDF without the selected pages
    RemovePages {
        input: PathBuf,
        output: PathBuf,

        /// Pages to remove, 1-based: "1, 3, 5-7"
        #[arg(short, long, value_name = "PAGES")]
        pages: String,

        /// Securely delete the source once the copy is written
        #[arg(long)]
        shred_source: bool,
    },

    /// Compress a PDF with Ghostscript
    Compress {
        input: PathBuf,

        /// Output PDF (defaults to <name>_<quality>.pdf next to the input)
        output: Option<PathBuf>,

        /// screen, ebook or printer
        #[arg(short, long, conflicts_with = "tier")]
        quality: Option<QualityProfile>,

        /// 0 = most compression, 1 = recommended, 2 = best quality
        #[arg(short, long)]
        tier: Option<usize>,
    },

    /// Place an image on a single PDF page
    ImageToPdf { input: PathBuf, output: PathBuf },

    /// Show page count and size of a PDF
    Info { input: PathBuf },

    /// Overwrite a file with zeros and delete it
    Shred { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_remove_pages() {
        let cli = Cli::try_parse_from([
            "legajo",
            "remove-pages",
            "in.pdf",
            "out.pdf",
            "--pages",
            "1,3-4",
            "--shred-source",
        ])
        .unwrap();
        match cli.command {
            Command::RemovePages {
                pages,
                shred_source,
                ..
            } => {
                assert_eq!(pages, "1,3-4");
                assert!(shred_source);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn quality_and_tier_conflict() {
        let result = Cli::try_parse_from([
            "legajo", "compress", "in.pdf", "--quality", "screen", "--tier", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quality_parses_case_insensitively() {
        let cli =
            Cli::try_parse_from(["legajo", "--json", "compress", "in.pdf", "-q", "Printer"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Compress { quality, output, .. } => {
                assert_eq!(quality, Some(QualityProfile::Printer));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
