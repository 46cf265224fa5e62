// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Trim near-white margins from images and PDF pages and recompose them as PDF.
#[derive(Debug, Parser)]
#[command(name = "whitecrop", about, version)]
pub struct Cli {
    /// JSON settings file. Missing files fall back to defaults
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Crop every image in a folder into PDF
    Images {
        /// Folder holding the images
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Folder for one PDF per image. Default: the input folder
        #[arg(long, value_name = "DIR", conflicts_with = "merge")]
        output: Option<PathBuf>,

        /// Merge all images into this single PDF instead
        #[arg(long, value_name = "FILE")]
        merge: Option<PathBuf>,
    },

    /// Recrop every PDF below a folder into a mirrored output folder
    PdfFolder {
        /// Input root folder
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output root folder, created if absent
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Recrop every page of one PDF
    Pdf {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file. Default: <name>_cropped.pdf next to the input
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Generate a label PDF, one page per blank-line separated group
    Labels {
        /// UTF-8 text file with the label groups
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output PDF
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show page count and page sizes of a PDF
    Inspect {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
