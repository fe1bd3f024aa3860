// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command line definitions

use clap::{Parser, Subcommand, ValueEnum};
use schemalite::StorageType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "schemalite", version, about = "SchemaLite - dynamic schema compilation engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a schema file, commit it and synchronize indexes
    Reload {
        /// JSON array of schema definitions
        #[arg(short, long)]
        schema: PathBuf,

        /// Index ledger directory (required for the sled backend)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Index ledger backend
        #[arg(long)]
        storage: Option<StorageType>,

        /// Engine configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip hierarchy and index synchronization
        #[arg(long)]
        testing: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print inheritance depth and relationship counts of a schema file
    Hierarchy {
        #[arg(short, long)]
        schema: PathBuf,

        /// Depth reported for chains longer than this
        #[arg(long, default_value_t = schemalite::hierarchy::DEFAULT_DEPTH_CAP)]
        depth_cap: usize,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List the indexes recorded in a persistent ledger
    Ledger {
        #[arg(short, long)]
        path: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
