// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SchemaLite CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still raise it
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "SchemaLite".bold().green(), schemalite::VERSION);
            println!("Dynamic schema compilation engine");
            Ok(())
        }

        Commands::Reload {
            schema,
            path,
            storage,
            config,
            testing,
            format,
        } => cli::handle_reload(schema, path, storage, config, testing, format),

        Commands::Hierarchy {
            schema,
            depth_cap,
            format,
        } => cli::handle_hierarchy(schema, depth_cap, format),

        Commands::Ledger { path, format } => cli::handle_ledger(path, format),
    }
}
