// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! QueryGraph command-line entry point

mod cli;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        cli.log_level
            .map(|l| l.to_level_filter())
            .unwrap_or(log::LevelFilter::Warn)
    };
    env_logger::Builder::new().filter_level(level).init();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Version => {
            cli::handle_version();
            Ok(())
        }
        Commands::Graph { input, format } => cli::handle_graph(&config, input, format),
        Commands::Export {
            input,
            format,
            output,
        } => cli::handle_export(input, format, output).await,
        Commands::Run {
            fixtures,
            database,
            table,
            query,
            format,
        } => cli::handle_run(config, fixtures, database, table, query, format).await,
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}
