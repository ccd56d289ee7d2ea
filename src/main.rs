// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use multijet_balance::config::{load_config, parse_pt_cuts, OutputConfig, PipelineBuilder, RunConfig};
use multijet_balance::engine::{Orchestrator, RunSummary};
use multijet_balance::io::{CsvStore, JsonLinesSource, MemoryStore, OutputStore};

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <config.yaml> [--group data|sim] [--pt-cuts 30,40] [--syst none|jec-up|...] [--workers N]\n\
         Example: {} configs/multijet-sim.yaml --syst jer-down --workers 4",
        program, program
    )
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut RunConfig, args: &[String]) -> Result<()> {
    let mut args = args.iter();
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .with_context(|| format!("missing value for '{}'", flag))?;
        match flag.as_str() {
            "--group" => config.dataset_group = value.parse()?,
            "--pt-cuts" => config.pt_cuts = parse_pt_cuts(value)?,
            "--syst" => config.syst = value.parse()?,
            "--workers" => {
                let workers = value
                    .parse()
                    .with_context(|| format!("invalid worker count '{}'", value))?;
                config.workers = Some(workers);
            }
            other => bail!("unknown option '{}'", other),
        }
    }
    Ok(())
}

fn output_store(output: &OutputConfig) -> Arc<dyn OutputStore> {
    match output {
        OutputConfig::Memory => Arc::new(MemoryStore::new()),
        OutputConfig::Csv { directory } => Arc::new(CsvStore::new(directory)),
    }
}

async fn run(args: &[String]) -> Result<RunSummary> {
    let config_path = &args[1];
    let mut config =
        load_config(config_path).with_context(|| format!("failed to load configuration '{}'", config_path))?;
    apply_overrides(&mut config, &args[2..])?;
    config.validate().context("invalid configuration")?;

    println!("Multijet balance");
    println!("════════════════");
    println!("Config: {}", config_path);
    println!(
        "Group: {}, pt cuts: {:?}, systematic: {}",
        config.dataset_group, config.pt_cuts, config.syst
    );
    println!();

    let registrations = PipelineBuilder::from_config(&config, output_store(&config.output));
    let orchestrator = Orchestrator::new(Arc::new(JsonLinesSource::new())).with_registrations(registrations);

    let summary = orchestrator
        .run(config.selected_datasets(), config.worker_count())
        .await?;
    Ok(summary)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("multijet");
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("{}", usage(program));
        std::process::exit(1);
    }

    match run(&args).await {
        Ok(summary) => {
            println!("{}", summary);
            if !summary.is_success() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            std::process::exit(2);
        }
    }
}
