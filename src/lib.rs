pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod io_utils;
pub mod month;
pub mod normalize;
pub mod payroll;
pub mod pipeline;
pub mod report;
pub mod request;
pub mod session;
pub mod table;
pub mod yaml_provider;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("leave_normalizer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => pipeline::execute(&args),
        Commands::DetectMonth(args) => handle_detect_month(&args),
        Commands::InitConfig(args) => handle_init_config(&args),
    }
}

fn handle_detect_month(args: &cli::DetectMonthArgs) -> Result<()> {
    let month = month::select_month(&args.identifier)?;
    println!("{}\t{}", month.number_from_month(), month.name());
    Ok(())
}

fn handle_init_config(args: &cli::InitConfigArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{:?} already exists (use --force to overwrite)",
            args.output
        );
    }
    config::LeaveConfig::default()
        .save(&args.output)
        .with_context(|| format!("Initializing config at {:?}", args.output))?;
    info!("Default column mapping written to {:?}", args.output);
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
