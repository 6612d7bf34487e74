use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

use clabgen::config_loader;
use clabgen::orchestrator::RunState;
use clabgen::pipeline::{self, REPORT_FILE};

/// Generate a containerlab topology and address plan from link declarations,
/// then deploy and configure the lab
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Link declaration file (`name: <lab>` header, then `dev if dev if` lines)
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,

    /// Optional run configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Working directory for the topology, playbooks and reports
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Redeploy an existing lab (`containerlab deploy --reconfigure`)
    #[arg(long)]
    reconfigure: bool,

    /// Write the topology, host_vars and address plan, then stop
    #[arg(long)]
    plan_only: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    let config = config_loader::load_or_default(args.config.as_deref())?;

    // RUST_LOG wins over the configured level, which defaults to "info"
    let default_filter = config.general.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Input file: {:?}", args.input);
    info!("Output directory: {:?}", args.output);

    let lab = pipeline::prepare(&args.input, &args.output, &config)?;
    if !lab.warnings.is_empty() {
        warn!("{} topology warning(s), see the log above", lab.warnings.len());
    }
    info!("Containerlab topology written to {:?}", lab.descriptor_path);

    if args.plan_only {
        info!("Plan-only run, skipping deployment");
        return Ok(());
    }

    let report = pipeline::deploy(&lab, &config, args.reconfigure);
    let report_path = args.output.join(REPORT_FILE);
    report
        .write_json(&report_path)
        .wrap_err("Failed to save the deployment report")?;
    info!("Deployment report written to {:?}", report_path);

    if let Some(error) = report.fatal_error() {
        return Err(eyre!("Deployment of lab '{}' failed: {}", lab.name, error));
    }
    if report.final_state == RunState::ViosManual {
        warn!("VIOS devices need manual configuration:");
        for command in &report.manual_commands {
            warn!("  {}", command);
        }
    }

    Ok(())
}
