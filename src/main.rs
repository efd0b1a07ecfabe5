use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use finadvisor::api::{PolicyArgs, ProfileArgs, apply_policy_overrides, build_profile};
use finadvisor::core::{EngineConfig, build_report};

#[derive(Parser, Debug)]
#[command(name = "finadvisor", about = "Personal finance health report and forecast")]
struct Cli {
    #[arg(long, global = true, help = "JSON file with benchmarks, assumptions and policy")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(default_value_t = 8080)]
        port: u16,
    },
    /// Print a full report for one profile as JSON.
    Report {
        #[command(flatten)]
        profile: ProfileArgs,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded engine config");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            finadvisor::api::run_http_server(port, config)
                .await
                .context("server error")?;
        }
        Command::Report { profile, policy } => {
            let profile = build_profile(profile)?;
            let config = apply_policy_overrides(&config, &policy)?;
            let report = build_report(&profile, &config);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
