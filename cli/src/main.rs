//! CLI entrypoint for dbrain
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use dbrain_application::{
    CapabilityRuntime, ExecutePromptInput, LlmProcessor, LlmProvider, VaultNotes,
    VaultPersistence,
};
use dbrain_domain::LlmResponseEnvelope;
use dbrain_infrastructure::{
    ConfigLoader, FileConfig, FsVaultNotes, LoadOptions, LocalCapabilityRuntime, ProviderRouter,
    VaultGit,
};
use dbrain_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter, format_json};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// One use case invocation, resolved from the command line
enum Job {
    Daily(NaiveDate),
    Prompt(ExecutePromptInput),
    Weekly(NaiveDate),
}

impl Job {
    async fn run(self, processor: &LlmProcessor) -> LlmResponseEnvelope {
        match self {
            Job::Daily(day) => processor.process_daily(day).await,
            Job::Prompt(input) => processor.execute_prompt(input).await,
            Job::Weekly(today) => processor.generate_weekly(today).await,
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter()),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn check_config(options: &LoadOptions, config: &FileConfig) -> Result<ExitCode> {
    println!("{}", "Configuration sources (in priority order):".bold());
    for source in ConfigLoader::sources(options) {
        let status = if source.found {
            "[FOUND]".green()
        } else {
            "[     ]".dimmed()
        };
        println!("  {} {:<9}{}", status, format!("{}:", source.label), source.location);
    }
    println!();

    let provider = config
        .provider_config()
        .context("Invalid provider configuration")?;
    let execution = config
        .execution_params()
        .context("Invalid execution settings")?;
    let vault_root = config.vault_root();

    println!("{} {}", "Provider:".cyan().bold(), provider.kind().label());
    println!("{} {}", "Vault:".cyan().bold(), vault_root.display());
    if !vault_root.is_dir() {
        println!("  {} vault directory does not exist", "!".yellow().bold());
    }
    println!(
        "{} {}",
        "Tracker key:".cyan().bold(),
        if config.tracker_api_key().is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!(
        "{} {}s, {} iterations",
        "Execution:".cyan().bold(),
        execution.timeout.as_secs(),
        execution.max_iterations
    );
    println!("\n{} configuration is valid", "v".green().bold());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting dbrain");

    let options = LoadOptions {
        config_path: cli.config.clone(),
        no_config: cli.no_config,
        provider: cli.provider.clone(),
    };
    let config = ConfigLoader::load(&options).context("Failed to load configuration")?;

    let today = chrono::Local::now().date_naive();
    let job = match cli.command.clone() {
        Command::CheckConfig => return check_config(&options, &config),
        Command::Daily { date } => Job::Daily(date.unwrap_or(today)),
        Command::Prompt { text, user_id } => {
            Job::Prompt(ExecutePromptInput::new(text, user_id).on(today))
        }
        Command::Weekly => Job::Weekly(today),
    };

    let provider_config = config
        .provider_config()
        .context("Invalid provider configuration")?;
    let execution = config
        .execution_params()
        .context("Invalid execution settings")?;
    let vault_root = config.vault_root();
    if !vault_root.is_dir() {
        bail!("Vault directory not found: {}", vault_root.display());
    }

    // === Dependency Injection ===
    let runtime: Arc<dyn CapabilityRuntime> = Arc::new(LocalCapabilityRuntime::new(
        vault_root.clone(),
        config.tracker_client(),
    ));
    let provider = ProviderRouter::create(&provider_config, runtime);
    let label = provider.label();
    let provider: Arc<dyn LlmProvider> = Arc::new(provider);
    let notes: Arc<dyn VaultNotes> = Arc::new(FsVaultNotes::new(&vault_root));
    let persistence: Arc<dyn VaultPersistence> = Arc::new(VaultGit::new(&vault_root));
    let processor = LlmProcessor::new(provider, notes, persistence, execution);

    info!(provider = label, vault = %vault_root.display(), "Running {}", cli.command.label());

    let progress = ProgressReporter::start(
        &format!("Running {} via {}", cli.command.label(), label),
        cli.quiet,
    );
    let task = tokio::spawn(async move { job.run(&processor).await });
    let envelope = match task.await {
        Ok(envelope) => envelope,
        Err(e) => {
            progress.finish(false);
            error!("Background task failed: {}", e);
            bail!("{} did not complete: {}", cli.command.label(), e);
        }
    };
    progress.finish(!envelope.is_error());

    if cli.json {
        println!("{}", format_json(&envelope));
    } else {
        println!("{}", ConsoleFormatter::format(&envelope));
    }

    Ok(if envelope.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
