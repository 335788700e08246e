//! lnf - Reconcile orphaned objects with their canonical location
//!
//! This is the CLI application that loads configuration, wires the store
//! into an operations context and renders whatever the ops crate returns.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{ArtifactArgs, Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use lnf_config::Config;
use lnf_events::{EventReceiver, EventSender};
use lnf_ops::{OperationResult, OpsContextBuilder, OpsCtx};
use lnf_types::{ColorChoice, OutputFormat};
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        // stderr never mixes with JSON written to stdout
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global, &cli.command)?;
    config.validate()?;

    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    init_tracing(json_output, cli.global.debug, &config.output.logs_dir);
    info!("Starting lnf v{}", env!("CARGO_PKG_VERSION"));

    // Plain output never colors unless asked to on the command line
    let color = match (cli.global.color, config.general.default_output) {
        (Some(color), _) => color,
        (None, OutputFormat::Plain) => ColorChoice::Never,
        (None, _) => config.general.color,
    };
    let renderer = OutputRenderer::new(json_output, color);

    // Classification is a pure function of the configuration
    if let Commands::Classify { held_path } = &cli.command {
        let report = lnf_ops::classify(&config, held_path);
        renderer.render_result(&OperationResult::Classification(report))?;
        return Ok(());
    }

    let (event_sender, event_receiver) = lnf_events::channel();
    let ops_ctx = build_ops_context(event_sender, config).await?;

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, json_output);

    let result =
        execute_command_with_events(cli.command, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    match command {
        Commands::Resolve { .. } => {
            let summary = lnf_ops::resolve(&ctx).await?;
            Ok(OperationResult::RunSummary(summary))
        }

        Commands::Inventory { .. } => {
            let report = lnf_ops::inventory(&ctx).await?;
            Ok(OperationResult::Inventory(report))
        }

        Commands::Explain {
            held_collection,
            name,
            ..
        } => {
            let report = lnf_ops::explain(&ctx, &held_collection, &name).await?;
            Ok(OperationResult::Explain(report))
        }

        Commands::Classify { held_path } => Ok(OperationResult::Classification(
            lnf_ops::classify(&ctx.config, &held_path),
        )),
    }
}

/// Build operations context with all required components
async fn build_ops_context(event_sender: EventSender, config: Config) -> Result<OpsCtx, CliError> {
    let store = lnf_ops::open_local_store(&config).await?;

    let ctx = OpsContextBuilder::new()
        .with_store(store)
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    Ok(ctx)
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, logs_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file, every step of every orphan
        if let Err(e) = std::fs::create_dir_all(logs_dir) {
            if !json_mode {
                eprintln!("Warning: Failed to create log directory: {e}");
            }
        }

        let log_file = logs_dir.join(format!(
            "lnf-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_env_filter(filter("info,lnf=debug,lnf_ops=debug"))
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn,lnf=warn,lnf_ops=warn"))
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(
    config: &mut Config,
    global: &cli::GlobalArgs,
    command: &Commands,
) -> Result<(), CliError> {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    match command {
        Commands::Resolve {
            jobs,
            artifacts,
            script,
            kept,
            still_lost,
        } => {
            if let Some(jobs) = jobs {
                config.resolve.workers = *jobs;
            }
            apply_artifacts(config, artifacts)?;
            if let Some(script) = script {
                config.output.script.clone_from(script);
            }
            if let Some(kept) = kept {
                config.output.kept_log.clone_from(kept);
            }
            if let Some(still_lost) = still_lost {
                config.output.still_lost_log.clone_from(still_lost);
            }
        }
        Commands::Inventory { artifacts } => apply_artifacts(config, artifacts)?,
        Commands::Explain {
            store_root: Some(root),
            ..
        } => set_store_root(config, root)?,
        Commands::Explain { .. } | Commands::Classify { .. } => {}
    }

    Ok(())
}

fn apply_artifacts(config: &mut Config, artifacts: &ArtifactArgs) -> Result<(), CliError> {
    if let Some(checkpoint) = &artifacts.checkpoint {
        config.output.checkpoint.clone_from(checkpoint);
    }
    if let Some(root) = &artifacts.store_root {
        set_store_root(config, root)?;
    }
    Ok(())
}

fn set_store_root(config: &mut Config, root: &Path) -> Result<(), CliError> {
    if root.as_os_str().is_empty() {
        return Err(CliError::InvalidArguments(
            "--store-root must not be empty".to_string(),
        ));
    }
    config.store.local_root = Some(root.to_path_buf());
    Ok(())
}
