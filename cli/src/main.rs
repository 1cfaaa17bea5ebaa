//! CLI entrypoint for ai-cofounder
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use cofounder_application::{
    FeedbackRepository, GenerateIdeasInput, GenerateIdeasUseCase, IdeaRepository,
    InvocationLogger, LlmGateway, NoInvocationLogger, NoProgress, ProgressNotifier,
};
use cofounder_domain::Constraints;
use cofounder_infrastructure::{
    CannedGateway, ConfigLoader, FileConfig, FileStorageKind, InMemoryFeedbackRepository,
    InMemoryIdeaRepository, JsonFileIdeaRepository, JsonlInvocationLogger, gateway_from_config,
};
use cofounder_presentation::{
    AppState, Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress, router,
    serve,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so `[logging]` can pick the file sink
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let _log_guard = init_logging(cli.verbose, &config);

    config.validate().context("invalid configuration")?;

    if let Command::Config = cli.command {
        print_config(&cli, &config)?;
        return Ok(());
    }

    info!("Starting ai-cofounder");

    // === Dependency Injection ===
    let params = config.to_pipeline_params()?;
    let gateway: Arc<dyn LlmGateway> = if cli.mock {
        Arc::new(CannedGateway::new())
    } else {
        gateway_from_config(&config.provider, params.call_timeout)?
    };
    let repository = build_repository(&config).await?;
    let logger: Arc<dyn InvocationLogger> = match &config.logging.invocation_log {
        Some(path) => match JsonlInvocationLogger::open(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoInvocationLogger),
        },
        None => Arc::new(NoInvocationLogger),
    };

    let shutdown = CancellationToken::new();
    spawn_ctrl_c_handler(shutdown.clone());

    match cli.command {
        Command::Serve { host, port } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let feedback: Arc<dyn FeedbackRepository> = Arc::new(InMemoryFeedbackRepository::new());
            let state = AppState::new(
                gateway,
                repository,
                feedback,
                params,
                logger,
                shutdown.clone(),
            );
            let app = router(Arc::new(state), &server.cors_origins);
            let listener = TcpListener::bind(server.bind_address())
                .await
                .with_context(|| format!("failed to bind {}", server.bind_address()))?;
            serve(listener, app, shutdown).await?;
            info!("Server stopped");
        }
        Command::Generate {
            topic,
            num_ideas,
            constraints,
            models,
            output,
        } => {
            let mut input = GenerateIdeasInput::new(topic).with_constraints(
                constraints
                    .into_iter()
                    .fold(Constraints::new(), |c, (key, value)| c.with(key, value)),
            );
            if let Some(n) = num_ideas {
                input = input.with_num_ideas(n);
            }
            for (agent, model) in models {
                input = input.with_model_setting(agent, model);
            }

            let use_case = GenerateIdeasUseCase::new(gateway, repository, params)
                .with_invocation_logger(logger)
                .with_cancellation(shutdown);

            let show_progress = !cli.quiet && output != OutputFormat::Json;
            let reporter = Arc::new(ProgressReporter::new());
            let progress: Arc<dyn ProgressNotifier> = if !show_progress {
                Arc::new(NoProgress)
            } else if std::io::stderr().is_terminal() {
                reporter.clone()
            } else {
                Arc::new(SimpleProgress)
            };

            let result = use_case.execute_with_progress(input, progress).await;
            reporter.finish();
            let result = result?;

            let text = match output {
                OutputFormat::Full => ConsoleFormatter::format(&result),
                OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
                OutputFormat::Json => ConsoleFormatter::format_json(&result),
            };
            println!("{}", text);

            if result.failed_count() > 0 {
                warn!(failed = result.failed_count(), "Some ideas failed");
            }
        }
        // Printed before wiring
        Command::Config => {}
    }

    Ok(())
}

/// Console sink filtered by `-v` (or `RUST_LOG`), plus a daily file when
/// `logging.dir` is set. The guard must live until exit to flush the file.
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let filter = || match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let (file, guard) = match &config.logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "cofounder.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

async fn build_repository(config: &FileConfig) -> Result<Arc<dyn IdeaRepository>> {
    match (config.storage.kind, &config.storage.path) {
        (FileStorageKind::JsonFile, Some(path)) => {
            let repository = JsonFileIdeaRepository::open(path)
                .await
                .with_context(|| format!("failed to open idea store at {}", path.display()))?;
            info!(path = %path.display(), "Using JSON file storage");
            Ok(Arc::new(repository))
        }
        _ => {
            info!("Using in-memory storage");
            Ok(Arc::new(InMemoryIdeaRepository::new()))
        }
    }
}

fn spawn_ctrl_c_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.cancel();
        }
    });
}

fn print_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("{}", "Configuration sources:".cyan().bold());
    if cli.no_config {
        println!("  (disabled with --no-config)");
    } else {
        for source in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("  {}", source);
        }
    }
    println!();
    println!("{}", "Effective configuration:".cyan().bold());
    println!("{}", toml::to_string_pretty(config)?);
    if cli.mock {
        println!("{}", "Provider overridden by --mock".yellow());
    }
    Ok(())
}
