/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Published sensor states, card mutations, or a generated config
[POS]:    Binary entry point
[UPDATE]: When changing CLI subcommands, startup flow, or shutdown handling
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use trello_board_adapter::{BoardFilter, TrelloApi};
use trello_board_sync::sensor::publish_states;
use trello_board_sync::{CardActions, RefreshCoordinator, SyncConfig, discover_sensors, strategy_for};

#[derive(Parser, Debug)]
#[command(name = "trello-board-sync", version, about = "Trello board polling and sensor publisher")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Also write logs to a daily rolling file in this directory
    #[arg(long = "log-dir", value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the configured boards and print sensor states as JSON lines
    Run {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// List the member's open boards
    Boards {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
    },
    /// Move a card to another list
    MoveCard {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        #[arg(long)]
        card_id: String,
        #[arg(long)]
        target_list_id: String,
    },
    /// Create a card at the bottom of a list
    CreateCard {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        #[arg(long)]
        list_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Interactively write a configuration file
    Init {
        #[arg(long, value_name = "PATH", default_value = "trello-sync.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let _log_guard = init_tracing(&args.log_level, args.log_dir.as_deref())?;

    match args.command {
        Command::Run { config_path, dry_run } => run(&config_path, dry_run).await,
        Command::Boards { config_path } => list_boards(&config_path).await,
        Command::MoveCard {
            config_path,
            card_id,
            target_list_id,
        } => move_card(&config_path, &card_id, &target_list_id).await,
        Command::CreateCard {
            config_path,
            list_id,
            name,
            description,
        } => create_card(&config_path, &list_id, &name, &description).await,
        Command::Init { output } => cli::init::run_init(output).await,
    }
}

async fn run(config_path: &Path, dry_run: bool) -> Result<()> {
    info!(config_path = %config_path.display(), dry_run, "starting trello-board-sync");

    let config = load_config(config_path)?;
    info!(
        boards = config.board_ids.len(),
        strategy = ?config.fetch_strategy,
        interval_secs = config.update_interval_secs,
        "configuration loaded"
    );

    if dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let mut coordinator = start_coordinator(&config).await?.1;
    let handle = coordinator.handle();
    let sensors = discover_sensors(&handle);
    info!(sensors = sensors.len(), "publishing sensor states");

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    publish_states(&sensors, &handle, shutdown, tokio::io::stdout())
        .await
        .context("publish sensor states")?;
    info!("shutdown signal received");

    coordinator
        .shutdown_and_wait()
        .await
        .context("shutdown refresh coordinator")?;
    info!("refresh coordinator shutdown complete");

    Ok(())
}

async fn list_boards(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let client = config.trello_client()?;

    let boards = client
        .list_boards(BoardFilter::Open)
        .await
        .context("list open boards")?;
    for board in boards {
        let marker = if config.board_ids.contains(&board.id) { "*" } else { " " };
        println!("{} {}  {}", marker, style(&board.id).cyan(), board.name);
    }
    Ok(())
}

async fn move_card(config_path: &Path, card_id: &str, target_list_id: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let (api, coordinator) = start_coordinator(&config).await?;
    let actions = CardActions::new(api, coordinator.handle());

    actions.move_card(card_id, target_list_id).await?;

    match coordinator.current_snapshot().find_list(target_list_id) {
        Some((board, list)) => println!(
            "Moved {} to {} / {} ({} cards)",
            style(card_id).cyan(),
            board.name,
            list.name(),
            list.card_count()
        ),
        None => println!("Moved {} to list {}", style(card_id).cyan(), target_list_id),
    }
    Ok(())
}

async fn create_card(config_path: &Path, list_id: &str, name: &str, description: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let (api, coordinator) = start_coordinator(&config).await?;
    let actions = CardActions::new(api, coordinator.handle());

    let card_id = actions.create_card(list_id, name, description).await?;
    println!("Created card {}", style(card_id).cyan());
    Ok(())
}

async fn start_coordinator(config: &SyncConfig) -> Result<(Arc<dyn TrelloApi>, RefreshCoordinator)> {
    let api: Arc<dyn TrelloApi> = Arc::new(config.trello_client()?);
    let strategy = strategy_for(config.fetch_strategy, api.clone());
    let coordinator = RefreshCoordinator::start(strategy, config.board_ids.clone(), config.interval())
        .await
        .context("start refresh coordinator")?;
    Ok((api, coordinator))
}

fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    // stdout carries sensor states, so logs go to stderr
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "trello-board-sync.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn load_config(path: &Path) -> Result<SyncConfig> {
    SyncConfig::load(path).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
