mod ability_commands;
mod db_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    herald_abilities::{AbilityBot, AbilityToggle, Localizer},
    herald_config::HeraldConfig,
    herald_telegram::{TelegramSender, connect, register_commands, start_polling},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "herald", about = "Herald: ability dispatch engine for Telegram bots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "HERALD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Telegram and dispatch updates (default when no subcommand is provided).
    Run,
    /// List the abilities the bot would register.
    Abilities,
    /// Store management (backup, recover, clear).
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<HeraldConfig> {
    match &cli.config {
        Some(path) => herald_config::load_config(path),
        None => herald_config::discover_and_load(),
    }
}

async fn run_bot(config: HeraldConfig) -> anyhow::Result<()> {
    if config.bot.creator_id == 0 {
        warn!("bot.creator_id is not set, creator-only abilities are unreachable");
    }

    let store = db_commands::open_store(&config.store)?;
    let connection = connect(&config.telegram).await?;
    let username = config
        .bot
        .username
        .clone()
        .unwrap_or_else(|| connection.username.clone());

    let sender = TelegramSender::new(connection.bot.clone());
    let engine = AbilityBot::builder(config.bot.creator_id, username, Arc::new(sender))
        .store(store)
        .localizer(Localizer::new(config.messages))
        .toggle(AbilityToggle::from(&config.abilities))
        .build()?;

    register_commands(&connection.bot, engine.registry()).await;

    let (cancel, handle) = start_polling(
        connection.bot,
        Arc::new(engine),
        config.telegram.poll_timeout_secs,
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("shutdown requested");
            cancel.cancel();
        },
        () = cancel.cancelled() => {},
    }
    handle.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "herald starting");

    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Abilities) => ability_commands::list_abilities(&config),
        Some(Commands::Db { action }) => db_commands::handle_db(action, &config.store),
    }
}
