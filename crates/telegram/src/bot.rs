use std::{sync::Arc, time::Duration};

use {
    herald_abilities::{AbilityBot, Privacy, Registry},
    herald_config::TelegramConfig,
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    convert::event_from_update,
    error::{Error, Result},
};

/// Delay before retrying after a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// A verified bot handle plus the username Telegram reported for it.
pub struct Connection {
    pub bot: Bot,
    pub username: String,
}

/// Build a bot client for `config`, verify the token and clear any webhook so
/// long polling works.
pub async fn connect(config: &TelegramConfig) -> Result<Connection> {
    if config.token.expose_secret().is_empty() {
        return Err(Error::message("telegram token is not configured"));
    }

    // The client timeout has to outlive the long-polling timeout or the HTTP
    // client aborts the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(config.client_timeout_secs))
        .build()?;
    let mut bot = Bot::with_client(config.token.expose_secret(), client);
    if let Some(api_url) = &config.api_url {
        let url =
            reqwest::Url::parse(api_url).map_err(|e| Error::external("invalid api_url", e))?;
        bot = bot.set_api_url(url);
    }

    let me = bot.get_me().await?;
    let username = me
        .user
        .username
        .clone()
        .ok_or_else(|| Error::message("bot account has no username"))?;

    bot.delete_webhook().await?;

    info!(username, "telegram bot connected (webhook cleared)");
    Ok(Connection { bot, username })
}

/// Advertise public abilities with a description as slash commands so
/// Telegram clients can autocomplete them.
pub async fn register_commands(bot: &Bot, registry: &Registry) {
    let commands = bot_commands(registry);
    if commands.is_empty() {
        return;
    }
    let count = commands.len();
    match bot.set_my_commands(commands).await {
        Ok(_) => debug!(count, "registered bot commands"),
        Err(e) => warn!("failed to register bot commands: {e}"),
    }
}

fn bot_commands(registry: &Registry) -> Vec<BotCommand> {
    let mut commands: Vec<BotCommand> = registry
        .abilities()
        .iter()
        .filter(|ability| ability.privacy() == Privacy::Public)
        .filter(|ability| is_command_name(ability.name()))
        .filter_map(|ability| {
            ability
                .info()
                .filter(|info| !info.is_empty())
                .map(|info| BotCommand::new(ability.name(), info))
        })
        .collect();
    commands.sort_by(|a, b| a.command.cmp(&b.command));
    commands
}

/// Telegram only accepts 1-32 lowercase letters, digits and underscores.
fn is_command_name(name: &str) -> bool {
    (1..=32).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_conflict(error: &RequestError) -> bool {
    matches!(error, RequestError::Api(ApiError::TerminatedByOtherGetUpdates))
}

/// Spawn the long-polling loop feeding every update into `engine`.
///
/// The loop runs until the returned token is cancelled, or until Telegram
/// reports that another instance is polling with the same token.
pub fn start_polling(
    bot: Bot,
    engine: Arc<AbilityBot>,
    poll_timeout_secs: u32,
) -> (CancellationToken, JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        info!("starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            let request = bot
                .get_updates()
                .offset(offset)
                .timeout(poll_timeout_secs)
                .allowed_updates(vec![
                    AllowedUpdate::Message,
                    AllowedUpdate::EditedMessage,
                    AllowedUpdate::ChannelPost,
                    AllowedUpdate::EditedChannelPost,
                    AllowedUpdate::CallbackQuery,
                    AllowedUpdate::InlineQuery,
                    AllowedUpdate::ChosenInlineResult,
                ]);

            let result = tokio::select! {
                () = token.cancelled() => break,
                result = request.send() => result,
            };

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        let Some(event) = event_from_update(&update) else {
                            debug!(update_id = update.id.0, "ignoring unsupported update");
                            continue;
                        };
                        let update_id = event.update_id;
                        if let Err(e) = engine.dispatch(event).await {
                            error!(update_id, error = %e, "error handling telegram update");
                        }
                    }
                },
                Err(e) if is_conflict(&e) => {
                    warn!(
                        "telegram polling stopped: another instance is already running with this token"
                    );
                    token.cancel();
                    break;
                },
                Err(e) => {
                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::select! {
                        () = token.cancelled() => break,
                        () = tokio::time::sleep(RETRY_DELAY) => {},
                    }
                },
            }
        }

        info!("telegram polling stopped");
    });

    (cancel, handle)
}
