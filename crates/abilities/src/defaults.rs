//! Abilities every bot ships with.

use std::collections::BTreeMap;

use {
    anyhow::Context as _,
    herald_common::types::Event,
    tracing::{error, info, warn},
};

use crate::{
    ability::Ability,
    context::MessageContext,
    db::strip_tag,
    error::Result,
    flag::Flag,
    localize::{self, Localizer},
    privacy::{Locality, Privacy},
    registry::AbilityExtension,
    reply::Reply,
    toggle::AbilityToggle,
};

pub const CLAIM: &str = "claim";
pub const REPORT: &str = "report";
pub const COMMANDS: &str = "commands";
pub const BACKUP: &str = "backup";
pub const RECOVER: &str = "recover";
pub const PROMOTE: &str = "promote";
pub const DEMOTE: &str = "demote";
pub const BAN: &str = "ban";
pub const UNBAN: &str = "unban";
/// Catch-all for text that is not a command.
pub const DEFAULT: &str = "default";

/// File name of the document sent by `/backup`.
pub const BACKUP_FILE_NAME: &str = "backup.json";

/// The built-in extension: ownership, admin management, bans, backups and
/// command listings.
pub struct DefaultAbilities {
    creator_id: i64,
    localizer: Localizer,
    toggle: AbilityToggle,
}

impl DefaultAbilities {
    pub fn new(creator_id: i64, localizer: Localizer, toggle: AbilityToggle) -> Self {
        Self {
            creator_id,
            localizer,
            toggle,
        }
    }

    fn all(&self) -> Result<Vec<Ability>> {
        Ok(vec![
            claim()?,
            report()?,
            commands()?,
            backup()?,
            recover(self.creator_id, self.localizer.clone())?,
            promote()?,
            demote()?,
            ban()?,
            unban()?,
            default_ability()?,
        ])
    }
}

impl AbilityExtension for DefaultAbilities {
    fn abilities(&self) -> Result<Vec<Ability>> {
        self.toggle.apply(self.all()?)
    }
}

fn claim() -> Result<Ability> {
    Ability::builder(CLAIM)
        .privacy(Privacy::Creator)
        .action(|ctx| async move {
            let db = ctx.bot().db();
            db.add_admin(ctx.user().id)?;
            db.commit()?;
            info!(user_id = ctx.user().id, "creator claimed the bot");
            ctx.reply_localized(localize::CLAIM_SUCCESS, &[]).await;
            Ok(())
        })
        .build()
}

fn report() -> Result<Ability> {
    Ability::builder(REPORT)
        .privacy(Privacy::Creator)
        .action(|ctx| async move {
            match report_listing(ctx.bot().registry().abilities()) {
                Some(listing) => ctx.reply(&listing).await,
                None => {
                    ctx.reply_localized(localize::COMMANDS_NOT_FOUND, &[])
                        .await
                },
            };
            Ok(())
        })
        .build()
}

fn commands() -> Result<Ability> {
    Ability::builder(COMMANDS)
        .action(|ctx| async move {
            let level = ctx.bot().privacy_of(ctx.event(), ctx.user().id).await?;
            match commands_listing(ctx.bot().registry().abilities(), level) {
                Some(listing) => ctx.reply(&listing).await,
                None => {
                    ctx.reply_localized(localize::COMMANDS_NOT_FOUND, &[])
                        .await
                },
            };
            Ok(())
        })
        .build()
}

fn backup() -> Result<Ability> {
    Ability::builder(BACKUP)
        .privacy(Privacy::Creator)
        .locality(Locality::User)
        .action(|ctx| async move {
            let backup = match ctx.bot().db().store().backup() {
                Ok(backup) => backup,
                Err(e) => {
                    ctx.reply_localized(localize::BACKUP_FAIL, &[]).await;
                    return Err(e).context("could not serialize the store");
                },
            };
            ctx.bot()
                .silent()
                .send_document(BACKUP_FILE_NAME, backup.into_bytes(), ctx.chat_id())
                .await;
            Ok(())
        })
        .build()
}

fn recover(creator_id: i64, localizer: Localizer) -> Result<Ability> {
    let reply = Reply::builder(|ctx| async move {
        match restore_from_document(&ctx).await {
            Ok(()) => {
                info!(user_id = ctx.user().id, "recovered store from backup");
                ctx.reply_localized(localize::RECOVER_SUCCESS, &[]).await;
            },
            Err(e) => {
                error!(error = %e, "could not recover store from backup");
                ctx.reply_localized(localize::RECOVER_FAIL, &[]).await;
            },
        }
        Ok(())
    })
    .flags([Flag::Document, Flag::Reply])
    .condition(move |event| is_recover_prompt_reply(event, &localizer))
    .condition(move |event| event.from.id == creator_id)
    .build();

    Ability::builder(RECOVER)
        .privacy(Privacy::Creator)
        .locality(Locality::User)
        .action(|ctx| async move {
            let prompt = ctx.localize(localize::RECOVER_MESSAGE, &[]);
            ctx.bot()
                .silent()
                .send_force_reply(&prompt, ctx.chat_id())
                .await;
            Ok(())
        })
        .reply(reply)
        .build()
}

/// Whether `event` answers the recovery prompt, as localized for its sender.
fn is_recover_prompt_reply(event: &Event, localizer: &Localizer) -> bool {
    let prompt = localizer.get(
        localize::RECOVER_MESSAGE,
        event.from.language_code.as_deref(),
        &[],
    );
    event
        .direct_message()
        .and_then(|m| m.reply_to.as_deref())
        .and_then(|original| original.text.as_deref())
        == Some(prompt.as_str())
}

async fn restore_from_document(ctx: &MessageContext) -> anyhow::Result<()> {
    let document = ctx
        .event()
        .direct_message()
        .and_then(|m| m.document.as_ref())
        .context("message has no document")?;
    let bytes = ctx.bot().sender().download_file(&document.file_id).await?;
    let backup = String::from_utf8(bytes).context("backup is not UTF-8")?;
    ctx.bot().db().store().recover(&backup)?;
    Ok(())
}

fn promote() -> Result<Ability> {
    Ability::builder(PROMOTE)
        .privacy(Privacy::Admin)
        .input(1)
        .action(|ctx| async move {
            let Some((username, id)) = resolve_target(&ctx).await? else {
                return Ok(());
            };
            let db = ctx.bot().db();
            if db.add_admin(id)? {
                db.commit()?;
                info!(admin = id, by = ctx.user().id, "promoted user");
                ctx.reply_localized(localize::PROMOTE_SUCCESS, &[&username])
                    .await;
            } else {
                ctx.reply_localized(localize::PROMOTE_FAIL, &[&username])
                    .await;
            }
            Ok(())
        })
        .build()
}

fn demote() -> Result<Ability> {
    Ability::builder(DEMOTE)
        .privacy(Privacy::Admin)
        .input(1)
        .action(|ctx| async move {
            let Some((username, id)) = resolve_target(&ctx).await? else {
                return Ok(());
            };
            let db = ctx.bot().db();
            if db.remove_admin(id)? {
                db.commit()?;
                info!(admin = id, by = ctx.user().id, "demoted user");
                ctx.reply_localized(localize::DEMOTE_SUCCESS, &[&username])
                    .await;
            } else {
                ctx.reply_localized(localize::DEMOTE_FAIL, &[&username])
                    .await;
            }
            Ok(())
        })
        .build()
}

fn ban() -> Result<Ability> {
    Ability::builder(BAN)
        .privacy(Privacy::Admin)
        .input(1)
        .action(|ctx| async move {
            let Some((username, id)) = resolve_target(&ctx).await? else {
                return Ok(());
            };
            let db = ctx.bot().db();
            if ctx.bot().is_creator(id) {
                let requester = ctx.user();
                db.ban(requester.id)?;
                db.commit()?;
                warn!(user_id = requester.id, "user tried to ban the creator");
                let name = requester.short_name().to_string();
                ctx.reply_localized(localize::BAN_CREATOR, &[&name]).await;
            } else if db.ban(id)? {
                db.commit()?;
                info!(banned = id, by = ctx.user().id, "banned user");
                ctx.reply_localized(localize::BAN_SUCCESS, &[&username])
                    .await;
            } else {
                ctx.reply_localized(localize::BAN_FAIL, &[&username]).await;
            }
            Ok(())
        })
        .build()
}

fn unban() -> Result<Ability> {
    Ability::builder(UNBAN)
        .privacy(Privacy::Admin)
        .input(1)
        .action(|ctx| async move {
            let Some((username, id)) = resolve_target(&ctx).await? else {
                return Ok(());
            };
            let db = ctx.bot().db();
            if db.unban(id)? {
                db.commit()?;
                info!(unbanned = id, by = ctx.user().id, "unbanned user");
                ctx.reply_localized(localize::UNBAN_SUCCESS, &[&username])
                    .await;
            } else {
                ctx.reply_localized(localize::UNBAN_FAIL, &[&username])
                    .await;
            }
            Ok(())
        })
        .build()
}

fn default_ability() -> Result<Ability> {
    Ability::builder(DEFAULT)
        .action(|_ctx| async { Ok(()) })
        .build()
}

/// Resolve the username in the first argument. Unknown users get a notice
/// and `None`.
async fn resolve_target(ctx: &MessageContext) -> anyhow::Result<Option<(String, i64)>> {
    let raw = ctx.first_arg().unwrap_or_default().to_string();
    let username = strip_tag(&raw);
    match ctx.bot().db().user_id(&username)? {
        Some(id) => Ok(Some((username, id))),
        None => {
            ctx.reply_localized(localize::USER_NOT_FOUND, &[&raw]).await;
            Ok(None)
        },
    }
}

/// `/commands` output: abilities usable at `level`, grouped under privacy
/// headers and sorted by name within each group.
pub fn commands_listing(abilities: &[Ability], level: Privacy) -> Option<String> {
    let mut groups: BTreeMap<Privacy, Vec<&Ability>> = BTreeMap::new();
    for ability in abilities.iter().filter(|a| a.privacy() <= level) {
        groups.entry(ability.privacy()).or_default().push(ability);
    }
    if groups.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for (privacy, mut group) in groups {
        group.sort_by(|a, b| a.name().cmp(b.name()));
        lines.push(privacy.to_string());
        lines.extend(group.into_iter().map(|ability| match ability.info() {
            Some(info) => format!("/{} - {info}", ability.name()),
            None => format!("/{}", ability.name()),
        }));
    }
    Some(lines.join("\n"))
}

/// `/report` output: `name - info` for every ability with a description,
/// sorted by name. Suitable for pasting into BotFather.
pub fn report_listing(abilities: &[Ability]) -> Option<String> {
    let mut lines: Vec<(&str, &str)> = abilities
        .iter()
        .filter_map(|ability| ability.info().map(|info| (ability.name(), info)))
        .collect();
    if lines.is_empty() {
        return None;
    }
    lines.sort_unstable();
    Some(
        lines
            .into_iter()
            .map(|(name, info)| format!("{name} - {info}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
