//! Message codes and their localized templates.
//!
//! Templates use positional `{0}`, `{1}`, ... placeholders. Overrides come from
//! the `[messages]` config section, keyed by language tag.

use std::{collections::BTreeMap, fmt::Display, sync::Arc};

use herald_config::MessagesConfig;

pub const CHECK_PRIVACY_FAIL: &str = "checkPrivacy.fail";
pub const CHECK_LOCALITY_FAIL: &str = "checkLocality.fail";
pub const CHECK_INPUT_FAIL: &str = "checkInput.fail";
pub const CHECK_INPUT_SINGULAR: &str = "checkInput.input";
pub const CHECK_INPUT_PLURAL: &str = "checkInput.inputs";
pub const USER_NOT_FOUND: &str = "userNotFound";
pub const COMMANDS_NOT_FOUND: &str = "ability.commands.notFound";
pub const CLAIM_SUCCESS: &str = "ability.claim.claimed";
pub const BACKUP_FAIL: &str = "ability.backup.fail";
pub const RECOVER_MESSAGE: &str = "ability.recover.message";
pub const RECOVER_SUCCESS: &str = "ability.recover.success";
pub const RECOVER_FAIL: &str = "ability.recover.fail";
pub const PROMOTE_SUCCESS: &str = "ability.promote.success";
pub const PROMOTE_FAIL: &str = "ability.promote.fail";
pub const DEMOTE_SUCCESS: &str = "ability.demote.success";
pub const DEMOTE_FAIL: &str = "ability.demote.fail";
pub const BAN_SUCCESS: &str = "ability.ban.success";
pub const BAN_FAIL: &str = "ability.ban.fail";
pub const BAN_CREATOR: &str = "ability.ban.creator";
pub const UNBAN_SUCCESS: &str = "ability.unban.success";
pub const UNBAN_FAIL: &str = "ability.unban.fail";

/// A template argument.
pub type Arg<'a> = &'a (dyn Display + Sync);

/// Built-in English bundle.
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    (
        CHECK_PRIVACY_FAIL,
        "Sorry, you don't have the required access level to do that.",
    ),
    (CHECK_LOCALITY_FAIL, "Sorry, {0}-only feature."),
    (
        CHECK_INPUT_FAIL,
        "Sorry, this feature requires {0} additional {1}.",
    ),
    (CHECK_INPUT_SINGULAR, "input"),
    (CHECK_INPUT_PLURAL, "inputs"),
    (USER_NOT_FOUND, "Sorry, I could not find the user [{0}]."),
    (COMMANDS_NOT_FOUND, "No available commands found."),
    (CLAIM_SUCCESS, "You're now my master."),
    (BACKUP_FAIL, "I have failed to create a backup."),
    (
        RECOVER_MESSAGE,
        "I am ready to receive the backup file. Please reply to this message with the backup file attached.",
    ),
    (RECOVER_SUCCESS, "I have successfully recovered."),
    (RECOVER_FAIL, "I have failed to recover."),
    (PROMOTE_SUCCESS, "@{0} has been promoted."),
    (PROMOTE_FAIL, "@{0} is already an admin."),
    (DEMOTE_SUCCESS, "@{0} has been demoted."),
    (DEMOTE_FAIL, "@{0} is not an admin."),
    (BAN_SUCCESS, "@{0} is now banned."),
    (BAN_FAIL, "@{0} is already banned."),
    (
        BAN_CREATOR,
        "{0} tried to ban my creator and got banned instead.",
    ),
    (UNBAN_SUCCESS, "@{0} is no longer banned."),
    (UNBAN_FAIL, "@{0} is not banned."),
];

/// Resolves message codes to text for a requester's language.
///
/// Lookup order: overrides for the full language tag (`pt-br`), overrides
/// for its primary subtag (`pt`), overrides under `root`, then the built-in
/// English bundle. Unknown codes render as the code itself.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    overrides: Arc<BTreeMap<String, BTreeMap<String, String>>>,
}

impl Localizer {
    pub fn new(overrides: MessagesConfig) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(tag, messages)| (normalize_tag(&tag), messages))
            .collect();
        Self {
            overrides: Arc::new(overrides),
        }
    }

    pub fn get(&self, code: &str, language: Option<&str>, args: &[Arg<'_>]) -> String {
        format_template(self.template(code, language), args)
    }

    fn template<'a>(&'a self, code: &'a str, language: Option<&str>) -> &'a str {
        let mut tags = Vec::with_capacity(3);
        if let Some(language) = language.filter(|l| !l.is_empty()) {
            let tag = normalize_tag(language);
            if let Some((primary, _)) = tag.split_once('-') {
                let primary = primary.to_string();
                tags.push(tag);
                tags.push(primary);
            } else {
                tags.push(tag);
            }
        }
        tags.push("root".to_string());

        tags.iter()
            .find_map(|tag| self.overrides.get(tag).and_then(|m| m.get(code)))
            .map(String::as_str)
            .or_else(|| builtin(code))
            .unwrap_or(code)
    }
}

fn builtin(code: &str) -> Option<&'static str> {
    DEFAULT_MESSAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, template)| *template)
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}

/// Replace `{N}` placeholders with `args[N]`. Placeholders without a matching
/// argument are left as written.
fn format_template(template: &str, args: &[Arg<'_>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let arg = tail[1..]
            .find('}')
            .and_then(|end| tail[1..=end].parse::<usize>().ok().map(|index| (index, end)))
            .and_then(|(index, end)| args.get(index).map(|arg| (arg, end)));
        match arg {
            Some((arg, end)) => {
                out.push_str(&arg.to_string());
                rest = &tail[end + 2..];
            },
            None => {
                out.push('{');
                rest = &tail[1..];
            },
        }
    }
    out.push_str(rest);
    out
}
