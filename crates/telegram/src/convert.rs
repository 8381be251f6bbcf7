//! Mapping from Bot API updates to engine events.

use {
    herald_common::types::{
        Chat, ChatKind, Document, Event, Location, Message, UpdateKind, User,
    },
    teloxide::types::{self as tg, UpdateKind as TgUpdateKind},
};

/// Convert an update into an [`Event`]. Update kinds the engine has no use
/// for (polls, chat member changes, ...) yield `None`.
pub fn event_from_update(update: &tg::Update) -> Option<Event> {
    let update_id = i64::from(update.id.0);
    let event = match &update.kind {
        TgUpdateKind::Message(msg) => from_message(update_id, UpdateKind::Message, msg),
        TgUpdateKind::EditedMessage(msg) => {
            from_message(update_id, UpdateKind::EditedMessage, msg)
        },
        TgUpdateKind::ChannelPost(msg) => from_message(update_id, UpdateKind::ChannelPost, msg),
        TgUpdateKind::EditedChannelPost(msg) => {
            from_message(update_id, UpdateKind::EditedChannelPost, msg)
        },
        TgUpdateKind::CallbackQuery(query) => Event {
            update_id,
            kind: UpdateKind::CallbackQuery,
            from: user(&query.from),
            message: query.regular_message().map(message),
            data: query.data.clone(),
        },
        TgUpdateKind::InlineQuery(query) => Event {
            update_id,
            kind: UpdateKind::InlineQuery,
            from: user(&query.from),
            message: None,
            data: Some(query.query.clone()),
        },
        TgUpdateKind::ChosenInlineResult(result) => Event {
            update_id,
            kind: UpdateKind::ChosenInlineQuery,
            from: user(&result.from),
            message: None,
            data: Some(result.query.clone()),
        },
        _ => return None,
    };
    Some(event)
}

fn from_message(update_id: i64, kind: UpdateKind, msg: &tg::Message) -> Event {
    // Channel posts carry no sender; attribute them to the channel itself.
    let from = match &msg.from {
        Some(from) => user(from),
        None => User::new(msg.chat.id.0, msg.chat.title().unwrap_or_default()),
    };
    Event {
        update_id,
        kind,
        from,
        message: Some(message(msg)),
        data: None,
    }
}

fn user(user: &tg::User) -> User {
    User {
        id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
        is_bot: user.is_bot,
    }
}

fn chat(chat: &tg::Chat) -> Chat {
    let kind = if chat.is_private() {
        ChatKind::Private
    } else if chat.is_channel() {
        ChatKind::Channel
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else {
        ChatKind::Group
    };
    Chat {
        id: chat.id.0,
        kind,
    }
}

fn message(msg: &tg::Message) -> Message {
    Message {
        id: msg.id.0,
        chat: chat(&msg.chat),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        reply_to: msg.reply_to_message().map(|original| Box::new(message(original))),
        document: msg.document().map(|doc| Document {
            file_id: doc.file.id.clone(),
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.as_ref().map(ToString::to_string),
        }),
        has_photo: msg.photo().is_some(),
        location: msg.location().map(|loc| Location {
            latitude: loc.latitude,
            longitude: loc.longitude,
        }),
    }
}
