//! Transport-neutral view of an inbound Telegram update.
//!
//! Adapters convert their wire types into [`Event`]; the dispatch engine only
//! ever looks at this model.

use serde::{Deserialize, Serialize};

/// The user that caused an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
            language_code: None,
            is_bot: false,
        }
    }

    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    /// First name, else last name, else username.
    pub fn short_name(&self) -> &str {
        if !self.first_name.is_empty() {
            return &self.first_name;
        }
        match (self.last_name.as_deref(), self.username.as_deref()) {
            (Some(last), _) if !last.is_empty() => last,
            (_, Some(username)) => username,
            _ => "",
        }
    }

    /// First and last name joined by a space; empty when both are missing.
    pub fn full_name(&self) -> String {
        [Some(self.first_name.as_str()), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Kind of chat an update originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub kind: ChatKind,
}

impl Chat {
    pub fn private(id: i64) -> Self {
        Self {
            id,
            kind: ChatKind::Private,
        }
    }

    pub fn group(id: i64) -> Self {
        Self {
            id,
            kind: ChatKind::Group,
        }
    }

    pub fn supergroup(id: i64) -> Self {
        Self {
            id,
            kind: ChatKind::Supergroup,
        }
    }
}

/// Which part of a Telegram update carried the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    CallbackQuery,
    InlineQuery,
    ChosenInlineQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A chat message attached to an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i32,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default)]
    pub has_photo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Message {
    pub fn text(id: i32, chat: Chat, text: impl Into<String>) -> Self {
        Self {
            id,
            chat,
            text: Some(text.into()),
            caption: None,
            reply_to: None,
            document: None,
            has_photo: false,
            location: None,
        }
    }

    pub fn document(id: i32, chat: Chat, document: Document) -> Self {
        Self {
            id,
            chat,
            text: None,
            caption: None,
            reply_to: None,
            document: Some(document),
            has_photo: false,
            location: None,
        }
    }

    #[must_use]
    pub fn replying_to(mut self, message: Message) -> Self {
        self.reply_to = Some(Box::new(message));
        self
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

/// One inbound update, reduced to what the dispatch engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub update_id: i64,
    pub kind: UpdateKind,
    pub from: User,
    /// Message payload; for callback queries this is the message the button
    /// was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Callback data or inline query text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Event {
    /// A plain `message` update.
    pub fn message(update_id: i64, from: User, message: Message) -> Self {
        Self {
            update_id,
            kind: UpdateKind::Message,
            from,
            message: Some(message),
            data: None,
        }
    }

    /// Shorthand for a text message from `from` in `chat`.
    pub fn text(update_id: i64, from: User, chat: Chat, text: impl Into<String>) -> Self {
        Self::message(update_id, from, Message::text(update_id as i32, chat, text))
    }

    /// The message of a plain `message` update. Other update kinds return `None`.
    pub fn direct_message(&self) -> Option<&Message> {
        match self.kind {
            UpdateKind::Message => self.message.as_ref(),
            _ => None,
        }
    }

    pub fn has_message(&self) -> bool {
        self.direct_message().is_some()
    }

    /// Text of a plain `message` update.
    pub fn text_body(&self) -> Option<&str> {
        self.direct_message().and_then(|m| m.text.as_deref())
    }

    /// The chat to answer in. Inline queries have no chat and answer the user.
    pub fn chat_id(&self) -> i64 {
        self.message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(self.from.id)
    }

    /// Whether the update comes from a one-to-one chat with the user.
    pub fn is_user_message(&self) -> bool {
        match self.kind {
            UpdateKind::InlineQuery | UpdateKind::ChosenInlineQuery => true,
            _ => self
                .message
                .as_ref()
                .is_some_and(|m| m.chat.kind == ChatKind::Private),
        }
    }

    /// Whether the update comes from a group or supergroup.
    pub fn is_group_message(&self) -> bool {
        self.message
            .as_ref()
            .is_some_and(|m| matches!(m.chat.kind, ChatKind::Group | ChatKind::Supergroup))
    }
}
