use {
    herald_common::types::{Event, UpdateKind},
    serde::{Deserialize, Serialize},
};

/// Predicate over the shape of an inbound event.
///
/// Message-related flags (`Reply`, `Document`, `Text`, `Photo`, `Location`,
/// `Caption`) only hold for plain `message` updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    /// Holds for every event.
    None,
    Message,
    CallbackQuery,
    ChannelPost,
    EditedChannelPost,
    EditedMessage,
    InlineQuery,
    ChosenInlineQuery,
    Reply,
    Document,
    Text,
    Photo,
    Location,
    Caption,
}

impl Flag {
    pub fn test(self, event: &Event) -> bool {
        let message = event.direct_message();
        match self {
            Self::None => true,
            Self::Message => message.is_some(),
            Self::CallbackQuery => event.kind == UpdateKind::CallbackQuery,
            Self::ChannelPost => event.kind == UpdateKind::ChannelPost,
            Self::EditedChannelPost => event.kind == UpdateKind::EditedChannelPost,
            Self::EditedMessage => event.kind == UpdateKind::EditedMessage,
            Self::InlineQuery => event.kind == UpdateKind::InlineQuery,
            Self::ChosenInlineQuery => event.kind == UpdateKind::ChosenInlineQuery,
            Self::Reply => message.is_some_and(|m| m.is_reply()),
            Self::Document => message.is_some_and(|m| m.document.is_some()),
            Self::Text => message.is_some_and(|m| m.text.is_some()),
            Self::Photo => message.is_some_and(|m| m.has_photo),
            Self::Location => message.is_some_and(|m| m.location.is_some()),
            Self::Caption => message.is_some_and(|m| m.caption.is_some()),
        }
    }
}

/// Whether every flag holds for `event`. An empty slice always holds.
pub fn all_hold(flags: &[Flag], event: &Event) -> bool {
    flags.iter().all(|flag| flag.test(event))
}
