use std::fmt;

use {
    herald_common::types::Event,
    serde::{Deserialize, Serialize},
};

/// Access level of a requester, lowest first.
///
/// A requester may run an ability when their level is greater than or equal
/// to the ability's required level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Privacy {
    #[default]
    Public,
    GroupAdmin,
    Admin,
    Creator,
}

impl Privacy {
    pub const ALL: [Self; 4] = [Self::Public, Self::GroupAdmin, Self::Admin, Self::Creator];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::GroupAdmin => "GROUP_ADMIN",
            Self::Admin => "ADMIN",
            Self::Creator => "CREATOR",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an ability may be invoked from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Locality {
    /// Private chats with the bot, inline queries and chosen inline results.
    User,
    /// Everything else.
    Group,
    #[default]
    All,
}

impl Locality {
    /// The origin of an event; never [`Locality::All`].
    pub fn of(event: &Event) -> Self {
        if event.is_user_message() {
            Self::User
        } else {
            Self::Group
        }
    }

    /// Whether an ability with this locality may run for an event from `origin`.
    pub fn admits(self, origin: Self) -> bool {
        self == Self::All || self == origin
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
