//! Test doubles shared by the unit tests of this crate.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use {
    anyhow::anyhow,
    async_trait::async_trait,
    herald_common::types::{Chat, Document, Event, Message, User},
};

use crate::{ability::Ability, error::Result, registry::AbilityExtension, sender::MessageSender};

pub const CREATOR_ID: i64 = 1337;
pub const USER_ID: i64 = 1;
pub const GROUP_ID: i64 = -10;
pub const BOT_USERNAME: &str = "HeraldTestBot";

pub fn creator() -> User {
    User::new(CREATOR_ID, "creatorFirst")
        .with_last_name("creatorLast")
        .with_username("creatorUsername")
}

pub fn user() -> User {
    User::new(USER_ID, "first")
        .with_last_name("last")
        .with_username("username")
}

pub fn private_text(from: User, text: &str) -> Event {
    let chat = Chat::private(from.id);
    Event::text(1, from, chat, text)
}

pub fn group_text(from: User, text: &str) -> Event {
    Event::text(1, from, Chat::group(GROUP_ID), text)
}

/// A private message from `from` carrying a document, replying to `prompt`.
pub fn document_reply(from: User, file_id: &str, prompt: &str) -> Event {
    let chat = Chat::private(from.id);
    let message = Message::document(2, chat, Document {
        file_id: file_id.into(),
        file_name: Some("backup.json".into()),
        mime_type: Some("application/json".into()),
    })
    .replying_to(Message::text(1, chat, prompt));
    Event::message(2, from, message)
}

/// Records everything sent and serves canned files and administrator lists.
#[derive(Default)]
pub struct MockSender {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub force_replies: Mutex<Vec<(i64, String)>>,
    pub documents: Mutex<Vec<(i64, String, Vec<u8>)>>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
    /// Chat → administrators. Chats missing here fail the lookup.
    pub admins: Mutex<HashMap<i64, Vec<i64>>>,
}

impl MockSender {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, text: &str, chat_id: i64) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_force_reply(&self, text: &str, chat_id: i64) -> anyhow::Result<()> {
        self.force_replies
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        chat_id: i64,
    ) -> anyhow::Result<()> {
        self.documents
            .lock()
            .unwrap()
            .push((chat_id, file_name.to_string(), contents));
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| anyhow!("no such file: {file_id}"))
    }

    async fn chat_administrators(&self, chat_id: i64) -> anyhow::Result<Vec<i64>> {
        self.admins
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| anyhow!("chat not found"))
    }
}

/// Extension with a spread of privacy, locality and arity requirements.
///
/// Registers its own `default`, so bots using it turn the built-in one off.
#[derive(Default)]
pub struct TestAbilities {
    pub hits: Arc<AtomicUsize>,
}

impl TestAbilities {
    pub fn hits(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.hits)
    }
}

fn counting(name: &str, hits: &Arc<AtomicUsize>) -> crate::ability::AbilityBuilder {
    let hits = Arc::clone(hits);
    Ability::builder(name).action(move |_ctx| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

impl AbilityExtension for TestAbilities {
    fn abilities(&self) -> Result<Vec<Ability>> {
        use crate::privacy::{Locality, Privacy};

        Ok(vec![
            counting("test", &self.hits).build()?,
            counting("count", &self.hits).input(1).build()?,
            counting("group", &self.hits)
                .locality(Locality::Group)
                .build()?,
            counting("admin", &self.hits)
                .privacy(Privacy::Admin)
                .build()?,
            counting("default", &self.hits)
                .info("dis iz default command")
                .build()?,
        ])
    }
}
