use std::sync::Arc;

use {async_trait::async_trait, tracing::warn};

/// Outbound side of the bot: everything the engine and the built-in abilities
/// need from the chat platform.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, text: &str, chat_id: i64) -> anyhow::Result<()>;

    /// Send `text` asking the client to open a reply to it.
    async fn send_force_reply(&self, text: &str, chat_id: i64) -> anyhow::Result<()>;

    async fn send_document(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        chat_id: i64,
    ) -> anyhow::Result<()>;

    async fn download_file(&self, file_id: &str) -> anyhow::Result<Vec<u8>>;

    /// User IDs of the administrators of a group chat.
    async fn chat_administrators(&self, chat_id: i64) -> anyhow::Result<Vec<i64>>;
}

/// A [`MessageSender`] wrapper that logs failures instead of returning them.
#[derive(Clone)]
pub struct SilentSender {
    inner: Arc<dyn MessageSender>,
}

impl SilentSender {
    pub fn new(inner: Arc<dyn MessageSender>) -> Self {
        Self { inner }
    }

    /// The wrapped sender, for callers that want to see errors.
    pub fn inner(&self) -> &Arc<dyn MessageSender> {
        &self.inner
    }

    pub async fn send(&self, text: &str, chat_id: i64) -> Option<()> {
        self.inner
            .send(text, chat_id)
            .await
            .inspect_err(|e| warn!(chat_id, error = %e, "could not send message"))
            .ok()
    }

    pub async fn send_force_reply(&self, text: &str, chat_id: i64) -> Option<()> {
        self.inner
            .send_force_reply(text, chat_id)
            .await
            .inspect_err(|e| warn!(chat_id, error = %e, "could not send force-reply message"))
            .ok()
    }

    pub async fn send_document(&self, file_name: &str, contents: Vec<u8>, chat_id: i64) -> Option<()> {
        self.inner
            .send_document(file_name, contents, chat_id)
            .await
            .inspect_err(|e| warn!(chat_id, file_name, error = %e, "could not send document"))
            .ok()
    }

    pub async fn chat_administrators(&self, chat_id: i64) -> Option<Vec<i64>> {
        self.inner
            .chat_administrators(chat_id)
            .await
            .inspect_err(|e| warn!(chat_id, error = %e, "could not fetch chat administrators"))
            .ok()
    }
}
