use {
    async_trait::async_trait,
    herald_abilities::MessageSender,
    teloxide::{
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatId, ForceReply, InputFile, ReplyMarkup},
    },
    tracing::debug,
};

use crate::error::{Error, Result};

/// [`MessageSender`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Fetch a file's contents: `getFile` for its path, then a plain GET on
    /// the file endpoint of the configured API server.
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self.bot.get_file(file_id).await?;
        let url = self
            .bot
            .api_url()
            .join(&format!("file/bot{}/{}", self.bot.token(), file.path))
            .map_err(|e| Error::external("invalid file URL", e))?;

        let response = reqwest::get(url).await?;
        if !response.status().is_success() {
            return Err(Error::message(format!(
                "failed to download file: HTTP {}",
                response.status()
            )));
        }
        let data = response.bytes().await?.to_vec();
        debug!(file_id, bytes = data.len(), "downloaded telegram file");
        Ok(data)
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, text: &str, chat_id: i64) -> anyhow::Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_force_reply(&self, text: &str, chat_id: i64) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(ReplyMarkup::ForceReply(ForceReply::new()))
            .await?;
        Ok(())
    }

    async fn send_document(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        chat_id: i64,
    ) -> anyhow::Result<()> {
        let document = InputFile::memory(contents).file_name(file_name.to_string());
        self.bot.send_document(ChatId(chat_id), document).await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.fetch_file(file_id).await?)
    }

    async fn chat_administrators(&self, chat_id: i64) -> anyhow::Result<Vec<i64>> {
        let members = self.bot.get_chat_administrators(ChatId(chat_id)).await?;
        Ok(members
            .into_iter()
            .map(|member| member.user.id.0 as i64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{MockTelegramApi, captured},
    };

    #[tokio::test]
    async fn send_uses_plain_send_message() {
        let api = MockTelegramApi::start().await;
        let sender = TelegramSender::new(api.bot());

        sender.send("hello", 42).await.unwrap();

        let requests = captured(&api, "SendMessage");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["chat_id"], 42);
        assert_eq!(requests[0]["text"], "hello");
        assert!(requests[0].get("reply_markup").is_none());
        api.shutdown().await;
    }

    #[tokio::test]
    async fn force_reply_sets_the_markup() {
        let api = MockTelegramApi::start().await;
        let sender = TelegramSender::new(api.bot());

        sender.send_force_reply("reply to me", 42).await.unwrap();

        let requests = captured(&api, "SendMessage");
        assert_eq!(requests[0]["reply_markup"]["force_reply"], true);
        api.shutdown().await;
    }

    #[tokio::test]
    async fn send_document_uploads_the_bytes() {
        let api = MockTelegramApi::start().await;
        let sender = TelegramSender::new(api.bot());

        sender
            .send_document("backup.json", b"{\"sets\":{}}".to_vec(), 42)
            .await
            .unwrap();

        let raw = api.raw_bodies("SendDocument");
        assert_eq!(raw.len(), 1);
        assert!(raw[0].contains("backup.json"));
        assert!(raw[0].contains("{\"sets\":{}}"));
        api.shutdown().await;
    }

    #[tokio::test]
    async fn download_file_follows_the_file_path() {
        let api = MockTelegramApi::start().await;
        api.serve_file("documents/backup.json", b"payload".to_vec());
        let sender = TelegramSender::new(api.bot());

        let data = sender.download_file("doc-id").await.unwrap();
        assert_eq!(data, b"payload");
        assert_eq!(captured(&api, "GetFile")[0]["file_id"], "doc-id");
        api.shutdown().await;
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let api = MockTelegramApi::start().await;
        let sender = TelegramSender::new(api.bot());

        let err = sender.download_file("doc-id").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 404"));
        api.shutdown().await;
    }

    #[tokio::test]
    async fn chat_administrators_returns_user_ids() {
        let api = MockTelegramApi::start().await;
        let sender = TelegramSender::new(api.bot());

        let admins = sender.chat_administrators(-5).await.unwrap();
        assert_eq!(admins, vec![1001]);
        assert_eq!(captured(&api, "GetChatAdministrators")[0]["chat_id"], -5);
        api.shutdown().await;
    }
}
