pub mod handler;


use super::traits::{ChannelMessage, ChatId, CommandInvocation};
use crate::error::TransportError;
use crate::llm::http_client::build_http_client;
use crate::llm::scrub::sanitize_api_error;
use crate::session::UserId;
use anyhow::Context;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const LONG_POLL_TIMEOUT_SECS: u64 = 30;

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IncomingMessage {
    #[serde(default)]
    pub from: Option<BotUser>,
    pub chat: IncomingChat,
    #[serde(default)]
    pub date: u64,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IncomingChat {
    pub id: i64,
}

/// Telegram channel: long-polls the Bot API for updates.
pub struct TelegramChannel {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String, api_base: &str) -> Self {
        Self {
            bot_token,
            api_base: api_base.trim_end_matches('/').to_string(),
            // Must outlive the long-poll window.
            client: build_http_client(LONG_POLL_TIMEOUT_SECS + 15),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<T> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                channel: "telegram".into(),
                message: format!("{method} request failed: {}", e.without_url()),
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| TransportError::Connection {
            channel: "telegram".into(),
            message: format!("{method} response unreadable: {}", e.without_url()),
        })?;
        if !status.is_success() {
            anyhow::bail!(
                "Telegram {method} failed ({status}): {}",
                sanitize_api_error(&text)
            );
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&text)
            .with_context(|| format!("Telegram {method} returned malformed JSON"))?;
        if !parsed.ok {
            anyhow::bail!(
                "Telegram {method} rejected: {}",
                parsed.description.as_deref().unwrap_or("no description")
            );
        }
        parsed
            .result
            .with_context(|| format!("Telegram {method} returned no result"))
    }

    /// Authenticates the token. Fails when the token is wrong.
    pub async fn get_me(&self) -> anyhow::Result<BotUser> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Publish the command menu shown by Telegram clients.
    pub async fn set_commands(&self, commands: &[(String, String)]) -> anyhow::Result<()> {
        let commands: Vec<serde_json::Value> = commands
            .iter()
            .map(|(command, description)| {
                serde_json::json!({ "command": command, "description": description })
            })
            .collect();
        let _: bool = self
            .call("setMyCommands", &serde_json::json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    pub(crate) async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": LONG_POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"]
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        silent: bool,
    ) -> anyhow::Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &serde_json::json!({
                    "chat_id": chat.get(),
                    "text": text,
                    "disable_notification": silent
                }),
            )
            .await
            .map_err(|e| TransportError::Send {
                channel: "telegram".into(),
                message: format!("{e:#}"),
            })?;
        Ok(())
    }

    pub async fn send_chat_action(&self, chat: ChatId, action: &str) -> anyhow::Result<()> {
        let _: bool = self
            .call(
                "sendChatAction",
                &serde_json::json!({ "chat_id": chat.get(), "action": action }),
            )
            .await?;
        Ok(())
    }

    pub async fn send_photo_by_url(&self, chat: ChatId, url: &str) -> anyhow::Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendPhoto",
                &serde_json::json!({ "chat_id": chat.get(), "photo": url }),
            )
            .await?;
        Ok(())
    }
}

/// Text messages with a sender become channel messages; everything else
/// (joins, stickers, channel posts) is skipped.
pub(crate) fn to_channel_message(update: Update) -> Option<ChannelMessage> {
    let message = update.message?;
    let text = message.text?;
    let from = message.from?;

    Some(ChannelMessage {
        id: Uuid::new_v4().to_string(),
        sender: UserId::new(from.id),
        sender_name: from.username,
        chat: ChatId::new(message.chat.id),
        command: CommandInvocation::parse(&text),
        text,
        timestamp: message.date,
    })
}
