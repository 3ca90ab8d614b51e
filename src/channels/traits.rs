use crate::session::UserId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Conversation a reply is delivered to (Telegram `chat.id`). For private
/// chats it equals the sender's [`UserId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(i64);

impl ChatId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<UserId> for ChatId {
    fn from(user: UserId) -> Self {
        Self(user.get())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `/name args`, with any `@botname` suffix removed from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: String,
}

impl CommandInvocation {
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;
        let (head, args) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        let name = head.split('@').next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            args: args.trim().to_string(),
        })
    }
}

/// An inbound text event.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: String,
    pub sender: UserId,
    pub sender_name: Option<String>,
    pub chat: ChatId,
    pub text: String,
    pub command: Option<CommandInvocation>,
    /// Unix seconds as reported by the channel.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Deliver without a notification sound.
    pub silent: bool,
}

impl SendOptions {
    pub const SILENT: Self = Self { silent: true };
}

/// Messaging platform the bot talks through.
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    fn send<'a>(
        &'a self,
        text: &'a str,
        chat: ChatId,
        options: SendOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Long-running; returns when `tx` is closed or the connection fails.
    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<ChannelMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { true })
    }

    fn max_message_length(&self) -> usize {
        usize::MAX
    }

    fn send_typing<'a>(
        &'a self,
        _chat: ChatId,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }

    /// Channels without image support get the URL as plain text.
    fn send_image_url<'a>(
        &'a self,
        url: &'a str,
        chat: ChatId,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        self.send(url, chat, SendOptions::default())
    }

    fn send_chunked<'a>(
        &'a self,
        text: &'a str,
        chat: ChatId,
        options: SendOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            for chunk in super::chunker::chunk_message(text, self.max_message_length()) {
                self.send(&chunk, chat, options).await?;
            }
            Ok(())
        })
    }
}
