use crate::channels::{Channel, ChannelMessage, ChatId, SendOptions};
use crate::commands::CommandDispatcher;
use crate::commands::dispatcher::render_access_error;
use crate::conversation::{ConversationEngine, ReplyBody};
use crate::error::UpstreamError;
use crate::security::AccessController;
use crate::utils::text::log_preview;
use std::sync::Arc;

/// Routes one inbound event: allow-list gate, then either the command
/// dispatcher or a conversation turn. Every outcome ends in a reply.
pub struct MessageRouter {
    channel: Arc<dyn Channel>,
    access: Arc<AccessController>,
    engine: Arc<ConversationEngine>,
    commands: Arc<CommandDispatcher>,
}

impl MessageRouter {
    pub fn new(
        channel: Arc<dyn Channel>,
        access: Arc<AccessController>,
        engine: Arc<ConversationEngine>,
        commands: Arc<CommandDispatcher>,
    ) -> Self {
        Self {
            channel,
            access,
            engine,
            commands,
        }
    }

    pub async fn handle(&self, msg: &ChannelMessage) {
        tracing::debug!(
            user = %msg.sender,
            chat = %msg.chat,
            text = %log_preview(&msg.text),
            "inbound message"
        );

        if let Err(denied) = self.access.authorize(msg.sender) {
            tracing::warn!(user = %msg.sender, "unauthorized user");
            self.reply(msg.chat, &render_access_error(&denied), SendOptions::default())
                .await;
            return;
        }

        if let Err(e) = self.channel.send_typing(msg.chat).await {
            tracing::debug!(chat = %msg.chat, error = %format!("{e:#}"), "typing indicator failed");
        }

        if let Some(invocation) = &msg.command {
            let text = self.commands.dispatch(msg.sender, invocation).await;
            self.reply(msg.chat, &text, SendOptions::default()).await;
            return;
        }

        match self.engine.handle_text(msg.sender, &msg.text).await {
            Ok(reply) => {
                match &reply.body {
                    ReplyBody::Text(text) => {
                        tracing::debug!(user = %msg.sender, reply = %log_preview(text), "completion reply");
                        self.reply(msg.chat, text, SendOptions::default()).await;
                    }
                    ReplyBody::ImageUrl(url) => {
                        if let Err(e) = self.channel.send_image_url(url, msg.chat).await {
                            tracing::warn!(chat = %msg.chat, error = %format!("{e:#}"), "image delivery failed");
                        }
                    }
                }
                if reply.context_trimmed {
                    tracing::info!(user = %msg.sender, "context trimmed");
                    self.reply(msg.chat, &t!("bot.context_trimmed"), SendOptions::SILENT)
                        .await;
                }
            }
            Err(err) => {
                tracing::warn!(user = %msg.sender, error = %err, "turn failed");
                self.reply(msg.chat, &render_upstream_error(&err), SendOptions::default())
                    .await;
            }
        }
    }

    async fn reply(&self, chat: ChatId, text: &str, options: SendOptions) {
        if let Err(e) = self.channel.send_chunked(text, chat, options).await {
            tracing::warn!(chat = %chat, error = %format!("{e:#}"), "reply failed");
        }
    }
}

fn render_upstream_error(err: &UpstreamError) -> String {
    match err {
        UpstreamError::Request { message, .. } => {
            t!("bot.request_failed", error = message.as_str()).into_owned()
        }
        UpstreamError::Timeout { .. } => t!("bot.request_timed_out").into_owned(),
        UpstreamError::EmptyResponse { .. } => t!("bot.no_result").into_owned(),
    }
}
