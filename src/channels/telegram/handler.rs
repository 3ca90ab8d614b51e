use super::{TelegramChannel, to_channel_message};
use crate::channels::traits::{Channel, ChannelMessage, ChatId, SendOptions};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn max_message_length(&self) -> usize {
        4096
    }

    fn send<'a>(
        &'a self,
        text: &'a str,
        chat: ChatId,
        options: SendOptions,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.send_message(chat, text, options.silent).await })
    }

    fn send_typing<'a>(
        &'a self,
        chat: ChatId,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.send_chat_action(chat, "typing").await })
    }

    fn send_image_url<'a>(
        &'a self,
        url: &'a str,
        chat: ChatId,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if let Err(e) = self.send_photo_by_url(chat, url).await {
                tracing::warn!(%chat, error = %e, "sendPhoto failed; sending the link instead");
                self.send_message(chat, url, false).await?;
            }
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<ChannelMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut offset: i64 = 0;
            tracing::info!("Telegram channel listening for messages...");

            loop {
                let updates = match self.get_updates(offset).await {
                    Ok(updates) => updates,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e:#}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let Some(msg) = to_channel_message(update) else {
                        continue;
                    };
                    tracing::debug!(
                        user = %msg.sender,
                        chat = %msg.chat,
                        command = msg.command.as_ref().map(|c| c.name.as_str()),
                        "telegram message received"
                    );
                    if tx.send(msg).await.is_err() {
                        return Ok(());
                    }
                }
            }
        })
    }

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { self.get_me().await.is_ok() })
    }
}
