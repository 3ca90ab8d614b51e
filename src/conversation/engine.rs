use super::turn::Turn;
use crate::error::UpstreamError;
use crate::llm::scrub::sanitize_api_error;
use crate::llm::{CompletionRequest, CompletionService, ImageRequest, ImageService};
use crate::session::{SessionStore, UserId};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Per-turn parameters taken from configuration.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f64,
    pub idle_timeout: chrono::Duration,
    /// Reported `total_tokens` above this trims one message.
    pub token_budget: u64,
    pub image_size: String,
    pub request_timeout: Duration,
    pub draw_prefixes: Vec<String>,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".into(),
            temperature: 1.0,
            idle_timeout: chrono::Duration::seconds(900),
            token_budget: 3500,
            image_size: "256x256".into(),
            request_timeout: Duration::from_secs(120),
            draw_prefixes: vec!["draw ".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Text(String),
    ImageUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub body: ReplyBody,
    pub context_trimmed: bool,
}

/// Runs prompt and draw turns against the session store and the two
/// upstream services.
pub struct ConversationEngine {
    store: Arc<SessionStore>,
    completion: Arc<dyn CompletionService>,
    images: Arc<dyn ImageService>,
    settings: TurnSettings,
}

impl ConversationEngine {
    pub fn new(
        store: Arc<SessionStore>,
        completion: Arc<dyn CompletionService>,
        images: Arc<dyn ImageService>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            store,
            completion,
            images,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub fn classify(&self, text: &str) -> Turn {
        Turn::classify(text, &self.settings.draw_prefixes)
    }

    pub async fn handle_text(
        &self,
        identity: UserId,
        text: &str,
    ) -> Result<TurnReply, UpstreamError> {
        match self.classify(text) {
            Turn::Prompt(prompt) => self.prompt_turn(identity, &prompt).await,
            Turn::Draw(prompt) => self.draw_turn(identity, &prompt).await,
        }
    }

    /// Append `text`, ask for a completion over the whole history, record the
    /// reply. A failed call leaves the history as it was before the turn.
    pub async fn prompt_turn(
        &self,
        identity: UserId,
        text: &str,
    ) -> Result<TurnReply, UpstreamError> {
        let _turn = self.store.lock_turn(identity).await;
        let now = Utc::now();

        if self
            .store
            .clear_if_expired(identity, self.settings.idle_timeout, now)
        {
            tracing::info!(user = %identity, "conversation idled out; starting a new one");
        }

        self.store.append_user_message_at(identity, text, now);
        let request = CompletionRequest::for_history(
            &self.settings.model,
            self.settings.temperature,
            self.store.history(identity),
        );

        let response = match self
            .bounded("completion", self.completion.complete(&request))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.store.remove_last_message(identity);
                tracing::warn!(user = %identity, error = %err, "completion failed; turn rolled back");
                return Err(err);
            }
        };

        let Some(reply) = response
            .first_reply()
            .filter(|reply| !reply.trim().is_empty())
            .map(str::to_string)
        else {
            self.store.remove_last_message(identity);
            tracing::warn!(user = %identity, "completion returned no choices; turn rolled back");
            return Err(UpstreamError::EmptyResponse {
                service: "completion",
            });
        };

        if !self.store.append_assistant_message(identity, reply.clone()) {
            tracing::warn!(user = %identity, "session vanished before the reply was recorded");
        }

        let total_tokens = response.usage.total_tokens;
        let context_trimmed =
            total_tokens > self.settings.token_budget && self.store.trim_oldest(identity).is_some();
        if context_trimmed {
            tracing::debug!(user = %identity, total_tokens, "context over budget; oldest message dropped");
        }

        Ok(TurnReply {
            body: ReplyBody::Text(reply),
            context_trimmed,
        })
    }

    /// Single image request. The conversation history is not consulted.
    pub async fn draw_turn(
        &self,
        identity: UserId,
        prompt: &str,
    ) -> Result<TurnReply, UpstreamError> {
        let request = ImageRequest::single_url(prompt, &self.settings.image_size);
        tracing::debug!(user = %identity, "image turn");

        let response = self
            .bounded("image", self.images.generate(&request))
            .await?;
        let url = response
            .first_url()
            .ok_or(UpstreamError::EmptyResponse { service: "image" })?;

        Ok(TurnReply {
            body: ReplyBody::ImageUrl(url.to_string()),
            context_trimmed: false,
        })
    }

    async fn bounded<T>(
        &self,
        service: &'static str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, UpstreamError> {
        let limit = self.settings.request_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(UpstreamError::Request {
                service,
                message: sanitize_api_error(&format!("{err:#}")),
            }),
            Err(_) => Err(UpstreamError::Timeout {
                service,
                secs: limit.as_secs(),
            }),
        }
    }
}
