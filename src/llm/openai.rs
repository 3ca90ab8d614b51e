//! OpenAI-compatible client for `/chat/completions` and `/images/generations`.

use super::http_client::build_http_client;
use super::scrub::api_error;
use super::traits::{CompletionService, ImageService};
use super::types::{CompletionRequest, CompletionResponse, ImageRequest, ImageResponse};
use anyhow::Context;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    /// Pre-computed `"Bearer <key>"` header value.
    cached_auth_header: Option<String>,
    cached_chat_url: String,
    cached_images_url: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            cached_auth_header: api_key
                .filter(|key| !key.trim().is_empty())
                .map(|key| format!("Bearer {key}")),
            cached_chat_url: format!("{base_url}/chat/completions"),
            cached_images_url: format!("{base_url}/images/generations"),
            client: build_http_client(timeout_secs),
        }
    }

    async fn post_json<Req, Resp>(&self, label: &str, url: &str, body: &Req) -> anyhow::Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let Some(auth) = self.cached_auth_header.as_deref() else {
            anyhow::bail!("OpenAI API key not set. Set OPENAI_API_KEY or `openai_api_key`.");
        };

        let response = self
            .client
            .post(url)
            .header("Authorization", auth)
            .json(body)
            .send()
            .await
            .with_context(|| format!("OpenAI {label} request failed"))?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI", response).await);
        }

        response
            .json()
            .await
            .with_context(|| format!("OpenAI {label} JSON decode failed"))
    }
}

impl CompletionService for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CompletionResponse>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(
                model = %request.model,
                messages = request.messages.len(),
                "sending chat completion request"
            );
            self.post_json("chat completions", &self.cached_chat_url, request)
                .await
        })
    }
}

impl ImageService for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ImageResponse>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!(size = %request.size, "sending image generation request");
            self.post_json("image generation", &self.cached_images_url, request)
                .await
        })
    }
}
