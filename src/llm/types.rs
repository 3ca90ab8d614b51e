use crate::session::Message;
use serde::{Deserialize, Serialize};

/// Chat completion request, serialised as the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub n: u32,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// Fixed sampling shape used for every turn: `top_p = 1`, `n = 1`.
    pub fn for_history(model: &str, temperature: f64, messages: Vec<Message>) -> Self {
        Self {
            model: model.to_string(),
            temperature,
            top_p: 1.0,
            n: 1,
            messages,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

impl CompletionResponse {
    /// Content of the first choice, if there is one with text.
    pub fn first_reply(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    Url,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
    pub response_format: ImageResponseFormat,
    pub n: u32,
}

impl ImageRequest {
    pub fn single_url(prompt: &str, size: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            size: size.to_string(),
            response_format: ImageResponseFormat::Url,
            n: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

impl ImageResponse {
    /// First URL, treating an empty `data` array or an empty URL as absent.
    pub fn first_url(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|image| image.url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}
