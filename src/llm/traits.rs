use super::types::{CompletionRequest, CompletionResponse, ImageRequest, ImageResponse};
use std::future::Future;
use std::pin::Pin;

/// Chat completion collaborator.
pub trait CompletionService: Send + Sync {
    /// Service identifier used in logs and error text.
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CompletionResponse>> + Send + 'a>>;
}

/// Image generation collaborator.
pub trait ImageService: Send + Sync {
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ImageResponse>> + Send + 'a>>;
}
