pub mod http_client;
pub mod openai;
pub mod scrub;
pub mod traits;
pub mod types;

pub use openai::OpenAiClient;
pub use traits::{CompletionService, ImageService};
pub use types::{CompletionRequest, CompletionResponse, ImageRequest, ImageResponse};
