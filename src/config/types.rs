use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ACCESS_FILE: &str = "config.cfg";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path the config was read from, if any. Not serialized.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub telegram_api_token: Option<String>,
    pub openai_api_key: Option<String>,

    pub model: String,
    pub temperature: f64,

    pub conversation_idle_timeout_secs: u64,
    pub notify_on_idle_timeout: bool,

    /// JSON file holding the admin and allow lists. `~` is expanded.
    pub access_file: String,

    pub openai_base_url: String,
    pub telegram_api_url: String,

    /// Reported `total_tokens` above which the oldest message is dropped.
    pub context_token_budget: u64,
    pub sweep_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub image_size: String,
    pub draw_prefixes: Vec<String>,
    pub max_concurrent_turns: usize,

    pub locale: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            telegram_api_token: None,
            openai_api_key: None,
            model: DEFAULT_MODEL.into(),
            temperature: 1.0,
            conversation_idle_timeout_secs: 900,
            notify_on_idle_timeout: false,
            access_file: DEFAULT_ACCESS_FILE.into(),
            openai_base_url: crate::llm::openai::DEFAULT_OPENAI_BASE_URL.into(),
            telegram_api_url: crate::channels::telegram::DEFAULT_TELEGRAM_API_URL.into(),
            context_token_budget: 3500,
            sweep_interval_secs: 60,
            request_timeout_secs: 120,
            image_size: "256x256".into(),
            draw_prefixes: vec!["draw ".into()],
            max_concurrent_turns: 32,
            locale: "en".into(),
            log_level: "info".into(),
        }
    }
}
