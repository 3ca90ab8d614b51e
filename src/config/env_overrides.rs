use super::Config;
use crate::error::ConfigError;

/// `1`, `t`, `true` (any of the usual casings) and their false counterparts.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::Validation(format!("{var} has an invalid value: {value:?}"))
}

impl Config {
    /// Environment wins over the config file. Empty variables are ignored;
    /// unparseable ones are an error.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(token) = std::env::var("TELEGRAM_APITOKEN")
            && !token.is_empty()
        {
            self.telegram_api_token = Some(token);
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.openai_api_key = Some(key);
        }

        if let Ok(model) = std::env::var("CHATGATE_MODEL")
            && !model.is_empty()
        {
            self.model = model;
        }

        if let Ok(raw) = std::env::var("MODEL_TEMPERATURE")
            && !raw.trim().is_empty()
        {
            self.temperature = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid("MODEL_TEMPERATURE", &raw))?;
        }

        if let Ok(raw) = std::env::var("CONVERSATION_IDLE_TIMEOUT_SECONDS")
            && !raw.trim().is_empty()
        {
            self.conversation_idle_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("CONVERSATION_IDLE_TIMEOUT_SECONDS", &raw))?;
        }

        if let Ok(raw) = std::env::var("NOTIFY_USER_ON_CONVERSATION_IDLE_TIMEOUT")
            && !raw.trim().is_empty()
        {
            self.notify_on_idle_timeout = parse_bool(&raw)
                .ok_or_else(|| invalid("NOTIFY_USER_ON_CONVERSATION_IDLE_TIMEOUT", &raw))?;
        }

        if let Ok(path) = std::env::var("CHATGATE_ACCESS_FILE")
            && !path.is_empty()
        {
            self.access_file = path;
        }

        if let Ok(url) = std::env::var("OPENAI_BASE_URL")
            && !url.is_empty()
        {
            self.openai_base_url = url;
        }

        if let Ok(level) = std::env::var("CHATGATE_LOG")
            && !level.is_empty()
        {
            self.log_level = level;
        }

        Ok(())
    }
}
