use super::Config;
use crate::conversation::TurnSettings;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// `~/.chatgate/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Ok(home.join(".chatgate").join("config.toml"))
    }

    /// Read `explicit` (which must exist) or the default path (if it exists),
    /// fall back to defaults, then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(Self::default_path()?).filter(|path| path.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .telegram_api_token
            .as_deref()
            .is_none_or(|token| token.trim().is_empty())
        {
            return Err(ConfigError::MissingSecret("TELEGRAM_APITOKEN"));
        }
        if self
            .openai_api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err(ConfigError::MissingSecret("OPENAI_API_KEY"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be within 0..=2, got {}",
                self.temperature
            )));
        }
        for (name, value) in [
            ("conversation_idle_timeout_secs", self.conversation_idle_timeout_secs),
            ("sweep_interval_secs", self.sweep_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        if self.max_concurrent_turns == 0 {
            return Err(ConfigError::Validation(
                "max_concurrent_turns must be positive".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model must not be empty".into()));
        }
        Ok(())
    }

    pub fn access_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.access_file).into_owned())
    }

    /// Values past what `TimeDelta` can hold saturate, so a huge timeout
    /// means sessions never idle out.
    pub fn idle_timeout(&self) -> chrono::TimeDelta {
        i64::try_from(self.conversation_idle_timeout_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            idle_timeout: self.idle_timeout(),
            token_budget: self.context_token_budget,
            image_size: self.image_size.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            draw_prefixes: self.draw_prefixes.clone(),
        }
    }

    /// Draw prefix as shown in help text.
    pub fn draw_hint(&self) -> String {
        self.draw_prefixes
            .first()
            .map_or_else(String::new, |prefix| prefix.trim().to_string())
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level
            .trim()
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }

    /// Human-readable settings with secrets masked.
    pub fn redacted_summary(&self) -> String {
        fn mask(secret: Option<&str>) -> &'static str {
            match secret {
                Some(value) if !value.trim().is_empty() => "set",
                _ => "missing",
            }
        }

        let source = self
            .config_path
            .as_ref()
            .map_or_else(|| "defaults + environment".to_string(), |p| p.display().to_string());
        [
            format!("config: {source}"),
            format!("telegram token: {}", mask(self.telegram_api_token.as_deref())),
            format!("openai key: {}", mask(self.openai_api_key.as_deref())),
            format!("model: {} (temperature {})", self.model, self.temperature),
            format!("openai base url: {}", self.openai_base_url),
            format!("access file: {}", self.access_file_path().display()),
            format!(
                "idle timeout: {}s (notify: {})",
                self.conversation_idle_timeout_secs, self.notify_on_idle_timeout
            ),
            format!("context token budget: {}", self.context_token_budget),
            format!("draw prefixes: {:?}", self.draw_prefixes),
            format!("locale: {}", self.locale),
        ]
        .join("\n")
    }
}
