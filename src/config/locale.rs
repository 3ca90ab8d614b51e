use super::Config;

pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "ru"];

fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|lang| lang.trim().to_lowercase())
        .find(|lang| !lang.is_empty())
}

/// `CHATGATE_LANG` -> config value -> system locale -> `"en"`.
/// Anything outside [`SUPPORTED_LOCALES`] resolves to `"en"`.
fn detect_locale(config_locale: &str) -> String {
    let explicit = std::env::var("CHATGATE_LANG")
        .ok()
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty());
    let configured = Some(config_locale.trim().to_lowercase())
        .filter(|lang| !lang.is_empty() && lang != "en");

    let raw = explicit.or(configured).or_else(system_locale);
    let lang = raw.as_deref().map(normalise_locale).unwrap_or_default();
    if SUPPORTED_LOCALES.contains(&lang.as_str()) {
        lang
    } else {
        "en".into()
    }
}

/// `"ru_RU.UTF-8"` -> `"ru"`, `"en-GB"` -> `"en"`.
fn normalise_locale(raw: &str) -> String {
    let base = raw.split(['.', '@']).next().unwrap_or(raw);
    let lang = base.split(['_', '-']).next().unwrap_or(base);
    lang.to_string()
}

impl Config {
    /// Resolve the reply language and hand it to `rust_i18n`.
    pub fn apply_locale(&self) -> String {
        let locale = detect_locale(&self.locale);
        rust_i18n::set_locale(&locale);
        locale
    }
}
