use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Markers after which a secret token follows. `/bot` covers Telegram API
/// URLs, which embed the bot token in the path and show up in transport errors.
const SECRET_MARKERS: [&str; 9] = [
    "sk-",
    "Bearer ",
    "bearer ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
    "/bot",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '=')
}

fn redact_after(text: &mut String, marker: &str) {
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let value_start = from + rel + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_secret_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            from = value_start;
            continue;
        }

        text.replace_range(value_start..value_start + value_len, REDACTED);
        from = value_start + REDACTED.len();
    }
}

/// Redact API keys, bearer tokens and bot tokens from free-form error text.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in SECRET_MARKERS {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets, then truncate to a length safe to echo back to a chat.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}

/// Build a sanitized error from a failed HTTP response.
pub async fn api_error(service: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    anyhow::anyhow!("{service} API error ({status}): {}", sanitize_api_error(&body))
}
