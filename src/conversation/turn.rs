/// What one inbound text asks for, decided once by prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Ordinary prompt, appended to the conversation history.
    Prompt(String),
    /// Image request; the prefix is stripped and the history left alone.
    Draw(String),
}

impl Turn {
    /// Prefixes match case-insensitively, including non-ASCII ones such as
    /// `"нарисуй "`. A prefix followed by nothing but whitespace is treated
    /// as a prompt.
    pub fn classify<S: AsRef<str>>(text: &str, draw_prefixes: &[S]) -> Self {
        for prefix in draw_prefixes {
            if let Some(rest) = strip_prefix_ignore_case(text, prefix.as_ref()) {
                let prompt = rest.trim();
                if !prompt.is_empty() {
                    return Self::Draw(prompt.to_string());
                }
            }
        }
        Self::Prompt(text.to_string())
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let mut chars = text.char_indices();
    let mut end = 0;
    for expected in prefix.chars() {
        let (index, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end = index + actual.len_utf8();
    }
    Some(&text[end..])
}
