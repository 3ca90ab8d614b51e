//! Splits replies that exceed a channel's message limit.
//!
//! Boundaries are tried coarsest first: blank line, newline, space, and
//! finally a hard cut at the character limit. Delimiters stay attached to the
//! piece they end, so concatenating the chunks restores the input.

#[derive(Clone, Copy)]
enum Boundary {
    Paragraph,
    Line,
    Word,
    Hard,
}

impl Boundary {
    fn finer(self) -> Self {
        match self {
            Self::Paragraph => Self::Line,
            Self::Line => Self::Word,
            Self::Word | Self::Hard => Self::Hard,
        }
    }

    fn delimiter(self) -> Option<&'static str> {
        match self {
            Self::Paragraph => Some("\n\n"),
            Self::Line => Some("\n"),
            Self::Word => Some(" "),
            Self::Hard => None,
        }
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn pieces<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(delimiter) {
        let (piece, tail) = rest.split_at(pos + delimiter.len());
        out.push(piece);
        rest = tail;
    }
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn cut(text: &str, max_chars: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    out.extend(chars.chunks(max_chars).map(|chunk| chunk.iter().collect::<String>()));
}

fn split_at_boundary(text: &str, max_chars: usize, boundary: Boundary, out: &mut Vec<String>) {
    if char_len(text) <= max_chars {
        out.push(text.to_string());
        return;
    }

    let Some(delimiter) = boundary.delimiter() else {
        cut(text, max_chars, out);
        return;
    };

    let parts = pieces(text, delimiter);
    if parts.len() <= 1 {
        split_at_boundary(text, max_chars, boundary.finer(), out);
        return;
    }

    let mut current = String::new();
    let mut current_len = 0;
    for part in parts {
        let part_len = char_len(part);
        if part_len > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            split_at_boundary(part, max_chars, boundary.finer(), out);
        } else if current_len + part_len > max_chars {
            out.push(std::mem::replace(&mut current, part.to_string()));
            current_len = part_len;
        } else {
            current.push_str(part);
            current_len += part_len;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    split_at_boundary(text, max_chars, Boundary::Paragraph, &mut chunks);
    chunks
}
