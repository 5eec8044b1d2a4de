/// `@username` segmentation shared by the editor and the renderer
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ASCII letters, digits, Hangul syllables and underscore
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@([0-9A-Za-z\x{AC00}-\x{D7A3}_]+)").expect("mention pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Text,
    Mention,
}

/// A span of the parsed text. Offsets are UTF-8 byte offsets, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionToken {
    pub kind: TokenKind,
    pub content: String,
    /// Username without the `@`; only set on mentions
    pub username: Option<String>,
    pub start: usize,
    pub end: usize,
}

impl MentionToken {
    fn text(source: &str, start: usize, end: usize) -> Self {
        Self {
            kind: TokenKind::Text,
            content: source[start..end].to_string(),
            username: None,
            start,
            end,
        }
    }

    pub fn is_mention(&self) -> bool {
        self.kind == TokenKind::Mention
    }
}

pub fn is_mention_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Split `text` into alternating text and mention tokens that cover every byte.
pub fn parse_mentions(text: &str) -> Vec<MentionToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in MENTION_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(MentionToken::text(text, last, whole.start()));
        }
        tokens.push(MentionToken {
            kind: TokenKind::Mention,
            content: whole.as_str().to_string(),
            username: Some(name.as_str().to_string()),
            start: whole.start(),
            end: whole.end(),
        });
        last = whole.end();
    }

    if last < text.len() {
        tokens.push(MentionToken::text(text, last, text.len()));
    }
    tokens
}

/// Distinct mentioned usernames in order of first appearance
pub fn mentioned_usernames(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in parse_mentions(text) {
        if let Some(name) = token.username {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
