/// Mention-aware text input: caret tracking, autocomplete and splicing
///
/// The input never talks to the network itself. A text change that opens a
/// query hands back a [`SearchRequest`]; whoever runs the search reports the
/// outcome through [`MentionInput::apply_search_result`] with the request's
/// generation, and only the newest generation is allowed to touch the popup.
use crate::error::Result;
use crate::mention::parser::{parse_mentions, MentionToken};
use crate::types::UserSuggestion;
use serde::Serialize;
use tracing::{debug, warn};

/// Search the caller should run for the active `@query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
}

/// Result of splicing a chosen username into the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionEdit {
    pub text: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    Down,
    Up,
    Confirm,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Popup not involved; the text field handles the key as usual
    PassThrough,
    /// Popup handled the key; suppress its default effect
    Consumed,
    /// Popup handled the key and replaced the text
    Selected(MentionEdit),
}

/// The `@` being typed at the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMention<'a> {
    /// Byte offset of the triggering `@`
    pub at: usize,
    /// Text between the `@` and the caret, possibly empty
    pub query: &'a str,
}

/// Find the in-progress mention ending at `cursor`, if any.
pub fn active_mention(text: &str, cursor: usize) -> Option<ActiveMention<'_>> {
    let cursor = floor_char_boundary(text, cursor);
    let prefix = &text[..cursor];
    let at = prefix.rfind('@')?;
    let query = &prefix[at + 1..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    Some(ActiveMention { at, query })
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Serializable snapshot of the input for views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentionInputState {
    pub raw_text: String,
    pub cursor_offset: usize,
    pub suggestions: Vec<UserSuggestion>,
    pub selected_index: usize,
    pub suggestions_visible: bool,
}

#[derive(Debug, Default)]
pub struct MentionInput {
    text: String,
    cursor: usize,
    suggestions: Vec<UserSuggestion>,
    selected_index: usize,
    open: bool,
    pending: Option<u64>,
    generation: u64,
}

impl MentionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn suggestions(&self) -> &[UserSuggestion] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Whether a search for the current query is still outstanding
    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.open && !self.suggestions.is_empty()
    }

    pub fn state(&self) -> MentionInputState {
        MentionInputState {
            raw_text: self.text.clone(),
            cursor_offset: self.cursor,
            suggestions: self.suggestions.clone(),
            selected_index: self.selected_index,
            suggestions_visible: self.is_visible(),
        }
    }

    /// Segmentation for the highlight overlay
    pub fn highlighted(&self) -> Vec<MentionToken> {
        parse_mentions(&self.text)
    }

    /// Record a new text/caret and decide whether a search is needed.
    pub fn on_text_change(
        &mut self,
        text: impl Into<String>,
        cursor: usize,
    ) -> Option<SearchRequest> {
        self.text = text.into();
        self.cursor = floor_char_boundary(&self.text, cursor);
        self.selected_index = 0;
        self.generation += 1;

        let query = active_mention(&self.text, self.cursor).map(|m| m.query.to_string());
        match query {
            Some(query) if !query.is_empty() => {
                self.open = true;
                self.pending = Some(self.generation);
                debug!("mention query {:?} (gen {})", query, self.generation);
                Some(SearchRequest {
                    generation: self.generation,
                    query,
                })
            }
            // bare `@`: nothing to search for yet
            Some(_) | None => {
                self.hide();
                None
            }
        }
    }

    /// Apply a finished search. Returns false when the result was stale.
    pub fn apply_search_result(
        &mut self,
        generation: u64,
        result: Result<Vec<UserSuggestion>>,
    ) -> bool {
        if self.pending != Some(generation) {
            debug!(
                "dropping stale mention search (gen {}, pending {:?})",
                generation, self.pending
            );
            return false;
        }
        self.pending = None;
        if !self.open {
            return false;
        }

        match result {
            Ok(list) => {
                self.suggestions = list;
                if self.selected_index >= self.suggestions.len() {
                    self.selected_index = 0;
                }
            }
            Err(e) => {
                warn!("user search failed: {}", e);
                self.suggestions.clear();
                self.selected_index = 0;
            }
        }
        true
    }

    pub fn on_key(&mut self, key: MentionKey) -> KeyOutcome {
        if !self.is_visible() {
            return KeyOutcome::PassThrough;
        }
        let len = self.suggestions.len();
        match key {
            MentionKey::Down => {
                self.selected_index = (self.selected_index + 1) % len;
                KeyOutcome::Consumed
            }
            MentionKey::Up => {
                self.selected_index = if self.selected_index == 0 {
                    len - 1
                } else {
                    self.selected_index - 1
                };
                KeyOutcome::Consumed
            }
            MentionKey::Confirm => match self.select_current() {
                Some(edit) => KeyOutcome::Selected(edit),
                None => KeyOutcome::Consumed,
            },
            MentionKey::Escape => {
                self.open = false;
                KeyOutcome::Consumed
            }
            MentionKey::Other => KeyOutcome::PassThrough,
        }
    }

    /// Mouse hover over a popup row
    pub fn hover(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.selected_index = index;
        }
    }

    /// Close the popup and forget any outstanding search
    pub fn dismiss(&mut self) {
        self.hide();
    }

    pub fn click_outside(&mut self) {
        self.open = false;
    }

    /// Pick the highlighted suggestion
    pub fn select_current(&mut self) -> Option<MentionEdit> {
        self.select(self.selected_index)
    }

    /// Replace `@query` at the caret with `@<userName> ` and close the popup.
    pub fn select(&mut self, index: usize) -> Option<MentionEdit> {
        let user_name = self.suggestions.get(index)?.user_name.clone();
        let at = active_mention(&self.text, self.cursor)?.at;

        let mut text = String::with_capacity(self.text.len() + user_name.len() + 2);
        text.push_str(&self.text[..at]);
        text.push('@');
        text.push_str(&user_name);
        text.push(' ');
        text.push_str(&self.text[self.cursor..]);
        let cursor = at + user_name.len() + 2;

        self.text = text;
        self.cursor = cursor;
        self.generation += 1;
        self.hide();

        Some(MentionEdit {
            text: self.text.clone(),
            cursor,
        })
    }

    fn hide(&mut self) {
        self.open = false;
        self.pending = None;
        self.suggestions.clear();
        self.selected_index = 0;
    }
}
