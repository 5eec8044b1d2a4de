/// Mention engine: parsing, autocomplete input, search dispatch, rendering
pub mod input;
pub mod parser;
pub mod render;
pub mod search;

pub use input::{
    active_mention, KeyOutcome, MentionEdit, MentionInput, MentionInputState, MentionKey,
    SearchRequest,
};
pub use parser::{mentioned_usernames, parse_mentions, MentionToken, TokenKind};
pub use render::{open_profile, MentionText, Propagation};
pub use search::{SearchDispatcher, SearchOutcome};
