/// Display side of the mention engine: finalized text with clickable mentions
use crate::api::SocialApi;
use crate::mention::parser::{parse_mentions, MentionToken};
use crate::routes::{Navigator, Route};
use tracing::{debug, error};

/// Whether a click may continue to ancestor handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionText {
    text: String,
    tokens: Vec<MentionToken>,
}

impl MentionText {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tokens: parse_mentions(text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[MentionToken] {
        &self.tokens
    }

    /// Mention token covering byte `offset`
    pub fn mention_at(&self, offset: usize) -> Option<&MentionToken> {
        self.tokens
            .iter()
            .find(|t| t.is_mention() && t.start <= offset && offset < t.end)
    }

    /// Handle a click at byte `offset`. Clicks on a mention never propagate,
    /// whether or not the lookup succeeds.
    pub async fn click<A, N>(&self, offset: usize, api: &A, navigator: &mut N) -> Propagation
    where
        A: SocialApi,
        N: Navigator,
    {
        let Some(username) = self.mention_at(offset).and_then(|t| t.username.clone()) else {
            return Propagation::Continue;
        };
        open_profile(api, navigator, &username).await;
        Propagation::Stop
    }
}

/// Resolve `username` and navigate to its profile. Returns whether
/// navigation happened; lookup failures are logged, never raised.
pub async fn open_profile<A, N>(api: &A, navigator: &mut N, username: &str) -> bool
where
    A: SocialApi,
    N: Navigator,
{
    match api.get_user_by_username(username).await {
        Ok(user) => {
            debug!("@{} resolved to user {}", username, user.user_id);
            navigator.navigate(Route::UserFeed(user.user_id));
            true
        }
        Err(e) => {
            error!("could not open profile of @{}: {}", username, e);
            false
        }
    }
}
