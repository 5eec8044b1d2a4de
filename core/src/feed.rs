/// Home feed: posts, the story row, and optimistic likes
use crate::api::SocialApi;
use crate::error::{GramError, Result};
use crate::types::{Post, PostId, Story, UserId};
use tracing::warn;

/// One avatar in the story row: all active stories of a user
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRing {
    pub user_id: UserId,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub story_count: usize,
}

/// Speculative like/unlike awaiting the server's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLike {
    pub post_id: PostId,
    was_liked: bool,
    previous_count: u32,
}

impl PendingLike {
    /// True when this toggle is a like (false = unlike)
    pub fn likes(&self) -> bool {
        !self.was_liked
    }
}

#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub stories: Vec<Story>,
}

impl Feed {
    /// Fetch posts and stories. Each half fails on its own; failures come
    /// back as notices and leave that half empty.
    pub async fn load<A: SocialApi>(api: &A) -> (Self, Vec<String>) {
        let mut notices = Vec::new();
        let posts = api.list_posts().await.unwrap_or_else(|e| {
            warn!("loading posts failed: {}", e);
            notices.push("Could not load posts".to_string());
            Vec::new()
        });
        let stories = api.list_stories().await.unwrap_or_else(|e| {
            warn!("loading stories failed: {}", e);
            notices.push("Could not load stories".to_string());
            Vec::new()
        });
        (Self { posts, stories }, notices)
    }

    pub fn post(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.post_id == post_id)
    }

    /// Group stories per author, in order of each author's first story.
    pub fn story_rings(&self) -> Vec<StoryRing> {
        let mut rings: Vec<StoryRing> = Vec::new();
        for story in &self.stories {
            match rings.iter_mut().find(|r| r.user_id == story.user_id) {
                Some(ring) => ring.story_count += 1,
                None => rings.push(StoryRing {
                    user_id: story.user_id,
                    user_name: story.user_name.clone(),
                    user_avatar: story.user_avatar.clone(),
                    story_count: 1,
                }),
            }
        }
        rings
    }

    /// Phase one: flip the like locally.
    pub fn begin_like_toggle(&mut self, post_id: PostId) -> Option<PendingLike> {
        let post = self.posts.iter_mut().find(|p| p.post_id == post_id)?;
        let pending = PendingLike {
            post_id,
            was_liked: post.is_liked,
            previous_count: post.like_count,
        };
        post.is_liked = !post.is_liked;
        post.like_count = if post.is_liked {
            post.like_count.saturating_add(1)
        } else {
            post.like_count.saturating_sub(1)
        };
        Some(pending)
    }

    /// Phase two: keep the flip on success, restore the old values on failure.
    /// Returns whether the speculative state was kept.
    pub fn settle(&mut self, pending: PendingLike, outcome: &Result<()>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!("like toggle on post {} failed: {}", pending.post_id, e);
                if let Some(post) = self.posts.iter_mut().find(|p| p.post_id == pending.post_id) {
                    post.is_liked = pending.was_liked;
                    post.like_count = pending.previous_count;
                }
                false
            }
        }
    }

    /// Both phases against the server. Returns the post's final liked state.
    pub async fn toggle_like<A: SocialApi>(&mut self, api: &A, post_id: PostId) -> Result<bool> {
        let pending = self
            .begin_like_toggle(post_id)
            .ok_or_else(|| GramError::NotFound(format!("post {}", post_id)))?;
        let outcome = if pending.likes() {
            api.add_like(post_id).await
        } else {
            api.remove_like(post_id).await
        };
        self.settle(pending, &outcome);
        outcome.map(|()| pending.likes())
    }
}
