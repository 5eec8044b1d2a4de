/// Collaborator contracts consumed by the core
///
/// Everything the mention engine, story viewer and feed need from the
/// server goes through [`SocialApi`]. [`crate::http::HttpApi`] is the real
/// implementation; tests plug in in-memory fakes.
use crate::error::Result;
use crate::types::{
    Comment, CommentId, CommentPage, Post, PostId, Story, StoryId, User, UserId, UserSuggestion,
};
use std::future::Future;

pub trait SocialApi: Send + Sync + 'static {
    /// Server-ordered search results; empty query yields an empty list
    fn search_users(&self, query: &str)
        -> impl Future<Output = Result<Vec<UserSuggestion>>> + Send;

    /// `Err(NotFound)` when no such user
    fn get_user_by_username(&self, username: &str) -> impl Future<Output = Result<User>> + Send;

    fn get_user(&self, user_id: UserId) -> impl Future<Output = Result<User>> + Send;

    /// Active stories of one user, oldest first
    fn list_stories_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Story>>> + Send;

    /// Active stories of everyone, for the feed's story row
    fn list_stories(&self) -> impl Future<Output = Result<Vec<Story>>> + Send;

    fn delete_story(&self, story_id: StoryId) -> impl Future<Output = Result<()>> + Send;

    fn list_posts(&self) -> impl Future<Output = Result<Vec<Post>>> + Send;

    fn list_user_posts(&self, user_id: UserId) -> impl Future<Output = Result<Vec<Post>>> + Send;

    fn get_post(&self, post_id: PostId) -> impl Future<Output = Result<Post>> + Send;

    fn delete_post(&self, post_id: PostId) -> impl Future<Output = Result<()>> + Send;

    fn add_like(&self, post_id: PostId) -> impl Future<Output = Result<()>> + Send;

    fn remove_like(&self, post_id: PostId) -> impl Future<Output = Result<()>> + Send;

    fn list_comments(&self, post_id: PostId) -> impl Future<Output = Result<CommentPage>> + Send;

    fn create_comment(
        &self,
        post_id: PostId,
        content: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn update_comment(
        &self,
        comment_id: CommentId,
        content: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_comment(&self, comment_id: CommentId) -> impl Future<Output = Result<()>> + Send;
}

/// Comments of a post with their mentions pre-parsed, as shown on the
/// post detail view.
pub async fn load_comment_thread<A: SocialApi>(
    api: &A,
    post_id: PostId,
) -> Result<Vec<(Comment, crate::mention::MentionText)>> {
    let page = api.list_comments(post_id).await?;
    Ok(page
        .comments
        .into_iter()
        .map(|c| {
            let text = crate::mention::MentionText::new(&c.comment_content);
            (c, text)
        })
        .collect())
}
