#![allow(dead_code)]
//! In-memory SocialApi shared by the integration tests

use gram_core::error::{GramError, Result};
use gram_core::types::{
    CommentId, CommentPage, Post, PostId, Story, StoryId, User, UserId, UserSuggestion,
};
use gram_core::SocialApi;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeApi {
    pub users: Vec<User>,
    pub stories: Mutex<Vec<Story>>,
    pub posts: Vec<Post>,
    /// Artificial latency per search query
    pub search_delays: HashMap<String, Duration>,
    pub fail_stories: bool,
    pub fail_delete: bool,
    pub searches: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<StoryId>>,
}

pub fn user(id: UserId, name: &str) -> User {
    User {
        user_id: id,
        user_name: name.to_string(),
        user_email: None,
        user_fullname: Some(format!("{} full", name)),
        user_avatar: None,
        created_at: None,
    }
}

pub fn story(id: StoryId, user_id: UserId) -> Story {
    Story {
        story_id: id,
        user_id,
        user_name: format!("u{}", user_id),
        user_avatar: None,
        story_image: format!("/stories/{}.jpg", id),
        created_at: "2025-12-11T10:00:00Z".to_string(),
        expires_at: None,
    }
}

impl FakeApi {
    pub fn with_users(names: &[&str]) -> Self {
        Self {
            users: names
                .iter()
                .enumerate()
                .map(|(i, n)| user(i as UserId + 1, n))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_stories(stories: Vec<Story>) -> Self {
        Self {
            stories: Mutex::new(stories),
            ..Default::default()
        }
    }

    pub fn search_log(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

impl SocialApi for FakeApi {
    async fn search_users(&self, query: &str) -> Result<Vec<UserSuggestion>> {
        self.searches.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self
            .users
            .iter()
            .filter(|u| u.user_name.starts_with(query))
            .map(UserSuggestion::from)
            .collect())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.users
            .iter()
            .find(|u| u.user_name == username)
            .cloned()
            .ok_or_else(|| GramError::NotFound(username.to_string()))
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned()
            .ok_or_else(|| GramError::NotFound(user_id.to_string()))
    }

    async fn list_stories_for_user(&self, user_id: UserId) -> Result<Vec<Story>> {
        if self.fail_stories {
            return Err(GramError::Network("connection refused".to_string()));
        }
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        Ok(self.stories.lock().unwrap().clone())
    }

    async fn delete_story(&self, story_id: StoryId) -> Result<()> {
        if self.fail_delete {
            return Err(GramError::Http {
                status: 500,
                message: "boom".to_string(),
            });
        }
        self.stories.lock().unwrap().retain(|s| s.story_id != story_id);
        self.deleted.lock().unwrap().push(story_id);
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    async fn list_user_posts(&self, user_id: UserId) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, post_id: PostId) -> Result<Post> {
        self.posts
            .iter()
            .find(|p| p.post_id == post_id)
            .cloned()
            .ok_or_else(|| GramError::NotFound(post_id.to_string()))
    }

    async fn delete_post(&self, _post_id: PostId) -> Result<()> {
        Ok(())
    }

    async fn add_like(&self, _post_id: PostId) -> Result<()> {
        Ok(())
    }

    async fn remove_like(&self, _post_id: PostId) -> Result<()> {
        Ok(())
    }

    async fn list_comments(&self, _post_id: PostId) -> Result<CommentPage> {
        Ok(CommentPage::default())
    }

    async fn create_comment(&self, _post_id: PostId, _content: &str) -> Result<()> {
        Ok(())
    }

    async fn update_comment(&self, _comment_id: CommentId, _content: &str) -> Result<()> {
        Ok(())
    }

    async fn delete_comment(&self, _comment_id: CommentId) -> Result<()> {
        Ok(())
    }
}
