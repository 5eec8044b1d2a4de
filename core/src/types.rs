/// Shared wire types for the REST API
///
/// Field names follow the server's camelCase JSON.
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;
pub type StoryId = i64;
pub type CommentId = i64;

/// Full user record (profile lookups, login response)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_fullname: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One row of a user search; ordering is whatever the server returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSuggestion {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_fullname: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
}

impl From<&User> for UserSuggestion {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            user_fullname: user.user_fullname.clone(),
            user_avatar: user.user_avatar.clone(),
        }
    }
}

/// Ephemeral image post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: StoryId,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub story_image: String,
    pub created_at: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: PostId,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub post_image: String,
    #[serde(default)]
    pub post_caption: String,
    #[serde(default)]
    pub post_location: Option<String>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub comment_content: String,
    pub created_at: String,
}

/// Response of `GET /posts/{id}/comments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comment_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_email: String,
    pub user_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_name: String,
    pub user_email: String,
    pub user_password: String,
    pub user_fullname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
