/// REST client for the social API over plain HTTP/1
///
/// Endpoints (relative to `api_base_url`):
///   POST   /auth/login | /auth/signup
///   GET    /users/search?q=   /users/username/:name   /users/userId/:id
///   GET    /stories           /stories/user/:userId   DELETE /stories/:id
///   GET    /posts             /posts/userId/:id       /posts/postId/:id
///   DELETE /posts/:id         POST|DELETE /posts/:id/like
///   GET|POST /posts/:id/comments   PUT|DELETE /comments/:id
use crate::api::SocialApi;
use crate::config::Config;
use crate::error::{GramError, Result};
use crate::session::{Session, SessionStore};
use crate::types::{
    CommentId, CommentPage, LoginRequest, LoginResponse, Post, PostId, SignupRequest, Story,
    StoryId, User, UserId, UserSuggestion,
};
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

pub struct HttpApi {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
    timeout: Duration,
    session: RwLock<Session>,
    store: Option<SessionStore>,
}

impl HttpApi {
    /// Build a client; the stored session (if any) provides the bearer token.
    pub fn new(config: &Config, store: Option<SessionStore>) -> Result<Self> {
        let session = match &store {
            Some(s) => s.load()?,
            None => Session::default(),
        };
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            base: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            session: RwLock::new(session),
            store,
        })
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let req = LoginRequest {
            user_email: email.to_string(),
            user_password: password.to_string(),
        };
        let bytes = self.send_json(Method::POST, "/auth/login", &req).await?;
        let resp: LoginResponse = serde_json::from_slice(&bytes)?;

        let session = Session {
            token: Some(resp.token),
            user: Some(resp.user.clone()),
        };
        if let Some(store) = &self.store {
            store.save(&session)?;
        }
        *self.session.write().await = session;
        Ok(resp.user)
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<()> {
        self.send_json(Method::POST, "/auth/signup", req).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        *self.session.write().await = Session::default();
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let bytes = self.request(Method::GET, path, None).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<Bytes> {
        let payload = serde_json::to_vec(body)?;
        self.request(method, path, Some((JSON, payload))).await
    }

    async fn send_text(&self, method: Method, path: &str, text: &str) -> Result<()> {
        self.request(method, path, Some((TEXT, text.as_bytes().to_vec())))
            .await?;
        Ok(())
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.request(method, path, None).await?;
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<(&'static str, Vec<u8>)>,
    ) -> Result<Bytes> {
        let uri = format!("{}{}", self.base, path);
        let token = self.session.read().await.token.clone();

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(&uri)
            .header(header::ACCEPT, JSON);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some((content_type, bytes)) => {
                builder = builder.header(header::CONTENT_TYPE, content_type);
                Full::new(Bytes::from(bytes))
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder
            .body(body)
            .map_err(|e| GramError::InvalidInput(format!("{} {}: {}", method, uri, e)))?;

        debug!("{} {}", method, uri);
        let resp = tokio::time::timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| GramError::Timeout(format!("{} {}", method, uri)))?
            .map_err(|e| GramError::Network(e.to_string()))?;

        let status = resp.status();
        let bytes = tokio::time::timeout(self.timeout, resp.into_body().collect())
            .await
            .map_err(|_| GramError::Timeout(format!("reading {} {}", method, uri)))?
            .map_err(|e| GramError::Network(e.to_string()))?
            .to_bytes();

        match status {
            s if s.is_success() => Ok(bytes),
            StatusCode::UNAUTHORIZED => {
                warn!("{} {} rejected the session; signing out", method, uri);
                if let Err(e) = self.logout().await {
                    warn!("could not clear stored session: {}", e);
                }
                Err(GramError::Unauthorized)
            }
            StatusCode::NOT_FOUND => Err(GramError::NotFound(path.to_string())),
            s => Err(GramError::Http {
                status: s.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            }),
        }
    }
}

impl SocialApi for HttpApi {
    async fn search_users(&self, query: &str) -> Result<Vec<UserSuggestion>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.get_json(&format!("/users/search?q={}", urlencoding::encode(query)))
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.get_json(&format!("/users/username/{}", urlencoding::encode(username)))
            .await
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.get_json(&format!("/users/userId/{}", user_id)).await
    }

    async fn list_stories_for_user(&self, user_id: UserId) -> Result<Vec<Story>> {
        self.get_json(&format!("/stories/user/{}", user_id)).await
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        self.get_json("/stories").await
    }

    async fn delete_story(&self, story_id: StoryId) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/stories/{}", story_id))
            .await
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.get_json("/posts").await
    }

    async fn list_user_posts(&self, user_id: UserId) -> Result<Vec<Post>> {
        self.get_json(&format!("/posts/userId/{}", user_id)).await
    }

    async fn get_post(&self, post_id: PostId) -> Result<Post> {
        self.get_json(&format!("/posts/postId/{}", post_id)).await
    }

    async fn delete_post(&self, post_id: PostId) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/posts/{}", post_id))
            .await
    }

    async fn add_like(&self, post_id: PostId) -> Result<()> {
        self.send_empty(Method::POST, &format!("/posts/{}/like", post_id))
            .await
    }

    async fn remove_like(&self, post_id: PostId) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/posts/{}/like", post_id))
            .await
    }

    async fn list_comments(&self, post_id: PostId) -> Result<CommentPage> {
        self.get_json(&format!("/posts/{}/comments", post_id)).await
    }

    async fn create_comment(&self, post_id: PostId, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(GramError::InvalidInput("comment is empty".to_string()));
        }
        self.send_text(Method::POST, &format!("/posts/{}/comments", post_id), content)
            .await
    }

    async fn update_comment(&self, comment_id: CommentId, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(GramError::InvalidInput("comment is empty".to_string()));
        }
        self.send_text(Method::PUT, &format!("/comments/{}", comment_id), content)
            .await
    }

    async fn delete_comment(&self, comment_id: CommentId) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/comments/{}", comment_id))
            .await
    }
}
