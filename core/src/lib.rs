/// gram - client core for a photo-sharing social network
///
/// Mention parsing and autocomplete, the story player, the typed REST
/// client, and session persistence. The terminal client in `main.rs`
/// drives all of it.

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod http;
pub mod mention;
pub mod routes;
pub mod session;
pub mod story;
pub mod types;

pub use api::SocialApi;
pub use config::Config;
pub use error::{GramError, Result};
pub use http::HttpApi;
pub use routes::{Navigator, Route};
pub use session::{Session, SessionStore};
