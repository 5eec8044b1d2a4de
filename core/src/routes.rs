/// Client-side routes and the navigation seam
use crate::types::{PostId, UserId};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Feed,
    UserFeed(UserId),
    StoryDetail(UserId),
    PostDetail(PostId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Feed => "/feed".to_string(),
            Route::UserFeed(id) => format!("/user/feed/{}", id),
            Route::StoryDetail(id) => format!("/story/detail/{}", id),
            Route::PostDetail(id) => format!("/post/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receives route changes requested by the core (profile jumps, exits)
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Navigator that just records where it was sent; used by the terminal
/// client to decide what to show next.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub history: Vec<Route>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<&Route> {
        self.history.last()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: Route) {
        tracing::debug!("navigate -> {}", route);
        self.history.push(route);
    }
}
