/// Session persistence: auth token, signed-in user, recent searches
///
/// Stored in a small sled DB under the data dir; one JSON value per key.
use crate::error::{GramError, Result};
use crate::types::{User, UserId, UserSuggestion};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SESSION_KEY: &[u8] = b"session";
const RECENT_KEY: &[u8] = b"recent_searches";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.user_id)
    }
}

pub struct SessionStore {
    db: sled::Db,
    recent_limit: usize,
}

impl SessionStore {
    pub fn open(data_dir: &Path, recent_limit: usize) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db = sled::open(data_dir.join("session.db"))
            .map_err(|e| GramError::Storage(format!("session DB: {}", e)))?;
        Ok(Self { db, recent_limit })
    }

    /// Stored session, or an empty one
    pub fn load(&self) -> Result<Session> {
        match self.db.get(SESSION_KEY)? {
            Some(val) => Ok(serde_json::from_slice(&val)?),
            None => Ok(Session::default()),
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let val = serde_json::to_vec(session)?;
        self.db.insert(SESSION_KEY, val)?;
        self.db.flush()?;
        Ok(())
    }

    /// Forget token and user (logout, or the server rejected the token)
    pub fn clear(&self) -> Result<()> {
        self.db.remove(SESSION_KEY)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn recent(&self) -> Result<Vec<UserSuggestion>> {
        match self.db.get(RECENT_KEY)? {
            Some(val) => Ok(serde_json::from_slice(&val)?),
            None => Ok(Vec::new()),
        }
    }

    /// Move `user` to the front, dropping older duplicates and the overflow.
    pub fn push_recent(&self, user: UserSuggestion) -> Result<Vec<UserSuggestion>> {
        let mut list = self.recent()?;
        list.retain(|u| u.user_id != user.user_id);
        list.insert(0, user);
        list.truncate(self.recent_limit);
        self.write_recent(&list)?;
        Ok(list)
    }

    pub fn remove_recent(&self, user_id: UserId) -> Result<Vec<UserSuggestion>> {
        let mut list = self.recent()?;
        list.retain(|u| u.user_id != user_id);
        self.write_recent(&list)?;
        Ok(list)
    }

    fn write_recent(&self, list: &[UserSuggestion]) -> Result<()> {
        let val = serde_json::to_vec(list)?;
        self.db.insert(RECENT_KEY, val)?;
        self.db.flush()?;
        Ok(())
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            recent_limit: self.recent_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> UserSuggestion {
        UserSuggestion {
            user_id: id,
            user_name: name.to_string(),
            user_fullname: None,
            user_avatar: None,
        }
    }

    #[test]
    fn session_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SessionStore::open(dir.path(), 10).unwrap();
            assert!(!store.load().unwrap().is_authenticated());
            store
                .save(&Session {
                    token: Some("jwt".into()),
                    user: Some(User {
                        user_id: 5,
                        user_name: "kim".into(),
                        user_email: None,
                        user_fullname: None,
                        user_avatar: None,
                        created_at: None,
                    }),
                })
                .unwrap();
        }
        let store = SessionStore::open(dir.path(), 10).unwrap();
        let session = store.load().unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(5));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), Session::default());
    }

    #[test]
    fn recent_searches_dedupe_and_cap() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path(), 3).unwrap();
        store.push_recent(user(1, "a")).unwrap();
        store.push_recent(user(2, "b")).unwrap();
        store.push_recent(user(3, "c")).unwrap();
        let list = store.push_recent(user(1, "a")).unwrap();
        let ids: Vec<_> = list.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![1, 3, 2]);

        let list = store.push_recent(user(4, "d")).unwrap();
        let ids: Vec<_> = list.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![4, 1, 3]);

        let list = store.remove_recent(1).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(store.recent().unwrap(), list);
    }
}
