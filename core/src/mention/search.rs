/// Runs mention searches off the input loop and reports back over a channel
use crate::api::SocialApi;
use crate::error::Result;
use crate::mention::input::SearchRequest;
use crate::types::UserSuggestion;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Finished search, tagged with the generation that asked for it
#[derive(Debug)]
pub struct SearchOutcome {
    pub generation: u64,
    pub result: Result<Vec<UserSuggestion>>,
}

pub struct SearchDispatcher<A: SocialApi> {
    api: Arc<A>,
    debounce: Duration,
    /// Generation of the newest dispatched request; 0 = none wanted
    latest: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<SearchOutcome>,
}

impl<A: SocialApi> SearchDispatcher<A> {
    pub fn new(api: Arc<A>, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            api,
            debounce,
            latest: Arc::new(AtomicU64::new(0)),
            tx,
        };
        (dispatcher, rx)
    }

    /// Start a search; any older in-flight search gives up at its next check.
    pub fn dispatch(&self, request: SearchRequest) -> JoinHandle<()> {
        self.latest.store(request.generation, Ordering::SeqCst);

        let api = self.api.clone();
        let latest = self.latest.clone();
        let tx = self.tx.clone();
        let debounce = self.debounce;

        tokio::spawn(async move {
            let SearchRequest { generation, query } = request;
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
                if latest.load(Ordering::SeqCst) != generation {
                    debug!("search {:?} superseded during debounce", query);
                    return;
                }
            }

            let result = api.search_users(&query).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!("search {:?} finished after being superseded", query);
                return;
            }
            let _ = tx.send(SearchOutcome { generation, result });
        })
    }

    /// Abandon every in-flight search (popup closed)
    pub fn cancel_all(&self) {
        self.latest.store(0, Ordering::SeqCst);
    }
}
