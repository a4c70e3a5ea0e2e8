use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::{SemiPersistentTerm, TermStore};
use crate::hn_client::{search_url, FetchError, SearchProvider};
use crate::models::Story;
use crate::stories::{stories_reducer, sum_comments, StoriesAction, StoriesState};

type FetchResult = Result<Vec<Story>, FetchError>;

/// Owns the search term and the story list, and drives fetches through a
/// [`SearchProvider`].
///
/// Fetches run on worker threads and report back over a channel. Nothing is
/// cancelled or de-duplicated: every completion is applied in the order it
/// arrives, so when two searches overlap the one that finishes last wins.
pub struct StoryListController<S: TermStore> {
    provider: Arc<dyn SearchProvider>,
    endpoint: String,
    search_term: SemiPersistentTerm<S>,
    url: String,
    stories: StoriesState,
    results_tx: Sender<FetchResult>,
    results_rx: Receiver<FetchResult>,
    in_flight: usize,
    // (revision, total)
    comment_total: Cell<Option<(u64, u64)>>,
}

impl<S: TermStore> StoryListController<S> {
    pub fn new(provider: Arc<dyn SearchProvider>, store: S, config: &AppConfig) -> Self {
        let search_term = SemiPersistentTerm::load(store, &config.storage_key, &config.default_term);
        let url = search_url(&config.api_endpoint, search_term.value());
        let (results_tx, results_rx) = mpsc::channel();

        Self {
            provider,
            endpoint: config.api_endpoint.clone(),
            search_term,
            url,
            stories: StoriesState::new(),
            results_tx,
            results_rx,
            in_flight: 0,
            comment_total: Cell::new(None),
        }
    }

    pub fn search_term(&self) -> &str {
        self.search_term.value()
    }

    /// The URL of the last submitted search (or the initial one).
    pub fn submitted_url(&self) -> &str {
        &self.url
    }

    pub fn stories(&self) -> &StoriesState {
        &self.stories
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn can_submit(&self) -> bool {
        !self.search_term.value().is_empty()
    }

    pub fn update_draft_term(&mut self, text: &str) {
        self.search_term.set(text);
    }

    pub fn submit_search(&mut self) {
        self.url = search_url(&self.endpoint, self.search_term.value());
        self.fetch_stories();
    }

    /// Starts one fetch for the current submitted URL.
    pub fn fetch_stories(&mut self) {
        info!(url = %self.url, "Searching stories");
        self.dispatch(StoriesAction::FetchInit);

        let provider = Arc::clone(&self.provider);
        let url = self.url.clone();
        let tx = self.results_tx.clone();

        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| provider.search(&url)))
                .unwrap_or_else(|_| Err(FetchError::Transport("search worker panicked".to_string())));
            let _ = tx.send(result);
        });

        self.in_flight += 1;
    }

    /// Applies every fetch that has completed since the last call, without
    /// blocking. Returns true if anything was applied.
    pub fn poll_fetches(&mut self) -> bool {
        let mut changed = false;

        while self.in_flight > 0 {
            match self.results_rx.try_recv() {
                Ok(result) => {
                    self.apply_result(result);
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                // We hold a sender ourselves, so this cannot happen
                Err(TryRecvError::Disconnected) => break,
            }
        }

        changed
    }

    /// Blocks until every in-flight fetch has completed and been applied.
    pub fn wait_for_fetches(&mut self) {
        while self.in_flight > 0 {
            match self.results_rx.recv() {
                Ok(result) => self.apply_result(result),
                Err(_) => break,
            }
        }
    }

    pub fn remove_story(&mut self, id: &str) {
        self.dispatch(StoriesAction::RemoveStory(id.to_string()));
    }

    /// Total comment count over the current stories, recomputed only when the
    /// story list changes.
    pub fn comment_total(&self) -> u64 {
        let revision = self.stories.revision();
        if let Some((cached_revision, total)) = self.comment_total.get() {
            if cached_revision == revision {
                return total;
            }
        }

        let total = sum_comments(&self.stories.data);
        self.comment_total.set(Some((revision, total)));
        total
    }

    fn apply_result(&mut self, result: FetchResult) {
        self.in_flight -= 1;

        match result {
            Ok(stories) => {
                info!("Received {} stories", stories.len());
                self.dispatch(StoriesAction::FetchSuccess(stories));
            }
            Err(e) => {
                warn!("Story search failed: {}", e);
                self.dispatch(StoriesAction::FetchFailure);
            }
        }
    }

    fn dispatch(&mut self, action: StoriesAction) {
        self.stories = stories_reducer(std::mem::take(&mut self.stories), action);
    }
}
