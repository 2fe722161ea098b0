use serde::Serialize;
use std::time::Duration;
use tokio::task::AbortHandle;

use crate::models::{is_known_genre, MediaItem};

/// Rotating status copy shown while a search is in flight, cycled in order
/// and restarted from the first entry on every new load.
pub const LOADING_MESSAGES: [&str; 8] = [
    "Dimming the lights...",
    "Popping the popcorn...",
    "Scanning the global archives...",
    "Consulting the critics...",
    "Finding official high-res posters...",
    "Verifying direct streaming links...",
    "Almost showtime...",
    "Finalizing your personalized watchlist...",
];

pub const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

/// User-facing copy for provider and response-shape failures. The underlying
/// cause is logged for diagnostics, never shown.
pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to fetch recommendations. Please check your connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Per-session interaction state: the draft inputs, the search state
/// machine, and the orthogonal detail selection.
///
/// Results live only here; each search wholly replaces the previous list and
/// everything is discarded with the session.
#[derive(Debug)]
pub struct SearchSession {
    pub query: String,
    /// Unique, insertion-ordered; only vocabulary tags are accepted.
    pub selected_genres: Vec<String>,
    pub phase: SearchPhase,
    pub results: Vec<MediaItem>,
    pub error: Option<String>,
    /// Id of the item open in the detail overlay, if any.
    pub selected: Option<String>,
    /// Bumped on every accepted submit; an in-flight completion must present
    /// the matching generation before it may write.
    pub generation: u64,
    pub loading_message_ix: usize,
    /// Unix seconds of the last API touch, for idle pruning.
    pub last_touched: i64,
    /// Rotation task for the loading messages; aborted on every loading exit
    /// path, including session drop.
    pub ticker: Option<AbortHandle>,
}

impl SearchSession {
    pub fn new(now: i64) -> Self {
        Self {
            query: String::new(),
            selected_genres: Vec::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            error: None,
            selected: None,
            generation: 0,
            loading_message_ix: 0,
            last_touched: now,
            ticker: None,
        }
    }

    /// Draft edits are allowed in any phase; they only affect the next
    /// submission.
    pub fn set_query(&mut self, text: String) {
        self.query = text;
    }

    /// Toggle one vocabulary tag; returns false for tags outside the fixed
    /// vocabulary. Toggling twice restores the previous selection.
    pub fn toggle_genre(&mut self, genre: &str) -> bool {
        if !is_known_genre(genre) {
            return false;
        }
        if let Some(pos) = self.selected_genres.iter().position(|g| g == genre) {
            self.selected_genres.remove(pos);
        } else {
            self.selected_genres.push(genre.to_string());
        }
        true
    }

    pub fn clear_genres(&mut self) {
        self.selected_genres.clear();
    }

    /// Submit precondition: something to search for, and no request already
    /// in flight. A failing precondition makes submit inert, not an error.
    pub fn can_submit(&self) -> bool {
        self.phase != SearchPhase::Loading
            && (!self.query.is_empty() || !self.selected_genres.is_empty())
    }

    /// Enter loading: prior results, error and selection are dropped, the
    /// message rotation restarts, and a fresh generation is handed to the
    /// caller to guard the completion.
    pub fn begin_loading(&mut self) -> u64 {
        self.phase = SearchPhase::Loading;
        self.results.clear();
        self.error = None;
        self.selected = None;
        self.loading_message_ix = 0;
        self.generation += 1;
        self.generation
    }

    pub fn finish_success(&mut self, items: Vec<MediaItem>) {
        self.results = items;
        self.phase = SearchPhase::Success;
        self.stop_ticker();
    }

    pub fn finish_error(&mut self, message: String) {
        self.results.clear();
        self.error = Some(message);
        self.phase = SearchPhase::Error;
        self.stop_ticker();
    }

    pub fn advance_loading_message(&mut self) {
        self.loading_message_ix = (self.loading_message_ix + 1) % LOADING_MESSAGES.len();
    }

    pub fn loading_message(&self) -> Option<&'static str> {
        (self.phase == SearchPhase::Loading).then(|| LOADING_MESSAGES[self.loading_message_ix])
    }

    /// Open the detail overlay; only ids from the current result list are
    /// accepted.
    pub fn select(&mut self, item_id: &str) -> bool {
        if self.results.iter().any(|item| item.id == item_id) {
            self.selected = Some(item_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        let id = self.selected.as_deref()?;
        self.results.iter().find(|item| item.id == id)
    }

    pub fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            query: self.query.clone(),
            selected_genres: self.selected_genres.clone(),
            loading_message: self.loading_message(),
            results: self.results.clone(),
            error: self.error.clone(),
            selected: self.selected.clone(),
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

/// Snapshot handed to the view layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SearchPhase,
    pub query: String,
    pub selected_genres: Vec<String>,
    pub loading_message: Option<&'static str>,
    pub results: Vec<MediaItem>,
    pub error: Option<String>,
    pub selected: Option<String>,
}
