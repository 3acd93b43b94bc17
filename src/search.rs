//! Debounced search-and-select.
//!
//! The selector is sans-IO: it never sleeps and never talks to the network.
//! Each handler runs to completion on one event (a keystroke, a timer fire,
//! a response) and tells the caller what to do next, either a
//! [`TimerToken`] to fire after [`DebouncedSearchSelector::debounce_delay`]
//! or a [`SearchRequest`] to send. [`crate::run_search`] wires it to `tokio`.
//!
//! Responses are never cancelled. Instead every response is checked against
//! the latest dispatched request, and anything older is dropped.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SelectorConfig;
use crate::endpoint::{
    Candidate, EndpointError, PageDirection, RequestId, SearchPage, SearchRequest,
};
use crate::selection::SelectionSet;
use crate::timer::{DebounceTimer, TimerToken};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchPhase {
    #[default]
    Idle,
    PendingDebounce,
    AwaitingResponse,
    HasResults,
}

/// What a timer fire amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// The token was cancelled or replaced by a newer keystroke.
    Superseded,
    /// The query is empty; results were cleared without a request.
    Cleared,
    /// The query was already dispatched and its first page is shown or on
    /// its way.
    Unchanged,
    Dispatch(SearchRequest),
}

/// What a search response amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    /// The response belongs to a request that is no longer the latest one.
    Stale,
    Failed(EndpointError),
}

/// The text side of a search field.
#[derive(Debug, Clone)]
pub struct QueryState {
    raw_text: String,
    last_dispatched: Option<String>,
    timer: DebounceTimer,
}

impl QueryState {
    fn new(delay: Duration) -> Self {
        Self {
            raw_text: String::new(),
            last_dispatched: None,
            timer: DebounceTimer::new(delay),
        }
    }

    /// What the user currently has in the field.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The query of the most recently dispatched search.
    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }

    pub const fn pending_timer(&self) -> Option<TimerToken> {
        self.timer.live()
    }

    fn clear(&mut self) {
        self.raw_text.clear();
        self.last_dispatched = None;
        self.timer.cancel();
    }
}

/// Search field plus the list of candidates the user picked from it.
#[derive(Debug, Clone)]
pub struct DebouncedSearchSelector {
    query: QueryState,
    next_request: u64,
    in_flight: Option<SearchRequest>,
    page: Option<SearchPage>,
    on_first_page: bool,
    has_next: bool,
    has_previous: bool,
    selection: SelectionSet,
}

impl Default for DebouncedSearchSelector {
    fn default() -> Self {
        Self::new(&SelectorConfig::default())
    }
}

impl DebouncedSearchSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            query: QueryState::new(config.debounce()),
            next_request: 0,
            in_flight: None,
            page: None,
            on_first_page: false,
            has_next: false,
            has_previous: false,
            selection: SelectionSet::new(),
        }
    }

    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    pub const fn debounce_delay(&self) -> Duration {
        self.query.timer.delay()
    }

    pub const fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The last page received, unfiltered.
    pub const fn page(&self) -> Option<&SearchPage> {
        self.page.as_ref()
    }

    pub const fn in_flight(&self) -> Option<&SearchRequest> {
        self.in_flight.as_ref()
    }

    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    pub const fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub const fn phase(&self) -> SearchPhase {
        if self.query.timer.is_pending() {
            SearchPhase::PendingDebounce
        } else if self.in_flight.is_some() {
            SearchPhase::AwaitingResponse
        } else if self.page.is_some() {
            SearchPhase::HasResults
        } else {
            SearchPhase::Idle
        }
    }

    /// Candidates to show: the fetched page minus anything whose label is
    /// already selected. The page itself is left as received.
    pub fn visible_candidates(&self) -> impl Iterator<Item = &Candidate> + '_ {
        self.page
            .iter()
            .flat_map(|page| page.candidates.iter())
            .filter(move |candidate| !self.selection.contains_label(&candidate.label))
    }

    /// Records the new field text and restarts the debounce.
    /// The returned token is the only one that can still fire.
    pub fn on_query_change(&mut self, text: impl Into<String>) -> TimerToken {
        self.query.raw_text = text.into();
        self.schedule_search()
    }

    /// Replaces the field text without searching, e.g. when the host
    /// pre-fills the box. Any pending fire is cancelled.
    pub fn sync_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.query.timer.cancel();
        self.query.last_dispatched = (!text.is_empty()).then(|| text.clone());
        self.query.raw_text = text;
        self.in_flight = None;
        self.clear_results();
    }

    fn schedule_search(&mut self) -> TimerToken {
        let token = self.query.timer.schedule();
        debug!(%token, query = %self.query.raw_text, "search scheduled");
        token
    }

    /// Handles the debounce timer firing.
    ///
    /// The live text is read now, not when the timer was scheduled. Every
    /// text change reschedules or cancels the timer, so a live token always
    /// fires for the text currently in the field.
    pub fn on_timer_fired(&mut self, token: TimerToken) -> FireOutcome {
        if !self.query.timer.fire(token) {
            debug!(%token, "superseded timer fire ignored");
            return FireOutcome::Superseded;
        }
        let text = self.query.raw_text.clone();
        if text.is_empty() {
            self.query.last_dispatched = None;
            self.in_flight = None;
            self.clear_results();
            return FireOutcome::Cleared;
        }
        // Only a first page counts: a fresh query starts over from page one
        let first_page_current = self
            .in_flight
            .as_ref()
            .map_or(self.page.is_some() && self.on_first_page, SearchRequest::is_fresh_query);
        if first_page_current && self.query.last_dispatched() == Some(text.as_str()) {
            debug!(query = %text, "query unchanged, search skipped");
            return FireOutcome::Unchanged;
        }
        FireOutcome::Dispatch(self.dispatch(text, None))
    }

    /// Asks for the neighbouring page of the current results, if the last
    /// page had a cursor in that direction.
    pub fn request_page(&mut self, direction: PageDirection) -> Option<SearchRequest> {
        let page = self.page.as_ref()?;
        let cursor = match direction {
            PageDirection::Next => page.next.clone()?,
            PageDirection::Previous => page.previous.clone()?,
        };
        let query = self.query.last_dispatched.clone()?;
        Some(self.dispatch(query, Some(cursor)))
    }

    fn dispatch(&mut self, query: String, cursor: Option<String>) -> SearchRequest {
        self.next_request += 1;
        let request = SearchRequest {
            id: RequestId(self.next_request),
            query: query.clone(),
            cursor,
        };
        debug!(id = %request.id, query = %request.query, cursor = ?request.cursor, "search dispatched");
        self.query.last_dispatched = Some(query);
        self.in_flight = Some(request.clone());
        request
    }

    /// Applies a response unless a newer request has been issued since.
    pub fn on_search_response(
        &mut self,
        request: &SearchRequest,
        result: Result<SearchPage, EndpointError>,
    ) -> ResponseOutcome {
        if !self.is_latest(request) {
            debug!(id = %request.id, query = %request.query, "stale search response dropped");
            return ResponseOutcome::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                self.has_next = page.has_next();
                // A fresh query always starts on the first page
                self.has_previous = !request.is_fresh_query() && page.has_previous();
                debug!(
                    id = %request.id,
                    candidates = page.candidates.len(),
                    has_next = self.has_next,
                    "search results applied"
                );
                self.page = Some(page);
                self.on_first_page = request.is_fresh_query();
                ResponseOutcome::Applied
            }
            Err(err) => {
                warn!(id = %request.id, query = %request.query, error = %err, "search failed");
                if request.is_fresh_query() {
                    // Retyping the same text should search again
                    self.query.last_dispatched = None;
                }
                ResponseOutcome::Failed(err)
            }
        }
    }

    fn is_latest(&self, request: &SearchRequest) -> bool {
        self.in_flight.as_ref().is_some_and(|latest| latest.id == request.id)
            && self.query.last_dispatched() == Some(request.query.as_str())
    }

    /// Moves `candidate` into the selection and resets the search box.
    /// Returns false if it was already selected.
    pub fn on_candidate_chosen(&mut self, candidate: Candidate) -> bool {
        let added = self.selection.insert(candidate);
        self.clear_search();
        added
    }

    /// Drops `candidate` from the selection. The fetched page is untouched.
    pub fn on_candidate_dismissed(&mut self, candidate: &Candidate) -> Option<Candidate> {
        self.selection.remove(candidate.id)
    }

    /// Replaces the selection wholesale, e.g. with a stored patient's
    /// restrictions.
    pub fn load_selection(&mut self, selection: SelectionSet) {
        self.selection = selection;
    }

    /// Empties the query and results. Responses still in flight become stale.
    pub fn clear_search(&mut self) {
        self.query.clear();
        self.in_flight = None;
        self.clear_results();
    }

    /// Back to a freshly mounted field, selection included.
    pub fn reset(&mut self) {
        self.clear_search();
        self.selection.clear();
    }

    fn clear_results(&mut self) {
        self.page = None;
        self.on_first_page = false;
        self.has_next = false;
        self.has_previous = false;
    }
}
