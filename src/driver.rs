//! Runs a [`DebouncedSearchSelector`] against a live [`SearchEndpoint`].
//!
//! Everything happens on the calling task: keystrokes arrive over a channel,
//! the debounce is a `tokio::time` deadline, and requests in flight sit in a
//! `FuturesUnordered` so their responses come back in arrival order. The
//! display side follows along through a [`watch`] channel of [`SearchView`]s.

use std::future::Future;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::debug;

use crate::endpoint::{
    Candidate, EndpointError, PageDirection, SearchEndpoint, SearchPage, SearchRequest,
};
use crate::search::{DebouncedSearchSelector, FireOutcome, SearchPhase};
use crate::selection::SelectionSet;
use crate::timer::TimerToken;

/// Input from the host form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    QueryChanged(String),
    CandidateChosen(Candidate),
    CandidateDismissed(Candidate),
    Page(PageDirection),
}

/// What the host renders: a snapshot of the selector taken after each event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub query: String,
    pub phase: SearchPhase,
    /// Results with already selected candidates filtered out.
    pub candidates: Vec<Candidate>,
    pub selection: SelectionSet,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<&DebouncedSearchSelector> for SearchView {
    fn from(selector: &DebouncedSearchSelector) -> Self {
        Self {
            query: selector.query().raw_text().to_owned(),
            phase: selector.phase(),
            candidates: selector.visible_candidates().cloned().collect(),
            selection: selector.selection().clone(),
            has_next: selector.has_next(),
            has_previous: selector.has_previous(),
        }
    }
}

/// Drives `selector` until `events` closes, which is treated as the form
/// unmounting: the pending timer and any responses still in flight are dropped.
///
/// `view` receives a fresh [`SearchView`] whenever the selector's visible
/// state changes; receivers are only woken for actual changes.
pub async fn run_search<E: SearchEndpoint>(
    selector: &mut DebouncedSearchSelector,
    endpoint: &E,
    mut events: mpsc::UnboundedReceiver<SearchEvent>,
    view: &watch::Sender<SearchView>,
) {
    let mut in_flight = FuturesUnordered::new();
    let mut deadline: Option<(TimerToken, Instant)> = None;
    publish(view, selector);

    loop {
        let timer = async move {
            match deadline {
                Some((token, at)) => {
                    time::sleep_until(at).await;
                    token
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!(dropped = in_flight.len(), "search events closed");
                    break;
                };
                match event {
                    SearchEvent::QueryChanged(text) => {
                        let token = selector.on_query_change(text);
                        deadline = Some((token, Instant::now() + selector.debounce_delay()));
                    }
                    SearchEvent::CandidateChosen(candidate) => {
                        selector.on_candidate_chosen(candidate);
                        deadline = None;
                    }
                    SearchEvent::CandidateDismissed(candidate) => {
                        selector.on_candidate_dismissed(&candidate);
                    }
                    SearchEvent::Page(direction) => {
                        if let Some(request) = selector.request_page(direction) {
                            in_flight.push(send(endpoint, request));
                        }
                    }
                }
            }
            token = timer => {
                deadline = None;
                if let FireOutcome::Dispatch(request) = selector.on_timer_fired(token) {
                    in_flight.push(send(endpoint, request));
                }
            }
            Some((request, result)) = in_flight.next(), if !in_flight.is_empty() => {
                selector.on_search_response(&request, result);
            }
        }
        publish(view, selector);
    }
}

fn publish(view: &watch::Sender<SearchView>, selector: &DebouncedSearchSelector) {
    let next = SearchView::from(selector);
    view.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

fn send<E: SearchEndpoint>(
    endpoint: &E,
    request: SearchRequest,
) -> impl Future<Output = (SearchRequest, Result<SearchPage, EndpointError>)> {
    async move {
        let result = endpoint.search(&request).await;
        (request, result)
    }
}
