//! # Search Pipeline
//!
//! Debounced product search with a history of successful queries.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  set_query / select_category /      select_sort / apply_suggestion /   │
//! │  update_price_range / select_size   retry                              │
//! │           │                                   │                         │
//! │           ▼ Trigger::Debounced                ▼ Trigger::Now            │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ debounce task: each Debounced resets the deadline; the deadline  │  │
//! │  │ or a Now trigger runs execute() with the latest inputs           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │           │                                                             │
//! │           ▼ execute()                                                   │
//! │   nothing to search? ──► Success([]) , no request                      │
//! │   otherwise         ──► abort in-flight, Loading, GET api/search,      │
//! │                          refine locally, Success | Error               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each execution takes a new generation number. A response only publishes
//! if its generation is still current, so a superseded search can never
//! overwrite a newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::api::StorefrontApi;
use storefront_core::search::{SearchQuery, POPULAR_QUERY_KEYS};
use storefront_core::{LanguageTag, LoadState, Product, SearchFilters, SearchHistory, SortOption};

pub type SearchResults = LoadState<Vec<Product>>;

/// What the user has typed and picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInputs {
    pub query: String,
    pub filters: SearchFilters,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Debounced,
    Now,
}

// =============================================================================
// Shared state
// =============================================================================

struct SearchState {
    api: Arc<dyn StorefrontApi>,
    inputs_tx: watch::Sender<SearchInputs>,
    results_tx: watch::Sender<SearchResults>,
    history_tx: watch::Sender<SearchHistory>,
    generation: AtomicU64,
    in_flight: StdMutex<Option<JoinHandle<()>>>,
}

impl SearchState {
    fn in_flight(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute(self: &Arc<Self>) {
        // Bumping the generation and publishing happen under the in-flight
        // lock, the same lock a response holds while it checks and publishes.
        let mut slot = self.in_flight();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let inputs = self.inputs_tx.borrow().clone();
        let Some(request) = SearchQuery::from_input(&inputs.query, &inputs.filters) else {
            debug!("Empty search, skipping request");
            self.results_tx.send_replace(LoadState::Success(Vec::new()));
            return;
        };

        self.results_tx.send_replace(LoadState::Loading);

        let state = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            let outcome = state.api.search(&request).await;
            let _slot = state.in_flight();
            if state.generation.load(Ordering::SeqCst) != generation {
                debug!(generation, "Dropping superseded search response");
                return;
            }
            match outcome {
                Ok(products) => {
                    let refined = inputs.filters.refine(products);
                    debug!(results = refined.len(), "Search finished");
                    if let Some(q) = &request.q {
                        state.history_tx.send_modify(|h| h.record(q));
                    }
                    state.results_tx.send_replace(LoadState::Success(refined));
                }
                Err(e) => {
                    warn!(error = %e, "Search failed");
                    state.results_tx.send_replace(LoadState::Error(e.to_string()));
                }
            }
        }));
    }
}

/// Debounce loop. Ends when the pipeline drops its sender.
async fn run_debouncer(
    state: Arc<SearchState>,
    mut rx: mpsc::UnboundedReceiver<Trigger>,
    debounce: Duration,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            trigger = rx.recv() => match trigger {
                Some(Trigger::Debounced) => deadline = Some(Instant::now() + debounce),
                Some(Trigger::Now) => {
                    deadline = None;
                    state.execute();
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                state.execute();
            }
        }
    }

    if let Some(handle) = state.in_flight().take() {
        handle.abort();
    }
    debug!("Search debouncer stopped");
}

// =============================================================================
// SearchPipeline
// =============================================================================

pub struct SearchPipeline {
    state: Arc<SearchState>,
    trigger_tx: mpsc::UnboundedSender<Trigger>,
}

impl SearchPipeline {
    /// Spawns the debounce task. Must be called inside a tokio runtime.
    pub fn start(api: Arc<dyn StorefrontApi>, debounce: Duration) -> Self {
        let (inputs_tx, _) = watch::channel(SearchInputs::default());
        let (results_tx, _) = watch::channel(LoadState::Success(Vec::new()));
        let (history_tx, _) = watch::channel(SearchHistory::new());

        let state = Arc::new(SearchState {
            api,
            inputs_tx,
            results_tx,
            history_tx,
            generation: AtomicU64::new(0),
            in_flight: StdMutex::new(None),
        });

        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_debouncer(Arc::clone(&state), trigger_rx, debounce));

        SearchPipeline { state, trigger_tx }
    }

    fn trigger(&self, trigger: Trigger) {
        if self.trigger_tx.send(trigger).is_err() {
            warn!("Search debouncer is gone, input ignored");
        }
    }

    fn update(&self, f: impl FnOnce(&mut SearchInputs)) {
        self.state.inputs_tx.send_modify(f);
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn results(&self) -> SearchResults {
        self.state.results_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.state.results_tx.subscribe()
    }

    pub fn inputs(&self) -> SearchInputs {
        self.state.inputs_tx.borrow().clone()
    }

    pub fn subscribe_inputs(&self) -> watch::Receiver<SearchInputs> {
        self.state.inputs_tx.subscribe()
    }

    /// Most recent first.
    pub fn history(&self) -> Vec<String> {
        self.state.history_tx.borrow().entries()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<SearchHistory> {
        self.state.history_tx.subscribe()
    }

    /// Message keys of the suggestions shown before anything is typed.
    pub fn popular_queries(&self) -> &'static [&'static str] {
        &POPULAR_QUERY_KEYS
    }

    // =========================================================================
    // Debounced inputs
    // =========================================================================

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|i| i.query = query);
        self.trigger(Trigger::Debounced);
    }

    pub fn select_category(&self, category_id: Option<String>) {
        self.update(|i| i.filters = i.filters.with_category(category_id));
        self.trigger(Trigger::Debounced);
    }

    pub fn update_price_range(&self, min_price: Option<f64>, max_price: Option<f64>) {
        self.update(|i| i.filters = i.filters.with_price_range(min_price, max_price));
        self.trigger(Trigger::Debounced);
    }

    pub fn select_size(&self, size: Option<String>) {
        self.update(|i| i.filters = i.filters.with_size(size));
        self.trigger(Trigger::Debounced);
    }

    // =========================================================================
    // Immediate inputs
    // =========================================================================

    /// Re-sorts right away. Picking the active option does nothing.
    pub fn select_sort(&self, sort: SortOption) {
        if self.state.inputs_tx.borrow().filters.sort_option == sort {
            return;
        }
        self.update(|i| i.filters = i.filters.with_sort(sort));
        self.trigger(Trigger::Now);
    }

    /// Uses a history or suggestion entry as the query and searches now.
    pub fn apply_suggestion(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|i| i.query = query);
        self.trigger(Trigger::Now);
    }

    /// Re-runs the current inputs now.
    pub fn retry(&self) {
        self.trigger(Trigger::Now);
    }

    /// Results carry localized names, so a language change searches again.
    pub fn on_language_changed(&self) {
        self.retry();
    }

    pub fn clear_history(&self) {
        self.state.history_tx.send_modify(|h| h.clear());
    }

    pub fn spawn_language_listener(
        &self,
        mut rx: watch::Receiver<Option<LanguageTag>>,
    ) -> JoinHandle<()> {
        let trigger_tx = self.trigger_tx.downgrade();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(tx) = trigger_tx.upgrade() else { break };
                if tx.send(Trigger::Now).is_err() {
                    break;
                }
            }
            debug!("Search language listener stopped");
        })
    }
}
