use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::{
    models::{CatalogItem, Category},
    services::{
        cancellation::{CancelScope, ScopeSlot, TaskHandle},
        debounce::{QueryDebouncer, Settled},
        providers::CatalogProvider,
    },
};

/// View state of the single-item title search
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// No query
    #[default]
    Empty,
    /// Request in flight; prior result and error are already cleared
    Loading { query: String, category: Category },
    /// The decoded item
    Found(CatalogItem),
    /// Human-readable failure message
    Failed(String),
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }
}

/// Resolves one settled title query against the active category's catalog.
///
/// Each call supersedes the previous one: its scope is cancelled before the
/// new request starts, so a slower stale response never reaches the view.
#[derive(Clone)]
pub struct SearchFetcher {
    catalog: Arc<dyn CatalogProvider>,
    slot: Arc<ScopeSlot>,
    view: Arc<watch::Sender<SearchState>>,
}

impl SearchFetcher {
    pub fn new(catalog: Arc<dyn CatalogProvider>, parent: &CancelScope) -> Self {
        let (view, _) = watch::channel(SearchState::Empty);
        Self {
            catalog,
            slot: Arc::new(ScopeSlot::new(parent)),
            view: Arc::new(view),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.view.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.view.borrow().clone()
    }

    /// Cancels any live search and resets to `Empty`
    pub fn clear(&self) {
        let scope = self.slot.renew();
        scope.publish(&self.view, SearchState::Empty);
    }

    /// Starts a search cycle for `query` in `category`
    pub fn search(&self, query: &str, category: Category) -> TaskHandle {
        let scope = self.slot.renew();
        let query = query.trim().to_string();

        if query.is_empty() {
            scope.publish(&self.view, SearchState::Empty);
            return TaskHandle::completed(scope);
        }

        scope.publish(
            &self.view,
            SearchState::Loading {
                query: query.clone(),
                category,
            },
        );

        let catalog = self.catalog.clone();
        let view = self.view.clone();
        let cycle = scope.clone();

        TaskHandle::spawn(scope, async move {
            let outcome = cycle
                .run(catalog.search_by_title(category, &query))
                .await;

            let next = match outcome {
                Ok(item) => SearchState::Found(item),
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(query = %query, scope = %cycle.id(), "Search cancelled");
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        query = %query,
                        category = %category.path_segment(),
                        error = %e,
                        "Title search failed"
                    );
                    SearchState::Failed(e.user_message())
                }
            };

            cycle.publish(&view, next);
        })
    }

    /// Runs one search to completion and returns the resulting state
    pub async fn resolve(&self, query: &str, category: Category) -> SearchState {
        self.search(query, category).finished().await;
        self.state()
    }
}

/// Wires a debouncer to a fetcher for the currently selected category.
///
/// A category change re-issues the last settled query under a fresh scope.
pub struct SearchSession {
    debouncer: QueryDebouncer,
    handle: TaskHandle,
}

impl SearchSession {
    pub fn spawn(
        fetcher: SearchFetcher,
        quiet: Duration,
        mut category: watch::Receiver<Category>,
        parent: &CancelScope,
    ) -> Self {
        let scope = parent.child();
        let (debouncer, mut settled) = QueryDebouncer::spawn(quiet, &scope);
        let task_scope = scope.clone();

        let handle = TaskHandle::spawn(scope, async move {
            let mut last_query: Option<String> = None;
            let mut follow_category = true;

            loop {
                tokio::select! {
                    _ = task_scope.cancelled() => break,
                    next = settled.recv() => match next {
                        Some(Settled::Query(query)) => {
                            let active = *category.borrow_and_update();
                            fetcher.search(&query, active);
                            last_query = Some(query);
                        }
                        Some(Settled::Cleared) => {
                            last_query = None;
                            fetcher.clear();
                        }
                        None => break,
                    },
                    changed = category.changed(), if follow_category => {
                        if changed.is_err() {
                            follow_category = false;
                            continue;
                        }
                        let active = *category.borrow_and_update();
                        match &last_query {
                            Some(query) => {
                                fetcher.search(query, active);
                            }
                            None => fetcher.clear(),
                        }
                    }
                }
            }

            fetcher.slot.cancel();
        });

        Self { debouncer, handle }
    }

    /// Feeds the full current input value
    pub fn input(&self, raw: impl Into<String>) {
        self.debouncer.input(raw);
    }

    pub fn shutdown(&self) {
        self.debouncer.shutdown();
        self.handle.cancel();
    }
}
