use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;

use crate::{
    error::ClientResult,
    models::{AccessToken, CatalogItem, Category, ItemId},
    services::{
        cancellation::{CancelScope, ScopeSlot, TaskHandle},
        providers::{AuthProvider, CatalogProvider},
    },
};

/// Liked identifiers and their hydrated details for one category
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LikedView {
    pub category: Category,
    /// A cycle for `category` is in flight
    pub loading: bool,
    /// Identifiers the auth service reports as liked, in server order
    pub ids: Vec<ItemId>,
    /// Details of every id whose lookup succeeded, in the same relative order
    pub items: Vec<CatalogItem>,
}

impl LikedView {
    fn empty(category: Category) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }

    pub fn contains(&self, category: Category, id: &ItemId) -> bool {
        self.category == category && self.ids.contains(id)
    }
}

/// Resolves `ids` into details in parallel, dropping failed lookups.
///
/// Completion order does not matter; the returned list follows `ids`.
pub async fn hydrate(
    catalog: &dyn CatalogProvider,
    category: Category,
    ids: &[ItemId],
) -> Vec<CatalogItem> {
    let lookups = ids.iter().map(|id| catalog.fetch_by_id(category, id));
    let results = join_all(lookups).await;

    let mut items = Vec::with_capacity(ids.len());
    let mut failed = 0usize;

    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(item) => items.push(item),
            Err(e) => {
                failed += 1;
                tracing::warn!(id = %id, category = %category.path_segment(), error = %e, "Detail lookup failed; dropping item");
            }
        }
    }

    if failed > 0 {
        tracing::warn!(
            success_count = items.len(),
            error_count = failed,
            "Partial hydration failure"
        );
    }

    items
}

/// Keeps the liked list of the active (token, category) pair in sync.
///
/// Phase 1 pulls the liked ids from the auth service, phase 2 hydrates every
/// id against the catalog in parallel. The finished list replaces the view
/// in one update; a newer cycle cancels the older one before it can write.
#[derive(Clone)]
pub struct LikedSetSynchronizer {
    auth: Arc<dyn AuthProvider>,
    catalog: Arc<dyn CatalogProvider>,
    slot: Arc<ScopeSlot>,
    parent: CancelScope,
    view: Arc<watch::Sender<LikedView>>,
}

impl LikedSetSynchronizer {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        catalog: Arc<dyn CatalogProvider>,
        parent: &CancelScope,
    ) -> Self {
        let (view, _) = watch::channel(LikedView::default());
        Self {
            auth,
            catalog,
            slot: Arc::new(ScopeSlot::new(parent)),
            parent: parent.clone(),
            view: Arc::new(view),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LikedView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> LikedView {
        self.view.borrow().clone()
    }

    pub fn is_liked(&self, category: Category, id: &ItemId) -> bool {
        self.view.borrow().contains(category, id)
    }

    /// Starts a sync cycle, cancelling the previous one first.
    ///
    /// Without a token nothing is requested and the list is simply empty.
    pub fn sync(&self, token: Option<AccessToken>, category: Category) -> TaskHandle {
        let scope = self.slot.renew();

        let Some(token) = token else {
            tracing::debug!(category = %category.path_segment(), "No session; liked list skipped");
            scope.publish(&self.view, LikedView::empty(category));
            return TaskHandle::completed(scope);
        };

        scope.publish(
            &self.view,
            LikedView {
                loading: true,
                ..LikedView::empty(category)
            },
        );

        let auth = self.auth.clone();
        let catalog = self.catalog.clone();
        let view = self.view.clone();
        let cycle = scope.clone();

        TaskHandle::spawn(scope, async move {
            tracing::debug!(scope = %cycle.id(), category = %category.path_segment(), "Liked sync started");

            let outcome = cycle
                .run(Self::pull_and_hydrate(
                    auth.as_ref(),
                    catalog.as_ref(),
                    &token,
                    category,
                ))
                .await;

            match outcome {
                Ok((ids, items)) => {
                    tracing::info!(
                        scope = %cycle.id(),
                        category = %category.path_segment(),
                        liked = ids.len(),
                        hydrated = items.len(),
                        "Liked sync completed"
                    );
                    cycle.publish(
                        &view,
                        LikedView {
                            category,
                            loading: false,
                            ids,
                            items,
                        },
                    );
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(scope = %cycle.id(), "Liked sync cancelled");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Liked sync failed");
                    cycle.publish(&view, LikedView::empty(category));
                }
            }
        })
    }

    async fn pull_and_hydrate(
        auth: &dyn AuthProvider,
        catalog: &dyn CatalogProvider,
        token: &AccessToken,
        category: Category,
    ) -> ClientResult<(Vec<ItemId>, Vec<CatalogItem>)> {
        let ids = match auth.pull_liked(token, category).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, category = %category.path_segment(), "Liked pull failed");
                return Ok((Vec::new(), Vec::new()));
            }
        };

        if ids.is_empty() {
            return Ok((ids, Vec::new()));
        }

        let items = hydrate(catalog, category, &ids).await;
        Ok((ids, items))
    }

    /// Re-runs the sync on every token or category change until `parent`
    /// (or the returned handle) is cancelled
    pub fn drive(
        &self,
        mut token: watch::Receiver<Option<AccessToken>>,
        mut category: watch::Receiver<Category>,
    ) -> TaskHandle {
        let scope = self.parent.child();
        let driver_scope = scope.clone();
        let this = self.clone();

        TaskHandle::spawn(scope, async move {
            loop {
                let current_token = token.borrow_and_update().clone();
                let current_category = *category.borrow_and_update();
                this.sync(current_token, current_category);

                tokio::select! {
                    _ = driver_scope.cancelled() => break,
                    changed = token.changed() => if changed.is_err() { break },
                    changed = category.changed() => if changed.is_err() { break },
                }
            }

            this.slot.cancel();
        })
    }

    /// Applies a confirmed like/dislike to the current view.
    ///
    /// A like hydrates the new id first, so ids and items change together
    /// in one wholesale replacement; a dislike drops both.
    pub async fn apply_confirmed(&self, category: Category, id: &ItemId, liked: bool) {
        let same_category = self.view.borrow().category == category;
        let hydrated = if liked && same_category {
            hydrate(self.catalog.as_ref(), category, std::slice::from_ref(id)).await
        } else {
            Vec::new()
        };

        self.view.send_if_modified(|current| {
            if current.category != category {
                return false;
            }

            let present = current.ids.contains(id);
            if liked == present {
                return false;
            }

            let mut next = current.clone();
            if liked {
                next.ids.push(id.clone());
                next.items.extend(hydrated);
            } else {
                next.ids.retain(|existing| existing != id);
                next.items
                    .retain(|item| item.item_id(category) != Some(id));
            }
            *current = next;
            true
        });
    }
}
