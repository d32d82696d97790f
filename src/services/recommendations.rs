use std::sync::Arc;

use futures::future::join_all;

use crate::{
    error::ClientResult,
    models::{
        CatalogItem, Category, EventKind, FeedbackRequest, HealthStatus, HomeFeed, ItemId,
        LikedItem, RecommendRequest, RecommendedKind,
    },
    services::providers::{CatalogProvider, RecommendationProvider},
};

/// One hydrated recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub category: Category,
    pub score: f64,
    pub item: CatalogItem,
}

/// Personalized and home-page suggestions
///
/// Ranking happens in the recommender; this service builds its payload from
/// the user's liked sets and resolves the returned ids against the catalog.
pub struct SuggestionService {
    recommender: Arc<dyn RecommendationProvider>,
    catalog: Arc<dyn CatalogProvider>,
    limit: usize,
}

impl SuggestionService {
    pub fn new(
        recommender: Arc<dyn RecommendationProvider>,
        catalog: Arc<dyn CatalogProvider>,
        limit: usize,
    ) -> Self {
        Self {
            recommender,
            catalog,
            limit,
        }
    }

    /// Asks the recommender for items similar to `liked` and hydrates them.
    ///
    /// Kinds the catalog cannot serve are skipped, as are failed lookups.
    /// The result keeps the recommender's ranking.
    pub async fn recommend(
        &self,
        user_id: Option<u64>,
        liked: &[(Category, Vec<ItemId>)],
    ) -> ClientResult<Vec<Suggestion>> {
        let liked_items: Vec<LikedItem> = liked
            .iter()
            .flat_map(|(category, ids)| {
                ids.iter().map(move |id| LikedItem {
                    id: id.clone(),
                    kind: RecommendedKind::from(*category),
                })
            })
            .collect();

        let request = RecommendRequest {
            user_id,
            liked_items,
            limit: self.limit,
        };
        let response = self.recommender.recommend(&request).await?;

        let ranked: Vec<_> = response
            .items
            .into_iter()
            .filter_map(|rec| match rec.kind.category() {
                Some(category) => Some((category, rec.id, rec.score)),
                None => {
                    tracing::debug!(id = %rec.id, kind = ?rec.kind, "Skipping suggestion outside the catalog");
                    None
                }
            })
            .collect();

        let lookups = ranked
            .iter()
            .map(|(category, id, _)| self.catalog.fetch_by_id(*category, id));
        let results = join_all(lookups).await;

        let mut suggestions = Vec::with_capacity(ranked.len());
        for ((category, id, score), result) in ranked.into_iter().zip(results) {
            match result {
                Ok(item) => suggestions.push(Suggestion {
                    category,
                    score,
                    item,
                }),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Suggestion lookup failed; dropping item")
                }
            }
        }

        tracing::info!(
            requested = self.limit,
            returned = suggestions.len(),
            "Suggestions ready"
        );

        Ok(suggestions)
    }

    /// Home page rows; a failing catalog yields empty rows
    pub async fn home(&self) -> HomeFeed {
        match self.catalog.home_feed().await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::error!(error = %e, provider = self.catalog.name(), "Home feed unavailable");
                HomeFeed::default()
            }
        }
    }

    /// Reports how the user reacted to a shown suggestion
    pub async fn feedback(
        &self,
        user_id: u64,
        category: Category,
        id: &ItemId,
        event: EventKind,
        score_shown: Option<f64>,
    ) -> ClientResult<()> {
        let request = FeedbackRequest {
            user_id,
            item_id: id.clone(),
            item_type: category.into(),
            event: event.as_str().to_string(),
            score_shown,
        };
        self.recommender.feedback(&request).await
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.recommender.health().await
    }
}
