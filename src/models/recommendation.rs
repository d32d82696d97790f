use serde::{Deserialize, Serialize};

use super::{Category, ItemId};

/// Item kinds known to the recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedKind {
    Movie,
    Book,
    Concert,
}

impl From<Category> for RecommendedKind {
    fn from(category: Category) -> Self {
        match category {
            Category::Video => RecommendedKind::Movie,
            Category::Books => RecommendedKind::Book,
        }
    }
}

impl RecommendedKind {
    pub fn category(self) -> Option<Category> {
        match self {
            RecommendedKind::Movie => Some(Category::Video),
            RecommendedKind::Book => Some(Category::Books),
            RecommendedKind::Concert => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: RecommendedKind,
}

/// Body of `POST /ml/recommend`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
    pub user_id: Option<u64>,
    pub liked_items: Vec<LikedItem>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: RecommendedKind,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub items: Vec<RecommendedItem>,
}

/// Body of `POST /ml/feedback`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRequest {
    pub user_id: u64,
    pub item_id: ItemId,
    pub item_type: RecommendedKind,
    pub event: String,
    pub score_shown: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recommend_request_shape() {
        let req = RecommendRequest {
            user_id: None,
            liked_items: vec![LikedItem {
                id: ItemId::new("42"),
                kind: Category::Video.into(),
            }],
            limit: 10,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"user_id": null, "liked_items": [{"id": "42", "type": "movie"}], "limit": 10})
        );
    }

    #[test]
    fn test_recommend_response_parse() {
        let resp: RecommendResponse = serde_json::from_value(json!({
            "items": [
                {"id": 101, "type": "movie", "score": 0.95},
                {"id": 303, "type": "concert", "score": 0.88}
            ]
        }))
        .unwrap();
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[0].kind.category(), Some(Category::Video));
        assert_eq!(resp.items[1].kind.category(), None);
    }
}
