pub mod category;
pub mod credentials;
pub mod events;
pub mod item;
pub mod recommendation;

pub use category::{Category, CategoryInfo};
pub use credentials::{AccessToken, CredentialsResponse, LoginRequest, RegisterRequest};
pub use events::{EventKind, EventPullRequest, EventPullResponse, EventPushRequest, PulledEvent};
pub use item::{CatalogItem, Envelope, Genre, HomeFeed, ItemId};
pub use recommendation::{
    FeedbackRequest, HealthStatus, LikedItem, RecommendRequest, RecommendResponse,
    RecommendedItem, RecommendedKind,
};
