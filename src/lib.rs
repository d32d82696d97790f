//! Client-side orchestration for a liked-items catalog.
//!
//! Debounced title search, liked-set synchronization with parallel detail
//! hydration, like/unlike toggling and request cancellation, all driven by
//! the session token and the selected category.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::Session;
pub use config::Config;
pub use error::{ClientError, ClientResult};
