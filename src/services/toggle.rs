use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};

use crate::{
    error::{ClientError, ClientResult},
    models::{AccessToken, Category, EventKind, ItemId},
    services::providers::AuthProvider,
};

/// Per-item like state; pending states remember which way they are going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    ConfirmedLiked,
    ConfirmedUnliked,
    PendingLike,
    PendingUnlike,
}

impl LikeState {
    pub fn confirmed(liked: bool) -> Self {
        if liked {
            LikeState::ConfirmedLiked
        } else {
            LikeState::ConfirmedUnliked
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, LikeState::PendingLike | LikeState::PendingUnlike)
    }

    /// Membership as last acknowledged by the server
    pub fn is_liked(self) -> bool {
        matches!(self, LikeState::ConfirmedLiked | LikeState::PendingUnlike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoginRequired,
    Failure,
}

/// A blocking, user-facing message raised by a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sends like/dislike events and tracks each item's state
pub struct LikeToggler {
    auth: Arc<dyn AuthProvider>,
    token: watch::Receiver<Option<AccessToken>>,
    states: Mutex<HashMap<(Category, ItemId), LikeState>>,
    notices: broadcast::Sender<Notice>,
}

impl LikeToggler {
    pub fn new(auth: Arc<dyn AuthProvider>, token: watch::Receiver<Option<AccessToken>>) -> Self {
        let (notices, _) = broadcast::channel(16);
        Self {
            auth,
            token,
            states: Mutex::new(HashMap::new()),
            notices,
        }
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn state(&self, category: Category, id: &ItemId) -> Option<LikeState> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(&(category, id.clone())).copied()
    }

    fn notify(&self, kind: NoticeKind, message: String) {
        // No subscribers is fine; the error is still returned to the caller
        let _ = self.notices.send(Notice { kind, message });
    }

    /// Flips membership of `id` through the auth service.
    ///
    /// `currently_liked` is the confirmed membership the caller shows. A toggle
    /// that is already in flight for the same item is not repeated; its
    /// pending state is returned instead.
    pub async fn toggle(
        &self,
        category: Category,
        id: &ItemId,
        currently_liked: bool,
    ) -> ClientResult<LikeState> {
        let token = self.token.borrow().clone();
        let Some(token) = token else {
            tracing::info!(id = %id, "Toggle refused without session");
            self.notify(
                NoticeKind::LoginRequired,
                ClientError::Unauthenticated.user_message(),
            );
            return Err(ClientError::Unauthenticated);
        };

        let (event, mut guard) = {
            let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
            let key = (category, id.clone());
            if let Some(state) = states.get(&key).copied().filter(|s| s.is_pending()) {
                tracing::debug!(id = %id, state = ?state, "Toggle already in flight");
                return Ok(state);
            }

            let (event, pending) = if currently_liked {
                (EventKind::Dislike, LikeState::PendingUnlike)
            } else {
                (EventKind::Like, LikeState::PendingLike)
            };
            states.insert(key.clone(), pending);
            tracing::debug!(id = %id, event = %event.as_str(), state = ?pending, "Pushing event");

            let guard = PendingGuard {
                states: &self.states,
                key,
                revert_to: LikeState::confirmed(currently_liked),
            };
            (event, guard)
        };

        match self.auth.push_event(&token, event, category, id).await {
            Ok(()) => {
                let confirmed = LikeState::confirmed(event == EventKind::Like);
                guard.revert_to = confirmed;
                drop(guard);
                tracing::info!(
                    id = %id,
                    category = %category.path_segment(),
                    event = %event.as_str(),
                    "Event confirmed"
                );
                Ok(confirmed)
            }
            Err(e) => {
                drop(guard);
                tracing::warn!(id = %id, event = %event.as_str(), error = %e, "Event push failed; reverted");
                self.notify(NoticeKind::Failure, e.user_message());
                Err(e)
            }
        }
    }
}

/// Settles a pending item when the toggle ends, including when its future
/// is dropped mid-push; an unconfirmed push falls back to the prior state
struct PendingGuard<'a> {
    states: &'a Mutex<HashMap<(Category, ItemId), LikeState>>,
    key: (Category, ItemId),
    revert_to: LikeState,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.insert(self.key.clone(), self.revert_to);
    }
}
