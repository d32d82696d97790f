use serde::{Deserialize, Serialize};

use super::{item::null_as_empty, Category, ItemId};

/// User events understood by the auth service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Like,
    Dislike,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Like => "like",
            EventKind::Dislike => "dislike",
        }
    }
}

/// Body of `POST /v1/auth/event/pull`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPullRequest<'a> {
    pub access_token: &'a str,
    pub event: EventKind,
    #[serde(rename = "type")]
    pub item_type: &'static str,
}

impl<'a> EventPullRequest<'a> {
    pub fn likes(access_token: &'a str, category: Category) -> Self {
        Self {
            access_token,
            event: EventKind::Like,
            item_type: category.event_type(),
        }
    }
}

/// Body of `POST /v1/auth/event/push`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPushRequest<'a> {
    pub access_token: &'a str,
    pub event: EventKind,
    #[serde(rename = "type")]
    pub item_type: &'static str,
    pub id: &'a str,
}

impl<'a> EventPushRequest<'a> {
    pub fn new(access_token: &'a str, event: EventKind, category: Category, id: &'a ItemId) -> Self {
        Self {
            access_token,
            event,
            item_type: category.event_type(),
            id: id.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulledEvent {
    pub id: ItemId,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `content` of the pull response; `items` may be `null`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPullResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<PulledEvent>,
}
