//! Change notification payloads.
//!
//! Every successful mutation on a resource publishes a [`ChangeEvent`]
//! which is fanned out to all connected websocket clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Notification sent to subscribers after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Resource kind, e.g. "funko", "category", "order"
    pub resource: String,
    pub action: ChangeAction,
    /// ID of the affected entity
    pub id: String,
    /// Entity snapshot after the change (absent for deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Event timestamp (millis)
    pub timestamp: i64,
}

impl ChangeEvent {
    pub fn new(
        resource: impl Into<String>,
        action: ChangeAction,
        id: impl ToString,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action,
            id: id.to_string(),
            data,
            timestamp: crate::util::now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_action_serializes_lowercase() {
        let json = serde_json::to_string(&ChangeAction::Created).unwrap();
        assert_eq!(json, "\"created\"");
    }

    #[test]
    fn change_event_roundtrip() {
        let event = ChangeEvent::new("funko", ChangeAction::Updated, 42, None);
        let json = serde_json::to_string(&event).unwrap();
        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resource, "funko");
        assert_eq!(back.action, ChangeAction::Updated);
        assert_eq!(back.id, "42");
    }
}
