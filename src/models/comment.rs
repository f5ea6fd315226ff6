use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::serde_utils::{string_from_value, timestamp_from_value};

pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Normalizes a server comment. Entries without any text are dropped.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let content = ["content", "text", "comment"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(string_from_value))?;

        let id = ["id", "_id"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(string_from_value))
            .unwrap_or_default();

        let author = ["user", "author"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(Self::author_name))
            .or_else(|| raw.get("userName").and_then(string_from_value))
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let created_at = ["createdAt", "created_at", "date"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(timestamp_from_value))
            .unwrap_or_else(Utc::now);

        Some(Self {
            id,
            content,
            author,
            created_at,
        })
    }

    /// Best-effort name from a literal string or a nested user object.
    pub(crate) fn author_name(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(map) => ["name", "fullName", "username", "email"]
                .iter()
                .find_map(|key| map.get(*key).and_then(string_from_value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn author_comes_from_nested_user_or_literal() {
        let nested = Comment::from_value(&json!({
            "id": 4, "content": "Great read", "user": { "fullName": "Meera K" }
        }))
        .unwrap();
        assert_eq!(nested.id, "4");
        assert_eq!(nested.author, "Meera K");

        let literal = Comment::from_value(&json!({
            "_id": "x",
            "text": "Agreed",
            "author": "Ravi",
        }))
        .unwrap();
        assert_eq!(literal.content, "Agreed");
        assert_eq!(literal.author, "Ravi");

        let unknown = Comment::from_value(&json!({ "text": "hm", "user": {} })).unwrap();
        assert_eq!(unknown.author, ANONYMOUS);
    }

    #[test]
    fn textless_comments_are_dropped() {
        assert!(Comment::from_value(&json!({ "id": 1, "content": "  " })).is_none());
        assert!(Comment::from_value(&json!("plain string")).is_none());
    }
}
