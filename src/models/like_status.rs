use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::serde_utils::count_from_value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub count: Option<u64>,
}

impl LikeStatus {
    /// Reads `liked`/`isLiked`/`hasLiked` and an optional count, also from under `data`.
    pub fn from_value(raw: &Value) -> Self {
        let body = raw.get("data").filter(|d| d.is_object()).unwrap_or(raw);
        let liked = ["liked", "isLiked", "hasLiked"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_bool))
            .unwrap_or(false);
        Self {
            liked,
            count: like_count(body),
        }
    }
}

/// Like count reported by a like/unlike/status response.
pub(crate) fn like_count(body: &Value) -> Option<u64> {
    let body = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
    ["likesCount", "likeCount", "count"]
        .iter()
        .find_map(|key| body.get(*key).and_then(count_from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_reads_any_flag_spelling() {
        assert!(LikeStatus::from_value(&json!({ "isLiked": true })).liked);
        assert!(LikeStatus::from_value(&json!({ "data": { "hasLiked": true } })).liked);
        let status = LikeStatus::from_value(&json!({ "liked": false, "likesCount": 9 }));
        assert_eq!(status, LikeStatus { liked: false, count: Some(9) });
        assert_eq!(LikeStatus::from_value(&json!(null)), LikeStatus::default());
    }

    #[test]
    fn counts_prefer_likes_count() {
        assert_eq!(like_count(&json!({ "likesCount": 3, "likeCount": 5 })), Some(3));
        assert_eq!(like_count(&json!({ "message": "ok" })), None);
    }
}
