use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    media::MediaResolver,
    models::{ArticleId, Category, Comment},
    serde_utils::{lenient_array, lenient_count, lenient_string, lenient_timestamp},
};

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Live,
    Placeholder,
}

/// Article as handed to the presentation layer. Every field is populated,
/// either from the API or from [`ArticleRecord::placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub state: String,
    pub district: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub media: Option<String>,
    pub video_id: Option<String>,
    pub like_count: u64,
    pub view_count: u64,
    pub comments: Vec<Comment>,
    pub source: RecordSource,
}

/// Wire shape, with every field optional and every type tolerated.
///
/// Alternative spellings are separate fields rather than serde aliases since
/// some records carry several of them at once.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArticle {
    #[serde(deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    headline: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    content: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    body: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    district: Option<String>,
    #[serde(rename = "createdAt", deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(rename = "publishedAt", deserialize_with = "lenient_timestamp")]
    published_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", deserialize_with = "lenient_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "likeCount", deserialize_with = "lenient_count")]
    like_count: Option<u64>,
    #[serde(rename = "likesCount", deserialize_with = "lenient_count")]
    likes_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    likes: Option<u64>,
    #[serde(rename = "viewCount", deserialize_with = "lenient_count")]
    view_count: Option<u64>,
    #[serde(rename = "viewsCount", deserialize_with = "lenient_count")]
    views_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    views: Option<u64>,
    #[serde(deserialize_with = "lenient_array")]
    comments: Option<Vec<Value>>,
    author: Option<Value>,
    user: Option<Value>,
}

impl ArticleRecord {
    /// Normalizes a live record. `id` is the caller's id, not the server's.
    pub fn from_value(
        id: &ArticleId,
        category: Category,
        raw: &Value,
        media: &MediaResolver,
    ) -> Self {
        let parsed: RawArticle = serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            warn!(%id, "article record did not deserialize, using defaults: {e}");
            RawArticle::default()
        });

        let author = parsed
            .author
            .as_ref()
            .and_then(Comment::author_name)
            .or_else(|| parsed.user.as_ref().and_then(Comment::author_name))
            .unwrap_or_else(|| crate::models::comment::ANONYMOUS.to_string());

        Self {
            id: id.clone(),
            title: parsed
                .title
                .or(parsed.headline)
                .unwrap_or_else(|| UNTITLED.to_string()),
            content: parsed
                .content
                .or(parsed.body)
                .or(parsed.description)
                .unwrap_or_default(),
            category: parsed
                .category
                .unwrap_or_else(|| category.slug().to_string()),
            state: parsed.state.unwrap_or_default(),
            district: parsed.district.unwrap_or_default(),
            author,
            created_at: parsed
                .created_at
                .or(parsed.published_at)
                .or(parsed.updated_at)
                .unwrap_or_else(Utc::now),
            media: media.resolve(raw),
            video_id: media.video_id(raw),
            like_count: parsed
                .like_count
                .or(parsed.likes_count)
                .or(parsed.likes)
                .unwrap_or(0),
            view_count: parsed
                .view_count
                .or(parsed.views_count)
                .or(parsed.views)
                .unwrap_or(0),
            comments: parsed
                .comments
                .unwrap_or_default()
                .iter()
                .filter_map(Comment::from_value)
                .collect(),
            source: RecordSource::Live,
        }
    }

    /// Synthetic record used when no live source answered.
    pub fn placeholder(id: &ArticleId, category: Category, media: &MediaResolver) -> Self {
        let label = category.label();
        Self {
            id: id.clone(),
            title: format!("{label}: Story #{id}"),
            content: format!(
                "<p>This {label} story (#{id}) is not available right now.</p>\
                 <p>Please check back later for the full coverage.</p>"
            ),
            category: category.slug().to_string(),
            state: String::new(),
            district: String::new(),
            author: format!("{label} Desk"),
            created_at: Utc::now(),
            media: Some(media.placeholder().to_string()),
            video_id: None,
            like_count: 0,
            view_count: 0,
            comments: Vec::new(),
            source: RecordSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == RecordSource::Placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn media() -> MediaResolver {
        MediaResolver::new("https://api.example.com", "https://img.example.com/none.png")
    }

    #[test]
    fn live_record_is_normalized() {
        let raw = json!({
            "_id": "abc",
            "title": "Floods recede",
            "content": "<p>Water levels drop</p>",
            "state": "Assam",
            "publishedAt": "2024-07-02T08:00:00Z",
            "likes": ["u1", "u2", "u3"],
            "views": "40",
            "image": "/uploads/flood.jpg",
            "user": { "name": "Reporter One" },
            "comments": [{ "_id": "c1", "text": "Stay safe", "user": { "username": "asha" } }],
        });
        let record =
            ArticleRecord::from_value(&ArticleId::from("abc"), Category::State, &raw, &media());

        assert_eq!(record.title, "Floods recede");
        assert_eq!(record.category, "state");
        assert_eq!(record.state, "Assam");
        assert_eq!(record.district, "");
        assert_eq!(record.author, "Reporter One");
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 7, 2, 8, 0, 0).unwrap()
        );
        assert_eq!(record.like_count, 3);
        assert_eq!(record.view_count, 40);
        assert_eq!(
            record.media.as_deref(),
            Some("https://api.example.com/uploads/flood.jpg")
        );
        assert_eq!(record.comments.len(), 1);
        assert_eq!(record.comments[0].author, "asha");
        assert_eq!(record.source, RecordSource::Live);
    }

    #[test]
    fn first_non_empty_timestamp_wins() {
        let raw = json!({
            "createdAt": "",
            "publishedAt": "2024-01-05T00:00:00Z",
            "updatedAt": "2024-02-05T00:00:00Z",
        });
        let record =
            ArticleRecord::from_value(&ArticleId::from(1), Category::Sports, &raw, &media());
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let raw = json!({ "id": 1, "title": null, "likeCount": "lots" });
        let record =
            ArticleRecord::from_value(&ArticleId::from(1), Category::Business, &raw, &media());
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.content, "");
        assert_eq!(record.category, "business");
        assert_eq!(record.like_count, 0);
        assert_eq!(record.author, "Anonymous");
        assert_eq!(record.media.as_deref(), Some("https://img.example.com/none.png"));
    }

    #[test]
    fn placeholder_mentions_id_and_label() {
        let record = ArticleRecord::placeholder(&ArticleId::from(77), Category::Sports, &media());
        assert!(record.title.contains("77"));
        assert!(record.title.contains("Sports News"));
        assert!(record.content.contains("77"));
        assert!(record.is_placeholder());
        assert_eq!(record.media.as_deref(), Some("https://img.example.com/none.png"));
    }
}
