//! Locates one article when the API's path convention is not known up front.
//!
//! Resolution is strictly sequential: the direct candidates from
//! [`paths::article_candidates`] are probed in order, then the category listing
//! is scanned for a loosely matching id, and when nothing answers a
//! placeholder record is synthesized. Failures along the way are logged and
//! never reach the caller.

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    api::ArticleApi,
    http::HttpClient,
    media::MediaResolver,
    models::{ArticleId, ArticleRecord, Category},
    paths,
};

/// Wrappers a direct lookup may nest the article under.
const ARTICLE_WRAPPERS: &[&str] = &["data", "posts"];
/// Wrappers a listing may nest its array under.
const LISTING_WRAPPERS: &[&str] = &["data", "posts", "news", "articles"];

pub struct ArticleResolver<'a, H: ?Sized> {
    http: &'a H,
    media: &'a MediaResolver,
}

impl<'a, H: HttpClient + ?Sized> ArticleResolver<'a, H> {
    pub fn new(http: &'a H, media: &'a MediaResolver) -> Self {
        Self { http, media }
    }

    /// Always yields a fully populated record, live or placeholder.
    #[instrument(skip_all, fields(id = %id, category = %category))]
    pub async fn resolve(&self, id: &ArticleId, category: Category) -> ArticleRecord {
        if let Some(raw) = self.fetch_direct(id, category).await {
            return ArticleRecord::from_value(id, category, &raw, self.media);
        }

        if let Some(raw) = self.scan_listing(id, category).await {
            return ArticleRecord::from_value(id, category, &raw, self.media);
        }

        warn!("No endpoint produced the article, using placeholder");
        ArticleRecord::placeholder(id, category, self.media)
    }

    /// Probes the direct candidates and returns the first non-empty article body.
    pub async fn fetch_direct(&self, id: &ArticleId, category: Category) -> Option<Value> {
        let candidates = paths::article_candidates(category, id);
        debug!("Probing {}", candidates.iter().join(", "));

        for path in candidates {
            match self.http.article_at(&path).await {
                Ok(body) => match select_article(body, id) {
                    Some(article) => {
                        info!(%path, "Article resolved from direct endpoint");
                        return Some(article);
                    }
                    None => debug!(%path, "Candidate answered without the article"),
                },
                Err(e) => debug!(%path, "Candidate failed: {e}"),
            }
        }

        None
    }

    /// Fetches the category listing and scans it for `id`.
    pub async fn scan_listing(&self, id: &ArticleId, category: Category) -> Option<Value> {
        for path in paths::listing_candidates(category) {
            let Some(items) = self.listing_at(&path).await else {
                continue;
            };
            if let Some(article) = items.into_iter().find(|item| id.matches(item)) {
                info!(%path, "Article resolved from category listing");
                return Some(article);
            }
            debug!(%path, "Listing does not contain the article");
        }

        None
    }

    /// First listing endpoint that answers with an array.
    pub async fn listing(&self, category: Category) -> Option<Vec<Value>> {
        for path in paths::listing_candidates(category) {
            if let Some(items) = self.listing_at(&path).await {
                return Some(items);
            }
        }
        None
    }

    /// Every listed article that carries an id, normalized.
    #[instrument(skip_all, fields(category = %category))]
    pub async fn feed(&self, category: Category) -> Vec<ArticleRecord> {
        let Some(items) = self.listing(category).await else {
            warn!("Category listing unavailable, feed is empty");
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match ArticleId::from_record(item) {
                Ok(id) => Some(ArticleRecord::from_value(&id, category, item, self.media)),
                Err(e) => {
                    debug!("Skipping listing entry: {e}");
                    None
                }
            })
            .collect()
    }

    async fn listing_at(&self, path: &str) -> Option<Vec<Value>> {
        match self.http.article_at(path).await {
            Ok(body) => match unwrap_payload(body, LISTING_WRAPPERS) {
                Value::Array(items) => Some(items),
                other => {
                    debug!(%path, "Listing is not an array: {}", kind(&other));
                    None
                }
            },
            Err(e) => {
                debug!(%path, "Listing failed: {e}");
                None
            }
        }
    }
}

/// Peels known wrapper objects, e.g. `{ "data": { "posts": [...] } }`.
///
/// An object carrying its own id is a record, not a wrapper, and is returned
/// as is even when it has fields named like a wrapper.
pub(crate) fn unwrap_payload(mut body: Value, wrappers: &[&str]) -> Value {
    while let Some(inner) = peel(&mut body, wrappers) {
        body = inner;
    }
    body
}

fn peel(body: &mut Value, wrappers: &[&str]) -> Option<Value> {
    match body {
        Value::Object(map) if !map.contains_key("id") && !map.contains_key("_id") => wrappers
            .iter()
            .find_map(|key| map.get_mut(*key).filter(|v| !v.is_null()).map(Value::take)),
        _ => None,
    }
}

fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Article bodies are peeled one level at most; an article's own `posts` or
/// `data` field is never mistaken for the payload.
fn select_article(mut body: Value, id: &ArticleId) -> Option<Value> {
    let body = peel(&mut body, ARTICLE_WRAPPERS).unwrap_or(body);
    match body {
        Value::Array(items) => items.into_iter().find(|item| id.matches(item)),
        article @ Value::Object(_) if !is_empty_body(&article) => Some(article),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
