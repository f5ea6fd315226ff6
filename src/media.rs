//! Display media for article records of unknown shape.
//!
//! Every category page used to carry its own copy of this lookup. There is one
//! now, and it is driven by the property order below.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::paths::{PLACEHOLDER_IMAGE_URL, YOUTUBE_THUMBNAIL_URL};

pub const YOUTUBE_FIELDS: &[&str] = &["youtubeUrl", "youtubeLink", "youtube_url", "videoUrl"];

pub const IMAGE_FIELDS: &[&str] = &[
    "featuredImage",
    "image",
    "images",
    "thumbnail",
    "thumbnailUrl",
    "imageUrl",
    "featured_image",
];

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:[^#]*&)?v=|embed/|v/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("youtube id pattern is valid")
});

/// Extracts the 11 character video id from the usual YouTube URL forms.
pub fn youtube_id(url: &str) -> Option<String> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn youtube_thumbnail(video_id: &str) -> String {
    format!("{YOUTUBE_THUMBNAIL_URL}/{video_id}/hqdefault.jpg")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base_url: String,
    placeholder: String,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(crate::paths::DEFAULT_BASE_URL, PLACEHOLDER_IMAGE_URL)
    }
}

impl MediaResolver {
    pub fn new(base_url: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The first non-blank YouTube field on the record, if any.
    fn youtube_field<'a>(&self, raw: &'a Value) -> Option<&'a str> {
        YOUTUBE_FIELDS.iter().find_map(|key| {
            raw.get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
    }

    pub fn video_id(&self, raw: &Value) -> Option<String> {
        self.youtube_field(raw).and_then(youtube_id)
    }

    /// Resolves the display URL for `raw`.
    ///
    /// A record with a YouTube link yields its thumbnail, or `None` when the link
    /// has no recognisable video id. Otherwise the image fields are scanned in
    /// [`IMAGE_FIELDS`] order and the first usable URL wins; relative URLs are
    /// joined to the API base. With nothing usable the placeholder is returned.
    pub fn resolve(&self, raw: &Value) -> Option<String> {
        if let Some(link) = self.youtube_field(raw) {
            return youtube_id(link).map(|id| youtube_thumbnail(&id));
        }

        let url = IMAGE_FIELDS
            .iter()
            .filter_map(|key| raw.get(*key))
            .find_map(image_url)
            .map(|url| self.absolute(url))
            .unwrap_or_else(|| self.placeholder.clone());
        Some(url)
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        }
    }
}

fn image_url(value: &Value) -> Option<&str> {
    let url = match value {
        Value::Array(items) => items.first().and_then(image_url),
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["url", "src"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    };
    url.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver() -> MediaResolver {
        MediaResolver::new("https://api.example.com/", "https://img.example.com/none.png")
    }

    #[test]
    fn youtube_forms_are_recognised() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=4",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(youtube_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
        assert_eq!(youtube_id("https://vimeo.com/123456"), None);
    }

    #[test]
    fn youtube_field_takes_precedence() {
        let raw = json!({
            "youtubeUrl": "https://youtu.be/dQw4w9WgXcQ",
            "image": "https://cdn.example.com/a.jpg",
        });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }

    #[test]
    fn blank_youtube_field_does_not_hide_later_ones() {
        let raw = json!({
            "youtubeUrl": "  ",
            "youtubeLink": "https://youtu.be/dQw4w9WgXcQ",
            "image": "https://cdn.example.com/a.jpg",
        });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(resolver().video_id(&raw).as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn unusable_youtube_link_yields_none() {
        let raw = json!({ "youtubeUrl": "https://youtube.com/channel/xyz", "image": "a.jpg" });
        assert_eq!(resolver().resolve(&raw), None);
    }

    #[test]
    fn image_fields_follow_scan_order() {
        let raw = json!({
            "imageUrl": "https://cdn.example.com/late.jpg",
            "images": [{ "src": "https://cdn.example.com/first.jpg" }, "second.jpg"],
        });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://cdn.example.com/first.jpg")
        );
    }

    #[test]
    fn object_and_relative_urls() {
        let raw = json!({ "featuredImage": { "url": "/uploads/cover.png" } });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://api.example.com/uploads/cover.png")
        );
        let raw = json!({ "thumbnail": "uploads/t.png" });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://api.example.com/uploads/t.png")
        );
    }

    #[test]
    fn empty_fields_fall_through_to_placeholder() {
        let raw = json!({ "image": "", "images": [], "thumbnail": { "alt": "x" } });
        assert_eq!(
            resolver().resolve(&raw).as_deref(),
            Some("https://img.example.com/none.png")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let raw = json!({ "image": ["b.jpg"], "thumbnail": "c.jpg" });
        let first = resolver().resolve(&raw);
        assert_eq!(first, resolver().resolve(&raw));
        assert_eq!(first.as_deref(), Some("https://api.example.com/b.jpg"));
    }
}
