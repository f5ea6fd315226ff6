use crate::models::{ArticleId, Category};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/800x450?text=News";
pub const YOUTUBE_THUMBNAIL_URL: &str = "https://img.youtube.com/vi";

fn segment(id: &ArticleId) -> String {
    urlencoding::encode(&id.to_string()).into_owned()
}

/// Direct lookup paths, in the order they are probed.
pub fn article_candidates(category: Category, id: &ArticleId) -> Vec<String> {
    let slug = category.slug();
    let id = segment(id);
    vec![
        format!("/api/news/{slug}/{id}"),
        format!("/api/news/category/{slug}/{id}"),
        format!("/api/news/{id}"),
        format!("/api/news/article/{id}"),
        format!("/api/news/post/{id}"),
    ]
}

pub fn listing_candidates(category: Category) -> Vec<String> {
    let slug = category.slug();
    vec![
        format!("/api/news/{slug}"),
        format!("/api/news/category/{slug}"),
    ]
}

pub fn view(id: &ArticleId) -> String {
    format!("/api/news/view/{}", segment(id))
}

pub fn interaction_view(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/view", segment(id))
}

pub fn like(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/like", segment(id))
}

pub fn unlike(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/unlike", segment(id))
}

pub fn like_status(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/like/status", segment(id))
}

pub fn comments(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/comments", segment(id))
}

pub fn comment(id: &ArticleId) -> String {
    format!("/api/interaction/news/{}/comment", segment(id))
}
