use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{
    error::ClientError,
    http::{HttpClient, HttpRequest},
    models::ArticleId,
    paths,
    serde_utils::count_from_value,
};

/// Article endpoints. Implemented for every [`HttpClient`].
#[async_trait::async_trait]
pub trait ArticleApi: HttpClient {
    /// Raw body of an article or listing path, wrappers untouched.
    async fn article_at(&self, path: &str) -> Result<Value, ClientError> {
        self.request_json(HttpRequest::get(path)).await
    }

    /// Bumps the remote view counter. Returns the server's count when it reports one.
    #[instrument(skip_all, fields(id = %id))]
    async fn record_view(&self, id: &ArticleId) -> Result<Option<u64>, ClientError> {
        let req = HttpRequest::post(paths::view(id)).json(&json!({ "newsId": id }))?;
        let body = match self.request_json(req).await {
            Ok(body) => body,
            Err(e) => {
                debug!("View endpoint failed, trying interaction endpoint: {e}");
                self.request_json(HttpRequest::post(paths::interaction_view(id)))
                    .await?
            }
        };

        let body = body.get("data").filter(|d| d.is_object()).unwrap_or(&body);
        Ok(["viewCount", "views", "viewsCount"]
            .iter()
            .find_map(|key| body.get(*key).and_then(count_from_value)))
    }
}

impl<T: HttpClient + ?Sized> ArticleApi for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeApi;

    #[tokio::test]
    async fn view_posts_news_id() {
        let api = FakeApi::new().reply("POST /api/news/view/12", json!({ "views": 31 }));
        let count = api.record_view(&ArticleId::from(12)).await.unwrap();
        assert_eq!(count, Some(31));
        assert_eq!(api.bodies()[0], Some(json!({ "newsId": 12 })));
    }

    #[tokio::test]
    async fn view_falls_back_to_interaction_endpoint() {
        let api = FakeApi::new().reply("POST /api/interaction/news/12/view", json!(null));
        let count = api.record_view(&ArticleId::from(12)).await.unwrap();
        assert_eq!(count, None);
        assert_eq!(
            api.calls(),
            vec!["POST /api/news/view/12", "POST /api/interaction/news/12/view"]
        );
    }

    #[tokio::test]
    async fn view_failure_surfaces_last_error() {
        let api = FakeApi::new();
        let err = api.record_view(&ArticleId::from(12)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
