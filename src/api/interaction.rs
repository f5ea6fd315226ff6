use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{
    error::{ClientError, ResponseError},
    http::{HttpClient, HttpRequest},
    models::{like_count, ArticleId, Comment, LikeStatus},
    paths,
    resolver::unwrap_payload,
};

/// Like and comment endpoints. All but the comment listing need the bearer token.
#[async_trait::async_trait]
pub trait InteractionApi: HttpClient {
    /// Returns the like count when the server reports one.
    #[instrument(skip_all, fields(id = %id))]
    async fn like(&self, id: &ArticleId) -> Result<Option<u64>, ClientError> {
        let body = self
            .request_json(HttpRequest::post(paths::like(id)).bearer())
            .await?;
        Ok(like_count(&body))
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn unlike(&self, id: &ArticleId) -> Result<Option<u64>, ClientError> {
        let body = self
            .request_json(HttpRequest::post(paths::unlike(id)).bearer())
            .await?;
        Ok(like_count(&body))
    }

    async fn like_status(&self, id: &ArticleId) -> Result<LikeStatus, ClientError> {
        let body = self
            .request_json(HttpRequest::get(paths::like_status(id)).bearer())
            .await?;
        Ok(LikeStatus::from_value(&body))
    }

    async fn comments(&self, id: &ArticleId) -> Result<Vec<Comment>, ClientError> {
        let body = self.request_json(HttpRequest::get(paths::comments(id))).await?;
        match unwrap_payload(body, &["data", "comments"]) {
            Value::Array(items) => Ok(items.iter().filter_map(Comment::from_value).collect()),
            Value::Null => Ok(Vec::new()),
            _ => Err(ResponseError::unexpected_structure("comment list is not an array").into()),
        }
    }

    /// Posts a comment. Returns the stored comment when the server echoes it back.
    #[instrument(skip_all, fields(id = %id))]
    async fn post_comment(
        &self,
        id: &ArticleId,
        text: &str,
    ) -> Result<Option<Comment>, ClientError> {
        let req = HttpRequest::post(paths::comment(id))
            .bearer()
            .json(&json!({ "content": text }))?;
        let body = self.request_json(req).await?;
        let comment = Comment::from_value(&unwrap_payload(body, &["data", "comment"]));
        if comment.is_none() {
            debug!("Comment accepted without an echoed record");
        }
        Ok(comment)
    }
}

impl<T: HttpClient + ?Sized> InteractionApi for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeApi;

    #[tokio::test]
    async fn like_reports_server_count() {
        let api = FakeApi::new().reply(
            "POST /api/interaction/news/3/like",
            json!({ "success": true, "likesCount": 11 }),
        );
        assert_eq!(api.like(&ArticleId::from(3)).await.unwrap(), Some(11));
        assert!(api.bearer_calls()[0]);
    }

    #[tokio::test]
    async fn comments_accept_wrapped_lists() {
        let api = FakeApi::new().reply(
            "GET /api/interaction/news/3/comments",
            json!({ "comments": [{ "id": 1, "text": "first" }, { "id": 2 }] }),
        );
        let comments = api.comments(&ArticleId::from(3)).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "first");
    }

    #[tokio::test]
    async fn malformed_comment_list_is_an_error() {
        let api = FakeApi::new().reply(
            "GET /api/interaction/news/3/comments",
            json!({ "message": "ok" }),
        );
        assert!(api.comments(&ArticleId::from(3)).await.is_err());
    }

    #[tokio::test]
    async fn posted_comment_is_echoed() {
        let api = FakeApi::new().reply(
            "POST /api/interaction/news/3/comment",
            json!({ "data": { "_id": "c9", "content": "hello", "user": { "name": "Ana" } } }),
        );
        let comment = api
            .post_comment(&ArticleId::from(3), "hello")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(comment.id, "c9");
        assert_eq!(comment.author, "Ana");
        assert_eq!(api.bodies()[0], Some(json!({ "content": "hello" })));
    }
}
