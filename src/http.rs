use reqwest::{header, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::{
    client::NewsClient,
    error::{ApiErrorResponse, ClientError, ResponseError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLevel {
    None,   // Public endpoint
    Bearer, // Requires the stored auth token
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    auth_level: AuthLevel,
}

impl HttpRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            auth_level: AuthLevel::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn bearer(mut self) -> Self {
        self.auth_level = AuthLevel::Bearer;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn auth_level(&self) -> AuthLevel {
        self.auth_level
    }
}

/// Transport seam between the API helpers and the network.
///
/// Responses are decoded as JSON; an empty body comes back as [`Value::Null`].
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn request_json(&self, req: HttpRequest) -> Result<Value, ClientError>;
}

#[async_trait::async_trait]
impl HttpClient for NewsClient {
    async fn request_json(&self, req: HttpRequest) -> Result<Value, ClientError> {
        let res = self.execute_request(req).await?;
        let text = res.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl NewsClient {
    /// Single attempt; callers decide what a failure means.
    #[instrument(
        skip(self, req),
        fields(method = %req.method, path = %req.path, auth_level = ?req.auth_level)
    )]
    async fn execute_request(&self, req: HttpRequest) -> Result<Response, ClientError> {
        match self.execute_single_request(&req).await {
            Ok(response) => {
                debug!("HTTP request completed successfully");
                self.record_success();
                Ok(response)
            }
            Err(e) => {
                debug!("HTTP request failed: {}", e);
                self.record_failure(&e.to_string());
                Err(e)
            }
        }
    }

    fn build_url(&self, req: &HttpRequest) -> Result<Url, ClientError> {
        let base = self.config().base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{}", req.path)).map_err(|e| {
            ClientError::InvalidRequest(format!("Invalid path '{}': {e}", req.path))
        })
    }

    async fn execute_single_request(&self, req: &HttpRequest) -> Result<Response, ClientError> {
        let url = self.build_url(req)?;
        debug!("Built request URL: {}", url);

        let mut request_builder = match req.method {
            Method::GET => self.http_client.get(url),
            Method::POST => self.http_client.post(url),
            _ => {
                return Err(ClientError::InvalidRequest(format!(
                    "Unsupported HTTP method: {:?}",
                    req.method
                )))
            }
        };

        request_builder = request_builder.header(header::ACCEPT, mime::APPLICATION_JSON.as_ref());

        if req.auth_level == AuthLevel::Bearer {
            let token = self.state().token().ok_or(ClientError::MissingToken)?;
            request_builder = request_builder.bearer_auth(token);
        }

        if let Some(body) = &req.body {
            request_builder = request_builder.json(body);
        }

        self.acquire_limit().await;

        let res = request_builder.send().await.map_err(|e| {
            warn!("Network error occurred: {}", e);
            ClientError::RequestError(e)
        })?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("Received 401 Unauthorized");
            return Err(ClientError::Unauthorized);
        }

        let body_text = res.text().await.unwrap_or_default();
        if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&body_text) {
            if error_response.message.is_some() || error_response.error.is_some() {
                debug!("API error response: {}", error_response);
                return Err(ResponseError::http_status(status, error_response.to_string()).into());
            }
        }

        if status.is_server_error() {
            error!(
                "Received server error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }

        Err(ResponseError::http_status(status, body_text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiConfig;
    use serde_json::json;

    #[test]
    fn requests_default_to_public() {
        let req = HttpRequest::get("/api/news/1");
        assert_eq!(req.auth_level(), AuthLevel::None);
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(HttpRequest::post("/x").bearer().auth_level(), AuthLevel::Bearer);
    }

    #[test]
    fn json_body_is_kept() {
        let req = HttpRequest::post("/api/news/view/1")
            .json(&json!({ "newsId": 1 }))
            .unwrap();
        assert_eq!(req.body(), Some(&json!({ "newsId": 1 })));
    }

    #[test]
    fn urls_join_base_and_path() {
        let config = ApiConfig::builder().base_url("https://news.example.com/").build();
        let client = NewsClient::new(config, Default::default()).unwrap();
        let url = client
            .build_url(&HttpRequest::get("/api/news/sports"))
            .unwrap();
        assert_eq!(url.as_str(), "https://news.example.com/api/news/sports");
    }

    #[tokio::test]
    async fn bearer_request_without_token_fails_before_sending() {
        let client = NewsClient::new(ApiConfig::default(), Default::default()).unwrap();
        let err = client
            .request_json(HttpRequest::post("/api/interaction/news/1/like").bearer())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingToken));
        assert_eq!(client.health_status().failed_requests, 1);
    }
}
