//! Scripted stand-in for the content API.

use std::collections::HashMap;

use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    error::{ClientError, ResponseError},
    http::{AuthLevel, HttpClient, HttpRequest},
};

enum Reply {
    Json(Value),
    Status(u16),
}

struct Recorded {
    route: String,
    body: Option<Value>,
    bearer: bool,
}

type Hook = Box<dyn Fn(&str) + Send + Sync>;

/// Routes are `"METHOD /path"`. Anything unscripted answers 404.
#[derive(Default)]
pub(crate) struct FakeApi {
    routes: HashMap<String, Reply>,
    calls: Mutex<Vec<Recorded>>,
    hook: Option<Hook>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, route: &str, body: Value) -> Self {
        self.routes.insert(route.to_string(), Reply::Json(body));
        self
    }

    pub(crate) fn status(mut self, route: &str, status: u16) -> Self {
        self.routes.insert(route.to_string(), Reply::Status(status));
        self
    }

    /// Runs before every request is answered.
    pub(crate) fn on_request(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.route.clone()).collect()
    }

    pub(crate) fn bodies(&self) -> Vec<Option<Value>> {
        self.calls.lock().iter().map(|c| c.body.clone()).collect()
    }

    pub(crate) fn bearer_calls(&self) -> Vec<bool> {
        self.calls.lock().iter().map(|c| c.bearer).collect()
    }

    pub(crate) fn count(&self, route: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.route == route).count()
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeApi {
    async fn request_json(&self, req: HttpRequest) -> Result<Value, ClientError> {
        let route = format!("{} {}", req.method(), req.path());
        self.calls.lock().push(Recorded {
            route: route.clone(),
            body: req.body().cloned(),
            bearer: req.auth_level() == AuthLevel::Bearer,
        });

        if let Some(hook) = &self.hook {
            hook(&route);
        }

        match self.routes.get(&route) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(401)) => Err(ClientError::Unauthorized),
            Some(Reply::Status(code)) => {
                let status =
                    StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Err(ResponseError::http_status(status, "").into())
            }
            None => Err(ResponseError::http_status(StatusCode::NOT_FOUND, "").into()),
        }
    }
}
