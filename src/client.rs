use std::{
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::{Duration, Instant},
};

use bon::Builder;
use leaky_bucket::RateLimiter;
use tracing::{debug, info};

use crate::{
    error::ClientError,
    media::MediaResolver,
    models::{ArticleId, ArticleRecord, Category},
    paths,
    resolver::ArticleResolver,
    store::{ClientState, FileStore},
    view::ArticleView,
};

pub const BASE_URL_ENV: &str = "NEWSDESK_BASE_URL";
pub const PLACEHOLDER_IMAGE_ENV: &str = "NEWSDESK_PLACEHOLDER_IMAGE";
pub const TIMEOUT_ENV: &str = "NEWSDESK_TIMEOUT_SECS";
pub const STATE_PASSPHRASE_ENV: &str = "NEWSDESK_STATE_PASSPHRASE";

/// Single source of truth for where the content API lives.
#[derive(Debug, Clone, Builder)]
pub struct ApiConfig {
    #[builder(into, default = paths::DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(into, default = paths::PLACEHOLDER_IMAGE_URL.to_string())]
    pub placeholder_image_url: String,
    #[builder(default = Duration::from_secs(10))]
    pub timeout: Duration,
    #[builder(default = 12)]
    pub requests_per_second: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(placeholder) = std::env::var(PLACEHOLDER_IMAGE_ENV) {
            config.placeholder_image_url = placeholder;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Unconfigured(format!(
                    "{TIMEOUT_ENV} must be a number of seconds, got '{raw}'"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn media_resolver(&self) -> MediaResolver {
        MediaResolver::new(&self.base_url, &self.placeholder_image_url)
    }
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub token_present: bool,
    pub last_successful_request: Option<Instant>,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub last_error: Option<(Instant, String)>,
}

#[derive(Clone)]
pub struct NewsClient {
    config: ApiConfig,
    state: ClientState,
    pub(crate) http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    total_requests: Arc<AtomicU64>,
    failed_requests: Arc<AtomicU64>,
    last_successful_request: Arc<parking_lot::RwLock<Option<Instant>>>,
    last_error: Arc<parking_lot::RwLock<Option<(Instant, String)>>>,
}

impl std::fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClient")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl NewsClient {
    pub fn new(config: ApiConfig, state: ClientState) -> Result<Self, ClientError> {
        let http_client = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .build()?;

        let per_second = config.requests_per_second.max(1);
        let rate_limiter = RateLimiter::builder()
            .initial(per_second)
            .max(per_second)
            .refill(per_second)
            .interval(Duration::from_millis(1000))
            .build();

        Ok(Self {
            config,
            state,
            http_client,
            rate_limiter: Arc::new(rate_limiter),
            total_requests: Arc::new(AtomicU64::new(0)),
            failed_requests: Arc::new(AtomicU64::new(0)),
            last_successful_request: Arc::new(parking_lot::RwLock::new(None)),
            last_error: Arc::new(parking_lot::RwLock::new(None)),
        })
    }

    /// Configuration from the environment plus the on-disk state file.
    pub fn load_from_env() -> Result<Self, ClientError> {
        let config = ApiConfig::from_env()?;
        let path = FileStore::default_path().ok_or_else(|| {
            ClientError::Unconfigured("Cannot determine config directory".to_string())
        })?;
        let passphrase = std::env::var(STATE_PASSPHRASE_ENV).ok();
        let store = FileStore::open(path, passphrase)?;
        info!(base_url = %config.base_url, "News client configured");
        Self::new(config, ClientState::new(Arc::new(store)))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn media_resolver(&self) -> MediaResolver {
        self.config.media_resolver()
    }

    /// Opens a detail view for one article; call [`ArticleView::load`] to fetch it.
    pub fn open_article(
        self: &Arc<Self>,
        id: impl Into<ArticleId>,
        category: Category,
    ) -> ArticleView<Self> {
        ArticleView::new(
            Arc::clone(self),
            self.state.clone(),
            self.media_resolver(),
            id.into(),
            category,
        )
    }

    /// Resolves one article without view bookkeeping (no view count, no like state).
    pub async fn article(&self, id: &ArticleId, category: Category) -> ArticleRecord {
        let media = self.media_resolver();
        ArticleResolver::new(self, &media).resolve(id, category).await
    }

    /// Normalized listing for the news feed; empty when the listing is unavailable.
    pub async fn feed(&self, category: Category) -> Vec<ArticleRecord> {
        let media = self.media_resolver();
        ArticleResolver::new(self, &media).feed(category).await
    }

    pub(crate) fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_successful_request.write() = Some(Instant::now());
    }

    pub(crate) fn record_failure(&self, error: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some((Instant::now(), error.to_string()));
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus {
            token_present: self.state.has_token(),
            last_successful_request: *self.last_successful_request.read(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }

    pub fn reset_health_metrics(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        *self.last_successful_request.write() = None;
        *self.last_error.write() = None;
        debug!("Health metrics reset");
    }

    pub(crate) async fn acquire_limit(&self) {
        self.rate_limiter.acquire_one().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_defaults() {
        let config = ApiConfig::builder().base_url("https://news.example.com").build();
        assert_eq!(config.base_url, "https://news.example.com");
        assert_eq!(config.placeholder_image_url, paths::PLACEHOLDER_IMAGE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.requests_per_second, 12);
    }

    #[test]
    fn health_metrics_track_outcomes() {
        let client = NewsClient::new(ApiConfig::default(), ClientState::in_memory()).unwrap();
        client.record_success();
        client.record_failure("HTTP 404");
        let health = client.health_status();
        assert_eq!(health.total_requests, 2);
        assert_eq!(health.failed_requests, 1);
        assert!(health.last_successful_request.is_some());
        assert_eq!(health.last_error.map(|(_, e)| e).as_deref(), Some("HTTP 404"));
        assert!(!health.token_present);

        client.reset_health_metrics();
        assert_eq!(client.health_status().total_requests, 0);
    }
}
