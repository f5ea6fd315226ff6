pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod interaction;
pub mod media;
pub mod models;
pub mod paths;
pub mod resolver;
mod serde_utils;
pub mod storage;
pub mod store;
pub mod util;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub mod prelude {
    pub use crate::api::{ArticleApi, InteractionApi};
    pub use crate::client::{ApiConfig, NewsClient};
    pub use crate::error::ClientError;
    pub use crate::http::HttpClient;
    pub use crate::interaction::{LikeMode, Notice, Outcome};
    pub use crate::models::{ArticleId, ArticleRecord, Category, Comment, RecordSource};
    pub use crate::store::{ClientState, FileStore, MemoryStore};
    pub use crate::view::{ArticleView, ViewLifecycle};
}
