mod article;
mod category;
pub(crate) mod comment;
mod id;
mod like_status;

pub use article::{ArticleRecord, RecordSource, UNTITLED};
pub use category::Category;
pub use comment::Comment;
pub use id::ArticleId;
pub use like_status::LikeStatus;
pub(crate) use like_status::like_count;
