mod interaction;
mod news;

pub use interaction::InteractionApi;
pub use news::ArticleApi;
