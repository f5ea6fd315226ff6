mod comments;
mod like;

pub use comments::{CommentThread, PendingComment};
pub use like::{LikeAction, LikeController, LikeMode, LikeState};

use derive_more::Display;

/// Transient message for the reader after an interaction was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Notice {
    #[display("Could not update your like. Please try again.")]
    LikeFailed,
    #[display("Could not post your comment. Please try again.")]
    CommentFailed,
    #[display("Comment cannot be empty.")]
    EmptyComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Server confirmed; local state already reflects it.
    Applied,
    /// Nothing to do: already pending, like-only and already liked, or no record loaded.
    Ignored,
    /// No auth token; the caller should send the reader to log in.
    LoginRequired,
    /// Local state was restored; show the notice.
    Failed(Notice),
}
