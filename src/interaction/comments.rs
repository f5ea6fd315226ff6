use chrono::Utc;
use tracing::{debug, warn};

use super::{Notice, Outcome};
use crate::{
    api::InteractionApi,
    error::ClientError,
    models::{ArticleId, Comment},
    store::ClientState,
};

const LOCAL_PREFIX: &str = "local-";

/// Handle for a comment shown optimistically but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComment {
    local_id: String,
}

/// Comments of one article, newest first once the reader starts posting.
///
/// Every submission is prepended before the request goes out, replaced by the
/// server's copy on success, and removed again on failure.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
    next_local: u64,
}

impl CommentThread {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            comments,
            next_local: 0,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.comments.iter().any(|c| c.id.starts_with(LOCAL_PREFIX))
    }

    /// Prepends the local copy. Fails without touching the list when the text is
    /// blank or there is no token.
    pub fn begin(
        &mut self,
        text: &str,
        author: &str,
        has_token: bool,
    ) -> Result<PendingComment, Outcome> {
        if !has_token {
            return Err(Outcome::LoginRequired);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Outcome::Failed(Notice::EmptyComment));
        }

        self.next_local += 1;
        let local_id = format!("{LOCAL_PREFIX}{}", self.next_local);
        self.comments.insert(
            0,
            Comment {
                id: local_id.clone(),
                content: text.to_string(),
                author: author.to_string(),
                created_at: Utc::now(),
            },
        );

        Ok(PendingComment { local_id })
    }

    pub fn settle(
        &mut self,
        pending: PendingComment,
        result: Result<Option<Comment>, ClientError>,
    ) -> Outcome {
        let Some(index) = self
            .comments
            .iter()
            .position(|c| c.id == pending.local_id)
        else {
            debug!("Pending comment already gone");
            return Outcome::Ignored;
        };

        match result {
            Ok(Some(stored)) => {
                self.comments[index] = stored;
                Outcome::Applied
            }
            Ok(None) => Outcome::Applied,
            Err(e) => {
                warn!("Comment submission failed, removing local copy: {e}");
                self.comments.remove(index);
                Outcome::Failed(Notice::CommentFailed)
            }
        }
    }

    pub async fn submit<H>(
        &mut self,
        api: &H,
        state: &ClientState,
        id: &ArticleId,
        text: &str,
        author: &str,
    ) -> Outcome
    where
        H: InteractionApi + ?Sized,
    {
        let pending = match self.begin(text, author, state.has_token()) {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let result = api.post_comment(id, text.trim()).await;
        self.settle(pending, result)
    }

    /// Replaces the list with a freshly fetched one.
    pub fn replace(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }
}
