use tracing::{debug, warn};

use super::{Notice, Outcome};
use crate::{api::InteractionApi, error::ClientError, models::ArticleId, store::ClientState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeMode {
    Toggle,
    LikeOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Unliked,
    Liked,
    /// Optimistically showing `liked`, waiting for the server.
    Pending { liked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    /// Send a like (`true`) or unlike (`false`).
    Dispatch { like: bool },
    LoginRequired,
    Ignored,
}

/// Optimistic like/unlike with exact rollback.
#[derive(Debug, Clone)]
pub struct LikeController {
    state: LikeState,
    count: u64,
    mode: LikeMode,
    rollback: Option<(LikeState, u64)>,
}

impl LikeController {
    pub fn new(liked: bool, count: u64, mode: LikeMode) -> Self {
        Self {
            state: if liked { LikeState::Liked } else { LikeState::Unliked },
            count,
            mode,
            rollback: None,
        }
    }

    pub fn state(&self) -> LikeState {
        self.state
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mode(&self) -> LikeMode {
        self.mode
    }

    /// What the reader sees, pending or not.
    pub fn is_liked(&self) -> bool {
        matches!(self.state, LikeState::Liked | LikeState::Pending { liked: true })
    }

    /// Applies the optimistic update for a click. The token check comes first so
    /// a logged-out click never touches the count.
    pub fn begin(&mut self, has_token: bool) -> LikeAction {
        if !has_token {
            return LikeAction::LoginRequired;
        }

        let like = match (self.state, self.mode) {
            (LikeState::Pending { .. }, _) => return LikeAction::Ignored,
            (LikeState::Liked, LikeMode::LikeOnly) => return LikeAction::Ignored,
            (LikeState::Liked, LikeMode::Toggle) => false,
            (LikeState::Unliked, _) => true,
        };

        self.rollback = Some((self.state, self.count));
        self.state = LikeState::Pending { liked: like };
        self.count = if like {
            self.count.saturating_add(1)
        } else {
            self.count.saturating_sub(1)
        };

        LikeAction::Dispatch { like }
    }

    /// Settles a pending request. A server count replaces the local estimate;
    /// a failure restores the exact pre-click state.
    pub fn settle(&mut self, result: Result<Option<u64>, ClientError>) -> Result<bool, Notice> {
        let LikeState::Pending { liked } = self.state else {
            warn!("Like response arrived with nothing pending");
            return Ok(self.is_liked());
        };

        match result {
            Ok(server_count) => {
                self.state = if liked { LikeState::Liked } else { LikeState::Unliked };
                if let Some(count) = server_count {
                    self.count = count;
                }
                self.rollback = None;
                Ok(liked)
            }
            Err(e) => {
                warn!("Like request failed, reverting: {e}");
                if let Some((state, count)) = self.rollback.take() {
                    self.state = state;
                    self.count = count;
                }
                Err(Notice::LikeFailed)
            }
        }
    }

    /// One full click: token check, optimistic update, request, settle. On success
    /// the liked flag is mirrored into the persistent store.
    pub async fn toggle<H>(&mut self, api: &H, state: &ClientState, id: &ArticleId) -> Outcome
    where
        H: InteractionApi + ?Sized,
    {
        let like = match self.begin(state.has_token()) {
            LikeAction::LoginRequired => return Outcome::LoginRequired,
            LikeAction::Ignored => return Outcome::Ignored,
            LikeAction::Dispatch { like } => like,
        };

        debug!(%id, like, "Sending like change");
        let result = if like {
            api.like(id).await
        } else {
            api.unlike(id).await
        };

        match self.settle(result) {
            Ok(liked) => {
                state.set_liked(id, liked);
                Outcome::Applied
            }
            Err(notice) => Outcome::Failed(notice),
        }
    }
}
