//! One article page: resolution, view counting, likes, comments and bookmarks.
//!
//! A view owns a [`ViewLifecycle`]. Closing it (or dropping the view) aborts
//! the tasks it spawned and makes any in-flight load discard its result.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

use crate::{
    api::{ArticleApi, InteractionApi},
    http::HttpClient,
    interaction::{CommentThread, LikeController, Outcome},
    media::MediaResolver,
    models::{ArticleId, ArticleRecord, Category, Comment},
    resolver::ArticleResolver,
    store::ClientState,
};

#[derive(Debug, Default)]
struct LifecycleInner {
    closed: AtomicBool,
    tasks: Mutex<Vec<AbortHandle>>,
}

/// Liveness token shared by a view and everything it started.
#[derive(Debug, Clone, Default)]
pub struct ViewLifecycle {
    inner: Arc<LifecycleInner>,
}

impl ViewLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.inner.closed.load(Ordering::Acquire)
    }

    /// Marks the view closed and aborts its outstanding tasks. Idempotent.
    pub fn close(&self) {
        let tasks = {
            let mut tasks = self.inner.tasks.lock();
            if self.inner.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *tasks)
        };
        debug!("Closing view, aborting {} task(s)", tasks.len());
        for task in tasks {
            task.abort();
        }
    }

    /// Fire-and-forget task tied to this view. Nothing is spawned once closed.
    ///
    /// The closed flag is read under the task lock, so a concurrent
    /// [`close`](Self::close) either sees the new task or prevents it.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.inner.tasks.lock();
        if self.inner.closed.load(Ordering::Acquire) {
            return false;
        }
        let handle = tokio::spawn(task);
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle.abort_handle());
        true
    }
}

/// Thin consumer of the shared resolver, parameterised by category.
pub struct ArticleView<H: ?Sized> {
    http: Arc<H>,
    state: ClientState,
    media: MediaResolver,
    id: ArticleId,
    category: Category,
    lifecycle: ViewLifecycle,
    record: Option<ArticleRecord>,
    like: LikeController,
    comments: CommentThread,
    bookmarked: bool,
}

impl<H: ?Sized> Drop for ArticleView<H> {
    fn drop(&mut self) {
        self.lifecycle.close();
    }
}

impl<H> ArticleView<H>
where
    H: HttpClient + ?Sized + 'static,
{
    pub fn new(
        http: Arc<H>,
        state: ClientState,
        media: MediaResolver,
        id: ArticleId,
        category: Category,
    ) -> Self {
        Self {
            http,
            state,
            media,
            id,
            category,
            lifecycle: ViewLifecycle::new(),
            record: None,
            like: LikeController::new(false, 0, category.like_mode()),
            comments: CommentThread::default(),
            bookmarked: false,
        }
    }

    pub fn id(&self) -> &ArticleId {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn lifecycle(&self) -> ViewLifecycle {
        self.lifecycle.clone()
    }

    pub fn record(&self) -> Option<&ArticleRecord> {
        self.record.as_ref()
    }

    pub fn like(&self) -> &LikeController {
        &self.like
    }

    pub fn comments(&self) -> &[Comment] {
        self.comments.comments()
    }

    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Resolves the article, starts the view-count bump and restores like and
    /// bookmark state. Returns `None` when the view was closed meanwhile.
    #[instrument(skip(self), fields(id = %self.id, category = %self.category))]
    pub async fn load(&mut self) -> Option<&ArticleRecord> {
        if !self.lifecycle.is_active() {
            return None;
        }

        let mut record = ArticleResolver::new(&*self.http, &self.media)
            .resolve(&self.id, self.category)
            .await;
        if !self.lifecycle.is_active() {
            debug!("View closed during resolution, discarding result");
            return None;
        }

        let (liked, like_count) = self.initial_like(record.like_count).await;
        if !self.lifecycle.is_active() {
            debug!("View closed while reading like status, discarding result");
            return None;
        }

        record.like_count = like_count;
        self.count_view(&mut record);

        self.like = LikeController::new(liked, like_count, self.category.like_mode());
        self.comments = CommentThread::new(record.comments.clone());
        self.bookmarked = self.state.is_bookmarked(&self.id);
        info!(source = ?record.source, "Article view loaded");
        self.record = Some(record);
        self.record.as_ref()
    }

    /// Switches the view to another article: the old lifecycle is closed and the
    /// new article is loaded from scratch.
    pub async fn navigate(&mut self, id: ArticleId) -> Option<&ArticleRecord> {
        self.lifecycle.close();
        self.lifecycle = ViewLifecycle::new();
        self.id = id;
        self.record = None;
        self.like = LikeController::new(false, 0, self.category.like_mode());
        self.comments = CommentThread::default();
        self.bookmarked = false;
        self.load().await
    }

    pub fn close(&self) {
        self.lifecycle.close();
    }

    pub async fn toggle_like(&mut self) -> Outcome {
        if self.record.is_none() {
            return Outcome::Ignored;
        }
        let outcome = self.like.toggle(&*self.http, &self.state, &self.id).await;
        self.sync_record();
        outcome
    }

    pub async fn submit_comment(&mut self, text: &str, author: &str) -> Outcome {
        if self.record.is_none() {
            return Outcome::Ignored;
        }
        let outcome = self
            .comments
            .submit(&*self.http, &self.state, &self.id, text, author)
            .await;
        self.sync_record();
        outcome
    }

    /// Refetches the comment list. A result arriving after close is dropped.
    pub async fn reload_comments(&mut self) -> bool {
        if !self.lifecycle.is_active() {
            return false;
        }
        let comments = match self.http.comments(&self.id).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(id = %self.id, "Comment reload failed: {e}");
                return false;
            }
        };
        if !self.lifecycle.is_active() {
            debug!("View closed during comment reload, discarding result");
            return false;
        }
        self.comments.replace(comments);
        self.sync_record();
        true
    }

    /// Local only; persisted under the bookmark key.
    pub fn toggle_bookmark(&mut self) -> bool {
        self.bookmarked = self.state.toggle_bookmark(&self.id);
        self.bookmarked
    }

    /// The local count always moves by one; the remote bump is not awaited.
    fn count_view(&self, record: &mut ArticleRecord) {
        record.view_count = record.view_count.saturating_add(1);

        let http = Arc::clone(&self.http);
        let id = self.id.clone();
        self.lifecycle.spawn(async move {
            match http.record_view(&id).await {
                Ok(_) => debug!(%id, "View recorded"),
                Err(e) => warn!(%id, "Failed to record view: {e}"),
            }
        });
    }

    async fn initial_like(&self, count: u64) -> (bool, u64) {
        let stored = self.state.is_liked(&self.id);
        if !self.state.has_token() {
            return (stored, count);
        }
        match self.http.like_status(&self.id).await {
            Ok(status) => (status.liked, status.count.unwrap_or(count)),
            Err(e) => {
                debug!("Like status unavailable, using stored flag: {e}");
                (stored, count)
            }
        }
    }

    fn sync_record(&mut self) {
        if let Some(record) = &mut self.record {
            record.like_count = self.like.count();
            record.comments = self.comments.comments().to_vec();
        }
    }
}
