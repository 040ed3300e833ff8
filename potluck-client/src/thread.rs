use std::sync::Arc;

use crate::{
    api::{self, CommentId, NewComment, RecipeId},
    build_forest, find_comment, find_root, Comment, CommentKey, CommentService, ComposerTarget,
    Composers, Config, CredentialStore, Error, ExpandedThreads, LocalId, PendingComment,
    ThreadNode, ThreadView, REPLY_PREVIEW,
};

/// UI state owned by the page displaying the comments
#[derive(Clone, Debug, Default)]
pub struct ThreadState {
    pub expanded: ExpandedThreads,
    pub composers: Composers,
}

/// A comment that was optimistically inserted and still needs to be sent
#[derive(Clone, Debug)]
pub struct Submission {
    recipe: RecipeId,
    local_id: LocalId,
    target: ComposerTarget,
    comment: NewComment,
}

impl Submission {
    pub fn recipe(&self) -> RecipeId {
        self.recipe
    }

    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub fn comment(&self) -> &NewComment {
        &self.comment
    }
}

/// The comments of one recipe, as currently known by the client
pub struct CommentThread<S> {
    service: S,
    credentials: Arc<dyn CredentialStore>,
    comments: Vec<Comment>,
    reply_preview: usize,
}

impl<S: CommentService> CommentThread<S> {
    pub fn new(service: S, credentials: Arc<dyn CredentialStore>) -> CommentThread<S> {
        CommentThread {
            service,
            credentials,
            comments: Vec::new(),
            reply_preview: REPLY_PREVIEW,
        }
    }

    pub fn with_config(
        config: &Config,
        service: S,
        credentials: Arc<dyn CredentialStore>,
    ) -> CommentThread<S> {
        CommentThread {
            reply_preview: config.reply_preview,
            ..CommentThread::new(service, credentials)
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// The working set, in no particular order
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Replaces the working set with the store's comments for `recipe`
    ///
    /// A failure to fetch is logged and leaves an empty working set.
    pub async fn load(&mut self, recipe: RecipeId) -> &[Comment] {
        self.comments = match self.service.list(recipe).await {
            Ok(comments) => {
                tracing::debug!(%recipe, num_comments = comments.len(), "loaded comments");
                comments.into_iter().map(Comment::Persisted).collect()
            }
            Err(err) => {
                tracing::error!(%recipe, ?err, "failed to load comments");
                Vec::new()
            }
        };
        &self.comments
    }

    pub fn find_comment(&self, key: CommentKey) -> Option<&Comment> {
        find_comment(&self.comments, key)
    }

    pub fn find_root(&self, key: CommentKey) -> Option<CommentKey> {
        find_root(&self.comments, key)
    }

    pub fn forest(&self) -> Vec<ThreadNode<'_>> {
        build_forest(&self.comments)
    }

    pub fn views(&self, expanded: &ExpandedThreads) -> Vec<ThreadView<'_>> {
        self.forest()
            .iter()
            .map(|root| ThreadView::new(root, expanded, self.reply_preview))
            .collect()
    }

    /// Posts a comment, optimistically showing it until the store answers
    ///
    /// Blank content is ignored and returns `Ok(None)`. On failure the comment
    /// is removed again and `content` is put back in its composer.
    pub async fn post(
        &mut self,
        state: &mut ThreadState,
        recipe: RecipeId,
        content: &str,
        parent: Option<CommentId>,
    ) -> Result<Option<api::Comment>, Error> {
        let submission = match self.begin_post(state, recipe, content, parent)? {
            None => return Ok(None),
            Some(s) => s,
        };
        let res = self
            .service
            .create(submission.recipe, &submission.comment)
            .await;
        self.finish_post(state, submission, res).map(Some)
    }

    /// Synchronous part of `post`, before the request is sent
    ///
    /// Inserts the pending comment, clears its composer and expands the thread
    /// it replies to. The caller is responsible for sending the returned
    /// submission and handing the answer to `finish_post`.
    pub fn begin_post(
        &mut self,
        state: &mut ThreadState,
        recipe: RecipeId,
        content: &str,
        parent: Option<CommentId>,
    ) -> Result<Option<Submission>, Error> {
        if self.credentials.access_token().is_none() {
            return Err(Error::Unauthenticated);
        }
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let pending = PendingComment::now(content.to_string(), parent);
        let local_id = pending.local_id;
        self.comments.push(Comment::Pending(pending));

        let target = ComposerTarget::from(parent);
        state.composers.start_submission(target);

        if let Some(parent) = parent {
            let parent = CommentKey::Persisted(parent);
            let root = self.find_root(parent).unwrap_or(parent);
            state.expanded.expand(root);
        }

        tracing::trace!(%recipe, %local_id, ?parent, "optimistically inserted comment");
        Ok(Some(Submission {
            recipe,
            local_id,
            target,
            comment: NewComment::new(content.to_string(), parent),
        }))
    }

    /// Applies the store's answer to a submission
    ///
    /// Every pending comment is dropped from the working set, then either the
    /// confirmed comment is appended or the draft is restored.
    pub fn finish_post(
        &mut self,
        state: &mut ThreadState,
        submission: Submission,
        res: Result<api::Comment, Error>,
    ) -> Result<api::Comment, Error> {
        self.comments.retain(|c| !c.is_pending());
        match res {
            Ok(comment) => {
                state.composers.complete_submission(submission.target);
                self.comments.push(Comment::Persisted(comment.clone()));
                Ok(comment)
            }
            Err(err) => {
                tracing::warn!(
                    recipe = %submission.recipe,
                    local_id = %submission.local_id,
                    ?err,
                    "failed to post comment"
                );
                state
                    .composers
                    .restore(submission.target, submission.comment.content);
                Err(err)
            }
        }
    }
}
