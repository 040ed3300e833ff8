use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::api::{self, CommentId, Time};

/// Client-generated identifier of a comment the server has not confirmed yet
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LocalId(pub Uuid);

impl LocalId {
    pub fn new() -> LocalId {
        LocalId(Uuid::new_v4())
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// Identifies one entry of the working set, whether it is persisted or not
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CommentKey {
    Persisted(CommentId),
    Pending(LocalId),
}

impl From<CommentId> for CommentKey {
    fn from(id: CommentId) -> CommentKey {
        CommentKey::Persisted(id)
    }
}

impl fmt::Display for CommentKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommentKey::Persisted(id) => write!(f, "{id}"),
            CommentKey::Pending(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingComment {
    pub local_id: LocalId,
    pub content: String,
    pub date: Time,

    /// Replies can only target comments the server knows about
    pub parent_id: Option<CommentId>,
}

impl PendingComment {
    pub fn now(content: String, parent_id: Option<CommentId>) -> PendingComment {
        PendingComment {
            local_id: LocalId::new(),
            content,
            date: Utc::now(),
            parent_id,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Comment {
    Persisted(api::Comment),
    Pending(PendingComment),
}

impl Comment {
    pub fn key(&self) -> CommentKey {
        match self {
            Comment::Persisted(c) => CommentKey::Persisted(c.id),
            Comment::Pending(c) => CommentKey::Pending(c.local_id),
        }
    }

    pub fn parent_id(&self) -> Option<CommentId> {
        match self {
            Comment::Persisted(c) => c.parent_id,
            Comment::Pending(c) => c.parent_id,
        }
    }

    pub fn parent_key(&self) -> Option<CommentKey> {
        self.parent_id().map(CommentKey::Persisted)
    }

    pub fn content(&self) -> &str {
        match self {
            Comment::Persisted(c) => &c.content,
            Comment::Pending(c) => &c.content,
        }
    }

    /// Ordering key; `None` for persisted comments with a malformed timestamp
    pub fn date(&self) -> Option<Time> {
        match self {
            Comment::Persisted(c) => c.date(),
            Comment::Pending(c) => Some(c.date),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Comment::Pending(_))
    }

    pub fn author_name(&self) -> &str {
        match self {
            Comment::Persisted(c) => c.username.as_deref().unwrap_or("Unknown"),
            Comment::Pending(_) => "You",
        }
    }
}

impl From<api::Comment> for Comment {
    fn from(c: api::Comment) -> Comment {
        Comment::Persisted(c)
    }
}
