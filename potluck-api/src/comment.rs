use std::fmt;

use crate::{parse_time, Error, RecipeId, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment, as served by the recipe API
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<RecipeId>,

    pub content: String,

    /// Kept verbatim: malformed timestamps must not make the whole list fail to parse
    pub created_at: String,

    #[serde(default)]
    pub parent_id: Option<CommentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Comment {
    /// `None` if the server sent a timestamp that could not be parsed
    pub fn date(&self) -> Option<Time> {
        parse_time(&self.created_at)
    }
}

/// Body of a comment creation request
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn new(content: String, parent_id: Option<CommentId>) -> NewComment {
        NewComment { content, parent_id }
    }

    /// Mirrors the server-side check: content must not be blank
    pub fn validate(&self) -> Result<(), Error> {
        if self.content.trim().is_empty() {
            return Err(Error::ContentRequired);
        }
        Ok(())
    }
}
