use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, RecipeId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Content is required")]
    ContentRequired,

    #[error("Recipe not found {0}")]
    RecipeNotFound(RecipeId),

    #[error("Parent comment not found {0}")]
    ParentNotFound(CommentId),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::ContentRequired => StatusCode::BAD_REQUEST,
            Error::RecipeNotFound(_) => StatusCode::NOT_FOUND,
            Error::ParentNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// JSON body, in the recipe API's `{"detail": ...}` shape plus a machine-readable type
    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "detail": msg,
                "type": "unknown",
            }),
            Error::Unauthorized => json!({
                "detail": "Not authenticated",
                "type": "unauthorized",
            }),
            Error::ContentRequired => json!({
                "detail": "Content is required",
                "type": "content-required",
            }),
            Error::RecipeNotFound(r) => json!({
                "detail": "Recipe not found",
                "type": "recipe-not-found",
                "id": r,
            }),
            Error::ParentNotFound(c) => json!({
                "detail": "Parent comment not found",
                "type": "parent-not-found",
                "id": c,
            }),
        })
        .expect("serializing error contents")
    }

    /// Parses an error answer
    ///
    /// Bodies without a `type` field (as produced by the real recipe API) are
    /// classified from the status code and the `detail` message.
    pub fn parse(status: http::StatusCode, body: &[u8]) -> anyhow::Result<Error> {
        use http::StatusCode;
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let detail = match data.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let id = || {
            data.get("id")
                .and_then(|id| id.as_i64())
                .ok_or_else(|| anyhow!("error is about a missing item but carries no id"))
        };
        Ok(match data.get("type").and_then(|t| t.as_str()) {
            Some("unknown") => Error::Unknown(detail),
            Some("unauthorized") => Error::Unauthorized,
            Some("content-required") => Error::ContentRequired,
            Some("recipe-not-found") => Error::RecipeNotFound(RecipeId(id()?)),
            Some("parent-not-found") => Error::ParentNotFound(CommentId(id()?)),
            Some(_) => return Err(anyhow!("error contents has unknown type")),
            None if status == StatusCode::UNAUTHORIZED => Error::Unauthorized,
            None if status == StatusCode::BAD_REQUEST && detail == "Content is required" => {
                Error::ContentRequired
            }
            None if detail.is_empty() => Error::Unknown(format!("server answered {status}")),
            None => Error::Unknown(detail),
        })
    }
}
