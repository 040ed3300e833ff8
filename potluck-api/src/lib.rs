use chrono::{NaiveDateTime, TimeZone, Utc};

mod auth;
pub use auth::{AuthToken, RefreshedToken, TokenRefresh};

mod comment;
pub use comment::{Comment, CommentId, NewComment};

mod error;
pub use error::Error;

mod recipe;
pub use recipe::RecipeId;

mod user;
pub use user::{User, UserId};

pub type Time = chrono::DateTime<Utc>;

/// Format used by the recipe API for `created_at`: naive ISO-8601 in UTC
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Parses a timestamp as served by the recipe API
///
/// Accepts RFC 3339 with an offset, and naive datetimes (with either a `T` or a
/// space separator) that are then taken to be UTC.
pub fn parse_time(s: &str) -> Option<Time> {
    let s = s.trim();
    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_time(t: &Time) -> String {
    t.format(TIME_FORMAT).to_string()
}
