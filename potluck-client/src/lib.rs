mod comment;
pub use comment::{Comment, CommentKey, LocalId, PendingComment};

mod composer;
pub use composer::{ComposerPhase, ComposerTarget, Composers};

mod config;
pub use config::{Config, DEFAULT_HOST, REPLY_PREVIEW};

mod credentials;
pub use credentials::{CredentialStore, MemoryCredentials};

mod error;
pub use error::Error;

mod http;
pub use http::HttpCommentService;

mod service;
pub use service::CommentService;

mod thread;
pub use thread::{CommentThread, Submission, ThreadState};

mod tree;
pub use tree::{build_forest, find_comment, find_root, flatten_replies, FlatReply, ThreadNode};

mod view;
pub use view::{ExpandedThreads, ThreadView};

pub mod api {
    pub use potluck_api::*;
}
