use std::collections::HashMap;

use crate::api::CommentId;

/// Which input a comment is being written in
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComposerTarget {
    Root,
    Reply(CommentId),
}

impl From<Option<CommentId>> for ComposerTarget {
    fn from(parent: Option<CommentId>) -> ComposerTarget {
        match parent {
            None => ComposerTarget::Root,
            Some(p) => ComposerTarget::Reply(p),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposerPhase {
    Idle,
    Composing,
    Submitting,
}

#[derive(Clone, Debug, Default)]
struct Composer {
    draft: String,

    // number of submissions from this composer still waiting for the server
    in_flight: usize,
}

/// Draft buffers of the root composer and of every reply composer
///
/// At most one reply composer is open at a time, but drafts of closed reply
/// composers are kept around.
#[derive(Clone, Debug, Default)]
pub struct Composers {
    root: Composer,
    replies: HashMap<CommentId, Composer>,
    open_reply: Option<CommentId>,
}

impl Composers {
    pub fn new() -> Composers {
        Composers::default()
    }

    fn get(&self, target: ComposerTarget) -> Option<&Composer> {
        match target {
            ComposerTarget::Root => Some(&self.root),
            ComposerTarget::Reply(p) => self.replies.get(&p),
        }
    }

    fn get_mut(&mut self, target: ComposerTarget) -> &mut Composer {
        match target {
            ComposerTarget::Root => &mut self.root,
            ComposerTarget::Reply(p) => self.replies.entry(p).or_default(),
        }
    }

    pub fn draft(&self, target: ComposerTarget) -> &str {
        self.get(target).map(|c| &c.draft as &str).unwrap_or("")
    }

    pub fn set_draft(&mut self, target: ComposerTarget, text: String) {
        self.get_mut(target).draft = text;
    }

    pub fn phase(&self, target: ComposerTarget) -> ComposerPhase {
        match self.get(target) {
            Some(c) if c.in_flight > 0 => ComposerPhase::Submitting,
            Some(c) if !c.draft.is_empty() => ComposerPhase::Composing,
            _ => ComposerPhase::Idle,
        }
    }

    pub fn open_reply(&mut self, parent: CommentId) {
        self.open_reply = Some(parent);
    }

    pub fn close_reply(&mut self) {
        self.open_reply = None;
    }

    pub fn open_reply_target(&self) -> Option<CommentId> {
        self.open_reply
    }

    /// Clears the draft, and closes the composer if it is the open reply composer
    pub(crate) fn start_submission(&mut self, target: ComposerTarget) {
        let composer = self.get_mut(target);
        composer.draft.clear();
        composer.in_flight += 1;
        if let ComposerTarget::Reply(p) = target {
            if self.open_reply == Some(p) {
                self.open_reply = None;
            }
        }
    }

    pub(crate) fn complete_submission(&mut self, target: ComposerTarget) {
        let composer = self.get_mut(target);
        composer.in_flight = composer.in_flight.saturating_sub(1);
    }

    /// Puts a failed submission's text back in its composer
    ///
    /// A reply composer is reopened, unless the user opened another one since.
    pub(crate) fn restore(&mut self, target: ComposerTarget, text: String) {
        self.complete_submission(target);
        self.set_draft(target, text);
        if let ComposerTarget::Reply(p) = target {
            if self.open_reply.is_none() {
                self.open_reply = Some(p);
            }
        }
    }
}
