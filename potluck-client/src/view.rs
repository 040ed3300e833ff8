use std::collections::HashSet;

use crate::{flatten_replies, Comment, CommentKey, FlatReply, ThreadNode};

/// Roots of the threads whose replies are all shown
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExpandedThreads(HashSet<CommentKey>);

impl ExpandedThreads {
    pub fn new() -> ExpandedThreads {
        ExpandedThreads(HashSet::new())
    }

    pub fn is_expanded(&self, root: &CommentKey) -> bool {
        self.0.contains(root)
    }

    pub fn expand(&mut self, root: CommentKey) {
        self.0.insert(root);
    }

    pub fn collapse(&mut self, root: &CommentKey) {
        self.0.remove(root);
    }

    /// Returns whether the thread is now expanded
    pub fn toggle(&mut self, root: CommentKey) -> bool {
        if self.0.remove(&root) {
            false
        } else {
            self.0.insert(root);
            true
        }
    }
}

/// What the page renders for one thread
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadView<'a> {
    pub root: &'a Comment,
    pub visible_replies: Vec<FlatReply<'a>>,

    /// Replies left out of a collapsed thread, for the "show N more" button
    pub hidden_count: usize,
    pub is_expanded: bool,
}

impl<'a> ThreadView<'a> {
    pub fn new(root: &ThreadNode<'a>, expanded: &ExpandedThreads, preview: usize) -> Self {
        let mut visible_replies = flatten_replies(root);
        let is_expanded = expanded.is_expanded(&root.comment.key());
        let hidden_count = match is_expanded {
            true => 0,
            false => visible_replies.len().saturating_sub(preview),
        };
        visible_replies.truncate(visible_replies.len() - hidden_count);
        ThreadView {
            root: root.comment,
            visible_replies,
            hidden_count,
            is_expanded,
        }
    }

    pub fn reply_count(&self) -> usize {
        self.visible_replies.len() + self.hidden_count
    }
}
