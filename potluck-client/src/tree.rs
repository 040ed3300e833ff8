use std::collections::{HashMap, HashSet};

use crate::{Comment, CommentKey};

/// One comment of the forest along with the comments replying to it
///
/// Reply chains can be arbitrarily deep, so dropping and comparing nodes
/// walk the tree with an explicit stack rather than recursing.
#[derive(Debug)]
pub struct ThreadNode<'a> {
    pub comment: &'a Comment,

    /// Direct replies, in chronological order
    pub children: Vec<ThreadNode<'a>>,
}

impl<'a> ThreadNode<'a> {
    fn leaf(comment: &'a Comment) -> ThreadNode<'a> {
        ThreadNode {
            comment,
            children: Vec::new(),
        }
    }
}

impl PartialEq for ThreadNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.comment != b.comment || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

impl Eq for ThreadNode<'_> {}

impl Drop for ThreadNode<'_> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// A reply of a flattened thread
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlatReply<'a> {
    pub comment: &'a Comment,

    /// Immediate parent, not the thread root
    pub parent: &'a Comment,
}

pub fn find_comment(comments: &[Comment], key: CommentKey) -> Option<&Comment> {
    comments.iter().find(|c| c.key() == key)
}

/// Returns the key of the root of the thread `key` belongs to
///
/// The walk stops at the last comment whose parent can be resolved, so a
/// dangling `parent_id` makes the dangling comment its own root. A cycle in the
/// parent links stops the walk on the last comment before the cycle closes.
/// Returns `None` only if `key` itself is not in `comments`.
pub fn find_root(comments: &[Comment], key: CommentKey) -> Option<CommentKey> {
    // first comment wins on duplicate keys, like `find_comment`
    let mut by_key = HashMap::with_capacity(comments.len());
    for c in comments {
        by_key.entry(c.key()).or_insert(c);
    }
    let mut current = *by_key.get(&key)?;
    let mut seen = HashSet::new();
    seen.insert(current.key());
    while let Some(parent) = current.parent_key() {
        let Some(&parent) = by_key.get(&parent) else {
            break;
        };
        if !seen.insert(parent.key()) {
            tracing::warn!(comment = %key, "cyclic parent links, stopping root lookup");
            break;
        }
        current = parent;
    }
    Some(current.key())
}

/// Builds the thread forest out of a flat list of comments
///
/// Comments are ordered by increasing date, those with a timestamp that could
/// not be parsed coming first in their original relative order. A comment whose
/// parent is not in `comments` is neither a root nor a child: it is dropped.
pub fn build_forest(comments: &[Comment]) -> Vec<ThreadNode<'_>> {
    let mut order = (0..comments.len()).collect::<Vec<_>>();
    order.sort_by_cached_key(|&i| comments[i].date());

    let present = comments.iter().map(|c| c.key()).collect::<HashSet<_>>();
    let mut replies: HashMap<CommentKey, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for i in order {
        match comments[i].parent_key() {
            None => roots.push(i),
            Some(parent) if present.contains(&parent) => {
                replies.entry(parent).or_default().push(i)
            }
            Some(parent) => tracing::trace!(
                comment = %comments[i].key(),
                %parent,
                "dropping comment with unknown parent"
            ),
        }
    }

    // Duplicate keys could otherwise make a comment its own descendant
    let mut visited = vec![false; comments.len()];
    roots
        .into_iter()
        .filter_map(|i| assemble(comments, &replies, &mut visited, i))
        .collect()
}

/// Builds the subtree rooted at `root`, bottom-up
///
/// Each stack entry is a node whose children are still being built, along
/// with the replies left to visit.
fn assemble<'a>(
    comments: &'a [Comment],
    replies: &HashMap<CommentKey, Vec<usize>>,
    visited: &mut [bool],
    root: usize,
) -> Option<ThreadNode<'a>> {
    if std::mem::replace(&mut visited[root], true) {
        return None;
    }
    let kids = move |i: usize| {
        replies
            .get(&comments[i].key())
            .map_or(&[][..], Vec::as_slice)
            .iter()
    };
    let mut stack = vec![(ThreadNode::leaf(&comments[root]), kids(root))];
    loop {
        let (_, pending) = stack.last_mut()?;
        match pending.find(|&&k| !std::mem::replace(&mut visited[k], true)) {
            Some(&k) => stack.push((ThreadNode::leaf(&comments[k]), kids(k))),
            None => {
                let (node, _) = stack.pop()?;
                match stack.last_mut() {
                    Some((parent, _)) => parent.children.push(node),
                    None => return Some(node),
                }
            }
        }
    }
}

/// Lists all the descendants of `root` depth-first, each with its direct parent
pub fn flatten_replies<'a>(root: &ThreadNode<'a>) -> Vec<FlatReply<'a>> {
    let mut res = Vec::new();
    let mut stack = root
        .children
        .iter()
        .rev()
        .map(|c| (c, root.comment))
        .collect::<Vec<_>>();
    while let Some((node, parent)) = stack.pop() {
        res.push(FlatReply {
            comment: node.comment,
            parent,
        });
        stack.extend(node.children.iter().rev().map(|c| (c, node.comment)));
    }
    res
}
