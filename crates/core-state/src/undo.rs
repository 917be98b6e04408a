//! Snapshot based undo.
//!
//! Every content change that goes through [`record`] pushes the content and
//! cursor from *before* the change. [`undo`] walks a position backwards over
//! those snapshots without ever removing one, and since an undo is itself a
//! content change recorded by the caller, the log keeps growing and the user
//! can always get back to any earlier state.

use crate::Buffer;
use core_text::{Coord, Text};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

pub const EDIT_WHILE_LOADING: &str = "can't edit while loading";

/// Restore point for undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content: Text,
    pub cursor: Coord,
}

struct Node {
    snapshot: Snapshot,
    /// Position counting from the oldest entry.
    index: usize,
    prev: Option<Arc<Node>>,
    /// Skew-binary jump to an older node, so lookups take O(log n) hops.
    jump: Option<Arc<Node>>,
}

/// Persistent snapshot log.
///
/// A singly linked list from the newest entry back to the oldest: cloning and
/// pushing are O(1) and share every existing node. Each node also carries a
/// jump pointer laid out so that reaching any older entry takes a logarithmic
/// number of hops.
#[derive(Clone, Default)]
pub struct History {
    head: Option<Arc<Node>>,
    len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&self, snapshot: Snapshot) -> History {
        let jump = self.head.as_ref().map(|prev| {
            let skip = prev.jump.as_ref().and_then(|j| {
                let jj = j.jump.as_ref()?;
                (prev.index - j.index == j.index - jj.index).then(|| jj.clone())
            });
            skip.unwrap_or_else(|| prev.clone())
        });
        History {
            head: Some(Arc::new(Node {
                snapshot,
                index: self.len,
                prev: self.head.clone(),
                jump,
            })),
            len: self.len + 1,
        }
    }

    /// Entry `index`, counting from the oldest (0).
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        let mut node = self.head.as_deref()?;
        if index > node.index {
            return None;
        }
        while node.index > index {
            node = match node.jump.as_deref() {
                Some(jump) if jump.index >= index => jump,
                _ => node.prev.as_deref()?,
            };
        }
        Some(&node.snapshot)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.head.as_deref().map(|n| &n.snapshot)
    }
}

impl Drop for History {
    // Unlink iteratively so a long log does not recurse once per node.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => {
                    // Jump targets are still held through `prev`.
                    node.jump = None;
                    next = node.prev.take();
                }
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History").field("len", &self.len).finish()
    }
}

/// Commit the transition `before -> after`.
///
/// Unchanged content passes through untouched. A change while the file is
/// still loading is discarded and `before` comes back with a message.
/// Otherwise the pre-edit snapshot is pushed, and unless the edit itself moved
/// the history position (an undo), the position returns to the tip.
pub fn record(before: &Buffer, mut after: Buffer) -> (Buffer, Option<&'static str>) {
    if before.content == after.content {
        return (after, None);
    }
    if before.file.load_in_progress() {
        trace!(target: "state.undo", buffer = %before.id, "edit_rejected_while_loading");
        return (before.clone(), Some(EDIT_WHILE_LOADING));
    }
    after.history = after.history.push(Snapshot {
        content: before.content.clone(),
        cursor: before.cursor,
    });
    if before.history_pos == after.history_pos {
        after.history_pos = None;
    }
    trace!(
        target: "state.undo",
        buffer = %after.id,
        depth = after.history.len(),
        pos = ?after.history_pos,
        "push_snapshot"
    );
    (after, None)
}

/// Step one snapshot back from the current history position.
pub fn undo(mut buf: Buffer) -> Buffer {
    let idx = buf.history_pos.unwrap_or(buf.history.len());
    let Some(target) = idx.checked_sub(1) else {
        trace!(target: "state.undo", buffer = %buf.id, "undo_at_oldest");
        return buf;
    };
    if let Some(snapshot) = buf.history.get(target) {
        buf.content = snapshot.content.clone();
        buf.cursor = snapshot.cursor;
        buf.history_pos = Some(target);
        trace!(target: "state.undo", buffer = %buf.id, pos = target, depth = buf.history.len(), "undo_restore");
    }
    buf
}
