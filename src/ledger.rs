//! In-memory record of already-forwarded posts
//!
//! The ledger is the dedup backbone of the relay: a post id that is in the
//! ledger is never delivered again for the lifetime of the run. It is seeded
//! once from the first successful wall fetch after a start, so the backlog
//! that existed before the start is never forwarded, and grows with every
//! processed tick. There is no removal; a run is bounded by process lifetime
//! and wall volumes are low-throughput, so unbounded growth is acceptable.
//!
//! The ledger is a plain struct with no interior synchronization. The
//! pipeline owns it behind a mutex and is the only writer (the active tick
//! or an active lifecycle transition).

use crate::types::{PostId, WallPost};
use std::collections::HashSet;

/// Set of post ids that have already been accepted for forwarding, plus the
/// highest id observed so far.
///
/// `highest()` returns `PostId(0)` until a baseline exists, which reads as
/// "forward everything going forward."
#[derive(Clone, Debug, Default)]
pub struct SeenLedger {
    seen: HashSet<i64>,
    highest: PostId,
}

impl SeenLedger {
    /// Create an empty ledger with no baseline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entire fetched page as already seen.
    ///
    /// Called once after the first fetch following a start. Every id is
    /// inserted and the highest becomes the page maximum (0 for an empty
    /// page).
    pub fn seed(&mut self, posts: &[WallPost]) {
        for post in posts {
            self.insert(post.id);
        }
    }

    /// True iff the id has never been accepted for forwarding.
    pub fn is_new(&self, id: PostId) -> bool {
        !self.seen.contains(&id.get())
    }

    /// Mark an id as seen, raising the highest watermark if it exceeds it.
    pub fn mark_seen(&mut self, id: PostId) {
        self.insert(id);
    }

    /// Highest id ever observed, `PostId(0)` while the ledger has no baseline.
    pub fn highest(&self) -> PostId {
        self.highest
    }

    /// Number of ids recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True iff no id has been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forget everything, returning to the no-baseline state.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.highest = PostId(0);
    }

    fn insert(&mut self, id: PostId) {
        self.seen.insert(id.get());
        if id.get() > self.highest.get() {
            self.highest = id;
        }
    }
}
