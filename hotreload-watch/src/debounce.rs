//! Trailing-edge debouncer.
//!
//! Every touch re-arms the deadline, cancelling whatever was pending; the
//! batch fires once the window passes with no further touches. Bundlers
//! rewrite `main.js`, `manifest.json` and `styles.css` in quick succession,
//! and this collapses the burst into a single install.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    pending: BTreeSet<PathBuf>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            pending: BTreeSet::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a touched path and push the deadline out to `now + window`.
    pub fn touch(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path);
        self.deadline = Some(now + self.window);
    }

    /// Pending deadline, if any touches are waiting.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_idle(&self) -> bool {
        self.deadline.is_none()
    }

    /// Take the batch if the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<Vec<PathBuf>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(std::mem::take(&mut self.pending).into_iter().collect())
            }
            _ => None,
        }
    }
}
