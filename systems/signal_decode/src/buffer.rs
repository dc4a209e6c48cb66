//! Time-windowed queue of recent coordinate-track signals.

use std::time::Duration;

use beam_maze_core::{RawSignal, Timestamp};

/// Hard cap on buffered signals; the window prune keeps the buffer far
/// smaller in practice, this bound only guards against a stalled clock.
const MAX_BUFFERED: usize = 16;

/// Bounded, sliding-window queue of recent raw signals.
///
/// Entries are kept in arrival order. Window membership is always computed
/// from timestamp values, so a jittered arrival carrying a slightly older
/// timestamp is pruned or retained by the same rule as an in-order one.
#[derive(Clone, Debug)]
pub(crate) struct SignalBuffer {
    entries: Vec<RawSignal>,
    window: Duration,
}

impl SignalBuffer {
    pub(crate) const fn new(window: Duration) -> Self {
        Self {
            entries: Vec::new(),
            window,
        }
    }

    /// Drops entries whose timestamp lies more than one window before the
    /// reference instant. Entries newer than the reference are kept.
    pub(crate) fn prune_stale(&mut self, reference: Timestamp) {
        let window = self.window;
        self.entries.retain(|entry| {
            reference
                .checked_since(entry.timestamp)
                .map_or(true, |age| age <= window)
        });
    }

    pub(crate) fn push(&mut self, signal: RawSignal) {
        if self.entries.len() >= MAX_BUFFERED {
            let _ = self.entries.remove(0);
        }
        self.entries.push(signal);
    }

    /// The two most recently arrived entries, in arrival order.
    pub(crate) fn recent_pair(&self) -> Option<(RawSignal, RawSignal)> {
        match self.entries.as_slice() {
            [.., first, second] => Some((*first, *second)),
            _ => None,
        }
    }

    /// Collapses the buffer to its most recent arrival so a fresh pairing
    /// can begin from it.
    pub(crate) fn retain_latest(&mut self) {
        if let Some(latest) = self.entries.pop() {
            self.entries.clear();
            self.entries.push(latest);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
