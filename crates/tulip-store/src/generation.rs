//! Request generation counter for stale-response discarding.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter; a response may commit only while its ticket is current.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request and get its ticket.
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }

    /// Mark every in-flight request stale.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let gen = Generation::new();
        let first = gen.begin();
        let second = gen.begin();
        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
    }

    #[test]
    fn test_invalidate_marks_all_stale() {
        let gen = Generation::new();
        let ticket = gen.begin();
        gen.invalidate();
        assert!(!gen.is_current(ticket));
    }
}
