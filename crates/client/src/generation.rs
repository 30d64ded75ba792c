use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Ticket identifying one request in a sequence of superseding requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Monotonic request counter for one queryable view.
///
/// Take a ticket with [`begin`](Self::begin) before sending; when the
/// response arrives, apply it only if [`is_current`](Self::is_current)
/// still holds. Responses that resolve out of order are dropped instead of
/// overwriting newer state.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration {
    latest: Arc<AtomicU64>,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }

    pub fn latest(&self) -> Generation {
        Generation(self.latest.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_current() {
        let generations = RequestGeneration::new();
        let first = generations.begin();
        assert!(generations.is_current(first));

        let second = generations.begin();
        assert!(second > first);
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
        assert_eq!(generations.latest(), second);
    }

    #[test]
    fn clones_share_the_counter() {
        let generations = RequestGeneration::new();
        let view = generations.clone();
        let ticket = generations.begin();
        view.begin();
        assert!(!generations.is_current(ticket));
    }
}
