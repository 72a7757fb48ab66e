//! Keyed one-shot timers on the engine's logical millisecond clock.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

/// At most one pending deadline per key; scheduling an existing key replaces it.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    pending: BTreeMap<(u64, u64), K>,
    index: HashMap<K, (u64, u64)>,
    next_seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<K: Clone + Eq + Hash> TimerQueue<K> {
    pub fn schedule(&mut self, key: K, deadline_ms: u64) {
        self.cancel(&key);
        let slot = (deadline_ms, self.next_seq);
        self.next_seq += 1;
        self.pending.insert(slot, key.clone());
        self.index.insert(key, slot);
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.pending.remove(&slot);
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, K)> {
        let (&slot, _) = self.pending.iter().next()?;
        if slot.0 > now_ms {
            return None;
        }
        let key = self.pending.remove(&slot)?;
        self.index.remove(&key);
        Some((slot.0, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_the_pending_deadline() {
        let mut timers = TimerQueue::default();
        timers.schedule("hint", 500);
        timers.schedule("hint", 700);

        assert_eq!(timers.next_deadline(), Some(700));
        assert_eq!(timers.pop_due(600), None);
        assert_eq!(timers.pop_due(700), Some((700, "hint")));
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::default();
        timers.schedule("b", 300);
        timers.schedule("a", 100);
        timers.schedule("c", 300);

        assert_eq!(timers.next_deadline(), Some(100));
        assert_eq!(timers.pop_due(1_000), Some((100, "a")));
        assert_eq!(timers.pop_due(1_000), Some((300, "b")));
        assert_eq!(timers.pop_due(1_000), Some((300, "c")));
        assert_eq!(timers.pop_due(1_000), None);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::default();
        timers.schedule(7_u32, 50);
        assert!(timers.cancel(&7));
        assert!(!timers.cancel(&7));
        assert_eq!(timers.pop_due(u64::MAX), None);
    }
}
