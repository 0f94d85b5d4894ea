//! Insertion-ordered dialog queue with priority lookup

use super::types::DialogId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    id: DialogId,
    priority: i32,
}

/// Registry of every dialog that has not been removed yet
#[derive(Debug, Default)]
pub struct DialogQueue {
    entries: Vec<QueueEntry>,
}

impl DialogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dialog; returns `false` if it is already queued
    pub fn queue(&mut self, id: DialogId, priority: i32) -> bool {
        if self.contains(id) {
            return false;
        }
        self.entries.push(QueueEntry { id, priority });
        true
    }

    /// Remove the first entry for `id`; returns `false` if absent
    pub fn unqueue(&mut self, id: DialogId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: DialogId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn all(&self) -> Vec<DialogId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn newest(&self) -> Option<DialogId> {
        self.entries.last().map(|entry| entry.id)
    }

    pub fn oldest(&self) -> Option<DialogId> {
        self.entries.first().map(|entry| entry.id)
    }

    /// Entry with the strictly greatest priority; the earliest one wins ties
    pub fn prioritized(&self) -> Option<DialogId> {
        let mut entries = self.entries.iter();
        let mut best = entries.next()?;
        for entry in entries {
            if entry.priority > best.priority {
                best = entry;
            }
        }
        Some(best.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> DialogId {
        DialogId::new(raw)
    }

    #[test]
    fn test_empty_queue() {
        let queue = DialogQueue::new();

        assert!(queue.is_empty());
        assert_eq!(queue.prioritized(), None);
        assert_eq!(queue.newest(), None);
        assert_eq!(queue.oldest(), None);
    }

    #[test]
    fn test_single_entry_is_prioritized() {
        let mut queue = DialogQueue::new();
        queue.queue(id(1), -5);

        assert_eq!(queue.prioritized(), Some(id(1)));
    }

    #[test]
    fn test_prioritized_prefers_earliest_on_ties() {
        let mut queue = DialogQueue::new();
        queue.queue(id(1), 1);
        queue.queue(id(2), 3);
        queue.queue(id(3), 3);
        queue.queue(id(4), 2);

        assert_eq!(queue.prioritized(), Some(id(2)));
    }

    #[test]
    fn test_newest_and_oldest() {
        let mut queue = DialogQueue::new();
        queue.queue(id(1), 1);
        queue.queue(id(2), 1);
        queue.queue(id(3), 1);

        assert_eq!(queue.oldest(), Some(id(1)));
        assert_eq!(queue.newest(), Some(id(3)));

        queue.unqueue(id(3));
        assert_eq!(queue.newest(), Some(id(2)));
    }

    #[test]
    fn test_queue_is_idempotent() {
        let mut queue = DialogQueue::new();

        assert!(queue.queue(id(1), 1));
        assert!(!queue.queue(id(1), 9));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.all(), vec![id(1)]);
    }

    #[test]
    fn test_unqueue_missing_is_noop() {
        let mut queue = DialogQueue::new();
        queue.queue(id(1), 1);

        assert!(!queue.unqueue(id(2)));
        assert!(queue.unqueue(id(1)));
        assert!(queue.is_empty());
    }
}
