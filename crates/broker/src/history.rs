use relaymq_common::EventEnvelope;
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-topic bounded ring of recent event envelopes.
///
/// Not synchronized on its own; the owning topic is always reached through
/// the registry lock.
#[derive(Debug)]
pub struct HistoryBuffer {
    events: VecDeque<Arc<EventEnvelope>>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an envelope, evicting the oldest when full.
    pub fn append(&mut self, event: Arc<EventEnvelope>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// The last `min(n, len)` envelopes in insertion order.
    pub fn tail(&self, n: usize) -> Vec<Arc<EventEnvelope>> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
