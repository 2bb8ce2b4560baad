use crate::history::HistoryBuffer;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Authoritative per-topic state. Reached only through the registry lock.
#[derive(Debug)]
pub struct TopicRecord {
    pub created_at: DateTime<Utc>,
    pub message_count: u64,
    pub subscribers: HashSet<String>,
    pub history: HistoryBuffer,
}

impl TopicRecord {
    fn new(history_capacity: usize) -> Self {
        Self {
            created_at: Utc::now(),
            message_count: 0,
            subscribers: HashSet::new(),
            history: HistoryBuffer::new(history_capacity),
        }
    }
}

/// The topic table. All access goes through the broker's registry mutex.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: HashMap<String, TopicRecord>,
}

impl TopicRegistry {
    /// Returns false when the name is already taken.
    pub fn create(&mut self, name: &str, history_capacity: usize) -> bool {
        if self.topics.contains_key(name) {
            return false;
        }
        self.topics
            .insert(name.to_string(), TopicRecord::new(history_capacity));
        true
    }

    /// Removes a topic, handing back its record so the caller can notify the
    /// affected subscribers.
    pub fn delete(&mut self, name: &str) -> Option<TopicRecord> {
        self.topics.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&TopicRecord> {
        self.topics.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TopicRecord> {
        self.topics.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TopicRecord)> {
        self.topics.iter()
    }

    /// Subscriptions summed with multiplicity across topics.
    pub fn total_subscriptions(&self) -> usize {
        self.topics.values().map(|t| t.subscribers.len()).sum()
    }
}
