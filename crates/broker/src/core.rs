use crate::dispatch::Dispatcher;
use crate::session::SessionTable;
use crate::topic::TopicRegistry;
use relaymq_common::{
    timestamp, validate_publish_message, BrokerConfig, BrokerError, EventEnvelope, Result,
    ServerFrame,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

/// Row returned by `list_topics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub name: String,
    pub subscribers: usize,
}

/// Per-topic counters returned by `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicStats {
    pub messages: u64,
    pub subscribers: usize,
}

/// Liveness summary returned by `health`.
///
/// `subscribers` sums subscriptions across topics with multiplicity, not
/// distinct clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub uptime_sec: u64,
    pub topics: usize,
    pub subscribers: usize,
}

/// The in-memory pub/sub core.
///
/// One broker value is created at process init and shared by reference with
/// every connection handler and control-plane route. Operations are
/// synchronous, hold the two state locks only for bounded CPU work, and
/// never touch I/O; delivery happens by enqueuing to per-session
/// [`Dispatcher`] queues after the locks are released.
///
/// Lock order when both are needed: `registry`, then `sessions`.
#[derive(Debug)]
pub struct Broker {
    registry: Mutex<TopicRegistry>,
    sessions: Mutex<SessionTable>,
    started_at: Instant,
    history_capacity: usize,
    queue_depth: usize,
}

impl Broker {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            registry: Mutex::new(TopicRegistry::default()),
            sessions: Mutex::new(SessionTable::default()),
            started_at: Instant::now(),
            history_capacity: config.history_capacity,
            queue_depth: config.dispatch_queue_depth,
        }
    }

    /// A fresh outbound queue sized for this broker's sessions.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.queue_depth)
    }

    // ---- session lifetime -------------------------------------------------

    /// Binds `dispatcher` as the current owner of `client_id`.
    pub fn attach(&self, client_id: &str, dispatcher: Dispatcher) {
        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .attach(client_id, dispatcher);
        debug!(client_id = %client_id, "session attached");
    }

    /// Tears down `client_id`'s session and every membership it holds.
    ///
    /// No-op unless `owner` is still the session's bound dispatcher, so a
    /// disconnect racing a rebind cannot drop the new owner's state.
    pub fn release(&self, client_id: &str, owner: &Dispatcher) {
        let subscriptions = self
            .sessions
            .lock()
            .expect("sessions lock poisoned")
            .detach(client_id, owner);

        let Some(subscriptions) = subscriptions else {
            return;
        };

        let mut registry = self.registry.lock().expect("registry lock poisoned");
        for topic in &subscriptions {
            if let Some(record) = registry.get_mut(topic) {
                record.subscribers.remove(client_id);
            }
        }
        info!(
            client_id = %client_id,
            subscriptions = subscriptions.len(),
            "session released"
        );
    }

    // ---- topic lifecycle --------------------------------------------------

    pub fn create_topic(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(BrokerError::BadRequest("topic name is required".to_string()));
        }

        let mut registry = self.registry.lock().expect("registry lock poisoned");
        if !registry.create(name, self.history_capacity) {
            return Err(BrokerError::TopicExists(name.to_string()));
        }
        info!(topic = %name, "topic created");
        Ok(())
    }

    /// Removes a topic, notifying every current subscriber with a
    /// `topic_deleted` info frame and dropping their memberships. The
    /// registry lock is held throughout, so no publish can interleave with
    /// the removal.
    pub fn delete_topic(&self, name: &str) -> Result<()> {
        let mut registry = self.registry.lock().expect("registry lock poisoned");
        let Some(record) = registry.delete(name) else {
            return Err(BrokerError::TopicNotFound(name.to_string()));
        };

        let mut sessions = self.sessions.lock().expect("sessions lock poisoned");
        for client_id in &record.subscribers {
            sessions.remove_sub(client_id, name);
            if let Some(session) = sessions.get(client_id) {
                session.dispatcher.enqueue(ServerFrame::topic_deleted(name));
            }
        }
        info!(
            topic = %name,
            notified = record.subscribers.len(),
            "topic deleted"
        );
        Ok(())
    }

    // ---- observability ----------------------------------------------------

    pub fn list_topics(&self) -> Vec<TopicSummary> {
        let registry = self.registry.lock().expect("registry lock poisoned");
        registry
            .iter()
            .map(|(name, record)| TopicSummary {
                name: name.clone(),
                subscribers: record.subscribers.len(),
            })
            .collect()
    }

    pub fn stats(&self) -> HashMap<String, TopicStats> {
        let registry = self.registry.lock().expect("registry lock poisoned");
        registry
            .iter()
            .map(|(name, record)| {
                (
                    name.clone(),
                    TopicStats {
                        messages: record.message_count,
                        subscribers: record.subscribers.len(),
                    },
                )
            })
            .collect()
    }

    pub fn health(&self) -> HealthSnapshot {
        let registry = self.registry.lock().expect("registry lock poisoned");
        HealthSnapshot {
            uptime_sec: self.started_at.elapsed().as_secs(),
            topics: registry.len(),
            subscribers: registry.total_subscriptions(),
        }
    }

    // ---- membership & delivery -------------------------------------------

    /// Adds `client_id` to `topic`, idempotently, and replays the last
    /// `last_n` retained events to its dispatcher before returning. Any
    /// publish that begins after this call returns is enqueued after the
    /// replay.
    pub fn subscribe(&self, client_id: &str, topic: &str, last_n: usize) -> Result<()> {
        let (replay, dispatcher) = {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            let Some(record) = registry.get_mut(topic) else {
                return Err(BrokerError::TopicNotFound(topic.to_string()));
            };

            let mut sessions = self.sessions.lock().expect("sessions lock poisoned");
            let Some(session) = sessions.get(client_id) else {
                return Err(BrokerError::Internal(format!(
                    "no session attached for client {client_id}"
                )));
            };
            let dispatcher = session.dispatcher.clone();

            record.subscribers.insert(client_id.to_string());
            sessions.add_sub(client_id, topic);

            let replay = if last_n > 0 {
                record.history.tail(last_n)
            } else {
                Vec::new()
            };
            (replay, dispatcher)
        };

        for event in replay {
            dispatcher.enqueue(ServerFrame::Event(event));
        }
        debug!(client_id = %client_id, topic = %topic, "subscribed");
        Ok(())
    }

    /// Drops the membership. `TOPIC_NOT_FOUND` only when the topic does not
    /// exist; removing an absent membership from a live topic is a no-op.
    pub fn unsubscribe(&self, client_id: &str, topic: &str) -> Result<()> {
        {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            let Some(record) = registry.get_mut(topic) else {
                return Err(BrokerError::TopicNotFound(topic.to_string()));
            };
            record.subscribers.remove(client_id);
        }

        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .remove_sub(client_id, topic);
        debug!(client_id = %client_id, topic = %topic, "unsubscribed");
        Ok(())
    }

    /// Validates and fans out one message: append to history, bump the
    /// counter, snapshot subscribers under the registry lock, then enqueue
    /// the shared envelope to each subscriber outside any lock. Never blocks
    /// on a slow consumer; zero subscribers is a success.
    pub fn publish(&self, topic: &str, message: serde_json::Value) -> Result<()> {
        let (envelope, targets) = {
            let mut registry = self.registry.lock().expect("registry lock poisoned");
            let Some(record) = registry.get_mut(topic) else {
                return Err(BrokerError::TopicNotFound(topic.to_string()));
            };

            validate_publish_message(&message).map_err(BrokerError::BadRequest)?;

            let envelope = Arc::new(EventEnvelope {
                topic: topic.to_string(),
                message,
                ts: timestamp(),
            });
            record.history.append(envelope.clone());
            record.message_count += 1;

            let targets: Vec<String> = record.subscribers.iter().cloned().collect();
            (envelope, targets)
        };

        let handles: Vec<Dispatcher> = {
            let sessions = self.sessions.lock().expect("sessions lock poisoned");
            targets
                .iter()
                .filter_map(|client_id| sessions.get(client_id))
                .map(|session| session.dispatcher.clone())
                .collect()
        };

        for handle in &handles {
            handle.enqueue(ServerFrame::Event(envelope.clone()));
        }
        debug!(topic = %topic, fanout = handles.len(), "published");
        Ok(())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(&BrokerConfig::default())
    }
}
