use crate::dispatch::Dispatcher;
use std::collections::{HashMap, HashSet};

/// Broker-side state for one client id.
///
/// The connection owns the session for lifetime purposes; the table only
/// holds the dispatcher handle bound by the most recent attach.
#[derive(Debug)]
pub struct SessionRecord {
    pub subscriptions: HashSet<String>,
    pub dispatcher: Dispatcher,
}

/// The session table. All access goes through the broker's sessions mutex.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<String, SessionRecord>,
}

impl SessionTable {
    /// Binds `dispatcher` as the current owner of `client_id`. Idempotent;
    /// an existing session keeps its subscriptions and is re-owned.
    pub fn attach(&mut self, client_id: &str, dispatcher: Dispatcher) {
        match self.sessions.get_mut(client_id) {
            Some(session) => session.dispatcher = dispatcher,
            None => {
                self.sessions.insert(
                    client_id.to_string(),
                    SessionRecord {
                        subscriptions: HashSet::new(),
                        dispatcher,
                    },
                );
            }
        }
    }

    /// Removes the session and returns its subscription set, but only if
    /// `owner` is still the bound dispatcher. A detach from a connection
    /// that has since been superseded by a rebind is a no-op, so a stale
    /// teardown cannot drop a live client's state.
    pub fn detach(&mut self, client_id: &str, owner: &Dispatcher) -> Option<HashSet<String>> {
        if self
            .sessions
            .get(client_id)
            .is_some_and(|s| s.dispatcher.same_queue(owner))
        {
            return self
                .sessions
                .remove(client_id)
                .map(|record| record.subscriptions);
        }
        None
    }

    pub fn get(&self, client_id: &str) -> Option<&SessionRecord> {
        self.sessions.get(client_id)
    }

    pub fn add_sub(&mut self, client_id: &str, topic: &str) -> bool {
        match self.sessions.get_mut(client_id) {
            Some(session) => {
                session.subscriptions.insert(topic.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove_sub(&mut self, client_id: &str, topic: &str) {
        if let Some(session) = self.sessions.get_mut(client_id) {
            session.subscriptions.remove(topic);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_ignores_stale_owner() {
        let mut table = SessionTable::default();
        let first = Dispatcher::new(8);
        let second = Dispatcher::new(8);

        table.attach("c1", first.clone());
        table.add_sub("c1", "weather");
        table.attach("c1", second.clone());

        // The superseded connection's teardown must not touch the session.
        assert!(table.detach("c1", &first).is_none());
        assert_eq!(table.len(), 1);

        let subs = table.detach("c1", &second).unwrap();
        assert!(subs.contains("weather"));
        assert!(table.is_empty());
    }
}
