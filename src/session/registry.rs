//! Explicit client registry keyed by (domain, task)
//!
//! Owned by the runtime context and injected where clients are looked
//! up; there is no ambient global state. `teardown` closes everything.

use super::client::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

type RegistryKey = (String, String);

#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<RegistryKey, Arc<Client>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the client for (domain, task), creating it on first use
    pub fn get_or_create<F>(&self, domain: &str, task: &str, make: F) -> Arc<Client>
    where
        F: FnOnce() -> Arc<Client>,
    {
        let key = (domain.to_string(), task.to_string());
        let mut clients = self.clients.lock().unwrap();
        if let Some(existing) = clients.get(&key) {
            return Arc::clone(existing);
        }
        info!(domain, task, "creating client");
        let client = make();
        clients.insert(key, Arc::clone(&client));
        client
    }

    pub fn get(&self, domain: &str, task: &str) -> Option<Arc<Client>> {
        self.clients
            .lock()
            .unwrap()
            .get(&(domain.to_string(), task.to_string()))
            .cloned()
    }

    /// Drop the registration; the client itself is returned for closing
    pub fn remove(&self, domain: &str, task: &str) -> Option<Arc<Client>> {
        self.clients
            .lock()
            .unwrap()
            .remove(&(domain.to_string(), task.to_string()))
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().unwrap().is_empty()
    }

    /// Close every registered client and clear the registry
    pub fn teardown(&self) {
        let drained: Vec<_> = {
            let mut clients = self.clients.lock().unwrap();
            clients.drain().collect()
        };
        for ((domain, task), client) in drained {
            info!(domain, task, "tearing down client");
            client.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::MockTransport;
    use crate::config::Config;
    use crate::session::client::ClientOptions;

    fn make_client() -> Arc<Client> {
        Client::new(
            ClientOptions::new("example.com"),
            Config::default(),
            Arc::new(MockTransport::new()),
        )
    }

    #[test]
    fn test_get_or_create_reuses() {
        let registry = ClientRegistry::new();
        let first = registry.get_or_create("example.com", "task-1", make_client);
        let second = registry.get_or_create("example.com", "task-1", make_client);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_keys_are_domain_and_task() {
        let registry = ClientRegistry::new();
        registry.get_or_create("example.com", "task-1", make_client);
        registry.get_or_create("example.com", "task-2", make_client);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("example.com", "task-1").is_some());
        assert!(registry.get("other.com", "task-1").is_none());
    }

    #[test]
    fn test_teardown_clears() {
        let registry = ClientRegistry::new();
        registry.get_or_create("example.com", "task-1", make_client);
        registry.teardown();
        assert!(registry.is_empty());
    }
}
