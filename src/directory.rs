//! Client directory: read-only lookup used to resolve `client_id → name`.
//!
//! The scheduling core never mutates the directory. `InMemoryDirectory`
//! carries the practice's demo roster.

use crate::models::Client;

/// Read-only source of clients.
pub trait ClientDirectory {
    fn list(&self) -> Vec<Client>;

    fn find(&self, id: &str) -> Option<Client> {
        self.list().into_iter().find(|c| c.id == id)
    }

    /// Resolves a client name, `None` when the id is unknown.
    fn name_of(&self, id: &str) -> Option<String> {
        self.find(id).map(|c| c.name)
    }
}

/// Directory backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    clients: Vec<Client>,
}

impl InMemoryDirectory {
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    /// Demo roster shown in the appointment form's client selector.
    pub fn demo() -> Self {
        Self::new(vec![
            Client::new("c1", "John Smith"),
            Client::new("c2", "Sarah Johnson"),
            Client::new("c3", "Robert Davis"),
            Client::new("c4", "Emily Wilson"),
            Client::new("c5", "Michael Brown"),
            Client::new("c6", "Jennifer Martinez"),
            Client::new("c7", "David Anderson"),
            Client::new("c8", "Lisa Taylor"),
        ])
    }
}

impl ClientDirectory for InMemoryDirectory {
    fn list(&self) -> Vec<Client> {
        self.clients.clone()
    }

    fn find(&self, id: &str) -> Option<Client> {
        self.clients.iter().find(|c| c.id == id).cloned()
    }
}
