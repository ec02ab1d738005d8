//! # Connection Registry
//!
//! Bidirectional map between local connection ids and peer nonces. The two
//! maps are exact inverses after every public call.
//!
//! `add` overwrites silently; callers check presence first through the
//! update rules.

use std::collections::HashMap;

use super::entities::{ConnectionId, Nonce};
use super::errors::PeerSyncError;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    nonce_by_connection: HashMap<ConnectionId, Nonce>,
    connection_by_nonce: HashMap<Nonce, ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_nonce(&self, connection_id: &str) -> Option<&str> {
        self.nonce_by_connection
            .get(connection_id)
            .map(String::as_str)
    }

    pub fn get_connection_id(&self, nonce: &str) -> Option<&str> {
        self.connection_by_nonce.get(nonce).map(String::as_str)
    }

    /// Map `nonce` to `connection_id`, replacing any previous pairing of
    /// either side.
    pub fn add(&mut self, nonce: &str, connection_id: &str) -> Result<(), PeerSyncError> {
        if nonce.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "nonce must not be empty".to_string(),
            ));
        }
        if connection_id.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "connection id must not be empty".to_string(),
            ));
        }

        // Drop stale partners so the maps stay inverse.
        if let Some(old_connection) = self.connection_by_nonce.remove(nonce) {
            self.nonce_by_connection.remove(&old_connection);
        }
        if let Some(old_nonce) = self.nonce_by_connection.remove(connection_id) {
            self.connection_by_nonce.remove(&old_nonce);
        }

        self.nonce_by_connection
            .insert(connection_id.to_string(), nonce.to_string());
        self.connection_by_nonce
            .insert(nonce.to_string(), connection_id.to_string());
        Ok(())
    }

    /// Remove `nonce` and its connection id. Unknown nonces are a no-op.
    /// Returns the connection id that was paired with it.
    pub fn remove(&mut self, nonce: &str) -> Result<Option<ConnectionId>, PeerSyncError> {
        if nonce.is_empty() {
            return Err(PeerSyncError::InvalidArgument(
                "nonce must not be empty".to_string(),
            ));
        }
        let connection_id = self.connection_by_nonce.remove(nonce);
        if let Some(connection_id) = &connection_id {
            self.nonce_by_connection.remove(connection_id);
        }
        Ok(connection_id)
    }

    /// Remove whatever nonce is bound to `connection_id` (socket teardown).
    pub fn remove_connection(&mut self, connection_id: &str) -> Option<Nonce> {
        let nonce = self.nonce_by_connection.remove(connection_id)?;
        self.connection_by_nonce.remove(&nonce);
        Some(nonce)
    }

    pub fn len(&self) -> usize {
        self.connection_by_nonce.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_by_nonce.is_empty()
    }

    pub fn clear(&mut self) {
        self.nonce_by_connection.clear();
        self.connection_by_nonce.clear();
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.nonce_by_connection.len() == self.connection_by_nonce.len()
            && self
                .nonce_by_connection
                .iter()
                .all(|(c, n)| self.connection_by_nonce.get(n) == Some(c))
    }
}
