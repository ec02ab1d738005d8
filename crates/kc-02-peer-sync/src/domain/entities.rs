//! Peer entities.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque peer session identifier.
pub type Nonce = String;

/// Local transport connection identifier.
pub type ConnectionId = String;

/// Connection state of a peer as seen by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeerState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Kind of peer update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateType {
    Insert,
    Remove,
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateType::Insert => write!(f, "INSERT"),
            UpdateType::Remove => write!(f, "REMOVE"),
        }
    }
}

/// A peer record.
///
/// Protocol fields the node does not interpret (`version`, `os`, `height`,
/// ...) ride along in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub nonce: Nonce,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_port: Option<u16>,
    #[serde(default)]
    pub state: PeerState,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl PeerInfo {
    pub fn new(nonce: impl Into<Nonce>) -> Self {
        Self {
            nonce: nonce.into(),
            ..Self::default()
        }
    }

    pub fn with_address(mut self, ip: impl Into<String>, ws_port: u16) -> Self {
        self.ip = Some(ip.into());
        self.ws_port = Some(ws_port);
        self
    }

    pub fn with_state(mut self, state: PeerState) -> Self {
        self.state = state;
        self
    }

    /// `ip:port` when both are known.
    pub fn address(&self) -> Option<String> {
        match (&self.ip, self.ws_port) {
            (Some(ip), Some(port)) => Some(format!("{ip}:{port}")),
            _ => None,
        }
    }
}
