//! # Peer Update Rules
//!
//! Decision table resolving a peer update into one safe action from the
//! worker's local view and the master's view.
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `nonce_known` | registry has a nonce for the connection being operated on |
//! | `conn_id_known` | registry has a connection id for the peer's nonce |
//! | `remote_known` | master lists the peer |
//!
//! The table is total: every combination maps to exactly one action.

use super::entities::UpdateType;
use super::errors::RejectionCode;

/// Outcome of resolving an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert,
    Remove,
    Reject(RejectionCode),
}

/// Presence flags for one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub nonce_known: bool,
    pub conn_id_known: bool,
    pub remote_known: bool,
}

impl Presence {
    pub const fn new(nonce_known: bool, conn_id_known: bool, remote_known: bool) -> Self {
        Self {
            nonce_known,
            conn_id_known,
            remote_known,
        }
    }

    /// Row of this combination in a per-update-type table.
    const fn index(self) -> usize {
        ((!self.nonce_known) as usize) << 2
            | ((!self.conn_id_known) as usize) << 1
            | (!self.remote_known) as usize
    }
}

use Action::{Insert, Reject, Remove};
use RejectionCode::{AlreadyAdded, AlreadyRemoved, DifferentConnId};

/// Rows ordered (nonce, conn_id, remote) from (yes, yes, yes) down to
/// (no, no, no).
const INSERT_RULES: [Action; 8] = [
    Reject(AlreadyAdded),
    Insert,
    Reject(DifferentConnId),
    Insert,
    Insert,
    Insert,
    Insert,
    Insert,
];

const REMOVE_RULES: [Action; 8] = [
    Remove,
    Remove,
    Reject(DifferentConnId),
    Remove,
    Remove,
    Remove,
    Remove,
    Reject(AlreadyRemoved),
];

/// Resolve `update_type` against `presence`.
pub const fn resolve(update_type: UpdateType, presence: Presence) -> Action {
    match update_type {
        UpdateType::Insert => INSERT_RULES[presence.index()],
        UpdateType::Remove => REMOVE_RULES[presence.index()],
    }
}
