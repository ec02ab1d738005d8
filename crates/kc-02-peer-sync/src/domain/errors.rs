//! # Domain Errors
//!
//! Every failure carries a numeric code so workers, the master and RPC
//! callers agree on what happened without parsing messages.

use std::fmt;

use thiserror::Error;

/// Numeric error codes shared by workers and the master.
pub mod codes {
    /// Remote call failed without a business code, or timed out.
    pub const TRANSPORT: u16 = 4000;
    /// Inbound request failed validation.
    pub const VALIDATION: u16 = 4001;
    /// Empty or missing argument.
    pub const INVALID_ARGUMENT: u16 = 4002;
    /// Peer object rejected by the master.
    pub const INVALID_PEER: u16 = 4100;
    /// Connection id does not match the one recorded for the nonce.
    pub const DIFFERENT_CONN_ID: u16 = 4101;
    /// Peer is already registered.
    pub const ALREADY_ADDED: u16 = 4102;
    /// Peer is already gone.
    pub const ALREADY_REMOVED: u16 = 4103;
    /// Auth key did not match.
    pub const UNAUTHORIZED: u16 = 4104;
}

/// Business rejection codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionCode {
    InvalidPeer,
    DifferentConnId,
    AlreadyAdded,
    AlreadyRemoved,
    Unauthorized,
}

impl RejectionCode {
    pub const fn code(self) -> u16 {
        match self {
            RejectionCode::InvalidPeer => codes::INVALID_PEER,
            RejectionCode::DifferentConnId => codes::DIFFERENT_CONN_ID,
            RejectionCode::AlreadyAdded => codes::ALREADY_ADDED,
            RejectionCode::AlreadyRemoved => codes::ALREADY_REMOVED,
            RejectionCode::Unauthorized => codes::UNAUTHORIZED,
        }
    }

    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            codes::INVALID_PEER => Some(RejectionCode::InvalidPeer),
            codes::DIFFERENT_CONN_ID => Some(RejectionCode::DifferentConnId),
            codes::ALREADY_ADDED => Some(RejectionCode::AlreadyAdded),
            codes::ALREADY_REMOVED => Some(RejectionCode::AlreadyRemoved),
            codes::UNAUTHORIZED => Some(RejectionCode::Unauthorized),
            _ => None,
        }
    }

    /// Default human-readable message.
    pub const fn message(self) -> &'static str {
        match self {
            RejectionCode::InvalidPeer => "Peer object is invalid",
            RejectionCode::DifferentConnId => "Connection id does not match the registered one",
            RejectionCode::AlreadyAdded => "Peer was already added",
            RejectionCode::AlreadyRemoved => "Peer was already removed",
            RejectionCode::Unauthorized => "Invalid auth key",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RejectionCode::InvalidPeer => "INVALID_PEER",
            RejectionCode::DifferentConnId => "DIFFERENT_CONN_ID",
            RejectionCode::AlreadyAdded => "ALREADY_ADDED",
            RejectionCode::AlreadyRemoved => "ALREADY_REMOVED",
            RejectionCode::Unauthorized => "UNAUTHORIZED",
        };
        write!(f, "{name}({})", self.code())
    }
}

/// Peer-sync error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerSyncError {
    /// Empty nonce or connection id.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed inbound request.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Rejected by the update rules or by the master.
    #[error("Rejected ({code}): {message}")]
    Rejected {
        /// Rejection code.
        code: RejectionCode,
        /// Human-readable message.
        message: String,
    },

    /// Master failed with a code outside the rejection set.
    #[error("Remote error {code}: {message}")]
    Remote {
        /// Numeric code reported by the master.
        code: u16,
        /// Message reported by the master.
        message: String,
    },

    /// Remote call failed without a code, or timed out. Local state was
    /// rolled back before this was returned.
    #[error("Transport error: {message}")]
    Transport {
        /// Underlying failure.
        message: String,
    },
}

impl PeerSyncError {
    /// Rejection with the default message for `code`.
    pub fn rejected(code: RejectionCode) -> Self {
        PeerSyncError::Rejected {
            code,
            message: code.message().to_string(),
        }
    }

    /// Numeric code of this error.
    pub fn code(&self) -> u16 {
        match self {
            PeerSyncError::InvalidArgument(_) => codes::INVALID_ARGUMENT,
            PeerSyncError::Validation(_) => codes::VALIDATION,
            PeerSyncError::Rejected { code, .. } => code.code(),
            PeerSyncError::Remote { code, .. } => *code,
            PeerSyncError::Transport { .. } => codes::TRANSPORT,
        }
    }

    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PeerSyncError::Transport { .. })
    }
}
