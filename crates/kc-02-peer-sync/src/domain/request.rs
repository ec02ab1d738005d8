//! Inbound `updatePeer` request validation.
//!
//! ```json
//! {
//!   "data": { "nonce": "O2wTkjqplHII5wPv", "ip": "10.0.0.7", "wsPort": 5001, "height": 42 },
//!   "socketId": "sock-17",
//!   "workerId": "worker-2"
//! }
//! ```
//!
//! `address`/`port` are accepted as aliases of `ip`/`wsPort`. Unknown `data`
//! fields are kept as peer metadata.

use serde_json::{Map, Value};

use super::entities::{ConnectionId, PeerInfo};
use super::errors::PeerSyncError;

/// Longest accepted nonce.
pub const MAX_NONCE_LENGTH: usize = 64;

/// A validated update request from a remote peer.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePeerRequest {
    pub peer: PeerInfo,
    pub socket_id: ConnectionId,
    pub worker_id: String,
}

fn invalid(reason: impl Into<String>) -> PeerSyncError {
    PeerSyncError::Validation(reason.into())
}

fn non_empty_string(map: &Map<String, Value>, key: &str) -> Result<String, PeerSyncError> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(invalid(format!("{key} must not be empty"))),
        Some(_) => Err(invalid(format!("{key} must be a string"))),
        None => Err(invalid(format!("{key} is required"))),
    }
}

impl UpdatePeerRequest {
    pub fn from_json(request: &Value) -> Result<Self, PeerSyncError> {
        let root = request
            .as_object()
            .ok_or_else(|| invalid("request must be an object"))?;
        let data = root
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("data must be an object"))?;

        let nonce = non_empty_string(data, "nonce")?;
        if nonce.chars().count() > MAX_NONCE_LENGTH {
            return Err(invalid(format!(
                "nonce must be at most {MAX_NONCE_LENGTH} characters"
            )));
        }

        let mut peer = PeerInfo::new(nonce);
        for (key, value) in data {
            match key.as_str() {
                "nonce" => {}
                "ip" | "address" => {
                    peer.ip = Some(non_empty_string(data, key)?);
                }
                "wsPort" | "port" => {
                    let port = value
                        .as_u64()
                        .filter(|p| (1..=u64::from(u16::MAX)).contains(p))
                        .ok_or_else(|| invalid(format!("{key} must be an integer in 1..=65535")))?;
                    peer.ws_port = Some(port as u16);
                }
                _ => {
                    peer.metadata.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(Self {
            peer,
            socket_id: non_empty_string(root, "socketId")?,
            worker_id: non_empty_string(root, "workerId")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_request() {
        let request = UpdatePeerRequest::from_json(&json!({
            "data": { "nonce": "abc", "ip": "10.0.0.7", "wsPort": 5001, "height": 42 },
            "socketId": "sock-1",
            "workerId": "worker-1"
        }))
        .unwrap();

        assert_eq!(request.peer.nonce, "abc");
        assert_eq!(request.peer.address().as_deref(), Some("10.0.0.7:5001"));
        assert_eq!(request.peer.metadata.get("height"), Some(&json!(42)));
        assert_eq!(request.socket_id, "sock-1");
        assert_eq!(request.worker_id, "worker-1");
    }

    #[test]
    fn test_address_aliases() {
        let request = UpdatePeerRequest::from_json(&json!({
            "data": { "nonce": "abc", "address": "host", "port": 80 },
            "socketId": "s",
            "workerId": "w"
        }))
        .unwrap();
        assert_eq!(request.peer.address().as_deref(), Some("host:80"));
    }

    #[test]
    fn test_invalid_requests() {
        let long_nonce = "x".repeat(MAX_NONCE_LENGTH + 1);
        let cases = [
            json!("not an object"),
            json!({ "socketId": "s", "workerId": "w" }),
            json!({ "data": {}, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": "" }, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": long_nonce }, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": "n", "wsPort": 0 }, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": "n", "wsPort": 70000 }, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": "n", "ip": "" }, "socketId": "s", "workerId": "w" }),
            json!({ "data": { "nonce": "n" }, "socketId": "", "workerId": "w" }),
            json!({ "data": { "nonce": "n" }, "socketId": "s" }),
            json!({ "data": { "nonce": 7 }, "socketId": "s", "workerId": "w" }),
        ];

        for case in cases {
            assert!(
                matches!(
                    UpdatePeerRequest::from_json(&case),
                    Err(PeerSyncError::Validation(_))
                ),
                "accepted {case}"
            );
        }
    }

    #[test]
    fn test_nonce_length_boundary() {
        let nonce = "x".repeat(MAX_NONCE_LENGTH);
        let request = UpdatePeerRequest::from_json(&json!({
            "data": { "nonce": nonce },
            "socketId": "s",
            "workerId": "w"
        }));
        assert!(request.is_ok());
    }
}
