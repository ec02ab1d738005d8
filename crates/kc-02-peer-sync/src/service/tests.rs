//! # Peer Sync Service Tests

use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::domain::{codes, Action, PeerInfo, PeerState, PeerSyncError, RejectionCode, UpdateType};
use crate::ports::inbound::PeerUpdateApi;
use crate::ports::outbound::RemoteError;
use crate::test_utils::ScriptedOracle;
use serde_json::json;

fn make_service() -> (Arc<PeerSyncService>, Arc<ScriptedOracle>) {
    let oracle = Arc::new(ScriptedOracle::new());
    let service = PeerSyncService::new(oracle.clone(), PeerSyncConfig::for_testing()).unwrap();
    (Arc::new(service), oracle)
}

fn rejected(code: RejectionCode) -> PeerSyncError {
    PeerSyncError::rejected(code)
}

// =============================================================================
// insert
// =============================================================================

#[tokio::test]
async fn test_insert_registers_locally_and_remotely() {
    let (service, oracle) = make_service();

    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();

    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
    assert_eq!(service.get_connection_id("n1").as_deref(), Some("c1"));
    let updates = oracle.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, UpdateType::Insert);
    assert_eq!(updates[0].1.state, PeerState::Connected);
}

#[tokio::test]
async fn test_insert_uncoded_failure_rolls_back_as_transport() {
    let (service, oracle) = make_service();
    oracle.fail_updates_with(RemoteError::uncoded("connection reset"));

    let err = service.insert(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert_eq!(
        err,
        PeerSyncError::Transport {
            message: "connection reset".to_string()
        }
    );
    assert_eq!(err.code(), codes::TRANSPORT);
    assert_eq!(service.get_nonce("c1"), None);
    assert_eq!(service.get_connection_id("n1"), None);
}

#[tokio::test]
async fn test_insert_coded_failure_rolls_back_as_rejection() {
    let (service, oracle) = make_service();
    oracle.fail_updates_with(RemoteError::coded(codes::UNAUTHORIZED, "bad key"));

    let err = service.insert(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert_eq!(
        err,
        PeerSyncError::Rejected {
            code: RejectionCode::Unauthorized,
            message: "bad key".to_string()
        }
    );
    assert_eq!(service.registered_peers(), 0);
}

#[tokio::test]
async fn test_insert_unknown_code_is_remote_error() {
    let (service, oracle) = make_service();
    oracle.fail_updates_with(RemoteError::coded(5000, "master crashed"));

    let err = service.insert(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert!(matches!(err, PeerSyncError::Remote { code: 5000, .. }));
    assert_eq!(service.registered_peers(), 0);
}

#[tokio::test]
async fn test_insert_rollback_restores_displaced_pairing() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();
    oracle.fail_updates_with(RemoteError::uncoded("down"));

    // Moving n1 to c2 fails, so n1 must still be on c1.
    assert!(service.insert(PeerInfo::new("n1"), "c2").await.is_err());

    assert_eq!(service.get_connection_id("n1").as_deref(), Some("c1"));
    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
    assert_eq!(service.get_nonce("c2"), None);
}

#[tokio::test]
async fn test_insert_timeout_rolls_back() {
    let (service, oracle) = make_service();
    oracle.set_delay(Duration::from_secs(5));

    let err = service.insert(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert!(matches!(err, PeerSyncError::Transport { .. }));
    assert!(err.is_retryable());
    assert_eq!(service.get_nonce("c1"), None);
}

#[tokio::test]
async fn test_insert_rejects_empty_arguments_without_remote_call() {
    let (service, oracle) = make_service();

    assert!(matches!(
        service.insert(PeerInfo::new(""), "c1").await,
        Err(PeerSyncError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.insert(PeerInfo::new("n1"), "").await,
        Err(PeerSyncError::InvalidArgument(_))
    ));
    assert_eq!(oracle.update_count(), 0);
}

// =============================================================================
// remove
// =============================================================================

#[tokio::test]
async fn test_remove_unregisters_locally_and_remotely() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();

    service.remove(PeerInfo::new("n1"), "c1").await.unwrap();

    assert_eq!(service.get_nonce("c1"), None);
    assert!(!oracle.is_present("n1"));
    assert_eq!(oracle.updates()[1].0, UpdateType::Remove);
}

#[tokio::test]
async fn test_remove_uncoded_failure_restores_entry() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();
    oracle.fail_updates_with(RemoteError::uncoded("timeout"));

    let err = service.remove(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert!(matches!(err, PeerSyncError::Transport { .. }));
    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
    assert_eq!(service.get_connection_id("n1").as_deref(), Some("c1"));
}

#[tokio::test]
async fn test_remove_coded_failure_keeps_removal() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();
    oracle.fail_updates_with(RemoteError::coded(codes::ALREADY_REMOVED, "gone"));

    let err = service.remove(PeerInfo::new("n1"), "c1").await.unwrap_err();

    assert!(matches!(
        err,
        PeerSyncError::Rejected {
            code: RejectionCode::AlreadyRemoved,
            ..
        }
    ));
    assert_eq!(service.get_nonce("c1"), None);
}

#[tokio::test]
async fn test_failed_insert_keeps_pairing_made_meanwhile() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("y"), "c1").await.unwrap();
    oracle.fail_updates_for("x", RemoteError::uncoded("reset"));
    oracle.set_delay(Duration::from_millis(50));

    // x takes c1 from y, then y moves to c2 while x waits on the master.
    let takeover = {
        let service = service.clone();
        tokio::spawn(async move { service.insert(PeerInfo::new("x"), "c1").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(service.get_nonce("c1").as_deref(), Some("x"));
    service.insert(PeerInfo::new("y"), "c2").await.unwrap();

    assert!(takeover.await.unwrap().is_err());
    assert_eq!(service.get_connection_id("y").as_deref(), Some("c2"));
    assert_eq!(service.get_nonce("c2").as_deref(), Some("y"));
    assert_eq!(service.get_nonce("c1"), None);
    assert_eq!(service.get_connection_id("x"), None);
}

#[tokio::test]
async fn test_failed_insert_restores_untouched_pairing() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("y"), "c1").await.unwrap();
    oracle.fail_updates_for("x", RemoteError::uncoded("reset"));

    assert!(service.insert(PeerInfo::new("x"), "c1").await.is_err());

    assert_eq!(service.get_nonce("c1").as_deref(), Some("y"));
    assert_eq!(service.get_connection_id("x"), None);
}

#[tokio::test]
async fn test_failed_remove_does_not_steal_rebound_connection() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("a"), "c1").await.unwrap();
    oracle.fail_updates_for("a", RemoteError::uncoded("reset"));
    oracle.set_delay(Duration::from_millis(50));

    let removal = {
        let service = service.clone();
        tokio::spawn(async move { service.remove(PeerInfo::new("a"), "c1").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    service.insert(PeerInfo::new("b"), "c1").await.unwrap();

    assert!(matches!(
        removal.await.unwrap(),
        Err(PeerSyncError::Transport { .. })
    ));
    assert_eq!(service.get_nonce("c1").as_deref(), Some("b"));
    assert_eq!(service.get_connection_id("a"), None);
}

// =============================================================================
// block
// =============================================================================

#[tokio::test]
async fn test_block_has_no_side_effects() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();

    let err = service
        .block(RejectionCode::DifferentConnId, &PeerInfo::new("n1"), "c1")
        .unwrap_err();

    assert_eq!(err, rejected(RejectionCode::DifferentConnId));
    assert_eq!(oracle.update_count(), 1);
    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
}

// =============================================================================
// internal_update
// =============================================================================

#[tokio::test]
async fn test_internal_insert_of_new_peer() {
    let (service, oracle) = make_service();

    let action = service
        .internal_update(UpdateType::Insert, PeerInfo::new("n1"), "c1")
        .await
        .unwrap();

    assert_eq!(action, Action::Insert);
    assert_eq!(oracle.presence_query_count(), 1);
    assert!(oracle.is_present("n1"));
    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
}

#[tokio::test]
async fn test_internal_insert_already_added_changes_nothing() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();

    let err = service
        .internal_update(UpdateType::Insert, PeerInfo::new("n1"), "c1")
        .await
        .unwrap_err();

    assert_eq!(err, rejected(RejectionCode::AlreadyAdded));
    assert_eq!(oracle.update_count(), 1);
    assert_eq!(service.registered_peers(), 1);
}

#[tokio::test]
async fn test_internal_insert_different_conn_id() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();
    oracle.set_present("n2", true);

    // c1 already belongs to n1; n2 is not bound locally but the master knows it.
    let err = service
        .internal_update(UpdateType::Insert, PeerInfo::new("n2"), "c1")
        .await
        .unwrap_err();

    assert_eq!(err, rejected(RejectionCode::DifferentConnId));
    assert_eq!(service.get_nonce("c1").as_deref(), Some("n1"));
}

#[tokio::test]
async fn test_internal_remove_of_registered_peer() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();

    let action = service
        .internal_update(UpdateType::Remove, PeerInfo::new("n1"), "c1")
        .await
        .unwrap();

    assert_eq!(action, Action::Remove);
    assert_eq!(service.registered_peers(), 0);
    assert!(!oracle.is_present("n1"));
}

#[tokio::test]
async fn test_internal_remove_unknown_peer() {
    let (service, oracle) = make_service();

    let err = service
        .internal_update(UpdateType::Remove, PeerInfo::new("n1"), "c1")
        .await
        .unwrap_err();

    assert_eq!(err, rejected(RejectionCode::AlreadyRemoved));
    assert_eq!(oracle.update_count(), 0);
}

#[tokio::test]
async fn test_internal_remove_known_only_remotely() {
    let (service, oracle) = make_service();
    oracle.set_present("n1", true);

    let action = service
        .internal_update(UpdateType::Remove, PeerInfo::new("n1"), "c1")
        .await
        .unwrap();

    assert_eq!(action, Action::Remove);
    assert!(!oracle.is_present("n1"));
}

#[tokio::test]
async fn test_internal_update_presence_failure_is_transport() {
    let (service, oracle) = make_service();
    oracle.fail_presence_with(RemoteError::uncoded("master unreachable"));

    let err = service
        .internal_update(UpdateType::Insert, PeerInfo::new("n1"), "c1")
        .await
        .unwrap_err();

    assert!(matches!(err, PeerSyncError::Transport { .. }));
    assert_eq!(oracle.update_count(), 0);
    assert_eq!(service.registered_peers(), 0);
}

#[tokio::test]
async fn test_same_nonce_updates_are_serialized() {
    let (service, oracle) = make_service();
    oracle.set_delay(Duration::from_millis(30));

    let spawn_insert = |service: Arc<PeerSyncService>| {
        tokio::spawn(async move {
            service
                .internal_update(UpdateType::Insert, PeerInfo::new("n1"), "c1")
                .await
        })
    };
    let first = spawn_insert(service.clone());
    let second = spawn_insert(service.clone());

    let results = [first.await.unwrap(), second.await.unwrap()];

    let inserted = results.iter().filter(|r| r.is_ok()).count();
    let already_added = results
        .iter()
        .filter(|r| **r == Err(rejected(RejectionCode::AlreadyAdded)))
        .count();
    assert_eq!(inserted, 1);
    assert_eq!(already_added, 1);
    assert_eq!(oracle.update_count(), 1);
}

// =============================================================================
// external_update
// =============================================================================

#[tokio::test]
async fn test_external_update_from_registered_socket() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "sock-1").await.unwrap();

    service
        .external_update(&json!({
            "data": { "nonce": "n1", "ip": "10.0.0.9", "wsPort": 7001, "height": 12 },
            "socketId": "sock-1",
            "workerId": "worker-1"
        }))
        .await
        .unwrap();

    let updates = oracle.updates();
    assert_eq!(updates.len(), 2);
    let (update_type, peer) = &updates[1];
    assert_eq!(*update_type, UpdateType::Insert);
    assert_eq!(peer.address().as_deref(), Some("10.0.0.9:7001"));
    assert_eq!(peer.metadata.get("height"), Some(&json!(12)));
}

#[tokio::test]
async fn test_external_update_from_other_socket_rejected() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "sock-1").await.unwrap();

    let err = service
        .external_update(&json!({
            "data": { "nonce": "n1" },
            "socketId": "sock-2",
            "workerId": "worker-1"
        }))
        .await
        .unwrap_err();

    assert_eq!(err, rejected(RejectionCode::DifferentConnId));
    assert_eq!(oracle.update_count(), 1);
}

#[tokio::test]
async fn test_external_update_invalid_request() {
    let (service, oracle) = make_service();

    let err = service
        .external_update(&json!({ "data": { "nonce": "" }, "socketId": "s", "workerId": "w" }))
        .await
        .unwrap_err();

    assert!(matches!(err, PeerSyncError::Validation(_)));
    assert_eq!(err.code(), codes::VALIDATION);
    assert_eq!(oracle.update_count(), 0);
}

#[tokio::test]
async fn test_external_update_remote_failure_leaves_registry() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "sock-1").await.unwrap();
    oracle.fail_updates_with(RemoteError::uncoded("down"));

    let err = service
        .external_update(&json!({ "data": { "nonce": "n1" }, "socketId": "sock-1", "workerId": "w" }))
        .await
        .unwrap_err();

    assert!(matches!(err, PeerSyncError::Transport { .. }));
    assert_eq!(service.get_nonce("sock-1").as_deref(), Some("n1"));
}

// =============================================================================
// Local housekeeping
// =============================================================================

#[tokio::test]
async fn test_forget_connection_and_reset() {
    let (service, oracle) = make_service();
    service.insert(PeerInfo::new("n1"), "c1").await.unwrap();
    service.insert(PeerInfo::new("n2"), "c2").await.unwrap();

    assert_eq!(service.forget_connection("c1").as_deref(), Some("n1"));
    assert_eq!(service.get_connection_id("n1"), None);
    assert!(oracle.is_present("n1"));

    service.reset();
    assert_eq!(service.registered_peers(), 0);
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut config = PeerSyncConfig::for_testing();
    config.auth_key.clear();
    assert!(PeerSyncService::new(Arc::new(ScriptedOracle::new()), config).is_err());
}
