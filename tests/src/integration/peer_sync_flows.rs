//! # Peer Sync Flows
//!
//! Workers reconcile their connection registries with one master peer book
//! over the channel transport, the way the node runtime wires them.
//!
//! ## Flows Tested
//!
//! 1. Connect, reconnect through another worker, disconnect on both
//! 2. Duplicate connect rejected without touching local or master state
//! 3. Master unreachable or refusing: local inserts are rolled back
//! 4. Socket-scoped external updates

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kc_02_peer_sync::test_utils::ScriptedOracle;
    use kc_02_peer_sync::{
        codes, spawn_master, Action, ChannelOracle, ConnectionRegistry, InMemoryPeerBook,
        PeerInfo, PeerState, PeerSyncConfig, PeerSyncError, PeerSyncService, PeerUpdateApi,
        RejectionCode, RemoteError, UpdateType,
    };
    use serde_json::json;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct Cluster {
        master: Arc<InMemoryPeerBook>,
        workers: Vec<Arc<PeerSyncService>>,
        master_task: JoinHandle<()>,
    }

    fn cluster(workers: usize) -> Cluster {
        let config = PeerSyncConfig::for_testing();
        let master = Arc::new(InMemoryPeerBook::new(config.auth_key.clone()));
        let (tx, master_task) = spawn_master(master.clone(), 16);

        let workers = (0..workers)
            .map(|i| {
                let oracle = Arc::new(ChannelOracle::new(tx.clone()));
                let config = PeerSyncConfig {
                    worker_id: format!("worker-{i}"),
                    ..config.clone()
                };
                Arc::new(PeerSyncService::new(oracle, config).unwrap())
            })
            .collect();

        Cluster {
            master,
            workers,
            master_task,
        }
    }

    fn peer(nonce: &str) -> PeerInfo {
        PeerInfo::new(nonce).with_address("10.0.0.7", 5001)
    }

    // =========================================================================
    // REGISTRY AND RULES
    // =========================================================================

    #[test]
    fn test_registry_add_then_remove() {
        let mut registry = ConnectionRegistry::new();

        registry.add("nonce-A", "conn-1").unwrap();
        assert_eq!(registry.get_nonce("conn-1"), Some("nonce-A"));
        assert_eq!(registry.get_connection_id("nonce-A"), Some("conn-1"));

        registry.remove("nonce-A").unwrap();
        assert_eq!(registry.get_nonce("conn-1"), None);
        assert_eq!(registry.get_connection_id("nonce-A"), None);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected_without_mutation() {
        let cluster = cluster(1);
        let worker = &cluster.workers[0];

        let first = worker
            .internal_update(UpdateType::Insert, peer("nonce-A"), "conn-1")
            .await
            .unwrap();
        assert_eq!(first, Action::Insert);

        let err = worker
            .internal_update(UpdateType::Insert, peer("nonce-A"), "conn-1")
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::ALREADY_ADDED);
        assert_eq!(worker.get_nonce("conn-1").as_deref(), Some("nonce-A"));
        assert_eq!(worker.registered_peers(), 1);
        assert_eq!(cluster.master.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_sends_nothing_to_master() {
        let oracle = Arc::new(ScriptedOracle::with_present(["nonce-A"]));
        let worker = PeerSyncService::new(oracle.clone(), PeerSyncConfig::for_testing()).unwrap();
        worker.insert(peer("nonce-A"), "conn-1").await.unwrap();
        let updates_before = oracle.update_count();

        let result = worker
            .internal_update(UpdateType::Insert, peer("nonce-A"), "conn-1")
            .await;

        assert!(matches!(
            result,
            Err(PeerSyncError::Rejected {
                code: RejectionCode::AlreadyAdded,
                ..
            })
        ));
        assert_eq!(oracle.update_count(), updates_before);
    }

    // =========================================================================
    // MULTI-WORKER LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_reconnect_through_second_worker() {
        let cluster = cluster(2);
        let (w0, w1) = (&cluster.workers[0], &cluster.workers[1]);

        w0.internal_update(UpdateType::Insert, peer("nonce-A"), "conn-1")
            .await
            .unwrap();
        assert_eq!(
            cluster.master.get("nonce-A").map(|p| p.state),
            Some(PeerState::Connected)
        );

        // The master already lists the peer; worker-1 has never seen it.
        let action = w1
            .internal_update(UpdateType::Insert, peer("nonce-A"), "conn-7")
            .await
            .unwrap();
        assert_eq!(action, Action::Insert);
        assert_eq!(w1.get_connection_id("nonce-A").as_deref(), Some("conn-7"));

        w0.internal_update(UpdateType::Remove, peer("nonce-A"), "conn-1")
            .await
            .unwrap();
        assert!(cluster.master.get("nonce-A").is_none());
        assert_eq!(w0.get_nonce("conn-1"), None);

        // Master already dropped the peer: the local entry still goes away
        // and the coded rejection is surfaced.
        let err = w1
            .internal_update(UpdateType::Remove, peer("nonce-A"), "conn-7")
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::ALREADY_REMOVED);
        assert_eq!(w1.get_connection_id("nonce-A"), None);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_peers() {
        let cluster = cluster(1);
        let worker = cluster.workers[0].clone();

        let tasks = (0..20)
            .map(|i| {
                let worker = worker.clone();
                tokio::spawn(async move {
                    worker
                        .internal_update(
                            UpdateType::Insert,
                            peer(&format!("nonce-{i}")),
                            &format!("conn-{i}"),
                        )
                        .await
                })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(worker.registered_peers(), 20);
        assert_eq!(cluster.master.len(), 20);
    }

    #[tokio::test]
    async fn test_master_stops_after_workers_drop() {
        let Cluster {
            master,
            workers,
            master_task,
        } = cluster(2);
        workers[0].insert(peer("nonce-A"), "conn-1").await.unwrap();

        drop(workers);
        master_task.await.unwrap();
        assert_eq!(master.len(), 1);
    }

    // =========================================================================
    // FAILURES AND ROLLBACK
    // =========================================================================

    #[tokio::test]
    async fn test_unreachable_master_rolls_back_insert() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let worker = PeerSyncService::new(
            Arc::new(ChannelOracle::new(tx)),
            PeerSyncConfig::for_testing(),
        )
        .unwrap();

        let err = worker.insert(peer("nonce-A"), "conn-1").await.unwrap_err();

        assert!(matches!(err, PeerSyncError::Transport { .. }));
        assert!(err.is_retryable());
        assert_eq!(worker.get_nonce("conn-1"), None);
        assert_eq!(worker.get_connection_id("nonce-A"), None);
    }

    #[tokio::test]
    async fn test_wrong_auth_key_is_unauthorized() {
        let master = Arc::new(InMemoryPeerBook::new("the-real-key"));
        let (tx, _task) = spawn_master(master.clone(), 4);
        let worker =
            PeerSyncService::new(Arc::new(ChannelOracle::new(tx)), PeerSyncConfig::for_testing())
                .unwrap();

        let err = worker.insert(peer("nonce-A"), "conn-1").await.unwrap_err();

        assert_eq!(err.code(), codes::UNAUTHORIZED);
        assert_eq!(worker.registered_peers(), 0);
        assert!(master.is_empty());
    }

    #[tokio::test]
    async fn test_uncoded_remove_failure_restores_entry() {
        let oracle = Arc::new(ScriptedOracle::new());
        let worker = PeerSyncService::new(oracle.clone(), PeerSyncConfig::for_testing()).unwrap();
        worker.insert(peer("nonce-A"), "conn-1").await.unwrap();

        oracle.fail_updates_with(RemoteError::uncoded("socket hang up"));
        let err = worker.remove(peer("nonce-A"), "conn-1").await.unwrap_err();

        assert!(matches!(err, PeerSyncError::Transport { .. }));
        assert_eq!(worker.get_nonce("conn-1").as_deref(), Some("nonce-A"));
    }

    // =========================================================================
    // EXTERNAL UPDATES
    // =========================================================================

    #[tokio::test]
    async fn test_external_update_reaches_master() {
        let cluster = cluster(1);
        let worker = &cluster.workers[0];
        worker.insert(PeerInfo::new("nonce-A"), "conn-1").await.unwrap();

        worker
            .external_update(&json!({
                "data": { "nonce": "nonce-A", "ip": "192.168.1.20", "wsPort": 7001, "height": 40 },
                "socketId": "conn-1",
                "workerId": "worker-0",
            }))
            .await
            .unwrap();

        let record = cluster.master.get("nonce-A").unwrap();
        assert_eq!(record.ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(record.ws_port, Some(7001));
        assert_eq!(record.metadata.get("height"), Some(&json!(40)));
    }

    #[tokio::test]
    async fn test_external_update_from_other_socket_rejected() {
        let cluster = cluster(1);
        let worker = &cluster.workers[0];
        worker.insert(PeerInfo::new("nonce-A"), "conn-1").await.unwrap();

        let err = worker
            .external_update(&json!({
                "data": { "nonce": "nonce-A" },
                "socketId": "conn-2",
                "workerId": "worker-0",
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::DIFFERENT_CONN_ID);
        assert!(cluster.master.get("nonce-A").unwrap().ip.is_none());
    }

    #[tokio::test]
    async fn test_malformed_external_update() {
        let cluster = cluster(1);

        let err = cluster.workers[0]
            .external_update(&json!({ "socketId": "conn-1", "workerId": "worker-0" }))
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::VALIDATION);
    }
}
