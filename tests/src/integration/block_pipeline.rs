//! # Block Pipeline Flows
//!
//! Encoded blocks go through decode, header cache and store on a running
//! node, and survive the JSON-safe representation unchanged.
//!
//! ## Flows Tested
//!
//! 1. Blocks with transactions accepted on top of genesis
//! 2. Eviction, store fallback and rollback with refill
//! 3. Forked blocks rejected before reaching the store
//! 4. Block and transaction JSON round trips back to identical bytes

#[cfg(test)]
mod tests {
    use kc_03_header_cache::HeaderCacheApi;
    use kc_04_block_serde::{
        decode_block, deserialize_block, deserialize_transaction, encode_block,
        encode_transaction, seal_header, serialize_block, serialize_transaction,
        transaction_root, Block, DelegateRegistrationAsset, Transaction, TransferAsset, Vote,
        VoteAsset,
    };
    use node_runtime::{NodeConfig, NodeRuntime};
    use shared_types::BlockHeader;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn transfer(nonce: u64, fee: u64) -> Transaction {
        Transaction {
            nonce,
            fee,
            sender_public_key: [0x42; 32],
            asset: TransferAsset {
                amount: 10_000_000 + nonce,
                recipient_address: [0x07; 20],
                data: format!("payment #{nonce}"),
            }
            .into(),
            signatures: vec![vec![0x5A; 64]],
        }
    }

    fn mixed_payload(seed: u64) -> Vec<Transaction> {
        vec![
            transfer(seed, 100_000),
            Transaction {
                nonce: seed + 1,
                fee: 2_500_000_000,
                sender_public_key: [0x43; 32],
                asset: DelegateRegistrationAsset {
                    username: format!("delegate_{seed}"),
                }
                .into(),
                signatures: vec![vec![0x5B; 64]],
            },
            Transaction {
                nonce: seed + 2,
                fee: 1_000_000,
                sender_public_key: [0x44; 32],
                asset: VoteAsset {
                    votes: vec![
                        Vote {
                            delegate_address: [0x01; 20],
                            amount: 1_000_000_000,
                        },
                        Vote {
                            delegate_address: [0x02; 20],
                            amount: -500_000_000,
                        },
                    ],
                }
                .into(),
                signatures: vec![vec![0x5C; 64], Vec::new()],
            },
        ]
    }

    fn child_of(parent: &BlockHeader, payload: Vec<Transaction>) -> Block {
        let header = BlockHeader {
            height: parent.height + 1,
            previous_block_id: parent.id,
            timestamp: parent.timestamp + 10,
            transaction_root: transaction_root(&payload).unwrap(),
            total_fee: payload.iter().map(|tx| tx.fee).sum(),
            ..parent.clone()
        };
        Block {
            header: seal_header(header).unwrap(),
            payload,
        }
    }

    /// Accept `count` blocks on top of the node's tip, each carrying
    /// transactions. Returns the accepted blocks.
    async fn extend_chain(node: &NodeRuntime, count: u64) -> Vec<Block> {
        let mut tip = node.header_cache().get_last().await.unwrap();
        let mut accepted = Vec::new();
        for i in 0..count {
            let block = child_of(&tip, mixed_payload(i * 10));
            let decoded = node
                .accept_block(&encode_block(&block).unwrap())
                .await
                .unwrap();
            assert_eq!(decoded, block);
            tip = decoded.header.clone();
            accepted.push(decoded);
        }
        accepted
    }

    // =========================================================================
    // NODE PIPELINE
    // =========================================================================

    #[tokio::test]
    async fn test_blocks_with_transactions_accepted() {
        let node = NodeRuntime::start(NodeConfig::for_testing()).await.unwrap();

        let blocks = extend_chain(&node, 3).await;

        let tip = node.header_cache().get_last().await.unwrap();
        assert_eq!(tip, blocks[2].header);
        assert_eq!(node.store().len(), 4);
        assert_eq!(
            node.header_cache().get_by_id(&blocks[0].header.id).await.unwrap().height,
            1
        );

        node.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_evicted_heights_served_from_store() {
        let node = NodeRuntime::start(NodeConfig::for_testing()).await.unwrap();
        extend_chain(&node, 7).await;
        let cache = node.header_cache();

        // Testing bounds are 3..=5: the sixth header evicts down to three.
        assert_eq!(cache.cached_range().await, Some((3, 7)));

        node.store().reset_counters();
        let cached = cache.get_by_height_range(4, 7).await.unwrap();
        assert_eq!(cached.len(), 4);
        assert_eq!(node.store().call_count(), 0);

        let mixed = cache.get_by_height_range(1, 7).await.unwrap();
        assert_eq!(
            mixed.iter().map(|h| h.height).collect::<Vec<_>>(),
            (1..=7).collect::<Vec<_>>()
        );
        assert!(node.store().call_count() > 0);
        // Reads never backfill the window.
        assert_eq!(cache.cached_range().await, Some((3, 7)));

        node.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rollback_refills_from_store() {
        let node = NodeRuntime::start(NodeConfig::for_testing()).await.unwrap();
        let blocks = extend_chain(&node, 7).await;

        let tip = node.rollback_to(4).await.unwrap();

        assert_eq!(tip, blocks[3].header);
        assert_eq!(node.store().len(), 5);
        assert_eq!(node.header_cache().cached_range().await, Some((0, 4)));

        // The chain grows again from the rolled-back tip.
        let next = child_of(&tip, mixed_payload(99));
        node.accept_block(&encode_block(&next).unwrap())
            .await
            .unwrap();
        assert_eq!(node.header_cache().get_last().await.unwrap().height, 5);

        node.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_forked_block_not_stored() {
        let node = NodeRuntime::start(NodeConfig::for_testing()).await.unwrap();
        let blocks = extend_chain(&node, 2).await;

        let mut fork = child_of(&blocks[1].header, Vec::new());
        fork.header.previous_block_id = blocks[0].header.id;
        fork.header = seal_header(fork.header).unwrap();

        let result = node.accept_block(&encode_block(&fork).unwrap()).await;

        assert!(result.is_err());
        assert_eq!(node.store().len(), 3);
        assert_eq!(node.header_cache().get_last().await.unwrap(), blocks[1].header);

        node.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_bytes_rejected() {
        let node = NodeRuntime::start(NodeConfig::for_testing()).await.unwrap();

        assert!(node.accept_block(&[0xFF, 0x01, 0x02]).await.is_err());
        assert_eq!(node.store().len(), 1);

        node.shutdown().await.unwrap();
    }

    // =========================================================================
    // JSON-SAFE REPRESENTATION
    // =========================================================================

    #[test]
    fn test_block_json_round_trip_is_byte_identical() {
        let genesis = node_runtime::genesis_block(0).unwrap();
        let block = child_of(&genesis.header, mixed_payload(1));
        let bytes = encode_block(&block).unwrap();

        let text = serde_json::to_string(&serialize_block(&block).unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let restored = deserialize_block(&parsed).unwrap();

        assert_eq!(restored, block);
        assert_eq!(encode_block(&restored).unwrap(), bytes);
        assert_eq!(decode_block(&bytes).unwrap(), restored);
    }

    #[test]
    fn test_max_fee_survives_both_representations() {
        let tx = transfer(3, u64::MAX);

        let json = serialize_transaction(&tx).unwrap();
        assert_eq!(json["fee"], "18446744073709551615");
        assert_eq!(json["id"].as_str().unwrap().len(), 64);

        let restored = deserialize_transaction(&json).unwrap();
        assert_eq!(restored, tx);
        assert_eq!(
            encode_transaction(&restored).unwrap(),
            encode_transaction(&tx).unwrap()
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let genesis = node_runtime::genesis_block(0).unwrap();
        let block = child_of(&genesis.header, vec![transfer(1, 100)]);

        let mut json = serialize_block(&block).unwrap();
        json["payload"][0]["fee"] = serde_json::json!("101");

        assert!(deserialize_block(&json).is_err());
    }
}
