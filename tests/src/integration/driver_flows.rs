//! # Driver Flows
//!
//! Block checks, rollbacks, pool synchronisation and queries, exercised
//! through the bus against the in-memory store and pool.

#[cfg(test)]
mod tests {
    use crate::harness::{
        child_of, eventually, linked_chain, solo_driver, InMemoryChainStore, InMemoryMempool,
        FAILING_EXECER,
    };
    use consensus_driver::{ConsensusApi, ConsensusConfig, ConsensusError, BASE_DRIVER};
    use serde_json::json;
    use shared_bus::{BusClient, BusError, BusEvent, EventTopic, InMemoryBus};
    use shared_types::{BlockDetail, ChainExecutor, Reply, Transaction};
    use std::sync::Arc;
    use std::time::Duration;

    fn quiet() -> ConsensusConfig {
        ConsensusConfig {
            miner_start: false,
            ..Default::default()
        }
    }

    fn remote_code(result: Result<BusEvent, BusError>) -> String {
        match result {
            Err(BusError::Remote(remote)) => remote.code,
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_block_against_stored_parent() {
        let bus = Arc::new(InMemoryBus::new());
        let chain = linked_chain(11);
        let parent = chain[10].clone();
        let _store = InMemoryChainStore::spawn_with_chain(bus.clone(), chain);
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();
        assert_eq!(driver.current_height().unwrap(), 10);

        let good = child_of(&parent);
        let reply = bus
            .request(
                EventTopic::Consensus,
                BusEvent::CheckBlock(BlockDetail::unexecuted(good.clone())),
            )
            .await
            .unwrap();
        assert_eq!(reply, BusEvent::Reply(Reply::ok()));

        let mut forged = good;
        forged.parent_hash = [0xAB; 32];
        let code = remote_code(
            bus.request(
                EventTopic::Consensus,
                BusEvent::CheckBlock(BlockDetail::unexecuted(forged)),
            )
            .await,
        );
        assert_eq!(code, "invalid_parent_hash");
        driver.close();
    }

    #[tokio::test]
    async fn test_rollback_notification_refreshes_head() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn_with_chain(bus.clone(), linked_chain(6));
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();
        assert_eq!(driver.current_height().unwrap(), 5);

        store.rollback().await.unwrap();
        store.rollback().await.unwrap();
        let probe = driver.clone();
        assert!(
            eventually(Duration::from_secs(2), move || {
                probe.current_height().ok() == Some(3)
            })
            .await
        );
        assert_eq!(
            driver.current_block().unwrap().hash(),
            store.last_block().unwrap().hash()
        );
        driver.close();
    }

    #[tokio::test]
    async fn test_pool_sync_failure_keeps_commit() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let pool = InMemoryMempool::spawn(bus.clone());
        pool.reject_removals(true);

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();

        let mut block = child_of(&driver.current_block().unwrap());
        let bad = Transaction::new(FAILING_EXECER, vec![1], 1, 1);
        driver.add_txs_to_block(&mut block, vec![bad.clone()]);
        block.seal_tx_root();

        let outcome = driver.write_block(block).await.unwrap();
        assert_eq!(outcome.dropped, vec![bad.hash()]);
        assert!(matches!(
            outcome.pool_sync,
            Err(ConsensusError::PoolSyncFailure { count: 1, .. })
        ));
        assert_eq!(store.height(), Some(1));
        assert_eq!(driver.current_height().unwrap(), 1);
        assert!(pool.removals().is_empty());
        driver.close();
    }

    #[tokio::test]
    async fn test_store_rejection_leaves_head() {
        let bus = Arc::new(InMemoryBus::new());
        let _store = InMemoryChainStore::spawn_with_chain(bus.clone(), linked_chain(3));
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();

        let mut stale = child_of(&driver.current_block().unwrap());
        stale.height = 7;
        let err = driver.write_block(stale).await.unwrap_err();
        match err {
            ConsensusError::Remote(remote) => assert_eq!(remote.code, "not_on_tip"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(driver.current_height().unwrap(), 2);
        driver.close();
    }

    #[tokio::test]
    async fn test_queries_over_bus() {
        let bus = Arc::new(InMemoryBus::new());
        let _store = InMemoryChainStore::spawn_with_chain(bus.clone(), linked_chain(4));
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();

        let height = bus
            .request(
                EventTopic::Consensus,
                BusEvent::ConsensusQuery(ChainExecutor::new(BASE_DRIVER, "current_height")),
            )
            .await
            .unwrap();
        assert_eq!(height, BusEvent::QueryResult(json!(3)));

        let mining = bus
            .request(
                EventTopic::Consensus,
                BusEvent::ConsensusQuery(ChainExecutor::new(BASE_DRIVER, "is_mining")),
            )
            .await
            .unwrap();
        assert_eq!(mining, BusEvent::QueryResult(json!(false)));

        let genesis = bus
            .request(
                EventTopic::Consensus,
                BusEvent::ConsensusQuery(ChainExecutor::new("solo", "genesis_address")),
            )
            .await
            .unwrap();
        assert_eq!(
            genesis,
            BusEvent::QueryResult(json!(ConsensusConfig::default().genesis))
        );

        let code = remote_code(
            bus.request(
                EventTopic::Consensus,
                BusEvent::ConsensusQuery(ChainExecutor::new("pow", "difficulty")),
            )
            .await,
        );
        assert_eq!(code, "query_not_found");
        driver.close();
    }

    #[tokio::test]
    async fn test_unknown_event_is_unsupported() {
        let bus = Arc::new(InMemoryBus::new());
        let _store = InMemoryChainStore::spawn(bus.clone());
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(quiet());
        driver.start(bus.clone()).await.unwrap();

        let code = remote_code(
            bus.request(
                EventTopic::Consensus,
                BusEvent::Custom {
                    kind: "vote".into(),
                    data: json!({ "round": 1 }),
                },
            )
            .await,
        );
        assert_eq!(code, "unsupported_action");
        driver.close();
    }

    #[tokio::test]
    async fn test_driver_from_json_config() {
        let config = ConsensusConfig::from_json(
            r#"{ "name": "solo", "genesis": "addr-9", "miner_start": false }"#,
        )
        .unwrap();
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(config);
        driver.start(bus.clone()).await.unwrap();
        assert!(!driver.is_mining());
        let genesis = store.block(0).unwrap();
        assert_eq!(genesis.txs.len(), 1);
        assert!(String::from_utf8_lossy(&genesis.txs[0].payload).contains("addr-9"));
    }
}
