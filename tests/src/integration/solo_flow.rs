//! # Solo Production Flows
//!
//! The solo miner pulls from the pool, the store executes and commits, and
//! the driver prunes what the store refused.

#[cfg(test)]
mod tests {
    use crate::harness::{
        eventually, solo_driver, InMemoryChainStore, InMemoryMempool, FAILING_EXECER,
    };
    use consensus_driver::{ConsensusApi, ConsensusConfig};
    use shared_bus::{BusClient, BusEvent, EventTopic, InMemoryBus};
    use shared_types::{Reply, Transaction};
    use std::sync::Arc;
    use std::time::Duration;

    fn config() -> ConsensusConfig {
        ConsensusConfig {
            write_block_seconds: 1,
            ..Default::default()
        }
    }

    fn coins(n: u8) -> Transaction {
        Transaction::new("coins", vec![n], 1, n as u64)
    }

    #[tokio::test(start_paused = true)]
    async fn test_solo_commits_pool_txs_and_prunes_failures() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let pool = InMemoryMempool::spawn(bus.clone());

        let good: Vec<Transaction> = (1..=3).map(coins).collect();
        let bad = Transaction::new(FAILING_EXECER, vec![9], 1, 9);
        pool.push(good.iter().cloned().chain([bad.clone()]));

        let driver = solo_driver(config());
        driver.start(bus.clone()).await.unwrap();
        assert_eq!(store.height(), Some(0));

        assert!(eventually(Duration::from_secs(10), || store.height() == Some(1)).await);
        let block = store.block(1).unwrap();
        assert_eq!(block.txs, good);
        assert_eq!(block.parent_hash, store.block(0).unwrap().hash());
        assert_eq!(pool.removals(), vec![vec![bad.hash()]]);

        // Committed transactions stay in the pool but are filtered as
        // duplicates, so nothing else is produced.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.height(), Some(1));
        assert_eq!(driver.current_height().unwrap(), 1);

        driver.close();
        driver.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_solo_waits_for_sync_unless_forced() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let pool = InMemoryMempool::spawn(bus.clone());
        store.set_synced(false);
        pool.push([coins(1)]);

        let driver = solo_driver(config());
        driver.start(bus.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.height(), Some(0));

        store.set_synced(true);
        assert!(eventually(Duration::from_secs(5), || store.height() == Some(1)).await);
        driver.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_mining_ignores_sync() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let pool = InMemoryMempool::spawn(bus.clone());
        store.set_synced(false);
        pool.push([coins(1)]);

        let driver = solo_driver(ConsensusConfig {
            force_mining: true,
            ..config()
        });
        driver.start(bus.clone()).await.unwrap();
        assert!(eventually(Duration::from_secs(5), || store.height() == Some(1)).await);
        driver.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pool_produces_nothing_by_default() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let _pool = InMemoryMempool::spawn(bus.clone());

        let driver = solo_driver(config());
        driver.start(bus.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.height(), Some(0));
        driver.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_block_after_interval() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let _pool = InMemoryMempool::spawn(bus.clone());

        // Genesis time is years in the past, so the interval has elapsed.
        let driver = solo_driver(ConsensusConfig {
            empty_block_interval: 1,
            ..config()
        });
        driver.start(bus.clone()).await.unwrap();
        assert!(eventually(Duration::from_secs(5), || store.height() >= Some(1)).await);
        assert!(store.block(1).unwrap().txs.is_empty());
        driver.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_production_follows_miner_start() {
        let bus = Arc::new(InMemoryBus::new());
        let store = InMemoryChainStore::spawn(bus.clone());
        let pool = InMemoryMempool::spawn(bus.clone());
        pool.push([coins(1)]);

        let driver = solo_driver(ConsensusConfig {
            miner_start: false,
            ..config()
        });
        driver.start(bus.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.height(), Some(0));

        let reply = bus
            .request(EventTopic::Consensus, BusEvent::MinerStart)
            .await
            .unwrap();
        assert_eq!(reply, BusEvent::Reply(Reply::ok()));
        assert!(eventually(Duration::from_secs(5), || store.height() == Some(1)).await);
        driver.close();
    }
}
