use super::ConsensusDriver;
use crate::ipc::IpcHandler;
use shared_bus::Subscription;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Drain the consensus subscription until shutdown or bus close.
///
/// Messages are handled one at a time; shutdown is observed between
/// messages, so an in-flight handler always finishes.
pub(super) async fn run(
    driver: Arc<ConsensusDriver>,
    mut subscription: Subscription,
    mut shutdown: watch::Receiver<bool>,
) {
    let handler = IpcHandler::new(driver);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            msg = subscription.recv() => match msg {
                Some(msg) => handler.handle(msg).await,
                None => break,
            },
        }
    }

    info!(topic = %subscription.topic(), "Consensus event loop stopped");
}
