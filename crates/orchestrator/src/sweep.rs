//! Periodic idle-channel eviction.

use std::sync::Arc;
use std::time::Duration;

use brain_core::ContextStore;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Spawn a task that sweeps idle channels every `every`.
///
/// The first sweep happens one interval after spawning. Abort the returned
/// handle to stop sweeping.
pub fn spawn_sweeper(context: Arc<ContextStore>, every: Duration, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = context.sweep_idle(max_age).await;
            if evicted > 0 {
                info!("Evicted {} idle channels", evicted);
            } else {
                debug!("Idle sweep found nothing to evict");
            }
        }
    })
}
