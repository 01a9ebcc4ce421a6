//! services/api/src/adapters/scheduler.rs
//!
//! A `ResetScheduler` backed by the tokio runtime. Each reset runs on its own
//! task after a fixed delay, or immediately once the server starts shutting down.

use daily_goals_core::ports::ResetScheduler;
use daily_goals_core::service::DayReset;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Clone)]
pub struct TokioResetScheduler {
    delay: Duration,
    shutdown: CancellationToken,
}

impl TokioResetScheduler {
    pub fn new(delay: Duration, shutdown: CancellationToken) -> Self {
        Self { delay, shutdown }
    }
}

impl ResetScheduler for TokioResetScheduler {
    fn schedule(&self, reset: DayReset) {
        let delay = self.delay;
        let shutdown = self.shutdown.clone();
        let user_id = reset.user_id();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.cancelled() => {
                    info!(%user_id, "Shutdown requested, running pending day reset now");
                }
            }
            if let Err(e) = reset.run().await {
                error!(%user_id, "Day reset failed: {:?}", e);
            }
        });
    }
}
