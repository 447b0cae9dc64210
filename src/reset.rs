use crate::store::PlayerStore;
use chrono::Utc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Clears every protection list once per UTC calendar day. The interval is a
/// plain poll; the date comparison in the store keeps the clear idempotent
/// within a day, and the first tick fires immediately at startup.
pub struct DailyResetTask {
    store: PlayerStore,
    poll_interval: Duration,
}

impl DailyResetTask {
    pub fn new(store: PlayerStore, poll_interval_secs: u64) -> Self {
        Self {
            store,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }

    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = self.check() {
                error!("Daily reset cycle failed: {}", e);
            }
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        let today = Utc::now().date_naive();
        if self.store.clear_protection_if_new_day(today)? {
            info!("Protection lists cleared for {}", today);
        }
        Ok(())
    }
}
