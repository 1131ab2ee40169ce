use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info};

use crate::booking::BookingRegistry;

/// Discards booking sessions whose client went away without closing them.
pub struct SessionSweeper {
    bookings: BookingRegistry,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(bookings: BookingRegistry, interval: Duration) -> Self {
        Self { bookings, interval }
    }

    /// One pass over the registry. Returns how many sessions were dropped.
    pub async fn run_once(&self) -> usize {
        let removed = self.bookings.sweep_idle(Utc::now()).await;
        if removed == 0 {
            debug!("No idle booking sessions to sweep");
        } else {
            info!("🧹 Swept {} idle booking sessions", removed);
        }
        removed
    }

    /// Runs forever; meant to be spawned onto the runtime.
    pub async fn run(self) {
        info!("Session sweeper started, interval {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::events::mock_events;
    use crate::services::simulation::Simulation;

    #[tokio::test]
    async fn fresh_sessions_survive_a_sweep() {
        let bookings = BookingRegistry::new(Simulation::quiet(1), Duration::from_secs(60));
        bookings.open(mock_events().remove(1)).await;
        let sweeper = SessionSweeper::new(bookings.clone(), Duration::from_secs(1));
        assert_eq!(sweeper.run_once().await, 0);
        assert_eq!(bookings.len().await, 1);
    }

    #[tokio::test]
    async fn zero_timeout_sweeps_everything() {
        let bookings = BookingRegistry::new(Simulation::quiet(1), Duration::ZERO);
        bookings.open(mock_events().remove(1)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let sweeper = SessionSweeper::new(bookings.clone(), Duration::from_secs(1));
        assert_eq!(sweeper.run_once().await, 1);
        assert!(bookings.is_empty().await);
    }
}
