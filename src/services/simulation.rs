//! simulation.rs
//!
//! Artificial latency and randomized faults shared by every service.
//!
//! Each fault site mirrors one deliberately broken interaction of the demo
//! product: a handler that ignores the request, reports a wrong value, or
//! claims the feature is temporarily unavailable. Fault injection can be
//! switched off as a whole, in which case every operation behaves correctly.
//! Faults never break the booking invariants (seat limit, price total, form
//! validation); they only make an operation refuse or misreport.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::warn;

use crate::config::SimulationConfig;

/// Shown in place of a real message when a fault swallows it.
pub const UNDEFINED: &str = "undefined";

/// Places where the product misbehaves on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultSite {
    /// Events list fails to load.
    EventsLoad,
    /// Featured events come back empty.
    FeaturedEmpty,
    /// A matching event is dropped from search results.
    SearchMiss,
    /// The seats tab ignores the click.
    SeatsTab,
    /// The seat map fails to render.
    SeatGrid,
    /// The booking submit button does nothing.
    BookingSubmit,
    /// Redirect to the tickets view after confirmation never happens.
    Redirect,
    /// Ticket list comes back empty.
    TicketsEmpty,
    TicketCancel,
    /// Download message is replaced by "undefined".
    TicketDownload,
    /// Profile save message is replaced by "undefined".
    ProfileSave,
    AccountDelete,
    /// The theme selector never opens.
    ThemeSelector,
    /// Quick-book message is replaced by "undefined".
    QuickBook,
    /// Wishlist log records "undefined" instead of the event id.
    WishlistLog,
    EventShare,
}

impl FaultSite {
    pub const fn probability(self) -> f64 {
        match self {
            FaultSite::EventsLoad => 0.1,
            FaultSite::FeaturedEmpty => 0.2,
            FaultSite::SearchMiss => 0.2,
            FaultSite::SeatsTab => 0.3,
            FaultSite::SeatGrid => 0.2,
            FaultSite::BookingSubmit => 0.2,
            FaultSite::Redirect => 0.3,
            FaultSite::TicketsEmpty => 0.2,
            FaultSite::TicketCancel => 0.3,
            FaultSite::TicketDownload => 0.3,
            FaultSite::ProfileSave => 0.3,
            FaultSite::AccountDelete => 0.5,
            FaultSite::ThemeSelector => 1.0,
            FaultSite::QuickBook => 0.3,
            FaultSite::WishlistLog => 0.2,
            FaultSite::EventShare => 0.5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FaultSite::EventsLoad => "events failed to load",
            FaultSite::FeaturedEmpty => "featured events returned empty",
            FaultSite::SearchMiss => "search dropped a matching event",
            FaultSite::SeatsTab => "seats tab not responding",
            FaultSite::SeatGrid => "seat grid failed to load",
            FaultSite::BookingSubmit => "submit button not responding",
            FaultSite::Redirect => "redirect failed",
            FaultSite::TicketsEmpty => "tickets returned empty",
            FaultSite::TicketCancel => "cancel operation failed",
            FaultSite::TicketDownload => "download message undefined",
            FaultSite::ProfileSave => "profile save message undefined",
            FaultSite::AccountDelete => "account deletion failed",
            FaultSite::ThemeSelector => "theme selector does not open",
            FaultSite::QuickBook => "quick book message undefined",
            FaultSite::WishlistLog => "wishlist logged wrong event id",
            FaultSite::EventShare => "share failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LatencyRange {
    min: Duration,
    max: Duration,
}

#[derive(Clone)]
pub struct Simulation {
    faults_enabled: bool,
    latency: LatencyRange,
    rng: Arc<Mutex<StdRng>>,
}

impl Simulation {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let min = Duration::from_millis(config.latency_min_ms);
        let max = Duration::from_millis(config.latency_max_ms.max(config.latency_min_ms));
        Self {
            faults_enabled: config.enable_fault_injection,
            latency: LatencyRange { min, max },
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// No latency and no faults; randomness (seat occupancy) is still seeded.
    pub fn quiet(seed: u64) -> Self {
        Self {
            faults_enabled: false,
            latency: LatencyRange { min: Duration::ZERO, max: Duration::ZERO },
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Faults on, latency off. Lets tests drive the broken paths.
    pub fn faulty(seed: u64) -> Self {
        Self {
            faults_enabled: true,
            ..Self::quiet(seed)
        }
    }

    pub fn faults_enabled(&self) -> bool {
        self.faults_enabled
    }

    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Rolls the dice for a fault site. Always false when faults are off.
    pub fn trips(&self, site: FaultSite) -> bool {
        if !self.faults_enabled {
            return false;
        }
        let tripped = self.with_rng(|rng| rng.gen_bool(site.probability()));
        if tripped {
            warn!(site = ?site, "Simulated fault: {}", site.label());
        }
        tripped
    }

    pub fn next_delay(&self) -> Duration {
        let LatencyRange { min, max } = self.latency;
        if max <= min {
            return min;
        }
        let millis = self.with_rng(|rng| rng.gen_range(min.as_millis()..=max.as_millis()));
        Duration::from_millis(millis as u64)
    }

    /// Sleeps for a random duration inside the configured latency range.
    pub async fn delay(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Fixed delay for operations that always take the same time (report generation).
    pub async fn delay_fixed(&self, duration: Duration) {
        if self.latency.max.is_zero() {
            return;
        }
        tokio::time::sleep(duration).await;
    }
}
