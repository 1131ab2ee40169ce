pub mod account;
pub mod bookings;
pub mod events;
pub mod tickets;

#[cfg(feature = "dashboard")]
pub mod dashboard;
#[cfg(feature = "reports")]
pub mod reports;

use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::config::FeatureFlags;
use crate::AppState;

/// Every `/api` route. Dashboard and reports need both their cargo feature
/// and the runtime flag.
pub fn routes(features: &FeatureFlags) -> Router<Arc<AppState>> {
    let router = Router::new()
        .merge(events::routes())
        .merge(bookings::routes())
        .merge(tickets::routes())
        .merge(account::routes());

    #[cfg(feature = "dashboard")]
    let router = if features.enable_dashboard {
        router.merge(dashboard::routes())
    } else {
        info!("Dashboard routes disabled");
        router
    };

    #[cfg(feature = "reports")]
    let router = if features.enable_reports {
        router.merge(reports::routes())
    } else {
        info!("Reports routes disabled");
        router
    };

    #[cfg(not(all(feature = "dashboard", feature = "reports")))]
    info!(
        "Built without some optional routes (dashboard: {}, reports: {})",
        cfg!(feature = "dashboard") && features.enable_dashboard,
        cfg!(feature = "reports") && features.enable_reports
    );

    router
}
