pub mod account;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod placeholder_client;
pub mod services;
pub mod tickets;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::services::simulation::Simulation;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub simulation: Simulation,
    pub catalog: catalog::CatalogService,
    pub bookings: booking::BookingRegistry,
    pub tickets: tickets::TicketStore,
    pub account: account::AccountService,
    pub placeholder: placeholder_client::PlaceholderClient,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, AppError> {
        let simulation = Simulation::from_config(&config.simulation);
        Self::with_simulation(config, simulation)
    }

    /// Same as [`AppState::new`] with an explicit simulation, so tests can pin
    /// the random source.
    pub fn with_simulation(config: config::Config, simulation: Simulation) -> Result<Arc<Self>, AppError> {
        let placeholder =
            placeholder_client::PlaceholderClient::new(&config.placeholder_api, &config.circuit_breaker)?;
        let idle_timeout = Duration::from_secs(config.sessions.idle_timeout_seconds);

        Ok(Arc::new(Self {
            catalog: catalog::CatalogService::with_mock_events(simulation.clone()),
            bookings: booking::BookingRegistry::new(simulation.clone(), idle_timeout),
            tickets: tickets::TicketStore::with_mock_tickets(simulation.clone()),
            account: account::AccountService::with_demo_user(simulation.clone()),
            placeholder,
            simulation,
            config,
        }))
    }
}

/// The full HTTP application: banner, health check and everything under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Event Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes(&state.config.features))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
