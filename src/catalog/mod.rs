use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::models::EventRecord;
use crate::services::simulation::{FaultSite, Simulation, UNDEFINED};

pub mod events;
pub mod search;

use search::{FilterCriteria, SortKey};

const FEATURED_COUNT: usize = 6;

/// Reply to one of the event card buttons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotice {
    pub event_id: i64,
    pub message: String,
}

/// Read-only event catalog. Every read goes through the simulated network
/// delay; the list itself never changes during a run.
#[derive(Clone)]
pub struct CatalogService {
    events: Arc<Vec<EventRecord>>,
    simulation: Simulation,
}

impl CatalogService {
    pub fn new(events: Vec<EventRecord>, simulation: Simulation) -> Self {
        Self { events: Arc::new(events), simulation }
    }

    pub fn with_mock_events(simulation: Simulation) -> Self {
        let events = events::mock_events();
        info!("Catalog loaded with {} events", events.len());
        Self::new(events, simulation)
    }

    // Full list, as the events view loads it
    pub async fn load_events(&self) -> Result<Vec<EventRecord>, AppError> {
        self.simulation.delay().await;
        if self.simulation.trips(FaultSite::EventsLoad) {
            return Err(AppError::Unavailable("Failed to load events. Please try again.".to_string()));
        }
        Ok(self.events.as_ref().clone())
    }

    /// Filter, then optionally sort. A search may randomly lose matching
    /// events when fault injection is on.
    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        sort: Option<SortKey>,
        today: NaiveDate,
    ) -> Result<Vec<EventRecord>, AppError> {
        let catalog = self.load_events().await?;
        let mut events = search::apply(&catalog, criteria, sort, today);
        if criteria.is_searching() {
            events.retain(|_| !self.simulation.trips(FaultSite::SearchMiss));
        }
        Ok(events)
    }

    // Home page: first few events, optionally narrowed to one category
    pub async fn featured(&self, category: Option<&str>) -> Vec<EventRecord> {
        self.simulation.delay().await;
        if self.simulation.trips(FaultSite::FeaturedEmpty) {
            return Vec::new();
        }
        let criteria = FilterCriteria {
            category: category.unwrap_or(search::ALL).to_string(),
            ..Default::default()
        };
        self.events
            .iter()
            .take(FEATURED_COUNT)
            .filter(|event| criteria.matches(event, event.date))
            .cloned()
            .collect()
    }

    pub async fn get_event(&self, id: i64) -> Result<EventRecord, AppError> {
        self.simulation.delay().await;
        self.require(id)
    }

    pub fn quick_book(&self, id: i64) -> Result<EventNotice, AppError> {
        let event = self.require(id)?;
        info!("Quick booking for event {}", event.id);
        let message = if self.simulation.trips(FaultSite::QuickBook) {
            UNDEFINED.to_string()
        } else {
            format!("Quick booking for {}", event.title)
        };
        Ok(EventNotice { event_id: event.id, message })
    }

    pub fn add_to_wishlist(&self, id: i64) -> Result<EventNotice, AppError> {
        let event = self.require(id)?;
        if self.simulation.trips(FaultSite::WishlistLog) {
            info!("Added to wishlist: {}", UNDEFINED);
        } else {
            info!("Added to wishlist: {}", event.id);
        }
        Ok(EventNotice { event_id: event.id, message: "Added to wishlist!".to_string() })
    }

    pub fn share(&self, id: i64) -> Result<EventNotice, AppError> {
        let event = self.require(id)?;
        if self.simulation.trips(FaultSite::EventShare) {
            return Err(AppError::Unavailable("Share feature temporarily unavailable".to_string()));
        }
        Ok(EventNotice { event_id: event.id, message: "Event shared!".to_string() })
    }

    fn require(&self, id: i64) -> Result<EventRecord, AppError> {
        self.find(id)
            .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))
    }

    /// Lookup without the simulated delay.
    pub fn find(&self, id: i64) -> Option<EventRecord> {
        self.events.iter().find(|event| event.id == id).cloned()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![search::ALL.to_string()];
        for event in self.events.iter() {
            if !categories.contains(&event.category) {
                categories.push(event.category.clone());
            }
        }
        categories
    }
}
