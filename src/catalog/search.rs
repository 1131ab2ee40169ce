//! Filter and sort predicates over the event catalog.
//!
//! All functions here are pure: they borrow the catalog and return new
//! vectors, so the display order of the catalog itself never changes.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::EventRecord;

pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PriceBucket {
    #[default]
    All,
    /// Closed range, both ends inclusive.
    Between { min: f64, max: f64 },
    /// Open-ended range such as "200+".
    AtLeast(f64),
}

impl PriceBucket {
    /// Parses a bucket tag. Anything malformed falls back to `All`.
    ///
    /// An unencoded `+` in a query string decodes to a space, so `"200 "` is
    /// read as `"200+"`.
    pub fn parse_lenient(tag: &str) -> Self {
        let raw = tag.trim_start();
        let tag = raw.trim_end();
        if tag.is_empty() || tag.eq_ignore_ascii_case(ALL) {
            return PriceBucket::All;
        }

        let open_ended = tag
            .strip_suffix('+')
            .or_else(|| (raw.ends_with(' ') && !tag.contains('-')).then_some(tag));

        let parsed = if let Some(min) = open_ended {
            min.trim().parse::<f64>().ok().map(PriceBucket::AtLeast)
        } else {
            tag.split_once('-').and_then(|(min, max)| {
                let min = min.trim().parse::<f64>().ok()?;
                let max = max.trim().parse::<f64>().ok()?;
                (min <= max).then_some(PriceBucket::Between { min, max })
            })
        };

        match parsed {
            Some(PriceBucket::AtLeast(min)) if !min.is_finite() => PriceBucket::All,
            Some(bucket) => bucket,
            None => {
                debug!("Unrecognised price bucket '{}', not filtering by price", tag);
                PriceBucket::All
            }
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        match *self {
            PriceBucket::All => true,
            PriceBucket::Between { min, max } => min <= price && price <= max,
            PriceBucket::AtLeast(min) => price >= min,
        }
    }
}

impl fmt::Display for PriceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceBucket::All => f.write_str(ALL),
            PriceBucket::Between { min, max } => write!(f, "{min}-{max}"),
            PriceBucket::AtLeast(min) => write!(f, "{min}+"),
        }
    }
}

impl<'de> Deserialize<'de> for PriceBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PriceBucket::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Tomorrow,
    Week,
    Month,
}

impl DateFilter {
    /// Whether `date` falls inside the window anchored at `today`.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Today => date == today,
            DateFilter::Tomorrow => Some(date) == today.succ_opt(),
            DateFilter::Week => date >= today && date < today + Duration::days(7),
            DateFilter::Month => date.year() == today.year() && date.month() == today.month(),
        }
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "tomorrow" => Ok(DateFilter::Tomorrow),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            other => Err(format!("unknown date filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Date,
    PriceLow,
    PriceHigh,
    /// Fewest remaining tickets first.
    Popularity,
    Name,
}

impl SortKey {
    fn compare(&self, a: &EventRecord, b: &EventRecord) -> Ordering {
        match self {
            SortKey::Date => a.starts_at().cmp(&b.starts_at()),
            SortKey::PriceLow => a.price.total_cmp(&b.price),
            SortKey::PriceHigh => (-a.price).total_cmp(&-b.price),
            SortKey::Popularity => a.available_count.cmp(&b.available_count),
            SortKey::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "price-low" => Ok(SortKey::PriceLow),
            "price-high" => Ok(SortKey::PriceHigh),
            "popularity" => Ok(SortKey::Popularity),
            "name" => Ok(SortKey::Name),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub search_text: String,
    pub category: String,
    pub price_range: PriceBucket,
    pub date_filter: DateFilter,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category: ALL.to_string(),
            price_range: PriceBucket::All,
            date_filter: DateFilter::All,
        }
    }
}

impl FilterCriteria {
    pub fn is_searching(&self) -> bool {
        !self.search_text.is_empty()
    }

    fn matches_search(&self, event: &EventRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        event.title.to_lowercase().contains(&needle) || event.location.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, event: &EventRecord) -> bool {
        self.category.is_empty() || self.category == ALL || event.category == self.category
    }

    /// All active predicates, combined with AND.
    pub fn matches(&self, event: &EventRecord, today: NaiveDate) -> bool {
        self.matches_search(event)
            && self.matches_category(event)
            && self.price_range.contains(event.price)
            && self.date_filter.contains(event.date, today)
    }
}

pub fn filter_events(catalog: &[EventRecord], criteria: &FilterCriteria, today: NaiveDate) -> Vec<EventRecord> {
    catalog
        .iter()
        .filter(|event| criteria.matches(event, today))
        .cloned()
        .collect()
}

/// Stable sort, so ties keep catalog order.
pub fn sort_events(events: &mut [EventRecord], key: SortKey) {
    events.sort_by(|a, b| key.compare(a, b));
}

pub fn apply(
    catalog: &[EventRecord],
    criteria: &FilterCriteria,
    sort: Option<SortKey>,
    today: NaiveDate,
) -> Vec<EventRecord> {
    let mut events = filter_events(catalog, criteria, today);
    if let Some(key) = sort {
        sort_events(&mut events, key);
    }
    events
}
