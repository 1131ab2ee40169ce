use chrono::{NaiveDate, NaiveTime};

use crate::models::EventRecord;

/// Categories offered by the events view, in display order.
pub const CATEGORIES: [&str; 9] = [
    "all",
    "Music",
    "Technology",
    "Food",
    "Art",
    "Sports",
    "Comedy",
    "Entertainment",
    "Health",
];

struct Row {
    id: i64,
    title: &'static str,
    date: (i32, u32, u32),
    time: (u32, u32),
    location: &'static str,
    price: f64,
    category: &'static str,
    available: u32,
}

const ROWS: [Row; 10] = [
    Row { id: 1, title: "Summer Music Festival 2024", date: (2024, 7, 15), time: (18, 0), location: "Central Park, New York", price: 89.0, category: "Music", available: 150 },
    Row { id: 2, title: "Tech Conference: AI & Future", date: (2024, 8, 22), time: (9, 0), location: "Convention Center, San Francisco", price: 199.0, category: "Technology", available: 5 },
    Row { id: 3, title: "Food & Wine Expo", date: (2024, 6, 30), time: (12, 0), location: "Downtown Plaza, Chicago", price: 45.0, category: "Food", available: 75 },
    Row { id: 4, title: "Art Gallery Opening", date: (2024, 7, 8), time: (19, 0), location: "Modern Art Museum, Los Angeles", price: 25.0, category: "Art", available: 200 },
    Row { id: 5, title: "Sports Championship Finals", date: (2024, 9, 15), time: (20, 0), location: "MetLife Stadium, New Jersey", price: 250.0, category: "Sports", available: 0 },
    Row { id: 6, title: "Comedy Night Special", date: (2024, 7, 20), time: (21, 0), location: "Laugh Factory, Hollywood", price: 35.0, category: "Comedy", available: 30 },
    Row { id: 7, title: "Classical Orchestra Performance", date: (2024, 7, 25), time: (19, 30), location: "Symphony Hall, Boston", price: 120.0, category: "Music", available: 80 },
    Row { id: 8, title: "Startup Pitch Competition", date: (2024, 8, 10), time: (14, 0), location: "Innovation Hub, Austin", price: 50.0, category: "Technology", available: 100 },
    Row { id: 9, title: "International Film Festival", date: (2024, 9, 5), time: (18, 0), location: "Cinema Complex, Seattle", price: 75.0, category: "Entertainment", available: 45 },
    Row { id: 10, title: "Fitness & Wellness Expo", date: (2024, 7, 12), time: (10, 0), location: "Health Center, Miami", price: 30.0, category: "Health", available: 120 },
];

/// The demo catalog served to every session.
pub fn mock_events() -> Vec<EventRecord> {
    ROWS.iter()
        .map(|row| {
            let (year, month, day) = row.date;
            let (hour, minute) = row.time;
            EventRecord {
                id: row.id,
                title: row.title.to_string(),
                date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
                time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default(),
                location: row.location.to_string(),
                price: row.price,
                image_ref: format!("https://picsum.photos/300/200?random={}", row.id),
                category: row.category.to_string(),
                available_count: row.available,
            }
        })
        .collect()
}
