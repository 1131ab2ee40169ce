use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use event_booking::{app, config::Config, services::simulation::Simulation, AppState};

fn state() -> Arc<AppState> {
    AppState::with_simulation(Config::quiet(), Simulation::quiet(17)).unwrap()
}

fn router() -> Router {
    app(state())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_date(app, method, uri, body, None).await
}

async fn send_with_date(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    date: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(date) = date {
        builder = builder.header("x-reference-date", date);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn ids(events: &Value) -> Vec<i64> {
    events.as_array().unwrap().iter().map(|e| e["id"].as_i64().unwrap()).collect()
}

async fn open_booking(app: &Router, event_id: i64) -> String {
    let (status, body) = send(app, Method::POST, "/api/bookings", Some(json!({ "eventId": event_id }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn free_seats(app: &Router, booking: &str, n: usize) -> Vec<String> {
    let (status, map) = send(app, Method::GET, &format!("/api/bookings/{booking}/seats"), None).await;
    assert_eq!(status, StatusCode::OK);
    map["rows"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row["seats"].as_array().unwrap().iter())
        .filter(|seat| seat["selectable"].as_bool().unwrap())
        .map(|seat| seat["id"].as_str().unwrap().to_string())
        .take(n)
        .collect()
}

fn contact(email: &str) -> Value {
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "email": email,
        "cardNumber": "4111111111111111",
        "expiryDate": "12/27",
        "cvv": "123"
    })
}

#[tokio::test]
async fn banner_and_health() {
    let app = router();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));
}

#[tokio::test]
async fn category_and_price_filters_hold() {
    let app = router();
    let (status, body) = send(&app, Method::GET, "/api/events?category=Music", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["events"]), vec![1, 7]);

    let (_, body) = send(&app, Method::GET, "/api/events?priceRange=200%2B", None).await;
    assert_eq!(ids(&body["events"]), vec![5]);

    // an unencoded plus decodes to a space
    let (_, body) = send(&app, Method::GET, "/api/events?priceRange=200+", None).await;
    assert_eq!(ids(&body["events"]), vec![5]);

    let (_, body) = send(&app, Method::GET, "/api/events?priceRange=50-100", None).await;
    for event in body["events"].as_array().unwrap() {
        let price = event["price"].as_f64().unwrap();
        assert!((50.0..=100.0).contains(&price));
    }

    // malformed bucket means no price filter
    let (_, body) = send(&app, Method::GET, "/api/events?priceRange=cheap", None).await;
    assert_eq!(body["total"], 10);
}

#[tokio::test]
async fn search_and_sort() {
    let app = router();
    let (_, body) = send(&app, Method::GET, "/api/events?search=NEW&sortBy=price-high", None).await;
    assert_eq!(ids(&body["events"]), vec![5, 1]);

    let (_, body) = send(&app, Method::GET, "/api/events?sortBy=popularity", None).await;
    assert_eq!(ids(&body["events"])[..2], [5, 2]);
}

#[tokio::test]
async fn week_filter_uses_reference_date() {
    let app = router();
    let (status, body) =
        send_with_date(&app, Method::GET, "/api/events?dateFilter=week", None, Some("2024-07-10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["events"]), vec![1, 10]);
}

#[tokio::test]
async fn unknown_event_is_a_json_404() {
    let app = router();
    let (status, body) = send(&app, Method::GET, "/api/events/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Event 404 not found");
}

#[tokio::test]
async fn featured_and_categories() {
    let app = router();
    let (_, body) = send(&app, Method::GET, "/api/events/featured", None).await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5, 6]);
    let (_, body) = send(&app, Method::GET, "/api/events/categories", None).await;
    assert_eq!(body[0], "all");
}

#[tokio::test]
async fn seat_booking_end_to_end() {
    let app = router();
    let booking = open_booking(&app, 1).await;

    let (status, _) =
        send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "seats" }))).await;
    assert_eq!(status, StatusCode::OK);

    for seat in free_seats(&app, &booking, 2).await {
        let (status, _) =
            send(&app, Method::PATCH, &format!("/api/bookings/{booking}/seats"), Some(json!({ "seat": seat }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, view) =
        send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "payment" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["totalPrice"], 178.0);
    assert_eq!(view["mode"], "seats");

    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/form"), Some(contact("john@doe.com"))).await;
    let (status, receipt) =
        send_with_date(&app, Method::POST, &format!("/api/bookings/{booking}/confirm"), None, Some("2024-06-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["confirmation"]["total"], 178.0);
    assert_eq!(receipt["ticket"]["id"], "TKT-005");
    assert_eq!(receipt["ticket"]["bookingDate"], "2024-06-01");
    assert_eq!(receipt["redirect"], "/tickets");

    let (status, _) = send(&app, Method::GET, &format!("/api/bookings/{booking}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, tickets) = send(&app, Method::GET, "/api/tickets?status=confirmed", None).await;
    assert_eq!(tickets["total"], 2);
}

#[tokio::test]
async fn seventh_seat_is_refused() {
    let app = router();
    let booking = open_booking(&app, 2).await;
    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "seats" }))).await;

    let seats = free_seats(&app, &booking, 7).await;
    assert_eq!(seats.len(), 7);
    for seat in &seats[..6] {
        let (status, _) =
            send(&app, Method::PATCH, &format!("/api/bookings/{booking}/seats"), Some(json!({ "seat": seat }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) =
        send(&app, Method::PATCH, &format!("/api/bookings/{booking}/seats"), Some(json!({ "seat": seats[6] }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Maximum 6 seats can be selected");

    let (_, view) = send(&app, Method::GET, &format!("/api/bookings/{booking}"), None).await;
    assert_eq!(view["selectedSeats"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn payment_needs_a_seat_when_coming_from_seats() {
    let app = router();
    let booking = open_booking(&app, 3).await;
    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "seats" }))).await;
    let (status, body) =
        send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "payment" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Please select at least one seat");
}

#[tokio::test]
async fn quantity_path_and_email_validation() {
    let app = router();
    let booking = open_booking(&app, 1).await;
    let (_, view) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking}/quantity"),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(view["ticketQuantity"], 3);
    assert_eq!(view["totalPrice"], 267.0);

    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "payment" }))).await;
    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/form"), Some(contact("john.doe.example.com"))).await;

    let (status, body) = send(&app, Method::POST, &format!("/api/bookings/{booking}/confirm"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Please enter a valid email address");

    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/form"), Some(json!({ "email": "john@doe.com" }))).await;
    let (status, receipt) = send(&app, Method::POST, &format!("/api/bookings/{booking}/confirm"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["confirmation"]["quantity"], 3);
    assert_eq!(receipt["ticket"]["seats"], json!([]));
}

#[tokio::test]
async fn unknown_form_field_is_rejected() {
    let app = router();
    let booking = open_booking(&app, 1).await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking}/form"),
        Some(json!({ "shoeSize": "42" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn concurrent_seat_clicks_respect_the_limit() {
    let app = router();
    let booking = open_booking(&app, 4).await;
    send(&app, Method::PATCH, &format!("/api/bookings/{booking}/tab"), Some(json!({ "tab": "seats" }))).await;
    let seats = free_seats(&app, &booking, 12).await;

    let uri = format!("/api/bookings/{booking}/seats");
    let clicks = seats
        .iter()
        .map(|seat| send(&app, Method::PATCH, &uri, Some(json!({ "seat": seat }))));
    let results = futures::future::join_all(clicks).await;

    let accepted = results.iter().filter(|(status, _)| *status == StatusCode::OK).count();
    assert_eq!(accepted, 6);
    let (_, view) = send(&app, Method::GET, &format!("/api/bookings/{booking}"), None).await;
    assert_eq!(view["selectedSeats"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn ticket_actions() {
    let app = router();
    let (status, body) = send(&app, Method::POST, "/api/tickets/TKT-001/cancel", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket"]["status"], "cancelled");
    assert_eq!(body["ticket"]["seats"], json!(["A12", "A13"]));
    assert_eq!(body["ticket"]["price"], 178.0);

    let (status, body) = send(&app, Method::POST, "/api/tickets/TKT-004/refund", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Refund processing is temporarily unavailable");

    let (_, body) = send(&app, Method::GET, "/api/tickets/TKT-002/download", None).await;
    assert_eq!(body["message"], "Downloading Tech Conference: AI & Future ticket");

    let (status, _) = send(&app, Method::GET, "/api/tickets?status=lost", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn account_settings() {
    let app = router();
    let (status, body) = send(&app, Method::PUT, "/api/account/settings/theme", Some(json!({ "theme": "dark" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    let (_, body) = send(&app, Method::PATCH, "/api/account/preferences/smsNotifications", None).await;
    assert_eq!(body["enabled"], true);
    let (status, _) = send(&app, Method::PATCH, "/api/account/preferences/carrierPigeon", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::POST, "/api/account/settings/reset", None).await;
    assert_eq!(body["theme"], "light");

    let (_, body) = send(&app, Method::POST, "/api/account/delete", Some(json!({ "confirm": true }))).await;
    assert_eq!(body["message"], "Account deletion initiated. You will receive a confirmation email.");
}

#[tokio::test]
async fn reports_summary_is_static() {
    let app = router();
    let (status, body) = send(&app, Method::GET, "/api/reports/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[3], json!({ "name": "Views", "value": 234 }));

    let (_, body) = send(&app, Method::POST, "/api/reports/generate", Some(json!({}))).await;
    assert_eq!(body["message"], "Summary report generated successfully!");
    let (_, body) = send(&app, Method::POST, "/api/reports/export", Some(json!({ "format": "csv" }))).await;
    assert_eq!(body["message"], "Report exported as CSV");
}

#[tokio::test]
async fn disabled_dashboard_is_not_routed() {
    let mut config = Config::quiet();
    config.features.enable_dashboard = false;
    let app = app(AppState::with_simulation(config, Simulation::quiet(1)).unwrap());
    let (status, _) = send(&app, Method::GET, "/api/dashboard/posts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
