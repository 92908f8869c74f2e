//! End-to-end booking flow against the in-memory calendar: browse the month,
//! pick a day, book a slot, then see it gone.


use axum::http::{Method, StatusCode};
use fixtures::{appointment_at, create_test_router, send, utc, InMemoryCalendar};
use std::sync::Arc;

#[tokio::test]
async fn test_browse_then_book_then_slot_is_gone() {
    let calendar = Arc::new(InMemoryCalendar::default());
    let router = create_test_router(calendar.clone());

    let (status, body) = send(&router, Method::GET, "/days?year=2030&month=6").await;
    assert_eq!(status, StatusCode::OK);
    let first_open_day = body["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["hasTimeSlots"] == true)
        .map(|d| d["day"].as_u64().unwrap())
        .unwrap();
    // Now is Monday the 10th at noon, Tuesday afternoon is bookable.
    assert_eq!(first_open_day, 11);

    let (_, body) = send(&router, Method::GET, "/timeslots?year=2030&month=6&day=12").await;
    let slots = body["timeSlots"].as_array().unwrap().clone();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[3]["startTime"], "2030-06-12T11:15:00.000Z");

    let (status, body) = send(
        &router,
        Method::POST,
        "/book?year=2030&month=6&day=12&hour=11&minute=15",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["startTime"], "2030-06-12T11:15:00.000Z");
    assert_eq!(body["endTime"], "2030-06-12T11:55:00.000Z");

    let stored = calendar.events();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].start, utc(6, 12, 11, 15));

    let (_, body) = send(&router, Method::GET, "/timeslots?year=2030&month=6&day=12").await;
    let slots = body["timeSlots"].as_array().unwrap();
    assert_eq!(slots.len(), 11);
    assert!(slots
        .iter()
        .all(|s| s["startTime"] != "2030-06-12T11:15:00.000Z"));

    let (status, body) = send(
        &router,
        Method::POST,
        "/book?year=2030&month=6&day=12&hour=11&minute=15",
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Invalid time slot");
    assert_eq!(calendar.events().len(), 1);
}

#[tokio::test]
async fn test_fully_booked_day_drops_out_of_month_view() {
    let day_events = (0..12)
        .map(|i| appointment_at(utc(6, 20, 9, 0) + chrono::Duration::minutes(45 * i)))
        .collect();
    let router = create_test_router(Arc::new(InMemoryCalendar::with_events(day_events)));

    let (_, body) = send(&router, Method::GET, "/days?year=2030&month=6").await;
    let days = body["days"].as_array().unwrap();

    assert_eq!(days[19]["hasTimeSlots"], false);
    assert_eq!(days[18]["hasTimeSlots"], true);
    assert_eq!(days[20]["hasTimeSlots"], true);
}

#[tokio::test]
async fn test_booking_outside_hours_and_weekends() {
    let calendar = Arc::new(InMemoryCalendar::default());
    let router = create_test_router(calendar.clone());

    for uri in [
        "/book?year=2030&month=6&day=15&hour=10&minute=30",
        "/book?year=2030&month=6&day=17&hour=18&minute=0",
        "/book?year=2030&month=6&day=17&hour=8&minute=15",
    ] {
        let (status, body) = send(&router, Method::POST, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert_eq!(body["message"], "Cannot book outside bookable timeframe");
        assert_eq!(body["error"], "outside_bookable_window");
    }
    assert!(calendar.events().is_empty());
}
