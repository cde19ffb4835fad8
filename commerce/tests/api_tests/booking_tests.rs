use axum::http::StatusCode;
use common::test_helpers::{
    TestResult,
    test_utils::{build_request, build_request_as, check_status_code},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::support::*;
use commerce::model::BookingStatus;

fn booking_body(property_id: i64, check_in: &str, check_out: &str, guest: &str) -> Value {
    json!({
        "propertyId": property_id,
        "checkIn": check_in,
        "checkOut": check_out,
        "guestName": guest,
        "guestEmail": format!("{}@example.ng", guest.to_lowercase().replace(' ', ".")),
        "guestPhone": " +2348011111111 ",
        "guests": 2,
    })
}

fn booking_request(body: &Value) -> http::Request<String> {
    build_request("POST", "/api/real-estate/bookings", Some(body.to_string())).expect("request")
}

fn status_update(booking_id: i64, status: &str) -> http::Request<String> {
    build_request_as(
        "PATCH",
        &format!("/api/admin/bookings/{}/status", booking_id),
        Some(json!({ "status": status }).to_string()),
        Some((IDENTITY_HEADER, ADMIN_EMAIL)),
    )
    .expect("request")
}

#[tokio::test]
async fn test_booking_is_created_pending_with_server_price() -> TestResult<()> {
    // Arrange
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let app = test_app(store.clone(), idle_gateway());

    // Act
    let mut body = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Tobi Adeyemi");
    body["totalPrice"] = json!(1);
    let (status, booking) = send(&app, booking_request(&body)).await;

    // Assert
    check_status_code(status, StatusCode::CREATED)?;
    assert_eq!(booking["status"], json!("pending"));
    assert_eq!(booking["guestEmail"], json!("tobi.adeyemi@example.ng"));
    assert_eq!(booking["guestPhone"], json!("+2348011111111"));
    assert_eq!(as_decimal(&booking["totalPrice"]), Decimal::from(540_000));
    assert_eq!(store.bookings().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_overlapping_booking_is_rejected_with_conflicts() -> TestResult<()> {
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let existing = store.seed_booking(
        villa.property.id,
        date(2026, 12, 20),
        date(2026, 12, 23),
        BookingStatus::Confirmed,
    );
    let app = test_app(store.clone(), idle_gateway());

    let body = booking_body(villa.property.id, "2026-12-22", "2026-12-26", "Late Guest");
    let (status, response) = send(&app, booking_request(&body)).await;

    check_status_code(status, StatusCode::CONFLICT)?;
    assert_eq!(response["error"], json!("requested dates are no longer available"));
    assert_eq!(response["conflictingBookings"][0]["id"], json!(existing.id));
    assert_eq!(store.bookings().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_guest_details_are_validated() {
    let store = MemoryStore::new();
    let villa = store.seed_property("Eko Atlantic Suite", 95_000, 2);
    let app = test_app(store.clone(), idle_gateway());

    let mut too_many = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Big Family");
    too_many["guests"] = json!(5);
    let mut no_guests = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Nobody");
    no_guests["guests"] = json!(0);
    let mut bad_email = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Typo");
    bad_email["guestEmail"] = json!("typo-at-example.ng");
    let mut no_name = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Anon");
    no_name["guestName"] = json!("   ");

    for body in [too_many, no_guests, bad_email, no_name] {
        let (status, _) = send(&app, booking_request(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }
    assert!(store.bookings().is_empty());
}

#[tokio::test]
async fn test_simultaneous_requests_for_same_dates_book_once() {
    // Arrange: two guests race for the same week
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let app = test_app(store.clone(), idle_gateway());
    let first = booking_body(villa.property.id, "2026-12-24", "2026-12-31", "First Guest");
    let second = booking_body(villa.property.id, "2026-12-26", "2027-01-02", "Second Guest");

    // Act
    let ((status_a, _), (status_b, _)) =
        futures::join!(send(&app, booking_request(&first)), send(&app, booking_request(&second)));

    // Assert: exactly one wins, the other sees a conflict
    let mut statuses = vec![status_a, status_b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(store.bookings().len(), 1);
}

#[tokio::test]
async fn test_availability_answer_is_not_a_reservation() {
    // Two guests both see the week as free; only the first booking holds it
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let app = test_app(store.clone(), idle_gateway());
    let dates = json!({
        "propertyId": villa.property.id,
        "checkIn": "2026-12-24",
        "checkOut": "2026-12-31"
    });

    for _ in 0..2 {
        let request =
            build_request("POST", "/api/real-estate/availability", Some(dates.to_string()))
                .expect("request");
        let (_, quote) = send(&app, request).await;
        assert_eq!(quote["available"], json!(true));
    }

    let first = booking_body(villa.property.id, "2026-12-24", "2026-12-31", "First Guest");
    let second = booking_body(villa.property.id, "2026-12-24", "2026-12-31", "Second Guest");
    let (status_a, _) = send(&app, booking_request(&first)).await;
    let (status_b, _) = send(&app, booking_request(&second)).await;

    assert_eq!(status_a, StatusCode::CREATED);
    assert_eq!(status_b, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancelling_frees_the_dates() -> TestResult<()> {
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let existing = store.seed_booking(
        villa.property.id,
        date(2026, 12, 20),
        date(2026, 12, 23),
        BookingStatus::Pending,
    );
    let app = test_app(store.clone(), idle_gateway());

    let (status, updated) = send(&app, status_update(existing.id, "cancelled")).await;
    check_status_code(status, StatusCode::OK)?;
    assert_eq!(updated["status"], json!("cancelled"));

    let body = booking_body(villa.property.id, "2026-12-20", "2026-12-23", "Next Guest");
    let (status, _) = send(&app, booking_request(&body)).await;
    check_status_code(status, StatusCode::CREATED)?;
    Ok(())
}

#[tokio::test]
async fn test_booking_status_transitions_are_enforced() {
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let pending = store.seed_booking(
        villa.property.id,
        date(2026, 12, 1),
        date(2026, 12, 3),
        BookingStatus::Pending,
    );
    let completed = store.seed_booking(
        villa.property.id,
        date(2026, 11, 1),
        date(2026, 11, 3),
        BookingStatus::Completed,
    );
    let app = test_app(store, idle_gateway());

    let (status, _) = send(&app, status_update(pending.id, "completed")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, status_update(pending.id, "confirmed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("confirmed"));

    let (status, _) = send(&app, status_update(pending.id, "pending")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, status_update(completed.id, "cancelled")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, status_update(4242, "confirmed")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, status_update(pending.id, "archived")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_booking_list_filters() {
    let store = MemoryStore::new();
    let villa = store.seed_property("Lekki Villa", 180_000, 8);
    let other = store.seed_property("Ikoyi Penthouse", 250_000, 6);
    store.seed_booking(
        villa.property.id,
        date(2026, 12, 1),
        date(2026, 12, 3),
        BookingStatus::Pending,
    );
    store.seed_booking(
        villa.property.id,
        date(2026, 12, 5),
        date(2026, 12, 7),
        BookingStatus::Confirmed,
    );
    store.seed_booking(
        other.property.id,
        date(2026, 12, 1),
        date(2026, 12, 3),
        BookingStatus::Pending,
    );
    let app = test_app(store, idle_gateway());

    let uri = format!("/api/admin/bookings?propertyId={}&status=pending", villa.property.id);
    let request =
        build_request_as("GET", &uri, None, Some((IDENTITY_HEADER, ADMIN_EMAIL))).expect("request");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().expect("array");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["propertyId"], json!(villa.property.id));
    assert_eq!(bookings[0]["status"], json!("pending"));
}
