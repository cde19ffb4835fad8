use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::post,
};

use super::{ApiJson, AppState};
use crate::availability::{AvailabilityQuote, AvailabilityRequest, BookingRequest};
use crate::error::CommerceResult;
use crate::model::Booking;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/real-estate/availability", post(check_availability))
        .route("/api/real-estate/bookings", post(create_booking))
}

pub async fn check_availability(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AvailabilityRequest>,
) -> CommerceResult<ApiJson<AvailabilityQuote>> {
    Ok(ApiJson(state.availability.check(&request).await?))
}

pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> CommerceResult<(StatusCode, ApiJson<Booking>)> {
    let booking = state.availability.book(&request).await?;
    Ok((StatusCode::CREATED, ApiJson(booking)))
}
