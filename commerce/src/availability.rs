use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{CommerceError, CommerceResult};
use crate::model::{
    Booking, BookingFilter, BookingOutcome, BookingStatus, ModelId, NewBooking, PropertyListing,
    StayRange,
};
use crate::storage::{BookingStorage, CatalogStorage};
use crate::validation::{normalize_email, required_text};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub property_id: Option<ModelId>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl AvailabilityRequest {
    pub fn validate(&self) -> CommerceResult<(ModelId, StayRange)> {
        let (Some(property_id), Some(check_in), Some(check_out)) =
            (self.property_id, self.check_in, self.check_out)
        else {
            return Err(CommerceError::validation(
                "propertyId, checkIn and checkOut are required",
            ));
        };
        let stay = StayRange::new(check_in, check_out).map_err(CommerceError::Validation)?;
        Ok((property_id, stay))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(flatten)]
    pub dates: AvailabilityRequest,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guests: Option<i32>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuote {
    pub id: ModelId,
    pub name: String,
    pub base_price: Decimal,
    pub nights: i64,
    pub total_price: Decimal,
}

impl PropertyQuote {
    pub fn for_stay(listing: &PropertyListing, stay: &StayRange) -> Self {
        let nights = stay.nights();
        let base_price = listing.nightly_price();
        Self {
            id: listing.property.id,
            name: listing.name().to_string(),
            base_price,
            nights,
            total_price: base_price * Decimal::from(nights),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuote {
    pub available: bool,
    pub property: PropertyQuote,
    pub conflicting_bookings: Vec<Booking>,
}

/// Date availability, quotes and booking lifecycle for real-estate listings.
#[derive(Clone)]
pub struct AvailabilityService {
    catalog: Arc<dyn CatalogStorage>,
    bookings: Arc<dyn BookingStorage>,
}

impl AvailabilityService {
    pub fn new(catalog: Arc<dyn CatalogStorage>, bookings: Arc<dyn BookingStorage>) -> Self {
        Self { catalog, bookings }
    }

    async fn listing(&self, property_id: ModelId) -> CommerceResult<PropertyListing> {
        self.catalog
            .get_property(property_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Property {} not found", property_id)))
    }

    pub async fn check(&self, request: &AvailabilityRequest) -> CommerceResult<AvailabilityQuote> {
        let started = Instant::now();
        let (property_id, stay) = request.validate()?;
        let listing = self.listing(property_id).await?;

        let conflicting_bookings = self
            .bookings
            .find_conflicting_bookings(property_id, &stay)
            .await?;

        debug!(
            property_id,
            check_in = %stay.check_in,
            check_out = %stay.check_out,
            conflicts = conflicting_bookings.len(),
            "Checked availability"
        );
        metrics::histogram!("storefront_availability_check_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(AvailabilityQuote {
            available: conflicting_bookings.is_empty(),
            property: PropertyQuote::for_stay(&listing, &stay),
            conflicting_bookings,
        })
    }

    pub async fn book(&self, request: &BookingRequest) -> CommerceResult<Booking> {
        let (property_id, stay) = request.dates.validate()?;
        let guest_name = required_text("guestName", request.guest_name.as_deref())?;
        let guest_email = normalize_email("guestEmail", request.guest_email.as_deref())?;
        let guests = request.guests.unwrap_or(1);
        if guests < 1 {
            return Err(CommerceError::validation("guests must be at least 1"));
        }

        let listing = self.listing(property_id).await?;
        if guests > listing.property.max_guests {
            return Err(CommerceError::validation(format!(
                "{} accommodates at most {} guests",
                listing.name(),
                listing.property.max_guests
            )));
        }
        let quote = PropertyQuote::for_stay(&listing, &stay);

        let new_booking = NewBooking {
            property_id,
            guest_name,
            guest_email,
            guest_phone: request
                .guest_phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
            guests,
            stay,
            total_price: quote.total_price,
            special_requests: request.special_requests.clone(),
        };

        match self.bookings.create_booking_if_available(&new_booking).await? {
            BookingOutcome::Created(booking) => {
                info!(
                    booking_id = booking.id,
                    property_id,
                    nights = quote.nights,
                    "Booking created"
                );
                metrics::counter!("storefront_bookings_total", "outcome" => "created").increment(1);
                Ok(booking)
            }
            BookingOutcome::Conflict(conflicts) => {
                warn!(
                    property_id,
                    conflicts = conflicts.len(),
                    "Booking rejected, dates already held"
                );
                metrics::counter!("storefront_bookings_total", "outcome" => "conflict")
                    .increment(1);
                Err(CommerceError::BookingConflict(conflicts))
            }
        }
    }

    pub async fn list(&self, filter: &BookingFilter) -> CommerceResult<Vec<Booking>> {
        Ok(self.bookings.list_bookings(filter).await?)
    }

    pub async fn update_status(
        &self,
        booking_id: ModelId,
        status: BookingStatus,
    ) -> CommerceResult<Booking> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Booking {} not found", booking_id)))?;

        if !booking.status.can_transition_to(status) {
            return Err(CommerceError::conflict(format!(
                "Booking {} cannot move from {} to {}",
                booking_id, booking.status, status
            )));
        }

        let updated = self
            .bookings
            .update_booking_status(booking_id, status)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Booking {} not found", booking_id)))?;

        info!(booking_id, from = %booking.status, to = %status, "Booking status changed");
        Ok(updated)
    }
}
