use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::ModelId;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Statuses that hold the dates of a property.
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Pending];

    pub fn blocks_dates(self) -> bool {
        Self::BLOCKING.contains(&self)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }
}

/// Half-open stay `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, String> {
        if check_out <= check_in {
            return Err(format!(
                "checkOut ({}) must be after checkIn ({})",
                check_out, check_in
            ));
        }
        Ok(Self { check_in, check_out })
    }

    /// Nights charged for the stay, rounding any partial day up.
    pub fn nights(&self) -> i64 {
        let seconds = (self.check_out - self.check_in).num_seconds();
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }

    /// Three-clause overlap test between `self` (the requested stay) and an existing one.
    pub fn overlaps(&self, existing: &StayRange) -> bool {
        let starts_inside_existing =
            existing.check_in <= self.check_in && self.check_in < existing.check_out;
        let existing_starts_inside =
            self.check_in <= existing.check_in && existing.check_in < self.check_out;
        let contains_existing =
            self.check_in <= existing.check_in && existing.check_out <= self.check_out;

        starts_inside_existing || existing_starts_inside || contains_existing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: ModelId,
    pub property_id: ModelId,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guests: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }

    pub fn conflicts_with(&self, property_id: ModelId, stay: &StayRange) -> bool {
        self.property_id == property_id && self.status.blocks_dates() && stay.overlaps(&self.stay())
    }
}

/// A validated, priced booking ready to be stored as `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub property_id: ModelId,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub guests: i32,
    pub stay: StayRange,
    pub total_price: Decimal,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    pub property_id: Option<ModelId>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.property_id.is_none_or(|id| booking.property_id == id)
            && self.status.is_none_or(|status| booking.status == status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Created(Booking),
    Conflict(Vec<Booking>),
}
