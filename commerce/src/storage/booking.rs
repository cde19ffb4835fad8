use crate::model::*;
use async_trait::async_trait;

#[async_trait]
pub trait BookingStorage: Send + Sync {
    /// Bookings of `property_id` in a blocking status that overlap `stay`.
    async fn find_conflicting_bookings(
        &self,
        property_id: ModelId,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, GenericError>;

    /// Overlap check and insert as one atomic step: either the booking is stored
    /// as `pending` or the bookings that hold the dates are returned.
    async fn create_booking_if_available(
        &self,
        booking: &NewBooking,
    ) -> Result<BookingOutcome, GenericError>;

    async fn get_booking(&self, booking_id: ModelId) -> Result<Option<Booking>, GenericError>;

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, GenericError>;

    async fn update_booking_status(
        &self,
        booking_id: ModelId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, GenericError>;
}
