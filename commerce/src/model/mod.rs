use std::error::Error;

pub type ModelId = i64;

pub type GenericError = Box<dyn Error + Send + Sync>;

pub mod back_office;
pub mod booking;
pub mod catalog;
pub mod order;

pub use back_office::{MediaAsset, NewMediaAsset, StoreSettings, UserProfile};
pub use booking::{Booking, BookingFilter, BookingOutcome, BookingStatus, NewBooking, StayRange};
pub use catalog::{Product, ProductInput, ProductQuery, Property, PropertyListing};
pub use order::{
    Address, CartEntry, CartLine, NewOrder, Order, OrderFilter, OrderItem, OrderStatus, OrderTotals,
};
