// Storage seams of the storefront. The Postgres implementation lives in the `storefront` crate.
pub mod back_office;
pub mod booking;
pub mod cart;
pub mod catalog;
pub mod order;

pub use back_office::*;
pub use booking::*;
pub use cart::*;
pub use catalog::*;
pub use order::*;
