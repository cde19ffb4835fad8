pub mod entities;
pub mod storefront_storage;
