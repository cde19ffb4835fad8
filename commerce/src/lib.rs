pub mod analytics;
pub mod api;
pub mod auth;
pub mod availability;
pub mod checkout;
pub mod error;
pub mod executable_utils;
pub mod model;
pub mod payment;
pub mod pricing;
pub mod storage;
pub mod validation;
