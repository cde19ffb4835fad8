use axum::{
    Json, Router,
    extract::{FromRef, FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::AccessPolicy;
use crate::availability::AvailabilityService;
use crate::checkout::CheckoutService;
use crate::error::CommerceError;
use crate::payment::PaymentGateway;
use crate::pricing::PricingPolicy;
use crate::storage::{BackOfficeStorage, BookingStorage, CartStorage, CatalogStorage, OrderStorage};

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod real_estate;

/// JSON body whose rejections become 400s with a readable message.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CommerceError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CommerceError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CommerceError))]
pub struct ApiPath<T>(pub T);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStorage>,
    pub back_office: Arc<dyn BackOfficeStorage>,
    pub availability: AvailabilityService,
    pub checkout: CheckoutService,
    pub access: Arc<AccessPolicy>,
}

impl FromRef<AppState> for Arc<AccessPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.access.clone()
    }
}

impl AppState {
    /// Wires every service onto one store implementing all storage traits.
    pub fn new<S>(
        storage: Arc<S>,
        payments: Arc<dyn PaymentGateway>,
        pricing: PricingPolicy,
        callback_url: String,
        access: AccessPolicy,
    ) -> Self
    where
        S: CatalogStorage
            + BookingStorage
            + OrderStorage
            + CartStorage
            + BackOfficeStorage
            + 'static,
    {
        let catalog: Arc<dyn CatalogStorage> = storage.clone();
        let bookings: Arc<dyn BookingStorage> = storage.clone();
        let orders: Arc<dyn OrderStorage> = storage.clone();
        let carts: Arc<dyn CartStorage> = storage.clone();
        let back_office: Arc<dyn BackOfficeStorage> = storage;

        Self {
            availability: AvailabilityService::new(catalog.clone(), bookings),
            checkout: CheckoutService::new(
                catalog.clone(),
                orders,
                carts,
                payments,
                pricing,
                callback_url,
            ),
            catalog,
            back_office,
            access: Arc::new(access),
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(catalog::routes())
        .merge(real_estate::routes())
        .merge(cart::routes())
        .merge(orders::routes())
        .nest("/api/admin", admin::routes())
        .with_state(state)
}
