use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use super::{ApiJson, ApiQuery, AppState};
use crate::auth::{Customer, MaybeCustomer};
use crate::checkout::{CheckoutRequest, CheckoutResponse};
use crate::error::CommerceResult;
use crate::model::{Order, OrderFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(my_orders).post(create_order))
        .route("/api/checkout", post(checkout))
        .route("/api/payments/verify", get(verify_payment))
}

pub async fn create_order(
    State(state): State<AppState>,
    MaybeCustomer(customer): MaybeCustomer,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> CommerceResult<(StatusCode, ApiJson<Order>)> {
    let order = state.checkout.place_order(customer.as_deref(), &request).await?;
    Ok((StatusCode::CREATED, ApiJson(order)))
}

pub async fn my_orders(
    State(state): State<AppState>,
    Customer(email): Customer,
) -> CommerceResult<ApiJson<Vec<Order>>> {
    let filter = OrderFilter {
        status: None,
        customer_email: Some(email),
    };
    Ok(ApiJson(state.checkout.list_orders(&filter).await?))
}

pub async fn checkout(
    State(state): State<AppState>,
    MaybeCustomer(customer): MaybeCustomer,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> CommerceResult<(StatusCode, ApiJson<CheckoutResponse>)> {
    let response = state.checkout.checkout(customer.as_deref(), &request).await?;
    Ok((StatusCode::CREATED, ApiJson(response)))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub reference: Option<String>,
}

pub async fn verify_payment(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyQuery>,
) -> CommerceResult<ApiJson<Order>> {
    let reference = query.reference.unwrap_or_default();
    Ok(ApiJson(state.checkout.confirm_payment(&reference).await?))
}
