use axum::{
    Router,
    extract::State,
    routing::{delete, get, put},
};

use super::{ApiJson, ApiPath, AppState};
use crate::auth::Customer;
use crate::checkout::{CheckoutItem, PricedCart};
use crate::error::CommerceResult;
use crate::model::ModelId;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", put(put_cart_item))
        .route("/api/cart/items/{product_id}", delete(delete_cart_item))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Customer(email): Customer,
) -> CommerceResult<ApiJson<PricedCart>> {
    Ok(ApiJson(state.checkout.cart_summary(&email).await?))
}

pub async fn put_cart_item(
    State(state): State<AppState>,
    Customer(email): Customer,
    ApiJson(item): ApiJson<CheckoutItem>,
) -> CommerceResult<ApiJson<PricedCart>> {
    Ok(ApiJson(state.checkout.set_cart_item(&email, &item).await?))
}

pub async fn delete_cart_item(
    State(state): State<AppState>,
    Customer(email): Customer,
    ApiPath(product_id): ApiPath<ModelId>,
) -> CommerceResult<ApiJson<PricedCart>> {
    Ok(ApiJson(state.checkout.remove_cart_item(&email, product_id).await?))
}
