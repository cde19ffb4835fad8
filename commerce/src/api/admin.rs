use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::analytics::DashboardSummary;
use crate::auth::Admin;
use crate::error::{CommerceError, CommerceResult};
use crate::model::{
    Booking, BookingFilter, BookingStatus, MediaAsset, ModelId, NewMediaAsset, Order, OrderFilter,
    OrderStatus, Product, ProductInput, ProductQuery, StoreSettings, UserProfile,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{product_id}", put(update_product).delete(delete_product))
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/status", patch(update_order_status))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{booking_id}/status", patch(update_booking_status))
        .route("/users", get(list_users))
        .route("/media", get(list_media).post(create_media))
        .route("/media/{media_id}", delete(delete_media))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/analytics", get(dashboard))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_admin: bool,
}

// products

pub async fn list_products(
    _admin: Admin,
    State(state): State<AppState>,
    ApiQuery(mut query): ApiQuery<ProductQuery>,
) -> CommerceResult<ApiJson<Vec<Product>>> {
    query.include_inactive = true;
    Ok(ApiJson(state.catalog.list_products(&query).await?))
}

pub async fn create_product(
    Admin(admin): Admin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> CommerceResult<(StatusCode, ApiJson<Product>)> {
    input.validate().map_err(CommerceError::Validation)?;
    let product = state.catalog.create_product(&input).await?;
    info!(product_id = product.id, admin = %admin, "Product created");
    Ok((StatusCode::CREATED, ApiJson(product)))
}

pub async fn update_product(
    Admin(admin): Admin,
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ModelId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> CommerceResult<ApiJson<Product>> {
    input.validate().map_err(CommerceError::Validation)?;
    let product = state
        .catalog
        .update_product(product_id, &input)
        .await?
        .ok_or_else(|| CommerceError::not_found(format!("Product {} not found", product_id)))?;
    info!(product_id, admin = %admin, "Product updated");
    Ok(ApiJson(product))
}

pub async fn delete_product(
    Admin(admin): Admin,
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ModelId>,
) -> CommerceResult<StatusCode> {
    if !state.catalog.delete_product(product_id).await? {
        return Err(CommerceError::not_found(format!("Product {} not found", product_id)));
    }
    info!(product_id, admin = %admin, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

// orders

pub async fn list_orders(
    _admin: Admin,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> CommerceResult<ApiJson<Vec<Order>>> {
    Ok(ApiJson(state.checkout.list_orders(&filter).await?))
}

pub async fn get_order(
    _admin: Admin,
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<ModelId>,
) -> CommerceResult<ApiJson<Order>> {
    Ok(ApiJson(state.checkout.get_order(order_id).await?))
}

pub async fn update_order_status(
    _admin: Admin,
    State(state): State<AppState>,
    ApiPath(order_id): ApiPath<ModelId>,
    ApiJson(update): ApiJson<StatusUpdate<OrderStatus>>,
) -> CommerceResult<ApiJson<Order>> {
    Ok(ApiJson(state.checkout.update_status(order_id, update.status).await?))
}

// bookings

pub async fn list_bookings(
    _admin: Admin,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BookingFilter>,
) -> CommerceResult<ApiJson<Vec<Booking>>> {
    Ok(ApiJson(state.availability.list(&filter).await?))
}

pub async fn update_booking_status(
    _admin: Admin,
    State(state): State<AppState>,
    ApiPath(booking_id): ApiPath<ModelId>,
    ApiJson(update): ApiJson<StatusUpdate<BookingStatus>>,
) -> CommerceResult<ApiJson<Booking>> {
    Ok(ApiJson(state.availability.update_status(booking_id, update.status).await?))
}

// users, media, settings

pub async fn list_users(
    _admin: Admin,
    State(state): State<AppState>,
) -> CommerceResult<ApiJson<Vec<AdminUserView>>> {
    let users = state
        .back_office
        .list_users()
        .await?
        .into_iter()
        .map(|profile| AdminUserView {
            is_admin: state.access.is_admin(&profile.email),
            profile,
        })
        .collect();
    Ok(ApiJson(users))
}

pub async fn list_media(
    _admin: Admin,
    State(state): State<AppState>,
) -> CommerceResult<ApiJson<Vec<MediaAsset>>> {
    Ok(ApiJson(state.back_office.list_media().await?))
}

pub async fn create_media(
    Admin(admin): Admin,
    State(state): State<AppState>,
    ApiJson(asset): ApiJson<NewMediaAsset>,
) -> CommerceResult<(StatusCode, ApiJson<MediaAsset>)> {
    asset.validate().map_err(CommerceError::Validation)?;
    let media = state.back_office.create_media(&asset).await?;
    info!(media_id = media.id, admin = %admin, "Media registered");
    Ok((StatusCode::CREATED, ApiJson(media)))
}

pub async fn delete_media(
    _admin: Admin,
    State(state): State<AppState>,
    ApiPath(media_id): ApiPath<ModelId>,
) -> CommerceResult<StatusCode> {
    if !state.back_office.delete_media(media_id).await? {
        return Err(CommerceError::not_found(format!("Media {} not found", media_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(
    _admin: Admin,
    State(state): State<AppState>,
) -> CommerceResult<ApiJson<StoreSettings>> {
    Ok(ApiJson(state.back_office.get_settings().await?))
}

pub async fn update_settings(
    Admin(admin): Admin,
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<StoreSettings>,
) -> CommerceResult<ApiJson<StoreSettings>> {
    if settings.keys().any(|key| key.trim().is_empty()) {
        return Err(CommerceError::validation("setting keys cannot be empty"));
    }
    let stored = state.back_office.upsert_settings(&settings).await?;
    info!(keys = settings.len(), admin = %admin, "Settings updated");
    Ok(ApiJson(stored))
}

// analytics

pub async fn dashboard(
    _admin: Admin,
    State(state): State<AppState>,
) -> CommerceResult<ApiJson<DashboardSummary>> {
    let orders = state.checkout.list_orders(&OrderFilter::default()).await?;
    let bookings = state.availability.list(&BookingFilter::default()).await?;
    let product_count = state.catalog.count_products().await?;
    Ok(ApiJson(DashboardSummary::build(
        &orders,
        &bookings,
        product_count,
        state.checkout.pricing(),
    )))
}
