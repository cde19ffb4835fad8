use axum::{Router, extract::State, routing::get};

use super::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::error::{CommerceError, CommerceResult};
use crate::model::{ModelId, Product, ProductQuery, PropertyListing};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{product_id}", get(get_product))
        .route("/api/real-estate/properties", get(list_properties))
        .route("/api/real-estate/properties/{property_id}", get(get_property))
}

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(mut query): ApiQuery<ProductQuery>,
) -> CommerceResult<ApiJson<Vec<Product>>> {
    query.include_inactive = false;
    Ok(ApiJson(state.catalog.list_products(&query).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ModelId>,
) -> CommerceResult<ApiJson<Product>> {
    state
        .catalog
        .get_product(product_id)
        .await?
        .filter(|product| product.is_active)
        .map(ApiJson)
        .ok_or_else(|| CommerceError::not_found(format!("Product {} not found", product_id)))
}

pub async fn list_properties(
    State(state): State<AppState>,
) -> CommerceResult<ApiJson<Vec<PropertyListing>>> {
    let listings = state
        .catalog
        .list_properties()
        .await?
        .into_iter()
        .filter(|listing| listing.product.is_active)
        .collect();
    Ok(ApiJson(listings))
}

pub async fn get_property(
    State(state): State<AppState>,
    ApiPath(property_id): ApiPath<ModelId>,
) -> CommerceResult<ApiJson<PropertyListing>> {
    state
        .catalog
        .get_property(property_id)
        .await?
        .filter(|listing| listing.product.is_active)
        .map(ApiJson)
        .ok_or_else(|| CommerceError::not_found(format!("Property {} not found", property_id)))
}
