use crate::model::*;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogStorage: Send + Sync {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, GenericError>;

    async fn get_product(&self, product_id: ModelId) -> Result<Option<Product>, GenericError>;

    /// Products for the given ids; unknown ids are simply absent from the result.
    async fn get_products(&self, product_ids: &[ModelId]) -> Result<Vec<Product>, GenericError>;

    async fn create_product(&self, input: &ProductInput) -> Result<Product, GenericError>;

    async fn update_product(
        &self,
        product_id: ModelId,
        input: &ProductInput,
    ) -> Result<Option<Product>, GenericError>;

    /// Returns false when nothing was deleted.
    async fn delete_product(&self, product_id: ModelId) -> Result<bool, GenericError>;

    async fn count_products(&self) -> Result<u64, GenericError>;

    async fn list_properties(&self) -> Result<Vec<PropertyListing>, GenericError>;

    async fn get_property(
        &self,
        property_id: ModelId,
    ) -> Result<Option<PropertyListing>, GenericError>;
}
