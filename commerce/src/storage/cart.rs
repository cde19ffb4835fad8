use crate::model::*;
use async_trait::async_trait;

/// Server-side carts of authenticated customers, keyed by email.
#[async_trait]
pub trait CartStorage: Send + Sync {
    async fn get_cart(&self, user_email: &str) -> Result<Vec<CartEntry>, GenericError>;

    /// Sets the quantity of a product; zero removes the line.
    async fn set_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
        quantity: u32,
    ) -> Result<(), GenericError>;

    async fn remove_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
    ) -> Result<(), GenericError>;

    async fn clear_cart(&self, user_email: &str) -> Result<(), GenericError>;
}
