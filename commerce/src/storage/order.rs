use crate::model::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait OrderStorage: Send + Sync {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, GenericError>;

    async fn get_order(&self, order_id: ModelId) -> Result<Option<Order>, GenericError>;

    async fn find_order_by_number(&self, order_number: &str) -> Result<Option<Order>, GenericError>;

    /// Newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, GenericError>;

    async fn update_order_status(
        &self,
        order_id: ModelId,
        status: OrderStatus,
    ) -> Result<Option<Order>, GenericError>;

    async fn mark_order_paid(
        &self,
        order_id: ModelId,
        payment_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, GenericError>;
}
