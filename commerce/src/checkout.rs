use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CommerceError, CommerceResult};
use crate::model::{
    Address, CartEntry, CartLine, ModelId, NewOrder, Order, OrderFilter, OrderItem, OrderStatus,
    OrderTotals, Product,
};
use crate::payment::{PaymentGateway, PaymentRequest};
use crate::pricing::{PricingPolicy, to_minor_units};
use crate::storage::{CartStorage, CatalogStorage, OrderStorage};
use crate::validation::normalize_email;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ModelId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub email: Option<String>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub authorization_url: String,
    pub reference: String,
    pub formatted_total: String,
}

/// A saved line that cannot be bought right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableItem {
    pub product_id: ModelId,
    pub quantity: u32,
    pub reason: String,
}

/// Cart lines re-priced from the catalog. Totals cover the purchasable lines only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedCart {
    pub items: Vec<OrderItem>,
    pub totals: Option<OrderTotals>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<UnavailableItem>,
}

pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("LUX-{}-{}", now.format("%Y%m%d"), suffix)
}

/// Same product listed twice becomes one line; order of first appearance is kept.
fn merge_entries(entries: Vec<CartEntry>) -> CommerceResult<Vec<CartEntry>> {
    let mut merged: Vec<CartEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.iter_mut().find(|e| e.product_id == entry.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or_else(|| CommerceError::validation("quantity is too large"))?;
            }
            None => merged.push(entry),
        }
    }
    Ok(merged)
}

/// Checks one entry against its catalog product and snapshots it as an order line.
fn price_line(product: Option<&Product>, entry: &CartEntry) -> CommerceResult<OrderItem> {
    let product = product.ok_or_else(|| {
        CommerceError::not_found(format!("Product {} not found", entry.product_id))
    })?;
    if !product.is_active {
        return Err(CommerceError::validation(format!(
            "{} is no longer available",
            product.name
        )));
    }
    if i64::from(entry.quantity) > i64::from(product.stock) {
        return Err(CommerceError::conflict(format!(
            "only {} of {} left in stock",
            product.stock, product.name
        )));
    }
    let line = CartLine {
        product_id: product.id,
        unit_price: product.price,
        quantity: entry.quantity,
    };
    Ok(OrderItem {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: line.unit_price,
        quantity: line.quantity,
        line_total: line.line_total(),
    })
}

fn cart_lines(items: &[OrderItem]) -> Vec<CartLine> {
    items
        .iter()
        .map(|item| CartLine {
            product_id: item.product_id,
            unit_price: item.unit_price,
            quantity: item.quantity,
        })
        .collect()
}

/// Order creation, payment handoff and the order lifecycle.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStorage>,
    orders: Arc<dyn OrderStorage>,
    carts: Arc<dyn CartStorage>,
    payments: Arc<dyn PaymentGateway>,
    pricing: PricingPolicy,
    callback_url: String,
}

impl CheckoutService {
    pub fn new(
        catalog: Arc<dyn CatalogStorage>,
        orders: Arc<dyn OrderStorage>,
        carts: Arc<dyn CartStorage>,
        payments: Arc<dyn PaymentGateway>,
        pricing: PricingPolicy,
        callback_url: String,
    ) -> Self {
        Self {
            catalog,
            orders,
            carts,
            payments,
            pricing,
            callback_url,
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    async fn products_for(
        &self,
        entries: &[CartEntry],
    ) -> CommerceResult<HashMap<ModelId, Product>> {
        let ids: Vec<ModelId> = entries.iter().map(|e| e.product_id).collect();
        Ok(self
            .catalog
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }

    /// Prices entries at current catalog prices. Fails on unknown, inactive or
    /// short-stocked products.
    pub async fn price_entries(
        &self,
        entries: &[CartEntry],
    ) -> CommerceResult<(Vec<OrderItem>, OrderTotals)> {
        let products = self.products_for(entries).await?;
        let items = entries
            .iter()
            .map(|entry| price_line(products.get(&entry.product_id), entry))
            .collect::<CommerceResult<Vec<_>>>()?;
        let totals = self.pricing.order_totals(&cart_lines(&items))?;
        Ok((items, totals))
    }

    /// Saved cart at current prices. Lines that cannot be bought are reported, not priced.
    pub async fn cart_summary(&self, user_email: &str) -> CommerceResult<PricedCart> {
        let entries = self.carts.get_cart(user_email).await?;
        let products = self.products_for(&entries).await?;

        let mut items = Vec::with_capacity(entries.len());
        let mut unavailable = Vec::new();
        for entry in &entries {
            match price_line(products.get(&entry.product_id), entry) {
                Ok(item) => items.push(item),
                Err(e) => unavailable.push(UnavailableItem {
                    product_id: entry.product_id,
                    quantity: entry.quantity,
                    reason: e.to_string(),
                }),
            }
        }

        let totals = if items.is_empty() {
            None
        } else {
            Some(self.pricing.order_totals(&cart_lines(&items))?)
        };
        Ok(PricedCart {
            items,
            totals,
            unavailable,
        })
    }

    pub async fn set_cart_item(
        &self,
        user_email: &str,
        item: &CheckoutItem,
    ) -> CommerceResult<PricedCart> {
        if item.quantity > 0 {
            let product = self.catalog.get_product(item.product_id).await?;
            let entry = CartEntry {
                product_id: item.product_id,
                quantity: item.quantity,
            };
            price_line(product.as_ref(), &entry)?;
        }
        self.carts
            .set_cart_item(user_email, item.product_id, item.quantity)
            .await?;
        self.cart_summary(user_email).await
    }

    pub async fn remove_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
    ) -> CommerceResult<PricedCart> {
        self.carts.remove_cart_item(user_email, product_id).await?;
        self.cart_summary(user_email).await
    }

    /// Creates a `pending` order from the request items, or from the caller's server cart.
    /// A signed-in caller always orders as themselves.
    pub async fn place_order(
        &self,
        customer: Option<&str>,
        request: &CheckoutRequest,
    ) -> CommerceResult<Order> {
        let customer_email = match customer {
            Some(user) => {
                let user = normalize_email("email", Some(user))?;
                let given = request.email.as_deref().filter(|e| !e.trim().is_empty());
                if let Some(given) = given {
                    if normalize_email("email", Some(given))? != user {
                        return Err(CommerceError::validation(
                            "email does not match the signed-in account",
                        ));
                    }
                }
                user
            }
            None => normalize_email("email", request.email.as_deref())?,
        };

        let entries = if !request.items.is_empty() {
            request
                .items
                .iter()
                .map(|item| CartEntry {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect()
        } else if let Some(user) = customer {
            self.carts.get_cart(user).await?
        } else {
            Vec::new()
        };
        let entries = merge_entries(entries)?;
        if entries.is_empty() {
            return Err(CommerceError::validation("cart is empty"));
        }

        let shipping_address = request
            .shipping_address
            .clone()
            .ok_or_else(|| CommerceError::validation("shippingAddress is required"))?;
        shipping_address
            .validate("shipping")
            .map_err(CommerceError::Validation)?;
        let billing_address = match &request.billing_address {
            Some(address) => {
                address.validate("billing").map_err(CommerceError::Validation)?;
                address.clone()
            }
            None => shipping_address.clone(),
        };

        let (items, totals) = self.price_entries(&entries).await?;
        let new_order = NewOrder {
            order_number: generate_order_number(Utc::now()),
            customer_email,
            items,
            totals,
            currency: self.pricing.currency.clone(),
            shipping_address,
            billing_address,
        };

        let order = self.orders.create_order(&new_order).await?;
        info!(
            order_id = order.id,
            order_number = %order.order_number,
            total = %order.totals.total,
            "Order created"
        );
        metrics::counter!("storefront_orders_created_total").increment(1);

        if let Some(user) = customer {
            if let Err(e) = self.carts.clear_cart(user).await {
                warn!(
                    error = %e,
                    order_id = order.id,
                    "Failed to clear cart after order creation"
                );
            }
        }
        Ok(order)
    }

    /// Creates the order and hands it to the payment gateway. A failed handoff leaves
    /// the order pending.
    pub async fn checkout(
        &self,
        customer: Option<&str>,
        request: &CheckoutRequest,
    ) -> CommerceResult<CheckoutResponse> {
        let order = self.place_order(customer, request).await?;
        let amount = to_minor_units(order.totals.total)
            .ok_or_else(|| CommerceError::validation("order total is out of range"))?;

        let payment_request = PaymentRequest {
            email: order.customer_email.clone(),
            amount,
            currency: order.currency.clone(),
            reference: order.order_number.clone(),
            callback_url: self.callback_url.clone(),
            metadata: json!({ "order_id": order.id, "order_number": order.order_number }),
        };

        match self.payments.initialize(&payment_request).await {
            Ok(session) => {
                info!(order_number = %order.order_number, "Payment initialised");
                Ok(CheckoutResponse {
                    formatted_total: self.pricing.format(order.totals.total),
                    reference: session.reference,
                    authorization_url: session.authorization_url,
                    order,
                })
            }
            Err(e) => {
                warn!(
                    error = %e,
                    order_number = %order.order_number,
                    "Payment initialisation failed, order left pending"
                );
                metrics::counter!("storefront_payment_failures_total", "stage" => "initialize")
                    .increment(1);
                Err(CommerceError::Gateway(format!(
                    "payment could not be started for order {}: {}",
                    order.order_number, e
                )))
            }
        }
    }

    /// Confirms a payment with the gateway and moves the order to `processing`.
    pub async fn confirm_payment(&self, reference: &str) -> CommerceResult<Order> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(CommerceError::validation("reference is required"));
        }
        let order = self
            .orders
            .find_order_by_number(reference)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Order {} not found", reference)))?;

        if order.is_paid() {
            return Ok(order);
        }
        if order.status != OrderStatus::Pending {
            return Err(CommerceError::conflict(format!(
                "Order {} is {} and cannot be paid",
                order.order_number, order.status
            )));
        }

        let verification = self.payments.verify(reference).await?;
        if !verification.is_successful() {
            metrics::counter!("storefront_payment_failures_total", "stage" => "verify")
                .increment(1);
            return Err(CommerceError::PaymentRequired(format!(
                "payment {} is {}",
                reference, verification.status
            )));
        }
        let expected = to_minor_units(order.totals.total);
        if expected != Some(verification.amount) {
            warn!(
                order_number = %order.order_number,
                paid = verification.amount,
                expected = ?expected,
                "Paid amount does not match order total"
            );
            return Err(CommerceError::conflict("paid amount does not match the order total"));
        }

        let paid_at = verification.paid_at.unwrap_or_else(Utc::now);
        let paid = self
            .orders
            .mark_order_paid(order.id, reference, paid_at)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Order {} not found", reference)))?;
        // The paid mark only applies to a pending order; a concurrent cancel wins.
        if !paid.is_paid() {
            warn!(
                order_number = %paid.order_number,
                status = %paid.status,
                "Payment verified for an order that left pending"
            );
            return Err(CommerceError::conflict(format!(
                "Order {} is {} and cannot be paid",
                paid.order_number, paid.status
            )));
        }
        info!(order_number = %paid.order_number, "Payment confirmed");
        Ok(paid)
    }

    pub async fn get_order(&self, order_id: ModelId) -> CommerceResult<Order> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Order {} not found", order_id)))
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> CommerceResult<Vec<Order>> {
        Ok(self.orders.list_orders(filter).await?)
    }

    pub async fn update_status(
        &self,
        order_id: ModelId,
        status: OrderStatus,
    ) -> CommerceResult<Order> {
        let order = self.get_order(order_id).await?;
        if !order.status.can_transition_to(status) {
            return Err(CommerceError::conflict(format!(
                "Order {} cannot move from {} to {}",
                order.order_number, order.status, status
            )));
        }
        let updated = self
            .orders
            .update_order_status(order_id, status)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Order {} not found", order_id)))?;
        info!(order_id, from = %order.status, to = %status, "Order status changed");
        Ok(updated)
    }
}
