use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{Booking, BookingStatus, ModelId, Order, OrderStatus};
use crate::pricing::PricingPolicy;

const RECENT_ORDER_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: ModelId,
    pub order_number: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub currency: String,
    pub total_revenue: Decimal,
    pub formatted_revenue: String,
    pub order_count: usize,
    pub paid_order_count: usize,
    pub average_order_value: Decimal,
    pub orders_by_status: BTreeMap<String, usize>,
    pub booking_count: usize,
    pub bookings_by_status: BTreeMap<String, usize>,
    pub booked_nights: i64,
    pub booking_revenue: Decimal,
    pub product_count: u64,
    pub recent_orders: Vec<RecentOrder>,
}

/// Status counts keyed by the lowercase status name.
pub fn count_by_status<T, S: ToString>(
    records: &[T],
    status: impl Fn(&T) -> S,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(status(record).to_string()).or_insert(0) += 1;
    }
    counts
}

impl DashboardSummary {
    pub fn build(
        orders: &[Order],
        bookings: &[Booking],
        product_count: u64,
        pricing: &PricingPolicy,
    ) -> Self {
        let paid: Vec<&Order> = orders.iter().filter(|o| o.status.counts_as_revenue()).collect();
        let total_revenue: Decimal = paid.iter().map(|o| o.totals.total).sum();
        let average_order_value = if paid.is_empty() {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(paid.len()))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        let honoured = bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Confirmed | BookingStatus::Completed));
        let (booked_nights, booking_revenue) = honoured
            .fold((0i64, Decimal::ZERO), |(nights, revenue), b| {
                (nights + b.stay().nights(), revenue + b.total_price)
            });

        let mut recent: Vec<&Order> = orders.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_orders = recent
            .into_iter()
            .take(RECENT_ORDER_COUNT)
            .map(|o| RecentOrder {
                id: o.id,
                order_number: o.order_number.clone(),
                customer_email: o.customer_email.clone(),
                status: o.status,
                total: o.totals.total,
                created_at: o.created_at,
            })
            .collect();

        Self {
            currency: pricing.currency.clone(),
            formatted_revenue: pricing.format(total_revenue),
            total_revenue,
            order_count: orders.len(),
            paid_order_count: paid.len(),
            average_order_value,
            orders_by_status: count_by_status(orders, |o| o.status),
            booking_count: bookings.len(),
            bookings_by_status: count_by_status(bookings, |b| b.status),
            booked_nights,
            booking_revenue,
            product_count,
            recent_orders,
        }
    }
}
