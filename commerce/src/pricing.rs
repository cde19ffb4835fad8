use common::config::PricingConfig;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{CommerceError, CommerceResult};
use crate::model::{CartLine, OrderTotals};

/// Tax and shipping rules applied to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy {
    pub currency: String,
    pub tax_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
}

impl From<&PricingConfig> for PricingPolicy {
    fn from(config: &PricingConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            tax_rate: Decimal::new(i64::from(config.tax_rate_bps), 4),
            free_shipping_threshold: Decimal::from(config.free_shipping_threshold),
            flat_shipping_fee: Decimal::from(config.flat_shipping_fee),
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::from(&PricingConfig::default())
    }
}

impl PricingPolicy {
    pub fn order_totals(&self, lines: &[CartLine]) -> CommerceResult<OrderTotals> {
        if lines.is_empty() {
            return Err(CommerceError::validation("cart is empty"));
        }
        if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
            return Err(CommerceError::validation(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }

        let subtotal: Decimal = lines.iter().map(CartLine::line_total).sum();
        Ok(self.totals_for_subtotal(subtotal))
    }

    pub fn totals_for_subtotal(&self, subtotal: Decimal) -> OrderTotals {
        let tax = round_money(subtotal * self.tax_rate);
        let shipping = self.shipping_for(subtotal);
        OrderTotals {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        }
    }

    pub fn format(&self, amount: Decimal) -> String {
        format_amount(amount, &self.currency)
    }
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount in the currency's minor unit (kobo for NGN).
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (round_money(amount) * Decimal::ONE_HUNDRED).to_i64()
}

/// `₦12,000.00` for naira, `USD 1,250.50` for anything else.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let rounded = round_money(amount.abs());
    let text = format!("{:.2}", rounded);
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let symbol = match currency {
        "NGN" => "₦".to_string(),
        other => format!("{} ", other),
    };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}
