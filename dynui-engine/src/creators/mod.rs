//! Built-in creators for the ordering assistant's widgets.

mod loyalty;
mod menu;
mod order;
mod product;

pub use loyalty::{LOYALTY_CARD, LoyaltyCardCreator, LoyaltyCardData, PointsEntry, Reward};
pub use menu::{MENU_RECOMMENDATIONS, MenuItem, MenuRecommendationsCreator, MenuRecommendationsData};
pub use order::{LineItem, ORDER_SUMMARY, OrderSummaryCreator, OrderSummaryData};
pub use product::{PRODUCT_DETAIL, ProductDetailCreator, ProductDetailData, ProductOption};

use crate::creator::ComponentCreator;
use std::sync::Arc;

pub fn builtin_creators() -> Vec<Arc<dyn ComponentCreator>> {
    vec![
        Arc::new(LoyaltyCardCreator),
        Arc::new(MenuRecommendationsCreator),
        Arc::new(ProductDetailCreator),
        Arc::new(OrderSummaryCreator),
    ]
}

/// "$4.50" for USD (and unspecified currency), "4.50 EUR" otherwise.
pub(crate) fn format_price(amount: f64, currency: &str) -> String {
    match currency {
        "" | "USD" | "usd" => format!("${amount:.2}"),
        other => format!("{amount:.2} {}", other.to_uppercase()),
    }
}

/// Reads stored `data` back into its typed form, defaulting on mismatch.
pub(crate) fn decode<T>(data: &serde_json::Value) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    serde_json::from_value(data.clone()).unwrap_or_default()
}

pub(crate) fn encode<T: serde::Serialize>(data: &T) -> serde_json::Value {
    serde_json::to_value(data).unwrap_or_default()
}
