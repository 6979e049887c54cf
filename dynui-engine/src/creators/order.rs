use super::{decode, encode, format_price};
use crate::creator::{ComponentCreator, ViewDescriptor};
use dynui_types::{ComponentInstance, PayloadReader, Placement, TypePolicy};
use serde::{Deserialize, Serialize};

pub const ORDER_SUMMARY: &str = "orderSummary";

const FUNCTIONS: &[&str] = &["get_cart", "add_to_cart", "get_order_summary"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderSummaryData {
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: u64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderSummaryView<'a> {
    item_count: u64,
    empty: bool,
    lines: Vec<OrderLineView<'a>>,
    subtotal_label: String,
    tax_label: String,
    total_label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderLineView<'a> {
    name: &'a str,
    quantity: u64,
    line_total_label: String,
}

/// Cart summary docked at the bottom; there is only ever one cart.
pub struct OrderSummaryCreator;

impl ComponentCreator for OrderSummaryCreator {
    fn component_type(&self) -> &str {
        ORDER_SUMMARY
    }

    fn function_names(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn policy(&self) -> TypePolicy {
        TypePolicy::unique("Order summary").in_placements(&[Placement::Bottom])
    }

    fn default_placement(&self) -> Placement {
        Placement::Bottom
    }

    fn normalize(&self, payload: PayloadReader<'_>) -> serde_json::Value {
        let cart = match payload.get(&["cart", "order"]) {
            Some(inner) if inner.is_object() => PayloadReader::new(inner),
            _ => payload,
        };
        let items: Vec<LineItem> = cart
            .array(&["items", "lineItems", "line_items"])
            .iter()
            .map(|item| {
                let item = PayloadReader::new(item);
                LineItem {
                    name: item.str_or(&["name", "title"], "Item"),
                    quantity: item.u64_or(&["quantity", "qty"], 1),
                    unit_price: item.f64_or(&["unitPrice", "unit_price", "price"], 0.0),
                }
            })
            .collect();

        let computed_subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        let subtotal = cart.f64_or(&["subtotal", "subTotal"], computed_subtotal);
        let tax = cart.f64_or(&["tax", "taxes"], 0.0);
        encode(&OrderSummaryData {
            total: cart.f64_or(&["total", "grandTotal"], subtotal + tax),
            subtotal,
            tax,
            currency: cart.str_or(&["currency"], "USD"),
            items,
        })
    }

    fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor {
        let data: OrderSummaryData = decode(&instance.data);
        let lines: Vec<OrderLineView<'_>> = data
            .items
            .iter()
            .map(|item| OrderLineView {
                name: &item.name,
                quantity: item.quantity,
                line_total_label: format_price(item.line_total(), &data.currency),
            })
            .collect();

        ViewDescriptor::widget(
            ORDER_SUMMARY,
            &OrderSummaryView {
                item_count: data.items.iter().fold(0u64, |n, i| n.saturating_add(i.quantity)),
                empty: lines.is_empty(),
                lines,
                subtotal_label: format_price(data.subtotal, &data.currency),
                tax_label: format_price(data.tax, &data.currency),
                total_label: format_price(data.total, &data.currency),
            },
        )
    }
}
