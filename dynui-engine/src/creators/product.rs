use super::{decode, encode, format_price};
use crate::creator::{ComponentCreator, ViewDescriptor};
use dynui_types::{ComponentInstance, PayloadReader, Placement, TypePolicy};
use serde::{Deserialize, Serialize};

pub const PRODUCT_DETAIL: &str = "productDetail";

const FUNCTIONS: &[&str] = &["get_product_details", "get_product_info"];
const VISIBLE_PRODUCTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductDetailData {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub image_url: Option<String>,
    pub available: bool,
    pub options: Vec<ProductOption>,
}

impl Default for ProductDetailData {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            name: String::new(),
            description: String::new(),
            price: 0.0,
            currency: "USD".to_string(),
            image_url: None,
            available: true,
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductOption {
    pub name: String,
    pub choices: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductCardView<'a> {
    name: &'a str,
    description: &'a str,
    price_label: String,
    image_url: Option<&'a str>,
    available: bool,
    options: &'a [ProductOption],
}

/// Product cards in the sidebar; the few most recently viewed stay visible.
pub struct ProductDetailCreator;

impl ComponentCreator for ProductDetailCreator {
    fn component_type(&self) -> &str {
        PRODUCT_DETAIL
    }

    fn function_names(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn policy(&self) -> TypePolicy {
        TypePolicy::limited("Product detail", VISIBLE_PRODUCTS)
    }

    fn default_placement(&self) -> Placement {
        Placement::Sidebar
    }

    fn normalize(&self, payload: PayloadReader<'_>) -> serde_json::Value {
        // Accept `{product: {...}}` as well as the product fields at top level.
        let product = match payload.get(&["product", "item"]) {
            Some(inner) if inner.is_object() => PayloadReader::new(inner),
            _ => payload,
        };
        encode(&ProductDetailData {
            product_id: product.str_or(&["id", "productId", "product_id", "sku"], ""),
            name: product.str_or(&["name", "title"], "Product"),
            description: product.str_or(&["description", "details"], ""),
            price: product.f64_or(&["price", "amount"], 0.0),
            currency: product.str_or(&["currency"], "USD"),
            image_url: product.opt_str(&["imageUrl", "image_url", "image"]),
            available: product
                .get(&["available", "inStock", "in_stock"])
                .and_then(|v| v.as_bool())
                .unwrap_or(true),
            options: product
                .array(&["options", "modifiers"])
                .iter()
                .map(|option| {
                    let option = PayloadReader::new(option);
                    ProductOption {
                        name: option.str_or(&["name", "label"], "Option"),
                        choices: option
                            .array(&["choices", "values"])
                            .iter()
                            .filter_map(|c| c.as_str().map(str::to_string))
                            .collect(),
                    }
                })
                .collect(),
        })
    }

    fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor {
        let data: ProductDetailData = decode(&instance.data);
        ViewDescriptor::widget(
            PRODUCT_DETAIL,
            &ProductCardView {
                name: &data.name,
                description: &data.description,
                price_label: format_price(data.price, &data.currency),
                image_url: data.image_url.as_deref(),
                available: data.available,
                options: &data.options,
            },
        )
    }
}
