use super::{decode, encode, format_price};
use crate::creator::{ComponentCreator, ViewDescriptor};
use dynui_dedup::LATEST;
use dynui_types::{ComponentInstance, PayloadReader, Placement, TypePolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MENU_RECOMMENDATIONS: &str = "menuRecommendations";

const FUNCTIONS: &[&str] = &["get_menu_recommendations", "get_recommendations"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuRecommendationsData {
    pub title: String,
    pub reason: String,
    pub currency: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CarouselView<'a> {
    title: &'a str,
    subtitle: &'a str,
    empty: bool,
    cards: Vec<CarouselCard<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CarouselCard<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    price_label: String,
    image_url: Option<&'a str>,
    tags: &'a [String],
}

/// Recommendation carousel rendered inline; the newest set of suggestions wins.
pub struct MenuRecommendationsCreator;

impl MenuRecommendationsCreator {
    fn item(value: &Value, index: usize) -> MenuItem {
        let item = PayloadReader::new(value);
        let name = item.str_or(&["name", "title"], "Menu item");
        MenuItem {
            id: item
                .opt_str(&["id", "itemId", "item_id", "sku"])
                .unwrap_or_else(|| format!("item-{index}")),
            name,
            description: item.str_or(&["description", "summary"], ""),
            price: item.f64_or(&["price", "amount"], 0.0),
            image_url: item.opt_str(&["imageUrl", "image_url", "image"]),
            tags: item
                .array(&["tags", "labels"])
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
        }
    }
}

impl ComponentCreator for MenuRecommendationsCreator {
    fn component_type(&self) -> &str {
        MENU_RECOMMENDATIONS
    }

    fn function_names(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn policy(&self) -> TypePolicy {
        TypePolicy::unique("Menu recommendations").in_placements(&[Placement::Inline])
    }

    fn default_placement(&self) -> Placement {
        Placement::Inline
    }

    fn dedup_rule(&self) -> Option<&'static str> {
        Some(LATEST)
    }

    fn normalize(&self, payload: PayloadReader<'_>) -> Value {
        // Some backends return the bare list of items.
        let items: &[Value] = match payload.value() {
            Value::Array(items) => items.as_slice(),
            _ => payload.array(&["recommendations", "items", "menuItems"]),
        };
        encode(&MenuRecommendationsData {
            title: payload.str_or(&["title", "heading"], "Recommended for you"),
            reason: payload.str_or(&["reason", "context"], ""),
            currency: payload.str_or(&["currency"], "USD"),
            items: items
                .iter()
                .enumerate()
                .map(|(index, item)| Self::item(item, index))
                .collect(),
        })
    }

    fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor {
        let data: MenuRecommendationsData = decode(&instance.data);
        let cards = data
            .items
            .iter()
            .map(|item| CarouselCard {
                id: &item.id,
                name: &item.name,
                description: &item.description,
                price_label: format_price(item.price, &data.currency),
                image_url: item.image_url.as_deref(),
                tags: &item.tags,
            })
            .collect::<Vec<_>>();

        ViewDescriptor::widget(
            MENU_RECOMMENDATIONS,
            &CarouselView {
                title: if data.title.is_empty() {
                    "Recommended for you"
                } else {
                    data.title.as_str()
                },
                subtitle: &data.reason,
                empty: cards.is_empty(),
                cards,
            },
        )
    }
}
