use super::{decode, encode};
use crate::creator::{ComponentCreator, ViewDescriptor};
use dynui_types::{ComponentInstance, PayloadReader, Placement, TypePolicy};
use serde::{Deserialize, Serialize};

pub const LOYALTY_CARD: &str = "loyaltyCard";

const FUNCTIONS: &[&str] = &["get_loyalty_points", "check_loyalty_balance"];
const RECENT_ACTIVITY: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoyaltyCardData {
    pub customer_name: String,
    pub points: u64,
    pub tier: String,
    pub next_reward: Option<Reward>,
    pub history: Vec<PointsEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reward {
    pub name: String,
    pub points_required: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointsEntry {
    pub date: String,
    pub description: String,
    /// Negative for redemptions.
    pub points: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoyaltyCardView<'a> {
    title: String,
    points: u64,
    tier: &'a str,
    next_reward: Option<&'a str>,
    points_to_next_reward: u64,
    progress_percent: u8,
    recent_activity: &'a [PointsEntry],
}

/// Single loyalty card in the sidebar; a newer balance replaces the old card.
pub struct LoyaltyCardCreator;

impl LoyaltyCardCreator {
    fn reward(payload: PayloadReader<'_>) -> Option<Reward> {
        let reward = payload.object(&["nextReward", "next_reward"]);
        let name = reward.opt_str(&["name", "title"])?;
        Some(Reward {
            name,
            points_required: reward.u64_or(&["pointsRequired", "points_required", "points"], 0),
        })
    }

    fn history(payload: PayloadReader<'_>) -> Vec<PointsEntry> {
        payload
            .array(&["history", "transactions", "recentActivity"])
            .iter()
            .map(|entry| {
                let entry = PayloadReader::new(entry);
                PointsEntry {
                    date: entry.str_or(&["date", "timestamp"], ""),
                    description: entry.str_or(&["description", "reason"], ""),
                    points: entry.f64_or(&["points", "amount"], 0.0) as i64,
                }
            })
            .collect()
    }
}

impl ComponentCreator for LoyaltyCardCreator {
    fn component_type(&self) -> &str {
        LOYALTY_CARD
    }

    fn function_names(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn policy(&self) -> TypePolicy {
        TypePolicy::unique("Loyalty card")
    }

    fn default_placement(&self) -> Placement {
        Placement::Sidebar
    }

    fn normalize(&self, payload: PayloadReader<'_>) -> serde_json::Value {
        encode(&LoyaltyCardData {
            customer_name: payload.str_or(&["customerName", "customer_name", "name"], ""),
            points: payload.u64_or(&["points", "loyaltyPoints", "loyalty_points", "balance"], 0),
            tier: payload.str_or(&["tier", "level"], "Member"),
            next_reward: Self::reward(payload),
            history: Self::history(payload),
        })
    }

    fn create_view(&self, instance: &ComponentInstance) -> ViewDescriptor {
        let data: LoyaltyCardData = decode(&instance.data);
        let (points_to_next_reward, progress_percent) = match &data.next_reward {
            Some(reward) if reward.points_required > 0 => {
                let remaining = reward.points_required.saturating_sub(data.points);
                let earned = u128::from(data.points.min(reward.points_required));
                let progress = earned * 100 / u128::from(reward.points_required);
                (remaining, progress.min(100) as u8)
            }
            _ => (0, 0),
        };
        let title = if data.customer_name.is_empty() {
            "Your rewards".to_string()
        } else {
            format!("{}'s rewards", data.customer_name)
        };
        let activity = &data.history[..data.history.len().min(RECENT_ACTIVITY)];

        ViewDescriptor::widget(
            LOYALTY_CARD,
            &LoyaltyCardView {
                title,
                points: data.points,
                tier: &data.tier,
                next_reward: data.next_reward.as_ref().map(|r| r.name.as_str()),
                points_to_next_reward,
                progress_percent,
                recent_activity: activity,
            },
        )
    }
}
