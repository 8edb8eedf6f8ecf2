use crate::models::{OrganizationRef, ProductBundleRef, SupportedCurrency};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatePlanType {
    Standard,
    Developer,
    DeveloperCategory,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RatePlanRef {
    pub id: String,
}

/// A pricing plan of a product bundle, with its own active window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatePlan {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub plan_type: Option<RatePlanType>,
    #[serde(default, with = "crate::utils::edge_date::option")]
    #[schema(value_type = Option<String>, example = "2024-01-01 00:00:00")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "crate::utils::edge_date::option")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currency: Option<SupportedCurrency>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub setup_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub recurring_fee: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub early_termination_fee: Option<Decimal>,
    #[serde(default)]
    pub frequency_duration: Option<i64>,
    #[serde(default)]
    pub frequency_duration_type: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub monetization_package: Option<ProductBundleRef>,
    #[serde(default)]
    pub organization: Option<OrganizationRef>,
    #[serde(default)]
    pub previous_rate_plan_revision: Option<RatePlanRef>,
}

impl RatePlan {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn is_ended(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.monetization_package.as_ref().map(|p| p.id.as_str())
    }

    /// The revision of `plans` that replaces this plan and has not started yet.
    pub fn future_revision<'a>(&self, plans: &'a [RatePlan], today: NaiveDate) -> Option<&'a RatePlan> {
        plans
            .iter()
            .filter(|p| {
                p.previous_rate_plan_revision
                    .as_ref()
                    .is_some_and(|prev| prev.id == self.id)
            })
            .filter(|p| p.start_date.is_some_and(|start| start > today))
            .min_by_key(|p| p.start_date)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatePlanLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub product_bundle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_revision: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatePlanView {
    pub rate_plan: RatePlan,
    pub purchasable: bool,
    pub future_revision_start_date: Option<NaiveDate>,
    pub links: RatePlanLinks,
}
