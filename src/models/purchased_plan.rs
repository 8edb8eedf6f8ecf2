use crate::models::RatePlan;
use crate::utils::{HasLifecycle, LifecycleDates, PurchaseStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CompanyRef {
    pub id: String,
}

/// A developer's or team's acceptance of a rate plan
/// (an Edge "developer accepted rate plan").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedPlan {
    pub id: String,
    #[serde(with = "crate::utils::edge_date")]
    #[schema(value_type = String, example = "2024-01-10 00:00:00")]
    pub start_date: NaiveDate,
    #[serde(default, with = "crate::utils::edge_date::option")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub rate_plan: RatePlan,
    #[serde(default)]
    pub developer: Option<DeveloperRef>,
    #[serde(default)]
    pub company: Option<CompanyRef>,
    #[serde(default)]
    pub quota_target: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl HasLifecycle for PurchasedPlan {
    fn lifecycle_dates(&self, today: NaiveDate) -> LifecycleDates {
        LifecycleDates {
            today,
            plan_end_date: self.rate_plan.end_date,
            item_start_date: Some(self.start_date),
            item_end_date: self.end_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchasedPlanLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub rate_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchasedPlanView {
    pub purchased_plan: PurchasedPlan,
    pub status: PurchaseStatus,
    /// End date to display, clamped so it never precedes the start date.
    pub end_date: Option<NaiveDate>,
    pub links: PurchasedPlanLinks,
}

/// Purchased plans of one owner, grouped by status.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct PurchasedPlanList {
    pub active: Vec<PurchasedPlanView>,
    pub future: Vec<PurchasedPlanView>,
    pub ended: Vec<PurchasedPlanView>,
}

impl PurchasedPlanList {
    pub fn len(&self) -> usize {
        self.active.len() + self.future.len() + self.ended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EndType {
    Now,
    OnDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelPurchaseRequest {
    pub end_type: EndType,
    /// Organization-local date; required when `end_type` is `on_date`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Accept the latest terms and conditions as part of this purchase.
    #[serde(default)]
    pub accept_terms: bool,
    /// Ask Edge to end overlapping purchases instead of rejecting the purchase.
    #[serde(default)]
    pub suppress_warning: bool,
}
