//! Links between monetization resources.
//!
//! Every link is rooted at the owner's scope so that a team member browsing a
//! team's plans never gets sent to their personal developer pages.

use crate::models::Owner;

#[derive(Debug, Clone)]
pub struct MonetizationUrls {
    base: String,
}

impl Default for MonetizationUrls {
    fn default() -> Self {
        Self::new("/api/v1")
    }
}

impl MonetizationUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn scoped(&self, owner: &Owner, path: &str) -> String {
        format!("{}{}{}", self.base, owner.route_prefix(), path)
    }

    pub fn product_bundles(&self, owner: &Owner) -> String {
        self.scoped(owner, "/product-bundles")
    }

    pub fn product_bundle(&self, owner: &Owner, bundle_id: &str) -> String {
        self.scoped(owner, &format!("/product-bundles/{bundle_id}"))
    }

    pub fn rate_plans(&self, owner: &Owner, bundle_id: &str) -> String {
        self.scoped(owner, &format!("/product-bundles/{bundle_id}/plans"))
    }

    pub fn rate_plan(&self, owner: &Owner, bundle_id: &str, plan_id: &str) -> String {
        self.scoped(owner, &format!("/product-bundles/{bundle_id}/plans/{plan_id}"))
    }

    pub fn purchase(&self, owner: &Owner, bundle_id: &str, plan_id: &str) -> String {
        format!("{}/purchase", self.rate_plan(owner, bundle_id, plan_id))
    }

    pub fn purchased_plans(&self, owner: &Owner) -> String {
        self.scoped(owner, "/purchased-plans")
    }

    pub fn purchased_plan(&self, owner: &Owner, purchased_plan_id: &str) -> String {
        self.scoped(owner, &format!("/purchased-plans/{purchased_plan_id}"))
    }

    pub fn cancel(&self, owner: &Owner, purchased_plan_id: &str) -> String {
        format!("{}/cancel", self.purchased_plan(owner, purchased_plan_id))
    }

    pub fn prepaid_balances(&self, owner: &Owner) -> String {
        self.scoped(owner, "/prepaid-balances")
    }

    pub fn billing_months(&self, owner: &Owner) -> String {
        self.scoped(owner, "/billing/months")
    }

    pub fn billing_report(&self, owner: &Owner, year: i32, month: u32, currency: &str) -> String {
        self.scoped(
            owner,
            &format!("/billing/reports?month={year:04}-{month:02}&currency={currency}"),
        )
    }

    pub fn terms(&self, owner: &Owner) -> String {
        self.scoped(owner, "/terms")
    }
}
