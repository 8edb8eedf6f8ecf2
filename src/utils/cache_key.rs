//! Cache ids and invalidation tags.
//!
//! Format: `{prefix}:{entity_type}:{entity_id}[:{suffix}]`. The same strings
//! double as tags so invalidating an entity drops every derived entry.

use crate::models::Owner;

pub const CACHE_PREFIX: &str = "apigee_m10n";

/// Tag attached to every cached list of purchased plans.
pub const MY_PURCHASES_CACHE_TAG: &str = "apigee_my_purchased_plans";

pub const ORGANIZATION: &str = "organization";
pub const SUPPORTED_CURRENCY: &str = "supported_currency";
pub const PRODUCT_BUNDLE: &str = "product_bundle";
pub const RATE_PLAN: &str = "rate_plan";
pub const PURCHASED_PLAN: &str = "purchased_plan";
pub const PREPAID_BALANCE: &str = "prepaid_balance";
pub const BILLING_MONTHS: &str = "billing_months";
pub const TERMS_AND_CONDITIONS: &str = "terms_and_conditions";

pub fn cache_id(entity_type: &str, entity_id: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{CACHE_PREFIX}:{entity_type}:{entity_id}:{suffix}"),
        None => format!("{CACHE_PREFIX}:{entity_type}:{entity_id}"),
    }
}

pub fn entity_tag(entity_type: &str, entity_id: &str) -> String {
    cache_id(entity_type, entity_id, None)
}

/// Tag shared by everything cached on behalf of one developer or team.
pub fn owner_tag(owner: &Owner) -> String {
    cache_id(owner.kind(), owner.id(), None)
}
