use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Monetization profile of the Edge organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationProfile {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// IANA timezone name, e.g. `America/Los_Angeles`.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportedCurrency {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub minimum_top_up_amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SupportedCurrency {
    /// ISO code, upper-cased (Edge ids are lower-case, e.g. `usd`).
    pub fn code(&self) -> String {
        self.name
            .as_deref()
            .unwrap_or(&self.id)
            .to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrganizationRef {
    pub id: String,
}
