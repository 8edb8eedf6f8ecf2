use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TermsAndConditions {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "crate::utils::edge_date::option")]
    #[schema(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermsAction {
    Accepted,
    Declined,
}

/// A developer's (or team's) decision on a terms and conditions revision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedTerms {
    #[serde(default)]
    pub id: Option<String>,
    pub action: TermsAction,
    #[serde(default)]
    pub audit_date: Option<String>,
    pub tnc: TermsAndConditions,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TermsStatusView {
    pub terms: Option<TermsAndConditions>,
    pub accepted: bool,
}
