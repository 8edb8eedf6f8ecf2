use crate::models::SupportedCurrency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrepaidBalance {
    #[serde(default)]
    pub id: Option<String>,
    pub supported_currency: SupportedCurrency,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub current_total_balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub current_usage: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub top_ups: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub usage: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrepaidBalanceView {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_usage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub top_ups: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub usage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    pub formatted_current_balance: String,
    pub formatted_current_usage: String,
    pub formatted_top_ups: String,
    pub formatted_usage: String,
    pub formatted_tax: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrepaidBalancesResponse {
    pub year: i32,
    pub month: u32,
    pub balances: Vec<PrepaidBalanceView>,
}
