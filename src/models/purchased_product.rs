use crate::utils::{HasLifecycle, LifecycleDates};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// An ApigeeX subscription to an API product.
///
/// ApigeeX reports times as epoch milliseconds (encoded as strings); they are
/// read as UTC dates. Only the lifecycle rules consume it for now; no ApigeeX
/// client produces these records yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedProduct {
    pub name: String,
    #[serde(rename = "apiproduct")]
    pub api_product: String,
    #[serde(default, deserialize_with = "millis")]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "millis")]
    pub end_time: Option<i64>,
}

fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn millis_to_date(value: Option<i64>) -> Option<NaiveDate> {
    // ApigeeX 用 0 表示未设置
    value
        .filter(|ms| *ms > 0)
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

impl HasLifecycle for PurchasedProduct {
    fn lifecycle_dates(&self, today: NaiveDate) -> LifecycleDates {
        LifecycleDates {
            today,
            plan_end_date: None,
            item_start_date: millis_to_date(self.start_time),
            item_end_date: millis_to_date(self.end_time),
        }
    }
}
