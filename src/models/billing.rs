use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Upper-case English month name used by Edge (`1` → `JANUARY`).
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .map(|i| i as u32 + 1)
}

fn edge_month<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Name(String),
    }

    let month = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Some(n),
        Raw::Name(name) => month_number(&name).or_else(|| name.parse().ok()),
    };
    month
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| serde::de::Error::custom("invalid billing month"))
}

/// A month for which Edge holds billing documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingMonth {
    pub year: i32,
    #[serde(deserialize_with = "edge_month")]
    pub month: u32,
    #[serde(default)]
    pub status: Option<String>,
}

impl BillingMonth {
    pub fn label(&self) -> String {
        let name = month_name(self.month).unwrap_or("UNKNOWN");
        let mut chars = name.chars();
        let pretty: String = match chars.next() {
            Some(first) => first.to_string() + &chars.as_str().to_ascii_lowercase(),
            None => String::new(),
        };
        format!("{pretty} {}", self.year)
    }

    /// Sort key, newest last.
    pub fn ordinal(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillingMonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub status: Option<String>,
}

impl From<BillingMonth> for BillingMonthView {
    fn from(m: BillingMonth) -> Self {
        Self {
            label: m.label(),
            year: m.year,
            month: m.month,
            status: m.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillingReportQuery {
    /// Billing month as `YYYY-MM`.
    #[schema(example = "2024-03")]
    pub month: String,
    #[schema(example = "usd")]
    pub currency: String,
}

impl BillingReportQuery {
    pub fn year_month(&self) -> Option<(i32, u32)> {
        let (year, month) = self.month.trim().split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    }

    /// Lower-case ISO currency id as Edge expects it, if the query holds three ASCII letters.
    pub fn currency_id(&self) -> Option<String> {
        let currency = self.currency.trim();
        (currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| currency.to_ascii_lowercase())
    }
}
