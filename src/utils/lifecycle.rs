//! Lifecycle status of purchased plans and products.
//!
//! All comparisons happen at day granularity against "today" in the
//! organization timezone. Rate plan expiry wins over the item's own end date,
//! which wins over a future start date.

use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum PurchaseStatus {
    Active,
    Future,
    Ended,
}

impl PurchaseStatus {
    /// Display order used when grouping purchases.
    pub fn weight(self) -> u8 {
        match self {
            PurchaseStatus::Active => 0,
            PurchaseStatus::Future => 1,
            PurchaseStatus::Ended => 2,
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseStatus::Active => write!(f, "Active"),
            PurchaseStatus::Future => write!(f, "Future"),
            PurchaseStatus::Ended => write!(f, "Ended"),
        }
    }
}

/// Dates needed to classify one purchased item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleDates {
    pub today: NaiveDate,
    pub plan_end_date: Option<NaiveDate>,
    pub item_start_date: Option<NaiveDate>,
    pub item_end_date: Option<NaiveDate>,
}

pub fn resolve_status(dates: &LifecycleDates) -> PurchaseStatus {
    let today = dates.today;
    if dates.plan_end_date.is_some_and(|end| end < today) {
        return PurchaseStatus::Ended;
    }
    if dates.item_end_date.is_some_and(|end| end < today) {
        return PurchaseStatus::Ended;
    }
    if dates.item_start_date.is_some_and(|start| start > today) {
        return PurchaseStatus::Future;
    }
    PurchaseStatus::Active
}

/// End date to display, never before an already reached start date.
///
/// A plan cancelled "now" on the day it was purchased can come back from Edge
/// with an end date before its start date.
pub fn adjusted_end_date(dates: &LifecycleDates) -> Option<NaiveDate> {
    match (dates.item_start_date, dates.item_end_date) {
        (Some(start), Some(end)) if start <= dates.today && end < start => Some(start),
        (_, end) => end,
    }
}

/// Entities whose lifecycle is derived from [`LifecycleDates`].
pub trait HasLifecycle {
    fn lifecycle_dates(&self, today: NaiveDate) -> LifecycleDates;

    fn status(&self, today: NaiveDate) -> PurchaseStatus {
        resolve_status(&self.lifecycle_dates(today))
    }

    fn adjusted_end_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        adjusted_end_date(&self.lifecycle_dates(today))
    }
}

pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::ConfigError(format!("Unknown organization timezone: {name}")))
}

pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
