pub mod cache_key;
pub mod currency;
pub mod edge_date;
pub mod jwt;
pub mod lifecycle;
pub mod urls;

pub use currency::format_amount;
pub use jwt::*;
pub use lifecycle::{
    Clock, FixedClock, HasLifecycle, LifecycleDates, PurchaseStatus, SystemClock,
    adjusted_end_date, parse_timezone, resolve_status, today_in,
};
pub use urls::MonetizationUrls;
