pub mod billing;
pub mod common;
pub mod organization;
pub mod owner;
pub mod prepaid_balance;
pub mod product_bundle;
pub mod purchased_plan;
pub mod purchased_product;
pub mod rate_plan;
pub mod terms;

pub use billing::*;
pub use common::*;
pub use organization::*;
pub use owner::*;
pub use prepaid_balance::*;
pub use product_bundle::*;
pub use purchased_plan::*;
pub use purchased_product::*;
pub use rate_plan::*;
pub use terms::*;
