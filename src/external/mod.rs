pub mod apigee;

pub use apigee::*;
