pub mod m10n_cache;

pub use m10n_cache as cache_entity;
