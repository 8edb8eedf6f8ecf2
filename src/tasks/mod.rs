//! Background scheduled tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use crate::services::CacheService;
use std::time::Duration;

/// Spawn all background tasks.
///
/// The task is detached via `tokio::spawn`; this function does not block.
pub fn spawn_all(cache_service: CacheService, gc_interval_secs: u64) {
    if gc_interval_secs == 0 {
        log::info!("Cache garbage collection disabled");
        return;
    }

    // 定期清理过期缓存
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(gc_interval_secs));
        loop {
            interval.tick().await;
            match cache_service.purge_expired().await {
                Ok(n) if n > 0 => log::info!("Expired cache entries removed: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to garbage collect cache: {e:?}"),
            }
        }
    });
}
