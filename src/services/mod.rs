pub mod billing_service;
pub mod cache_service;
pub mod catalog_service;
pub mod organization_service;
pub mod purchase_service;
pub mod terms_service;

pub use billing_service::*;
pub use cache_service::*;
pub use catalog_service::*;
pub use organization_service::*;
pub use purchase_service::*;
pub use terms_service::*;

use crate::config::Config;
use crate::external::MonetizationApi;
use crate::utils::{Clock, MonetizationUrls};
use std::sync::Arc;

/// Every service wired to one Edge client, cache backend and clock.
#[derive(Clone)]
pub struct Services {
    pub cache: CacheService,
    pub organization: OrganizationService,
    pub catalog: CatalogService,
    pub purchases: PurchaseService,
    pub billing: BillingService,
    pub terms: TermsService,
}

impl Services {
    pub fn new(
        config: &Config,
        api: Arc<dyn MonetizationApi>,
        backend: Arc<dyn CacheBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let urls = MonetizationUrls::default();
        let cache = CacheService::new(backend, clock.clone(), config.cache.max_age);
        let organization = OrganizationService::new(api.clone(), cache.clone(), clock);
        let terms = TermsService::new(api.clone(), cache.clone(), organization.clone());
        let catalog = CatalogService::new(
            api.clone(),
            cache.clone(),
            organization.clone(),
            urls.clone(),
        );
        let purchases = PurchaseService::new(
            api.clone(),
            cache.clone(),
            organization.clone(),
            catalog.clone(),
            terms.clone(),
            urls,
        );
        let billing = BillingService::new(
            api,
            cache.clone(),
            organization.clone(),
            config.billing.clone(),
        );
        Self {
            cache,
            organization,
            catalog,
            purchases,
            billing,
            terms,
        }
    }
}
