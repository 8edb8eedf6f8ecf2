use crate::error::{AppError, AppResult};
use crate::external::MonetizationApi;
use crate::models::*;
use crate::services::CacheService;
use crate::utils::cache_key::{self, ORGANIZATION, SUPPORTED_CURRENCY};
use crate::utils::{Clock, parse_timezone, today_in};
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::sync::Arc;

const PROFILE_ID: &str = "profile";

#[derive(Clone)]
pub struct OrganizationService {
    api: Arc<dyn MonetizationApi>,
    cache: CacheService,
    clock: Arc<dyn Clock>,
}

impl OrganizationService {
    pub fn new(api: Arc<dyn MonetizationApi>, cache: CacheService, clock: Arc<dyn Clock>) -> Self {
        Self { api, cache, clock }
    }

    pub async fn profile(&self) -> AppResult<OrganizationProfile> {
        let cid = cache_key::cache_id(ORGANIZATION, PROFILE_ID, None);
        let tags = [cache_key::entity_tag(ORGANIZATION, PROFILE_ID)];
        self.cache
            .remember(&cid, &tags, || self.api.get_organization_profile())
            .await
    }

    pub async fn timezone(&self) -> AppResult<Tz> {
        let profile = self.profile().await?;
        match profile.timezone.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => parse_timezone(name),
            _ => Err(AppError::ConfigError(format!(
                "Organization {} has no timezone configured",
                profile.id
            ))),
        }
    }

    /// The current date in the organization timezone.
    pub async fn today(&self) -> AppResult<NaiveDate> {
        Ok(today_in(self.timezone().await?, self.clock.now()))
    }

    pub async fn now_local(&self) -> AppResult<NaiveDateTime> {
        let tz = self.timezone().await?;
        Ok(self.clock.now().with_timezone(&tz).naive_local())
    }

    pub async fn supported_currencies(&self) -> AppResult<Vec<SupportedCurrency>> {
        let cid = cache_key::cache_id(SUPPORTED_CURRENCY, "all", None);
        let tags = [cache_key::entity_tag(ORGANIZATION, PROFILE_ID)];
        self.cache
            .remember(&cid, &tags, || self.api.list_supported_currencies())
            .await
    }
}
