use crate::error::{AppError, AppResult};
use crate::external::MonetizationApi;
use crate::models::*;
use crate::services::{CacheService, OrganizationService};
use crate::utils::MonetizationUrls;
use crate::utils::cache_key::{self, PRODUCT_BUNDLE, RATE_PLAN};
use chrono::NaiveDate;
use std::sync::Arc;

/// Plans worth listing for a bundle on `today`.
///
/// Ended plans are dropped, and so are revisions that have not started yet
/// while the plan they replace is still listed; those are reached through the
/// current plan's future revision instead.
pub fn visible_rate_plans(plans: &[RatePlan], today: NaiveDate) -> Vec<&RatePlan> {
    plans
        .iter()
        .filter(|p| !p.is_ended(today))
        .filter(|p| {
            let pending_revision = p.start_date.is_some_and(|start| start > today)
                && p.previous_rate_plan_revision.as_ref().is_some_and(|prev| {
                    plans
                        .iter()
                        .any(|other| other.id == prev.id && !other.is_ended(today))
                });
            !pending_revision
        })
        .collect()
}

#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn MonetizationApi>,
    cache: CacheService,
    organization: OrganizationService,
    urls: MonetizationUrls,
}

impl CatalogService {
    pub fn new(
        api: Arc<dyn MonetizationApi>,
        cache: CacheService,
        organization: OrganizationService,
        urls: MonetizationUrls,
    ) -> Self {
        Self {
            api,
            cache,
            organization,
            urls,
        }
    }

    fn bundle_view(&self, owner: &Owner, bundle: ProductBundle) -> ProductBundleView {
        let links = ProductBundleLinks {
            self_link: self.urls.product_bundle(owner, &bundle.id),
            rate_plans: self.urls.rate_plans(owner, &bundle.id),
        };
        ProductBundleView {
            product_bundle: bundle,
            links,
        }
    }

    fn rate_plan_view(
        &self,
        owner: &Owner,
        bundle_id: &str,
        plan: RatePlan,
        all: &[RatePlan],
        today: NaiveDate,
    ) -> RatePlanView {
        let purchasable = !plan.is_ended(today);
        let future_revision = plan.future_revision(all, today);
        let links = RatePlanLinks {
            self_link: self.urls.rate_plan(owner, bundle_id, &plan.id),
            product_bundle: self.urls.product_bundle(owner, bundle_id),
            purchase: purchasable.then(|| self.urls.purchase(owner, bundle_id, &plan.id)),
            future_revision: future_revision.map(|r| self.urls.rate_plan(owner, bundle_id, &r.id)),
        };
        RatePlanView {
            future_revision_start_date: future_revision.and_then(|r| r.start_date),
            rate_plan: plan,
            purchasable,
            links,
        }
    }

    pub async fn list_bundles(&self, owner: &Owner) -> AppResult<Vec<ProductBundleView>> {
        let cid = cache_key::cache_id(PRODUCT_BUNDLE, owner.kind(), Some(owner.id()));
        let tags = [cache_key::owner_tag(owner)];
        let bundles = self
            .cache
            .remember(&cid, &tags, || self.api.list_available_bundles(owner))
            .await?;
        Ok(bundles
            .into_iter()
            .map(|b| self.bundle_view(owner, b))
            .collect())
    }

    async fn bundle(&self, bundle_id: &str) -> AppResult<ProductBundle> {
        let cid = cache_key::cache_id(PRODUCT_BUNDLE, bundle_id, None);
        let tags = [cache_key::entity_tag(PRODUCT_BUNDLE, bundle_id)];
        self.cache
            .remember(&cid, &tags, || self.api.get_bundle(bundle_id))
            .await
    }

    pub async fn get_bundle(&self, owner: &Owner, bundle_id: &str) -> AppResult<ProductBundleView> {
        let bundle = self.bundle(bundle_id).await?;
        Ok(self.bundle_view(owner, bundle))
    }

    /// Every revision of every rate plan of the bundle, ended ones included.
    async fn all_rate_plans(&self, bundle_id: &str) -> AppResult<Vec<RatePlan>> {
        let cid = cache_key::cache_id(RATE_PLAN, bundle_id, Some("all"));
        let tags = [
            cache_key::entity_tag(PRODUCT_BUNDLE, bundle_id),
            cache_key::entity_tag(RATE_PLAN, bundle_id),
        ];
        self.cache
            .remember(&cid, &tags, || self.api.list_rate_plans(bundle_id, false))
            .await
    }

    pub async fn list_rate_plans(&self, owner: &Owner, bundle_id: &str) -> AppResult<Vec<RatePlanView>> {
        let plans = self.all_rate_plans(bundle_id).await?;
        let today = self.organization.today().await?;
        Ok(visible_rate_plans(&plans, today)
            .into_iter()
            .map(|p| self.rate_plan_view(owner, bundle_id, p.clone(), &plans, today))
            .collect())
    }

    /// A single rate plan, checked to belong to `bundle_id`.
    pub async fn rate_plan(&self, bundle_id: &str, plan_id: &str) -> AppResult<RatePlan> {
        let cid = cache_key::cache_id(RATE_PLAN, plan_id, None);
        let tags = [
            cache_key::entity_tag(PRODUCT_BUNDLE, bundle_id),
            cache_key::entity_tag(RATE_PLAN, plan_id),
        ];
        let plan = self
            .cache
            .remember(&cid, &tags, || self.api.get_rate_plan(bundle_id, plan_id))
            .await?;
        match plan.bundle_id() {
            Some(id) if id != bundle_id => Err(AppError::NotFound(format!(
                "Rate plan {plan_id} does not belong to product bundle {bundle_id}"
            ))),
            _ => Ok(plan),
        }
    }

    pub async fn get_rate_plan(
        &self,
        owner: &Owner,
        bundle_id: &str,
        plan_id: &str,
    ) -> AppResult<RatePlanView> {
        let plan = self.rate_plan(bundle_id, plan_id).await?;
        let plans = self.all_rate_plans(bundle_id).await?;
        let today = self.organization.today().await?;
        Ok(self.rate_plan_view(owner, bundle_id, plan, &plans, today))
    }
}
