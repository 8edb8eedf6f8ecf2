use crate::error::{AppError, AppResult, EDGE_INSUFFICIENT_FUNDS, EDGE_OVERLAPPING_PLANS};
use crate::external::{MonetizationApi, NewPurchasedPlan};
use crate::models::*;
use crate::services::{CacheService, CatalogService, OrganizationService, TermsService};
use crate::utils::cache_key::{self, MY_PURCHASES_CACHE_TAG, PURCHASED_PLAN};
use crate::utils::{HasLifecycle, MonetizationUrls, PurchaseStatus};
use chrono::NaiveDate;
use std::sync::Arc;

/// Splits views into the Active, Future and Ended groups, newest start first
/// within each group, ties broken by id.
pub fn group_purchased_plans(mut views: Vec<PurchasedPlanView>) -> PurchasedPlanList {
    views.sort_by(|a, b| {
        a.status
            .weight()
            .cmp(&b.status.weight())
            .then(b.purchased_plan.start_date.cmp(&a.purchased_plan.start_date))
            .then_with(|| a.purchased_plan.id.cmp(&b.purchased_plan.id))
    });
    let mut list = PurchasedPlanList::default();
    for view in views {
        match view.status {
            PurchaseStatus::Active => list.active.push(view),
            PurchaseStatus::Future => list.future.push(view),
            PurchaseStatus::Ended => list.ended.push(view),
        }
    }
    list
}

/// New end date for a cancellation request made on `today`.
///
/// Ending "now" sets the end date to the purchase's own start date, which is
/// what Edge expects for immediate termination.
pub fn cancellation_end_date(
    plan: &PurchasedPlan,
    request: &CancelPurchaseRequest,
    today: NaiveDate,
) -> AppResult<NaiveDate> {
    if plan.status(today) == PurchaseStatus::Ended {
        return Err(AppError::ValidationError(format!(
            "Purchased plan {} has already ended",
            plan.id
        )));
    }
    match request.end_type {
        EndType::Now => Ok(plan.start_date),
        EndType::OnDate => {
            let end_date = request.end_date.ok_or_else(|| {
                AppError::ValidationError("An end date is required to cancel on a date".to_string())
            })?;
            if end_date < today {
                return Err(AppError::ValidationError(format!(
                    "The end date {end_date} is in the past"
                )));
            }
            Ok(end_date)
        }
    }
}

/// Maps Edge purchase failures to errors the developer can act on.
pub fn translate_purchase_error(err: AppError, plan: &RatePlan) -> AppError {
    match err {
        AppError::Edge { code, .. } if code == EDGE_INSUFFICIENT_FUNDS => {
            AppError::InsufficientFunds(format!(
                "You have insufficient funds to purchase plan {}.",
                plan.label()
            ))
        }
        AppError::Edge { code, message, .. } if code == EDGE_OVERLAPPING_PLANS => {
            AppError::OverlappingPlans(message)
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct PurchaseService {
    api: Arc<dyn MonetizationApi>,
    cache: CacheService,
    organization: OrganizationService,
    catalog: CatalogService,
    terms: TermsService,
    urls: MonetizationUrls,
}

impl PurchaseService {
    pub fn new(
        api: Arc<dyn MonetizationApi>,
        cache: CacheService,
        organization: OrganizationService,
        catalog: CatalogService,
        terms: TermsService,
        urls: MonetizationUrls,
    ) -> Self {
        Self {
            api,
            cache,
            organization,
            catalog,
            terms,
            urls,
        }
    }

    fn purchases_cid(owner: &Owner) -> String {
        cache_key::cache_id(PURCHASED_PLAN, owner.kind(), Some(owner.id()))
    }

    fn view(&self, owner: &Owner, plan: PurchasedPlan, today: NaiveDate) -> PurchasedPlanView {
        let status = plan.status(today);
        let links = PurchasedPlanLinks {
            self_link: self.urls.purchased_plan(owner, &plan.id),
            rate_plan: plan
                .rate_plan
                .bundle_id()
                .map(|bundle| self.urls.rate_plan(owner, bundle, &plan.rate_plan.id)),
            cancel: (status != PurchaseStatus::Ended).then(|| self.urls.cancel(owner, &plan.id)),
        };
        PurchasedPlanView {
            end_date: plan.adjusted_end_date(today),
            purchased_plan: plan,
            status,
            links,
        }
    }

    async fn invalidate_purchases(&self, owner: &Owner) {
        self.cache
            .forget(
                &[MY_PURCHASES_CACHE_TAG.to_string()],
                &[Self::purchases_cid(owner)],
            )
            .await;
    }

    pub async fn list_purchased_plans(&self, owner: &Owner) -> AppResult<PurchasedPlanList> {
        let tags = [MY_PURCHASES_CACHE_TAG.to_string(), cache_key::owner_tag(owner)];
        let plans = self
            .cache
            .remember(&Self::purchases_cid(owner), &tags, || {
                self.api.list_purchased_plans(owner)
            })
            .await?;
        let today = self.organization.today().await?;
        let views = plans
            .into_iter()
            .map(|p| self.view(owner, p, today))
            .collect();
        Ok(group_purchased_plans(views))
    }

    pub async fn get_purchased_plan(&self, owner: &Owner, id: &str) -> AppResult<PurchasedPlanView> {
        let plan = self.api.get_purchased_plan(owner, id).await?;
        let today = self.organization.today().await?;
        Ok(self.view(owner, plan, today))
    }

    pub async fn purchase(
        &self,
        owner: &Owner,
        bundle_id: &str,
        plan_id: &str,
        request: PurchaseRequest,
    ) -> AppResult<PurchasedPlanView> {
        let plan = self.catalog.rate_plan(bundle_id, plan_id).await?;
        let today = self.organization.today().await?;
        if plan.is_ended(today) {
            return Err(AppError::ValidationError(format!(
                "Rate plan {} is no longer available",
                plan.label()
            )));
        }

        self.terms.ensure_accepted(owner, request.accept_terms).await?;

        let start_date = plan.start_date.map_or(today, |start| start.max(today));
        let new_plan = NewPurchasedPlan {
            rate_plan_id: plan.id.clone(),
            start_date,
            suppress_warning: request.suppress_warning,
        };
        let created = self
            .api
            .create_purchased_plan(owner, &new_plan)
            .await
            .map_err(|e| translate_purchase_error(e, &plan))?;
        log::info!("{owner} purchased rate plan {} starting {start_date}", plan.id);

        self.invalidate_purchases(owner).await;
        Ok(self.view(owner, created, today))
    }

    pub async fn cancel(
        &self,
        owner: &Owner,
        id: &str,
        request: CancelPurchaseRequest,
    ) -> AppResult<PurchasedPlanView> {
        let mut plan = self.api.get_purchased_plan(owner, id).await?;
        let today = self.organization.today().await?;
        let end_date = cancellation_end_date(&plan, &request, today)?;

        plan.end_date = Some(end_date);
        let updated = self.api.update_purchased_plan(owner, &plan).await?;
        log::info!("{owner} cancelled purchased plan {id} ending {end_date}");

        self.invalidate_purchases(owner).await;
        Ok(self.view(owner, updated, today))
    }
}
