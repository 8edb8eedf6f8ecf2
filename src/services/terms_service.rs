use crate::error::{AppError, AppResult};
use crate::external::MonetizationApi;
use crate::models::*;
use crate::services::{CacheService, OrganizationService};
use crate::utils::cache_key::{self, TERMS_AND_CONDITIONS};
use chrono::NaiveDate;
use std::sync::Arc;

/// Current terms and conditions revision in effect on `today`: the one with
/// the newest start date that has already been reached.
pub fn latest_in_effect(terms: &[TermsAndConditions], today: NaiveDate) -> Option<&TermsAndConditions> {
    terms
        .iter()
        .filter(|t| t.start_date.is_none_or(|start| start <= today))
        .max_by_key(|t| t.start_date)
}

/// Whether the newest decision recorded for `terms_id` is an acceptance.
pub fn is_accepted(records: &[AcceptedTerms], terms_id: &str) -> bool {
    records
        .iter()
        .filter(|r| r.tnc.id == terms_id)
        // audit date 格式为 "YYYY-MM-DD HH:MM:SS"，字符串比较即时间顺序
        .max_by(|a, b| a.audit_date.cmp(&b.audit_date))
        .is_some_and(|r| r.action == TermsAction::Accepted)
}

#[derive(Clone)]
pub struct TermsService {
    api: Arc<dyn MonetizationApi>,
    cache: CacheService,
    organization: OrganizationService,
}

impl TermsService {
    pub fn new(
        api: Arc<dyn MonetizationApi>,
        cache: CacheService,
        organization: OrganizationService,
    ) -> Self {
        Self {
            api,
            cache,
            organization,
        }
    }

    fn accepted_cid(owner: &Owner) -> String {
        cache_key::cache_id(TERMS_AND_CONDITIONS, owner.kind(), Some(owner.id()))
    }

    pub async fn latest_terms(&self) -> AppResult<Option<TermsAndConditions>> {
        let cid = cache_key::cache_id(TERMS_AND_CONDITIONS, "current", None);
        let tags = [cache_key::entity_tag(TERMS_AND_CONDITIONS, "current")];
        let terms = self
            .cache
            .remember(&cid, &tags, || self.api.list_current_terms())
            .await?;
        let today = self.organization.today().await?;
        Ok(latest_in_effect(&terms, today).cloned())
    }

    async fn accepted_terms(&self, owner: &Owner) -> AppResult<Vec<AcceptedTerms>> {
        let tags = [cache_key::owner_tag(owner)];
        self.cache
            .remember(&Self::accepted_cid(owner), &tags, || {
                self.api.list_accepted_terms(owner)
            })
            .await
    }

    /// True when there are no terms in effect or the owner accepted them.
    pub async fn is_latest_accepted(&self, owner: &Owner) -> AppResult<bool> {
        match self.latest_terms().await? {
            Some(terms) => Ok(is_accepted(&self.accepted_terms(owner).await?, &terms.id)),
            None => Ok(true),
        }
    }

    pub async fn status(&self, owner: &Owner) -> AppResult<TermsStatusView> {
        let terms = self.latest_terms().await?;
        let accepted = match &terms {
            Some(t) => is_accepted(&self.accepted_terms(owner).await?, &t.id),
            None => true,
        };
        Ok(TermsStatusView { terms, accepted })
    }

    pub async fn accept_latest(&self, owner: &Owner) -> AppResult<TermsStatusView> {
        let terms = self
            .latest_terms()
            .await?
            .ok_or_else(|| AppError::NotFound("No terms and conditions in effect".to_string()))?;
        let audit_date = self.organization.now_local().await?;
        self.api.accept_terms(owner, &terms.id, audit_date).await?;
        self.cache.forget(&[], &[Self::accepted_cid(owner)]).await;
        Ok(TermsStatusView {
            terms: Some(terms),
            accepted: true,
        })
    }

    /// Makes sure `owner` accepted the terms in effect, accepting them on
    /// their behalf when `accept` is set.
    pub async fn ensure_accepted(&self, owner: &Owner, accept: bool) -> AppResult<()> {
        if self.is_latest_accepted(owner).await? {
            return Ok(());
        }
        if !accept {
            return Err(AppError::ValidationError(
                "You must accept the terms and conditions to purchase this plan".to_string(),
            ));
        }
        self.accept_latest(owner).await.map(|_| ())
    }
}
