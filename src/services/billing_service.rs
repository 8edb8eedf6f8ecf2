use crate::config::BillingConfig;
use crate::error::{AppError, AppResult};
use crate::external::MonetizationApi;
use crate::models::*;
use crate::services::{CacheService, OrganizationService};
use crate::utils::cache_key::{self, BILLING_MONTHS, ORGANIZATION};
use crate::utils::format_amount;
use chrono::Datelike;
use std::sync::Arc;

pub fn balance_view(balance: &PrepaidBalance) -> PrepaidBalanceView {
    let code = balance.supported_currency.code();
    PrepaidBalanceView {
        formatted_current_balance: format_amount(balance.current_balance, &code),
        formatted_current_usage: format_amount(balance.current_usage, &code),
        formatted_top_ups: format_amount(balance.top_ups, &code),
        formatted_usage: format_amount(balance.usage, &code),
        formatted_tax: format_amount(balance.tax, &code),
        current_balance: balance.current_balance,
        current_usage: balance.current_usage,
        top_ups: balance.top_ups,
        usage: balance.usage,
        tax: balance.tax,
        currency: code,
    }
}

/// Newest first, at most `limit` months.
pub fn recent_months(mut months: Vec<BillingMonth>, limit: u32) -> Vec<BillingMonth> {
    months.sort_by_key(|m| std::cmp::Reverse(m.ordinal()));
    months.dedup_by_key(|m| m.ordinal());
    months.truncate(limit as usize);
    months
}

#[derive(Clone)]
pub struct BillingService {
    api: Arc<dyn MonetizationApi>,
    cache: CacheService,
    organization: OrganizationService,
    config: BillingConfig,
}

impl BillingService {
    pub fn new(
        api: Arc<dyn MonetizationApi>,
        cache: CacheService,
        organization: OrganizationService,
        config: BillingConfig,
    ) -> Self {
        Self {
            api,
            cache,
            organization,
            config,
        }
    }

    /// Balances for the current billing month of the organization.
    pub async fn prepaid_balances(&self, owner: &Owner) -> AppResult<PrepaidBalancesResponse> {
        let today = self.organization.today().await?;
        let (year, month) = (today.year(), today.month());
        let balances = self.api.get_prepaid_balances(owner, year, month).await?;
        Ok(PrepaidBalancesResponse {
            year,
            month,
            balances: balances.iter().map(balance_view).collect(),
        })
    }

    pub async fn billing_months(&self) -> AppResult<Vec<BillingMonth>> {
        let cid = cache_key::cache_id(BILLING_MONTHS, "all", None);
        let tags = [cache_key::entity_tag(ORGANIZATION, BILLING_MONTHS)];
        let months = self
            .cache
            .remember(&cid, &tags, || self.api.list_billing_months())
            .await?;
        Ok(recent_months(months, self.config.max_statement_history_months))
    }

    /// CSV prepaid balance report for one of the listed billing months.
    pub async fn prepaid_balance_report(
        &self,
        owner: &Owner,
        query: &BillingReportQuery,
    ) -> AppResult<String> {
        let (year, month) = query.year_month().ok_or_else(|| {
            AppError::ValidationError(format!("Invalid billing month: {}", query.month))
        })?;
        let currency = query.currency_id().ok_or_else(|| {
            AppError::ValidationError(format!("Invalid currency: {}", query.currency.trim()))
        })?;
        let available = self.billing_months().await?;
        if !available.iter().any(|m| m.year == year && m.month == month) {
            return Err(AppError::NotFound(format!(
                "No billing documents for {}",
                query.month
            )));
        }
        let report = self
            .api
            .prepaid_balance_report(owner, year, month, &currency)
            .await?;
        log::info!("Generated prepaid balance report {year}-{month:02} {currency} for {owner}");
        Ok(report)
    }
}
