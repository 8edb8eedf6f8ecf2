use crate::config::ApigeeConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Data needed to purchase a rate plan.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPurchasedPlan {
    pub rate_plan_id: String,
    pub start_date: NaiveDate,
    pub suppress_warning: bool,
}

/// Calls into the Apigee Edge Monetization API used by the services.
#[async_trait]
pub trait MonetizationApi: Send + Sync {
    async fn get_organization_profile(&self) -> AppResult<OrganizationProfile>;

    async fn list_supported_currencies(&self) -> AppResult<Vec<SupportedCurrency>>;

    async fn list_available_bundles(&self, owner: &Owner) -> AppResult<Vec<ProductBundle>>;

    async fn get_bundle(&self, bundle_id: &str) -> AppResult<ProductBundle>;

    async fn list_rate_plans(&self, bundle_id: &str, current_only: bool) -> AppResult<Vec<RatePlan>>;

    async fn get_rate_plan(&self, bundle_id: &str, plan_id: &str) -> AppResult<RatePlan>;

    async fn list_purchased_plans(&self, owner: &Owner) -> AppResult<Vec<PurchasedPlan>>;

    async fn get_purchased_plan(&self, owner: &Owner, id: &str) -> AppResult<PurchasedPlan>;

    async fn create_purchased_plan(
        &self,
        owner: &Owner,
        plan: &NewPurchasedPlan,
    ) -> AppResult<PurchasedPlan>;

    async fn update_purchased_plan(
        &self,
        owner: &Owner,
        plan: &PurchasedPlan,
    ) -> AppResult<PurchasedPlan>;

    async fn get_prepaid_balances(
        &self,
        owner: &Owner,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<PrepaidBalance>>;

    async fn list_billing_months(&self) -> AppResult<Vec<BillingMonth>>;

    async fn prepaid_balance_report(
        &self,
        owner: &Owner,
        year: i32,
        month: u32,
        currency: &str,
    ) -> AppResult<String>;

    async fn list_current_terms(&self) -> AppResult<Vec<TermsAndConditions>>;

    async fn list_accepted_terms(&self, owner: &Owner) -> AppResult<Vec<AcceptedTerms>>;

    async fn accept_terms(
        &self,
        owner: &Owner,
        terms_id: &str,
        audit_date: NaiveDateTime,
    ) -> AppResult<AcceptedTerms>;
}

#[derive(Debug, Deserialize)]
struct EdgeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageList {
    #[serde(default)]
    monetization_package: Vec<ProductBundle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatePlanList {
    #[serde(default)]
    rate_plan: Vec<RatePlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchasedPlanList {
    #[serde(default)]
    developer_rate_plan: Vec<PurchasedPlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceList {
    #[serde(default)]
    developer_balance: Vec<PrepaidBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyList {
    #[serde(default)]
    supported_currency: Vec<SupportedCurrency>,
}

#[derive(Debug, Deserialize)]
struct TermsList {
    #[serde(default)]
    tnc: Vec<TermsAndConditions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptedTermsList {
    #[serde(default)]
    developer_tnc: Vec<AcceptedTerms>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeCriteria<'a> {
    id: &'a str,
    org_id: &'a str,
}

#[derive(Clone)]
pub struct ApigeeClient {
    client: Client,
    config: ApigeeConfig,
}

impl ApigeeClient {
    pub fn new(config: ApigeeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn organization(&self) -> &str {
        &self.config.organization
    }

    /// `{endpoint}/mint/organizations/{org}/{segments...}` with each segment escaped.
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| {
            AppError::ConfigError(format!("Invalid Apigee endpoint {}: {e}", self.config.endpoint))
        })?;
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("Apigee endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["mint", "organizations", self.config.organization.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn owner_url(&self, owner: &Owner, segments: &[&str]) -> AppResult<Url> {
        let mut all: Vec<&str> = owner.edge_segments().to_vec();
        all.extend_from_slice(segments);
        self.url(&all)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder.basic_auth(&self.config.username, Some(&self.config.password)),
        }
    }

    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<EdgeErrorBody>(&text) {
            Ok(body) => (
                body.code.unwrap_or_else(|| "unknown".to_string()),
                body.message.unwrap_or_else(|| text.clone()),
            ),
            Err(_) => ("unknown".to_string(), text),
        };
        Err(AppError::Edge {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        log::debug!("Edge GET {url}");
        let response = self
            .request(Method::GET, url)
            .header("Accept", "application/json")
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> AppResult<T> {
        log::debug!("Edge {method} {url}");
        let response = self
            .request(method, url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl MonetizationApi for ApigeeClient {
    async fn get_organization_profile(&self) -> AppResult<OrganizationProfile> {
        self.get_json(self.url(&[])?).await
    }

    async fn list_supported_currencies(&self) -> AppResult<Vec<SupportedCurrency>> {
        let list: CurrencyList = self.get_json(self.url(&["supported-currencies"])?).await?;
        Ok(list.supported_currency)
    }

    async fn list_available_bundles(&self, owner: &Owner) -> AppResult<Vec<ProductBundle>> {
        let mut url = self.owner_url(owner, &["monetization-packages"])?;
        url.query_pairs_mut()
            .append_pair("current", "true")
            .append_pair("allAvailable", "true");
        let list: PackageList = self.get_json(url).await?;
        Ok(list.monetization_package)
    }

    async fn get_bundle(&self, bundle_id: &str) -> AppResult<ProductBundle> {
        self.get_json(self.url(&["monetization-packages", bundle_id])?)
            .await
    }

    async fn list_rate_plans(&self, bundle_id: &str, current_only: bool) -> AppResult<Vec<RatePlan>> {
        let mut url = self.url(&["monetization-packages", bundle_id, "rate-plans"])?;
        url.query_pairs_mut()
            .append_pair("current", if current_only { "true" } else { "false" })
            .append_pair("showPrivate", "true");
        let list: RatePlanList = self.get_json(url).await?;
        Ok(list.rate_plan)
    }

    async fn get_rate_plan(&self, bundle_id: &str, plan_id: &str) -> AppResult<RatePlan> {
        self.get_json(self.url(&["monetization-packages", bundle_id, "rate-plans", plan_id])?)
            .await
    }

    async fn list_purchased_plans(&self, owner: &Owner) -> AppResult<Vec<PurchasedPlan>> {
        let list: PurchasedPlanList = self
            .get_json(self.owner_url(owner, &["developer-accepted-rateplans"])?)
            .await?;
        Ok(list.developer_rate_plan)
    }

    async fn get_purchased_plan(&self, owner: &Owner, id: &str) -> AppResult<PurchasedPlan> {
        self.get_json(self.owner_url(owner, &["developer-rateplans", id])?)
            .await
    }

    async fn create_purchased_plan(
        &self,
        owner: &Owner,
        plan: &NewPurchasedPlan,
    ) -> AppResult<PurchasedPlan> {
        let owner_ref = json!({ "id": owner.id() });
        let mut body = json!({
            "ratePlan": { "id": plan.rate_plan_id },
            "startDate": crate::utils::edge_date::format(plan.start_date),
            "suppressWarning": plan.suppress_warning,
        });
        match owner {
            Owner::Developer(_) => body["developer"] = owner_ref,
            Owner::Team(_) => body["company"] = owner_ref,
        }
        let created: PurchasedPlan = self
            .send_json(
                Method::POST,
                self.owner_url(owner, &["developer-rateplans"])?,
                &body,
            )
            .await?;
        log::info!(
            "Purchased rate plan {} for {owner} as {}",
            plan.rate_plan_id,
            created.id
        );
        Ok(created)
    }

    async fn update_purchased_plan(
        &self,
        owner: &Owner,
        plan: &PurchasedPlan,
    ) -> AppResult<PurchasedPlan> {
        let updated: PurchasedPlan = self
            .send_json(
                Method::PUT,
                self.owner_url(owner, &["developer-rateplans", &plan.id])?,
                plan,
            )
            .await?;
        log::info!("Updated purchased plan {} for {owner}", updated.id);
        Ok(updated)
    }

    async fn get_prepaid_balances(
        &self,
        owner: &Owner,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<PrepaidBalance>> {
        let month_name = month_name(month)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid billing month: {month}")))?;
        let mut url = self.owner_url(owner, &["prepaid-developer-balance"])?;
        url.query_pairs_mut()
            .append_pair("billingMonth", month_name)
            .append_pair("billingYear", &year.to_string());
        let list: BalanceList = self.get_json(url).await?;
        Ok(list.developer_balance)
    }

    async fn list_billing_months(&self) -> AppResult<Vec<BillingMonth>> {
        self.get_json(self.url(&["billing-documents-months"])?).await
    }

    async fn prepaid_balance_report(
        &self,
        owner: &Owner,
        year: i32,
        month: u32,
        currency: &str,
    ) -> AppResult<String> {
        let month_name = month_name(month)
            .ok_or_else(|| AppError::ValidationError(format!("Invalid billing month: {month}")))?;
        let org = self.config.organization.as_str();
        let body = json!({
            "billingMonth": month_name,
            "billingYear": year,
            "showTxDetail": true,
            "devCriteria": [EdgeCriteria { id: owner.id(), org_id: org }],
            "currCriteria": [EdgeCriteria { id: &currency.to_ascii_lowercase(), org_id: org }],
        });
        let url = self.url(&["prepaid-balance-reports"])?;
        log::debug!("Edge POST {url}");
        let response = self
            .request(Method::POST, url)
            .header("Accept", "application/octet-stream")
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.text().await?)
    }

    async fn list_current_terms(&self) -> AppResult<Vec<TermsAndConditions>> {
        let mut url = self.url(&["tncs"])?;
        url.query_pairs_mut().append_pair("current", "true");
        let list: TermsList = self.get_json(url).await?;
        Ok(list.tnc)
    }

    async fn list_accepted_terms(&self, owner: &Owner) -> AppResult<Vec<AcceptedTerms>> {
        let list: AcceptedTermsList = self
            .get_json(self.owner_url(owner, &["developer-tncs"])?)
            .await?;
        Ok(list.developer_tnc)
    }

    async fn accept_terms(
        &self,
        owner: &Owner,
        terms_id: &str,
        audit_date: NaiveDateTime,
    ) -> AppResult<AcceptedTerms> {
        let body = json!({
            "action": TermsAction::Accepted,
            "auditDate": audit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        let accepted: AcceptedTerms = self
            .send_json(
                Method::POST,
                self.owner_url(owner, &["tncs", terms_id, "developer-tncs"])?,
                &body,
            )
            .await?;
        log::info!("{owner} accepted terms and conditions {terms_id}");
        Ok(accepted)
    }
}
