#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::json;

use apigee_m10n::config::Config;
use apigee_m10n::external::{MonetizationApi, NewPurchasedPlan};
use apigee_m10n::handlers;
use apigee_m10n::middlewares::AuthMiddleware;
use apigee_m10n::models::*;
use apigee_m10n::services::{CacheBackend, MemoryCacheBackend, Services};
use apigee_m10n::utils::{FixedClock, JwtService};
use apigee_m10n::{AppError, AppResult};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const DEV: &str = "dev@example.com";
pub const TEAM: &str = "rocket";

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).expect("fixture")
}

/// In-memory stand-in for Apigee Edge.
pub struct FakeEdge {
    pub profile: OrganizationProfile,
    pub bundles: Vec<ProductBundle>,
    pub rate_plans: Vec<RatePlan>,
    pub purchased: HashMap<Owner, Vec<PurchasedPlan>>,
    pub terms: Vec<TermsAndConditions>,
    pub accepted: HashMap<Owner, Vec<AcceptedTerms>>,
    pub billing_months: Vec<BillingMonth>,
    pub balances: Vec<PrepaidBalance>,
    pub create_error: Option<AppError>,
    pub created: Vec<(Owner, NewPurchasedPlan)>,
    pub updated: Vec<PurchasedPlan>,
    pub list_purchased_calls: usize,
}

impl FakeEdge {
    pub fn new() -> Self {
        let gold = json!({
            "id": "gold", "displayName": "Gold", "startDate": "2024-01-01 00:00:00",
            "monetizationPackage": {"id": "weather"}
        });
        let developer = Owner::Developer(DEV.to_string());
        let purchased = vec![
            from_json(json!({
                "id": "dp-active", "startDate": "2024-02-01 00:00:00", "ratePlan": gold
            })),
            from_json(json!({
                "id": "dp-future", "startDate": "2024-03-01 00:00:00", "ratePlan": gold
            })),
            from_json(json!({
                "id": "dp-ended", "startDate": "2024-01-01 00:00:00",
                "endDate": "2024-01-31 00:00:00", "ratePlan": gold
            })),
            from_json(json!({
                "id": "dp-cancelled", "startDate": "2024-02-29 00:00:00",
                "endDate": "2024-02-28 00:00:00", "ratePlan": gold
            })),
        ];

        Self {
            profile: from_json(json!({
                "id": "acme", "currency": "USD", "timezone": "America/Los_Angeles"
            })),
            bundles: vec![from_json(json!({
                "id": "weather", "displayName": "Weather", "product": [{"id": "forecast"}]
            }))],
            rate_plans: vec![
                from_json(gold.clone()),
                from_json(json!({
                    "id": "gold-v2", "displayName": "Gold", "startDate": "2024-06-01 00:00:00",
                    "monetizationPackage": {"id": "weather"},
                    "previousRatePlanRevision": {"id": "gold"}
                })),
                from_json(json!({
                    "id": "retired", "startDate": "2023-01-01 00:00:00",
                    "endDate": "2024-01-31 00:00:00", "monetizationPackage": {"id": "weather"}
                })),
                from_json(json!({
                    "id": "launch", "displayName": "Launch", "startDate": "2024-04-01 00:00:00",
                    "monetizationPackage": {"id": "weather"}
                })),
            ],
            purchased: HashMap::from([(developer.clone(), purchased)]),
            terms: vec![from_json(json!({"id": "tnc-1", "startDate": "2024-01-01 00:00:00"}))],
            accepted: HashMap::from([(
                developer,
                vec![from_json(json!({
                    "action": "ACCEPTED",
                    "auditDate": "2024-01-05 10:00:00",
                    "tnc": {"id": "tnc-1"}
                }))],
            )]),
            billing_months: vec![
                from_json(json!({"year": 2024, "month": "JANUARY"})),
                from_json(json!({"year": 2024, "month": "FEBRUARY"})),
            ],
            balances: vec![from_json(json!({
                "supportedCurrency": {"id": "usd", "name": "USD"},
                "currentBalance": 1250.5,
                "usage": 20
            }))],
            create_error: None,
            created: Vec::new(),
            updated: Vec::new(),
            list_purchased_calls: 0,
        }
    }
}

#[derive(Clone)]
pub struct FakeApi {
    pub edge: Arc<Mutex<FakeEdge>>,
}

impl FakeApi {
    pub fn new(edge: FakeEdge) -> Self {
        Self {
            edge: Arc::new(Mutex::new(edge)),
        }
    }

    pub fn edge(&self) -> std::sync::MutexGuard<'_, FakeEdge> {
        self.edge.lock().expect("fake edge lock")
    }
}

fn not_found(what: &str) -> AppError {
    AppError::Edge {
        status: 404,
        code: "mint.resourceDoesNotExist".to_string(),
        message: format!("{what} does not exist"),
    }
}

#[async_trait]
impl MonetizationApi for FakeApi {
    async fn get_organization_profile(&self) -> AppResult<OrganizationProfile> {
        Ok(self.edge().profile.clone())
    }

    async fn list_supported_currencies(&self) -> AppResult<Vec<SupportedCurrency>> {
        Ok(vec![from_json(json!({"id": "usd", "name": "USD"}))])
    }

    async fn list_available_bundles(&self, _owner: &Owner) -> AppResult<Vec<ProductBundle>> {
        Ok(self.edge().bundles.clone())
    }

    async fn get_bundle(&self, bundle_id: &str) -> AppResult<ProductBundle> {
        self.edge()
            .bundles
            .iter()
            .find(|b| b.id == bundle_id)
            .cloned()
            .ok_or_else(|| not_found(bundle_id))
    }

    async fn list_rate_plans(&self, bundle_id: &str, _current_only: bool) -> AppResult<Vec<RatePlan>> {
        Ok(self
            .edge()
            .rate_plans
            .iter()
            .filter(|p| p.bundle_id() == Some(bundle_id))
            .cloned()
            .collect())
    }

    async fn get_rate_plan(&self, _bundle_id: &str, plan_id: &str) -> AppResult<RatePlan> {
        self.edge()
            .rate_plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
            .ok_or_else(|| not_found(plan_id))
    }

    async fn list_purchased_plans(&self, owner: &Owner) -> AppResult<Vec<PurchasedPlan>> {
        let mut edge = self.edge();
        edge.list_purchased_calls += 1;
        Ok(edge.purchased.get(owner).cloned().unwrap_or_default())
    }

    async fn get_purchased_plan(&self, owner: &Owner, id: &str) -> AppResult<PurchasedPlan> {
        self.edge()
            .purchased
            .get(owner)
            .and_then(|plans| plans.iter().find(|p| p.id == id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_purchased_plan(
        &self,
        owner: &Owner,
        plan: &NewPurchasedPlan,
    ) -> AppResult<PurchasedPlan> {
        let mut edge = self.edge();
        if let Some(err) = edge.create_error.take() {
            return Err(err);
        }
        let rate_plan = edge
            .rate_plans
            .iter()
            .find(|p| p.id == plan.rate_plan_id)
            .cloned()
            .ok_or_else(|| not_found(&plan.rate_plan_id))?;
        let created: PurchasedPlan = from_json(json!({
            "id": format!("new-{}", edge.created.len() + 1),
            "startDate": plan.start_date.format("%Y-%m-%d 00:00:00").to_string(),
            "ratePlan": rate_plan,
        }));
        edge.created.push((owner.clone(), plan.clone()));
        edge.purchased
            .entry(owner.clone())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_purchased_plan(
        &self,
        owner: &Owner,
        plan: &PurchasedPlan,
    ) -> AppResult<PurchasedPlan> {
        let mut edge = self.edge();
        edge.updated.push(plan.clone());
        let stored = edge
            .purchased
            .get_mut(owner)
            .and_then(|plans| plans.iter_mut().find(|p| p.id == plan.id))
            .ok_or_else(|| not_found(&plan.id))?;
        *stored = plan.clone();
        Ok(plan.clone())
    }

    async fn get_prepaid_balances(
        &self,
        _owner: &Owner,
        _year: i32,
        _month: u32,
    ) -> AppResult<Vec<PrepaidBalance>> {
        Ok(self.edge().balances.clone())
    }

    async fn list_billing_months(&self) -> AppResult<Vec<BillingMonth>> {
        Ok(self.edge().billing_months.clone())
    }

    async fn prepaid_balance_report(
        &self,
        owner: &Owner,
        year: i32,
        month: u32,
        currency: &str,
    ) -> AppResult<String> {
        Ok(format!(
            "Developer,Month,Currency\n{},{year}-{month:02},{currency}\n",
            owner.id()
        ))
    }

    async fn list_current_terms(&self) -> AppResult<Vec<TermsAndConditions>> {
        Ok(self.edge().terms.clone())
    }

    async fn list_accepted_terms(&self, owner: &Owner) -> AppResult<Vec<AcceptedTerms>> {
        Ok(self.edge().accepted.get(owner).cloned().unwrap_or_default())
    }

    async fn accept_terms(
        &self,
        owner: &Owner,
        terms_id: &str,
        audit_date: NaiveDateTime,
    ) -> AppResult<AcceptedTerms> {
        let record: AcceptedTerms = from_json(json!({
            "action": "ACCEPTED",
            "auditDate": audit_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            "tnc": {"id": terms_id}
        }));
        self.edge()
            .accepted
            .entry(owner.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }
}

pub fn test_config() -> Config {
    toml::from_str(
        r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [jwt]
        secret = "integration-test-secret"
        access_token_expires_in = 3600

        [apigee]
        organization = "acme"
        username = "ops"
        password = "secret"

        [cache]
        backend = "memory"
        max_age = 900
        gc_interval = 3600

        [billing]
        max_statement_history_months = 12
        "#,
    )
    .expect("test config")
}

/// 2024-03-01T05:00:00Z, which is still 2024-02-29 in Los Angeles.
pub fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap()
}

pub fn services(api: &FakeApi) -> Services {
    services_with_backend(api, Arc::new(MemoryCacheBackend::new()))
}

pub fn services_with_backend(api: &FakeApi, backend: Arc<dyn CacheBackend>) -> Services {
    Services::new(
        &test_config(),
        Arc::new(api.clone()),
        backend,
        Arc::new(FixedClock(now())),
    )
}

/// Cache backend whose storage is unreachable.
pub struct UnavailableCache;

fn cache_down() -> AppError {
    AppError::InternalError("cache storage unreachable".to_string())
}

#[async_trait]
impl CacheBackend for UnavailableCache {
    async fn get(&self, _cid: &str, _now: DateTime<Utc>) -> AppResult<Option<String>> {
        Err(cache_down())
    }

    async fn set(
        &self,
        _cid: &str,
        _data: String,
        _tags: &[String],
        _expire: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        Err(cache_down())
    }

    async fn delete(&self, _cid: &str) -> AppResult<()> {
        Err(cache_down())
    }

    async fn invalidate_tags(&self, _tags: &[String]) -> AppResult<u64> {
        Err(cache_down())
    }

    async fn garbage_collect(&self, _now: DateTime<Utc>) -> AppResult<u64> {
        Err(cache_down())
    }
}

pub fn token(developer: &str, teams: &[&str], admin: bool) -> String {
    let teams: Vec<String> = teams.iter().map(|t| t.to_string()).collect();
    JwtService::new(JWT_SECRET, 3600)
        .generate_access_token(developer, &teams, admin)
        .expect("token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn app(
    services: Services,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(AuthMiddleware::new(JwtService::new(JWT_SECRET, 3600)))
        .app_data(web::Data::new(services.cache))
        .app_data(web::Data::new(services.catalog))
        .app_data(web::Data::new(services.purchases))
        .app_data(web::Data::new(services.billing))
        .app_data(web::Data::new(services.terms))
        .service(
            web::scope("/api/v1")
                .configure(handlers::monetization_config)
                .configure(handlers::admin_config),
        )
}
