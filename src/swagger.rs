use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::utils::PurchaseStatus;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::catalog::list_bundles,
        handlers::catalog::get_bundle,
        handlers::catalog::list_rate_plans,
        handlers::catalog::get_rate_plan,
        handlers::purchase::purchase_plan,
        handlers::purchase::list_purchased_plans,
        handlers::purchase::get_purchased_plan,
        handlers::purchase::cancel_purchased_plan,
        handlers::billing::prepaid_balances,
        handlers::billing::billing_months,
        handlers::billing::billing_report,
        handlers::terms::terms_status,
        handlers::terms::accept_terms,
        handlers::admin::invalidate_cache,
        handlers::admin::purge_cache,
    ),
    components(
        schemas(
            OrganizationRef,
            SupportedCurrency,
            ApiProduct,
            ProductBundle,
            ProductBundleRef,
            ProductBundleLinks,
            ProductBundleView,
            RatePlanType,
            RatePlanRef,
            RatePlan,
            RatePlanLinks,
            RatePlanView,
            DeveloperRef,
            CompanyRef,
            PurchasedPlan,
            PurchasedPlanLinks,
            PurchasedPlanView,
            PurchasedPlanList,
            PurchaseStatus,
            EndType,
            CancelPurchaseRequest,
            PurchaseRequest,
            PrepaidBalanceView,
            PrepaidBalancesResponse,
            BillingMonthView,
            TermsAndConditions,
            TermsStatusView,
            InvalidateCacheRequest,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Product bundles and rate plans"),
        (name = "purchase", description = "Purchased plans API"),
        (name = "billing", description = "Prepaid balances and billing reports"),
        (name = "terms", description = "Terms and conditions API"),
        (name = "admin", description = "Cache administration API"),
    ),
    info(
        title = "Apigee Monetization API",
        version = "1.0.0",
        description = "Developer and team monetization REST API on top of Apigee Edge"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
