pub mod admin;
pub mod billing;
pub mod catalog;
pub mod purchase;
pub mod terms;

pub use admin::admin_config;

use crate::error::{AppError, AppResult};
use crate::models::Owner;
use crate::utils::AuthContext;
use actix_web::{HttpMessage, HttpRequest, web};

pub(crate) fn auth_context(req: &HttpRequest) -> AppResult<AuthContext> {
    req.extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

/// The developer or team named in the route, checked against the caller.
pub(crate) fn owner_from_request(req: &HttpRequest) -> AppResult<Owner> {
    let info = req.match_info();
    let owner = if let Some(team) = info.get("team") {
        Owner::Team(team.to_string())
    } else if let Some(developer) = info.get("developer") {
        Owner::Developer(developer.to_string())
    } else {
        return Err(AppError::NotFound("Unknown monetization scope".to_string()));
    };
    if !auth_context(req)?.can_access(&owner) {
        log::warn!("Access to {owner} denied");
        return Err(AppError::Forbidden);
    }
    Ok(owner)
}

// developer 与 team 共用同一组路由
fn owner_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/product-bundles", web::get().to(catalog::list_bundles))
        .route("/product-bundles/{bundle}", web::get().to(catalog::get_bundle))
        .route(
            "/product-bundles/{bundle}/plans",
            web::get().to(catalog::list_rate_plans),
        )
        .route(
            "/product-bundles/{bundle}/plans/{plan}",
            web::get().to(catalog::get_rate_plan),
        )
        .route(
            "/product-bundles/{bundle}/plans/{plan}/purchase",
            web::post().to(purchase::purchase_plan),
        )
        .route("/purchased-plans", web::get().to(purchase::list_purchased_plans))
        .route(
            "/purchased-plans/{purchased_plan}",
            web::get().to(purchase::get_purchased_plan),
        )
        .route(
            "/purchased-plans/{purchased_plan}/cancel",
            web::post().to(purchase::cancel_purchased_plan),
        )
        .route("/prepaid-balances", web::get().to(billing::prepaid_balances))
        .route("/billing/months", web::get().to(billing::billing_months))
        .route("/billing/reports", web::get().to(billing::billing_report))
        .route("/terms", web::get().to(terms::terms_status))
        .route("/terms/accept", web::post().to(terms::accept_terms));
}

pub fn monetization_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/developers/{developer}").configure(owner_routes))
        .service(web::scope("/teams/{team}").configure(owner_routes));
}
