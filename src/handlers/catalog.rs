use super::owner_from_request;
use crate::services::CatalogService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct BundlePath {
    pub bundle: String,
}

#[derive(Debug, Deserialize)]
pub struct RatePlanPath {
    pub bundle: String,
    pub plan: String,
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/product-bundles",
    tag = "catalog",
    params(("developer" = String, Path, description = "开发者邮箱；团队使用 /teams/{team} 前缀")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取可购买的产品包成功", body = [ProductBundleView]),
        (status = 401, description = "未授权"),
        (status = 403, description = "无权访问该开发者或团队")
    )
)]
pub async fn list_bundles(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let bundles = catalog_service.list_bundles(&owner).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": bundles})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/product-bundles/{bundle}",
    tag = "catalog",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("bundle" = String, Path, description = "产品包 ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取产品包成功", body = ProductBundleView),
        (status = 404, description = "产品包不存在")
    )
)]
pub async fn get_bundle(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<BundlePath>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let bundle = catalog_service.get_bundle(&owner, &path.bundle).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": bundle})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/product-bundles/{bundle}/plans",
    tag = "catalog",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("bundle" = String, Path, description = "产品包 ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取未结束的费率计划成功", body = [RatePlanView]),
        (status = 404, description = "产品包不存在")
    )
)]
pub async fn list_rate_plans(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<BundlePath>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let plans = catalog_service.list_rate_plans(&owner, &path.bundle).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": plans})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/product-bundles/{bundle}/plans/{plan}",
    tag = "catalog",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("bundle" = String, Path, description = "产品包 ID"),
        ("plan" = String, Path, description = "费率计划 ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取费率计划成功", body = RatePlanView),
        (status = 404, description = "费率计划不存在")
    )
)]
pub async fn get_rate_plan(
    catalog_service: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<RatePlanPath>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let plan = catalog_service
        .get_rate_plan(&owner, &path.bundle, &path.plan)
        .await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": plan})))
}
