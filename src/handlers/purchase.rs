use super::catalog::RatePlanPath;
use super::owner_from_request;
use crate::models::*;
use crate::services::PurchaseService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct PurchasedPlanPath {
    pub purchased_plan: String,
}

#[utoipa::path(
    post,
    path = "/developers/{developer}/product-bundles/{bundle}/plans/{plan}/purchase",
    tag = "purchase",
    params(
        ("developer" = String, Path, description = "开发者邮箱；团队使用 /teams/{team} 前缀"),
        ("bundle" = String, Path, description = "产品包 ID"),
        ("plan" = String, Path, description = "费率计划 ID")
    ),
    request_body = PurchaseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "购买费率计划成功", body = PurchasedPlanView),
        (status = 400, description = "计划已结束或未接受条款"),
        (status = 402, description = "余额不足"),
        (status = 409, description = "与已购计划重叠")
    )
)]
pub async fn purchase_plan(
    purchase_service: web::Data<PurchaseService>,
    req: HttpRequest,
    path: web::Path<RatePlanPath>,
    request: Option<web::Json<PurchaseRequest>>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let request = request.map(|r| r.into_inner()).unwrap_or_default();
    let purchased = purchase_service
        .purchase(&owner, &path.bundle, &path.plan, request)
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "data": purchased,
        "message": "Rate plan purchased"
    })))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/purchased-plans",
    tag = "purchase",
    params(("developer" = String, Path, description = "开发者邮箱；团队使用 /teams/{team} 前缀")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "按状态分组的已购计划", body = PurchasedPlanList),
        (status = 403, description = "无权访问该开发者或团队")
    )
)]
pub async fn list_purchased_plans(
    purchase_service: web::Data<PurchaseService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let list = purchase_service.list_purchased_plans(&owner).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": list})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/purchased-plans/{purchased_plan}",
    tag = "purchase",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("purchased_plan" = String, Path, description = "已购计划 ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取已购计划成功", body = PurchasedPlanView),
        (status = 404, description = "已购计划不存在")
    )
)]
pub async fn get_purchased_plan(
    purchase_service: web::Data<PurchaseService>,
    req: HttpRequest,
    path: web::Path<PurchasedPlanPath>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let plan = purchase_service
        .get_purchased_plan(&owner, &path.purchased_plan)
        .await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": plan})))
}

#[utoipa::path(
    post,
    path = "/developers/{developer}/purchased-plans/{purchased_plan}/cancel",
    tag = "purchase",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("purchased_plan" = String, Path, description = "已购计划 ID")
    ),
    request_body = CancelPurchaseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "取消已购计划成功", body = PurchasedPlanView),
        (status = 400, description = "结束日期无效或计划已结束")
    )
)]
pub async fn cancel_purchased_plan(
    purchase_service: web::Data<PurchaseService>,
    req: HttpRequest,
    path: web::Path<PurchasedPlanPath>,
    request: web::Json<CancelPurchaseRequest>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let plan = purchase_service
        .cancel(&owner, &path.purchased_plan, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": plan,
        "message": "Purchased plan cancelled"
    })))
}
