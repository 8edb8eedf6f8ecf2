use super::owner_from_request;
use crate::services::TermsService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/developers/{developer}/terms",
    tag = "terms",
    params(("developer" = String, Path, description = "开发者邮箱；团队使用 /teams/{team} 前缀")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "当前条款及是否已接受", body = TermsStatusView)
    )
)]
pub async fn terms_status(
    terms_service: web::Data<TermsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let status = terms_service.status(&owner).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": status})))
}

#[utoipa::path(
    post,
    path = "/developers/{developer}/terms/accept",
    tag = "terms",
    params(("developer" = String, Path, description = "开发者邮箱")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "接受当前条款成功", body = TermsStatusView),
        (status = 404, description = "当前没有生效的条款")
    )
)]
pub async fn accept_terms(
    terms_service: web::Data<TermsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let status = terms_service.accept_latest(&owner).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": status,
        "message": "Terms and conditions accepted"
    })))
}
