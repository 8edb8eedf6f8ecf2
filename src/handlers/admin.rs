use super::auth_context;
use crate::error::AppError;
use crate::models::*;
use crate::services::CacheService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;

fn require_admin(req: &HttpRequest) -> Result<(), AppError> {
    if auth_context(req)?.admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[utoipa::path(
    post,
    path = "/admin/cache/invalidate",
    tag = "admin",
    request_body = InvalidateCacheRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "按标签清除缓存成功"),
        (status = 400, description = "标签无效"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn invalidate_cache(
    cache_service: web::Data<CacheService>,
    req: HttpRequest,
    request: web::Json<InvalidateCacheRequest>,
) -> Result<HttpResponse> {
    require_admin(&req)?;
    let removed = cache_service.invalidate_tags(&request.tags).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "removed_count": removed
        },
        "message": "缓存已清除"
    })))
}

#[utoipa::path(
    post,
    path = "/admin/cache/purge",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "清理过期缓存成功"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn purge_cache(
    cache_service: web::Data<CacheService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_admin(&req)?;
    let removed = cache_service.purge_expired().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "removed_count": removed
        },
        "message": "过期缓存清理完成"
    })))
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/cache/invalidate", web::post().to(invalidate_cache))
            .route("/cache/purge", web::post().to(purge_cache)),
    );
}
