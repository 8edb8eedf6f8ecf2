use super::owner_from_request;
use crate::models::*;
use crate::services::BillingService;
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/developers/{developer}/prepaid-balances",
    tag = "billing",
    params(("developer" = String, Path, description = "开发者邮箱；团队使用 /teams/{team} 前缀")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "本月预付费余额", body = PrepaidBalancesResponse),
        (status = 403, description = "无权访问该开发者或团队")
    )
)]
pub async fn prepaid_balances(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let balances = billing_service.prepaid_balances(&owner).await?;
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": balances})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/billing/months",
    tag = "billing",
    params(("developer" = String, Path, description = "开发者邮箱")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "可下载账单的月份（新到旧）", body = [BillingMonthView])
    )
)]
pub async fn billing_months(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    owner_from_request(&req)?;
    let months: Vec<BillingMonthView> = billing_service
        .billing_months()
        .await?
        .into_iter()
        .map(BillingMonthView::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({"success": true, "data": months})))
}

#[utoipa::path(
    get,
    path = "/developers/{developer}/billing/reports",
    tag = "billing",
    params(
        ("developer" = String, Path, description = "开发者邮箱"),
        ("month" = String, Query, description = "账单月份 (YYYY-MM)"),
        ("currency" = String, Query, description = "币种，例如 usd")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "预付费余额报表 CSV", body = String, content_type = "text/csv"),
        (status = 400, description = "月份或币种格式错误"),
        (status = 404, description = "该月份无账单")
    )
)]
pub async fn billing_report(
    billing_service: web::Data<BillingService>,
    req: HttpRequest,
    query: web::Query<BillingReportQuery>,
) -> Result<HttpResponse> {
    let owner = owner_from_request(&req)?;
    let csv = billing_service
        .prepaid_balance_report(&owner, &query)
        .await?;
    // 月份与币种已在服务层校验
    let filename = format!(
        "prepaid-balance-report-{}-{}.csv",
        query.month.trim(),
        query.currency_id().unwrap_or_default()
    );
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(csv))
}
