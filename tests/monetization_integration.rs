use actix_web::dev::Service;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;

use apigee_m10n::AppError;
use apigee_m10n::error::EDGE_INSUFFICIENT_FUNDS;
use apigee_m10n::models::Owner;

mod support;
use support::{DEV, FakeApi, FakeEdge, TEAM, UnavailableCache, bearer, token};

fn ids(group: &Value) -> Vec<String> {
    group
        .as_array()
        .expect("group array")
        .iter()
        .map(|v| v["purchased_plan"]["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[actix_web::test]
async fn purchased_plans_are_grouped_in_organization_timezone() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/purchased-plans")
        .insert_header(bearer(&token(DEV, &[], false)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let data = &body["data"];

    assert_eq!(ids(&data["active"]), vec!["dp-active"]);
    // 2024-03-01 已是 UTC 日期，但在洛杉矶仍是 2024-02-29
    assert_eq!(ids(&data["future"]), vec!["dp-future"]);
    assert_eq!(ids(&data["ended"]), vec!["dp-cancelled", "dp-ended"]);

    let cancelled = &data["ended"][0];
    assert_eq!(cancelled["status"], "Ended");
    assert_eq!(cancelled["end_date"], "2024-02-29");
    assert!(cancelled["links"].get("cancel").is_none());

    let active = &data["active"][0];
    assert_eq!(
        active["links"]["cancel"],
        "/api/v1/developers/dev@example.com/purchased-plans/dp-active/cancel"
    );
    assert_eq!(
        active["links"]["rate_plan"],
        "/api/v1/developers/dev@example.com/product-bundles/weather/plans/gold"
    );
}

#[actix_web::test]
async fn purchase_invalidates_cached_purchases() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[], false);

    for _ in 0..2 {
        let req = TestRequest::get()
            .uri("/api/v1/developers/dev@example.com/purchased-plans")
            .insert_header(bearer(&auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
    assert_eq!(api.edge().list_purchased_calls, 1);

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/product-bundles/weather/plans/launch/purchase")
        .insert_header(bearer(&auth))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "Future");

    {
        let edge = api.edge();
        let (owner, plan) = &edge.created[0];
        assert_eq!(owner, &Owner::Developer(DEV.to_string()));
        assert_eq!(plan.rate_plan_id, "launch");
        assert_eq!(plan.start_date, date(2024, 4, 1));
    }

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/purchased-plans")
        .insert_header(bearer(&auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(api.edge().list_purchased_calls, 2);
    assert!(ids(&body["data"]["future"]).contains(&"new-1".to_string()));
}

#[actix_web::test]
async fn purchase_of_started_plan_starts_today() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/product-bundles/weather/plans/gold/purchase")
        .insert_header(bearer(&token(DEV, &[], false)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(api.edge().created[0].1.start_date, date(2024, 2, 29));
}

#[actix_web::test]
async fn purchase_errors_are_translated() {
    let mut edge = FakeEdge::new();
    edge.create_error = Some(AppError::Edge {
        status: 400,
        code: EDGE_INSUFFICIENT_FUNDS.to_string(),
        message: "Insufficient funds".to_string(),
    });
    let api = FakeApi::new(edge);
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[], false);

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/product-bundles/weather/plans/gold/purchase")
        .insert_header(bearer(&auth))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"]["message"],
        "You have insufficient funds to purchase plan Gold."
    );

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/product-bundles/weather/plans/retired/purchase")
        .insert_header(bearer(&auth))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn team_purchase_requires_terms_acceptance() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[TEAM], false);
    let uri = "/api/v1/teams/rocket/product-bundles/weather/plans/gold/purchase";

    let req = TestRequest::post()
        .uri(uri)
        .insert_header(bearer(&auth))
        .set_json(json!({}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
    assert!(api.edge().created.is_empty());

    let req = TestRequest::post()
        .uri(uri)
        .insert_header(bearer(&auth))
        .set_json(json!({"accept_terms": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["links"]["self"],
        "/api/v1/teams/rocket/purchased-plans/new-1"
    );

    let edge = api.edge();
    let team = Owner::Team(TEAM.to_string());
    assert_eq!(edge.accepted[&team].len(), 1);
    assert_eq!(edge.accepted[&team][0].tnc.id, "tnc-1");
    assert_eq!(edge.created[0].0, team);
}

#[actix_web::test]
async fn cancel_now_ends_on_start_date() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/purchased-plans/dp-active/cancel")
        .insert_header(bearer(&token(DEV, &[], false)))
        .set_json(json!({"end_type": "now"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "Ended");
    assert_eq!(body["data"]["end_date"], "2024-02-01");

    let edge = api.edge();
    assert_eq!(edge.updated.len(), 1);
    assert_eq!(edge.updated[0].end_date, Some(date(2024, 2, 1)));
}

#[actix_web::test]
async fn writes_succeed_when_cache_is_unavailable() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services_with_backend(&api, Arc::new(UnavailableCache));
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[TEAM], false);

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/product-bundles/weather/plans/gold/purchase")
        .insert_header(bearer(&auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/purchased-plans/dp-active/cancel")
        .insert_header(bearer(&auth))
        .set_json(json!({"end_type": "now"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::post()
        .uri("/api/v1/teams/rocket/terms/accept")
        .insert_header(bearer(&auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let edge = api.edge();
    assert_eq!(edge.created.len(), 1);
    assert_eq!(edge.updated.len(), 1);
    assert_eq!(edge.accepted[&Owner::Team(TEAM.to_string())].len(), 1);
}

#[actix_web::test]
async fn cancel_on_date_uses_organization_today() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[], false);
    let uri = "/api/v1/developers/dev@example.com/purchased-plans/dp-future/cancel";

    let req = TestRequest::post()
        .uri(uri)
        .insert_header(bearer(&auth))
        .set_json(json!({"end_type": "on_date", "end_date": "2024-02-28"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = TestRequest::post()
        .uri(uri)
        .insert_header(bearer(&auth))
        .set_json(json!({"end_type": "on_date", "end_date": "2024-02-29"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(api.edge().updated[0].end_date, Some(date(2024, 2, 29)));

    let req = TestRequest::post()
        .uri("/api/v1/developers/dev@example.com/purchased-plans/dp-ended/cancel")
        .insert_header(bearer(&auth))
        .set_json(json!({"end_type": "now"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn rate_plans_hide_ended_and_link_revisions() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::get()
        .uri("/api/v1/teams/rocket/product-bundles/weather/plans")
        .insert_header(bearer(&token(DEV, &[TEAM], false)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let plans = body["data"].as_array().expect("plans");
    let plan_ids: Vec<&str> = plans
        .iter()
        .map(|p| p["rate_plan"]["id"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(plan_ids, vec!["gold", "launch"]);

    let gold = &plans[0];
    assert_eq!(gold["future_revision_start_date"], "2024-06-01");
    assert_eq!(
        gold["links"]["purchase"],
        "/api/v1/teams/rocket/product-bundles/weather/plans/gold/purchase"
    );
    assert_eq!(
        gold["links"]["future_revision"],
        "/api/v1/teams/rocket/product-bundles/weather/plans/gold-v2"
    );
}

#[actix_web::test]
async fn owner_access_is_enforced() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/purchased-plans")
        .insert_header(bearer(&token("other@example.com", &[], false)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
        .uri("/api/v1/teams/apollo/purchased-plans")
        .insert_header(bearer(&token(DEV, &[TEAM], false)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/purchased-plans")
        .to_request();
    match app.call(req).await {
        Ok(resp) => panic!("expected auth error, got {}", resp.status()),
        Err(err) => assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        ),
    }
}

#[actix_web::test]
async fn billing_endpoints() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[], false);

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/prepaid-balances")
        .insert_header(bearer(&auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["year"], 2024);
    assert_eq!(body["data"]["month"], 2);
    assert_eq!(
        body["data"]["balances"][0]["formatted_current_balance"],
        "$1,250.50"
    );

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/billing/months")
        .insert_header(bearer(&auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["label"], "February 2024");
    assert_eq!(body["data"][1]["label"], "January 2024");

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/billing/reports?month=2024-02&currency=usd")
        .insert_header(bearer(&auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let csv = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&csv).contains("dev@example.com,2024-02,usd"));

    let req = TestRequest::get()
        .uri("/api/v1/developers/dev@example.com/billing/reports?month=2023-05&currency=usd")
        .insert_header(bearer(&auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    for currency in ["dollars", "u%22sd", "u1d"] {
        let req = TestRequest::get()
            .uri(&format!(
                "/api/v1/developers/dev@example.com/billing/reports?month=2024-02&currency={currency}"
            ))
            .insert_header(bearer(&auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "currency {currency}");
        assert!(resp.headers().get("content-disposition").is_none());
    }
}

#[actix_web::test]
async fn terms_status_and_acceptance() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;
    let auth = token(DEV, &[TEAM], false);

    let req = TestRequest::get()
        .uri("/api/v1/teams/rocket/terms")
        .insert_header(bearer(&auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["accepted"], false);
    assert_eq!(body["data"]["terms"]["id"], "tnc-1");

    let req = TestRequest::post()
        .uri("/api/v1/teams/rocket/terms/accept")
        .insert_header(bearer(&auth))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/v1/teams/rocket/terms")
        .insert_header(bearer(&auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["accepted"], true);
}

#[actix_web::test]
async fn cache_admin_requires_admin_claim() {
    let api = FakeApi::new(FakeEdge::new());
    let services = support::services(&api);
    let app = test::init_service(support::app(services.clone())).await;

    let req = TestRequest::post()
        .uri("/api/v1/admin/cache/invalidate")
        .insert_header(bearer(&token(DEV, &[], false)))
        .set_json(json!({"tags": ["apigee_my_purchased_plans"]}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::post()
        .uri("/api/v1/admin/cache/invalidate")
        .insert_header(bearer(&token("ops@example.com", &[], true)))
        .set_json(json!({"tags": ["apigee_my_purchased_plans"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["removed_count"], 0);
}
