//! HTTP-level integration tests for dashboard reports and their cache.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Months};
use common::{agent_token, body_json, create_policy, delete_auth, get_auth, post_json_auth, token_for};
use policydesk_core::roles::{ROLE_ADMIN, ROLE_USER};
use serde_json::json;
use sqlx::PgPool;

/// One policy per bucket: expired, today, week, month, active.
async fn seed(app: axum::Router, token: &str) {
    create_policy(app.clone(), token, "KAA 100", "Jubilee", -3).await;
    create_policy(app.clone(), token, "KBB 200", "Jubilee", 0).await;
    create_policy(app.clone(), token, "KCC 300", "APA", 6).await;
    create_policy(app.clone(), token, "KDD 400", "APA", 25).await;
    create_policy(app, token, "KEE 500", "Britam", 90).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_merges_near_buckets_into_expiring(pool: PgPool) {
    let token = agent_token(&pool).await;
    let app = common::build_test_app(pool);
    seed(app.clone(), &token).await;

    let response = get_auth(app, "/api/v1/summary", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "created": 5, "active": 1, "expiring": 3, "expired": 1 })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_store_reports_zeroes(pool: PgPool) {
    let token = agent_token(&pool).await;
    let app = common::build_test_app(pool);

    let summary = body_json(get_auth(app.clone(), "/api/v1/summary", &token).await).await;
    assert_eq!(summary["created"], 0);

    let trends = body_json(get_auth(app.clone(), "/api/v1/trends", &token).await).await;
    assert_eq!(trends, json!({ "trends": [] }));

    let distribution =
        body_json(get_auth(app, "/api/v1/company-distribution", &token).await).await;
    assert_eq!(distribution, json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expiry_report_groups_tabs_and_filters_company(pool: PgPool) {
    let token = agent_token(&pool).await;
    let app = common::build_test_app(pool);
    seed(app.clone(), &token).await;

    let json = body_json(get_auth(app.clone(), "/api/v1/expiry-report", &token).await).await;
    assert_eq!(json["today"][0]["plate"], "KBB 200");
    assert_eq!(json["week"][0]["plate"], "KCC 300");
    assert_eq!(json["month"][0]["plate"], "KDD 400");
    assert_eq!(json["expired"][0]["plate"], "KAA 100");
    for tab in ["today", "week", "month", "expired"] {
        assert_eq!(json[tab].as_array().unwrap().len(), 1, "{tab}");
    }
    assert!(json.get("active").is_none());

    let json = body_json(get_auth(app, "/api/v1/expiry-report?company=APA", &token).await).await;
    assert!(json["today"].as_array().unwrap().is_empty());
    assert!(json["expired"].as_array().unwrap().is_empty());
    assert_eq!(json["week"][0]["company"], "APA");
    assert_eq!(json["month"][0]["company"], "APA");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn company_distribution_is_largest_first(pool: PgPool) {
    let token = agent_token(&pool).await;
    let app = common::build_test_app(pool);
    seed(app.clone(), &token).await;
    create_policy(app.clone(), &token, "KFF 600", "APA", 200).await;
    create_policy(app.clone(), &token, "KGG 700", "Britam", 200).await;

    let json = body_json(get_auth(app, "/api/v1/company-distribution", &token).await).await;
    let shares = json.as_array().unwrap();

    assert_eq!(shares.len(), 3);
    assert_eq!(shares[0]["name"], "APA");
    assert_eq!(shares[0]["value"], 3);
    // Ties are ordered by name.
    assert_eq!(shares[1]["name"], "Britam");
    assert_eq!(shares[1]["value"], 2);
    assert_eq!(shares[2]["name"], "Jubilee");
    assert_eq!(shares[2]["value"], 2);
    assert!(shares[0]["color"].as_str().unwrap().starts_with('#'));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn trends_window_ends_at_the_current_period(pool: PgPool) {
    let token = agent_token(&pool).await;
    let app = common::build_test_app(pool);
    create_policy(app.clone(), &token, "KAA 100", "Jubilee", 0).await;
    // A long-dated policy must not drag the window into the future.
    create_policy(app.clone(), &token, "KBB 200", "Jubilee", 1200).await;

    let json = body_json(get_auth(app.clone(), "/api/v1/trends?period=month&limit=3", &token).await).await;
    let rows = json["trends"].as_array().unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r["month"].as_str().unwrap()).collect();

    let current = common::date(0).with_day(1).unwrap();
    let expected: Vec<String> = (0..3)
        .map(|n| (current - Months::new(n)).format("%Y-%m").to_string())
        .collect();
    assert_eq!(labels, expected, "newest first, ending at this month");
    assert_eq!(rows[0]["active"], 1);
    let counted: u64 = rows
        .iter()
        .map(|r| r["active"].as_u64().unwrap() + r["expired"].as_u64().unwrap())
        .sum();
    assert_eq!(counted, 1);

    let json = body_json(get_auth(app, "/api/v1/trends?period=year", &token).await).await;
    let rows = json["trends"].as_array().unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0]["month"], common::date(0).year().to_string());
}

#[tokio::test]
async fn unknown_trend_period_is_400() {
    let app = common::build_offline_app();
    let response = get_auth(app, "/api/v1/trends?period=quarter", &token_for(1, ROLE_USER)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn writes_invalidate_cached_reports(pool: PgPool) {
    let token = agent_token(&pool).await;
    let admin = token_for(0, ROLE_ADMIN);
    let app = common::build_test_app(pool);
    let policy = create_policy(app.clone(), &token, "KAA 100", "Jubilee", -3).await;

    let summary = body_json(get_auth(app.clone(), "/api/v1/summary", &token).await).await;
    assert_eq!(summary["expired"], 1);

    // Renew: the expired count drops immediately despite the cache TTL.
    let uri = format!("/api/v1/policies/{}/renew", policy["id"]);
    let body = json!({ "expiry_date": common::day(365) });
    let response = post_json_auth(app.clone(), &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let summary = body_json(get_auth(app.clone(), "/api/v1/summary", &token).await).await;
    assert_eq!(summary["expired"], 0);
    assert_eq!(summary["active"], 1);

    let uri = format!("/api/v1/policies/{}", policy["id"]);
    assert_eq!(delete_auth(app.clone(), &uri, &admin).await.status(), StatusCode::NO_CONTENT);

    let summary = body_json(get_auth(app, "/api/v1/summary", &token).await).await;
    assert_eq!(summary["created"], 0);
}
