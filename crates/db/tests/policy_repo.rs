//! Integration tests for the policy, user and SMS log repositories.

use chrono::{Duration, NaiveDate};
use policydesk_core::expiry::{bucket_range, ExpiryBucket};
use policydesk_db::models::policy::{CreatePolicy, PolicyFilter, UpdatePolicy};
use policydesk_db::models::sms_log::CreateSmsLog;
use policydesk_db::models::user::CreateUser;
use policydesk_db::repositories::{PolicyRepo, SmsLogRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn new_policy(plate: &str, company: &str, expires_in: i64) -> CreatePolicy {
    let expiry_date = today() + Duration::days(expires_in);
    CreatePolicy {
        plate: plate.to_string(),
        owner: format!("Owner of {plate}"),
        contact: "0712 345 678".to_string(),
        company: company.to_string(),
        start_date: expiry_date - Duration::days(365),
        expiry_date,
    }
}

fn bucket_filter(bucket: ExpiryBucket) -> PolicyFilter {
    let (expires_after, expires_until) = bucket_range(bucket, today());
    PolicyFilter {
        expires_after,
        expires_until,
        ..PolicyFilter::default()
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_policy(pool: PgPool) {
    let created = PolicyRepo::create(&pool, &new_policy("KCB 123A", "Jubilee", 5))
        .await
        .unwrap();
    assert_eq!(created.followup_status, "none");
    assert!(created.renewed_date.is_none());

    let found = PolicyRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(found.plate, "KCB 123A");
    assert_eq!(found.expiry_date, today() + Duration::days(5));

    assert!(PolicyRepo::find_by_id(&pool, created.id + 1000).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_plate_violates_unique_constraint(pool: PgPool) {
    PolicyRepo::create(&pool, &new_policy("KCB 123A", "Jubilee", 5))
        .await
        .unwrap();
    let err = PolicyRepo::create(&pool, &new_policy("KCB 123A", "APA", 50))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_policies_plate"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bucket_filter_matches_classification(pool: PgPool) {
    for (plate, days) in [("P-EXP", -1), ("P-TOD", 0), ("P-WK", 7), ("P-MO", 8), ("P-ACT", 31)] {
        PolicyRepo::create(&pool, &new_policy(plate, "APA", days))
            .await
            .unwrap();
    }

    let expected = [
        (ExpiryBucket::Expired, "P-EXP"),
        (ExpiryBucket::Today, "P-TOD"),
        (ExpiryBucket::Week, "P-WK"),
        (ExpiryBucket::Month, "P-MO"),
        (ExpiryBucket::Active, "P-ACT"),
    ];
    for (bucket, plate) in expected {
        let rows = PolicyRepo::list_all(&pool, &bucket_filter(bucket)).await.unwrap();
        let plates: Vec<&str> = rows.iter().map(|p| p.plate.as_str()).collect();
        assert_eq!(plates, vec![plate], "bucket {}", bucket.as_str());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_company_and_search_filters(pool: PgPool) {
    PolicyRepo::create(&pool, &new_policy("KDA 100B", "Jubilee", 10)).await.unwrap();
    PolicyRepo::create(&pool, &new_policy("KDB 200C", "Britam", 10)).await.unwrap();
    PolicyRepo::create(&pool, &new_policy("KDC 300D", "jubilee", 20)).await.unwrap();

    let by_company = PolicyFilter {
        company: Some("JUBILEE".into()),
        ..PolicyFilter::default()
    };
    let rows = PolicyRepo::list(&pool, &by_company, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 2);

    let by_search = PolicyFilter {
        search: Some("db 2".into()),
        ..PolicyFilter::default()
    };
    let rows = PolicyRepo::list(&pool, &by_search, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].plate, "KDB 200C");

    let page = PolicyRepo::list(&pool, &PolicyFilter::default(), 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    let all = PolicyRepo::list_all(&pool, &PolicyFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(page[0].id, all[1].id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_given_fields(pool: PgPool) {
    let created = PolicyRepo::create(&pool, &new_policy("KCC 111A", "APA", 40))
        .await
        .unwrap();
    let patch = UpdatePolicy {
        owner: Some("New Owner".into()),
        ..UpdatePolicy::default()
    };
    let updated = PolicyRepo::update(&pool, created.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.owner, "New Owner");
    assert_eq!(updated.plate, created.plate);
    assert_eq!(updated.expiry_date, created.expiry_date);

    assert!(PolicyRepo::update(&pool, created.id + 99, &patch).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_renew_only_matches_expired_rows(pool: PgPool) {
    let expired = PolicyRepo::create(&pool, &new_policy("KEE 001A", "APA", -3)).await.unwrap();
    let live = PolicyRepo::create(&pool, &new_policy("KEE 002A", "APA", 3)).await.unwrap();
    let new_expiry = today() + Duration::days(365);

    let renewed = PolicyRepo::renew(&pool, expired.id, new_expiry, today())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renewed.expiry_date, new_expiry);
    assert_eq!(renewed.renewed_date, Some(today()));

    // A second renewal finds the row no longer expired.
    assert!(PolicyRepo::renew(&pool, expired.id, new_expiry, today()).await.unwrap().is_none());
    assert!(PolicyRepo::renew(&pool, live.id, new_expiry, today()).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_followup_set_is_idempotent_and_clearable(pool: PgPool) {
    let created = PolicyRepo::create(&pool, &new_policy("KFF 001A", "APA", 3)).await.unwrap();

    let first = PolicyRepo::set_followup(&pool, created.id, "confirmed").await.unwrap().unwrap();
    let second = PolicyRepo::set_followup(&pool, created.id, "confirmed").await.unwrap().unwrap();
    assert_eq!(first.followup_status, "confirmed");
    assert_eq!(second.followup_status, first.followup_status);
    assert_eq!(second.expiry_date, first.expiry_date);

    let cleared = PolicyRepo::clear_followup(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(cleared.followup_status, "none");

    assert!(PolicyRepo::set_followup(&pool, 424242, "pending").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete(pool: PgPool) {
    let created = PolicyRepo::create(&pool, &new_policy("KGG 001A", "APA", 3)).await.unwrap();
    assert!(PolicyRepo::hard_delete(&pool, created.id).await.unwrap());
    assert!(!PolicyRepo::hard_delete(&pool, created.id).await.unwrap());
    assert!(PolicyRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_lookup_by_email_ignores_case(pool: PgPool) {
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            name: "Admin".into(),
            email: "admin@agency.test".into(),
            phone: None,
            role: "Admin".into(),
            password_hash: "not-a-real-hash".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(user.status, "Active");

    let found = UserRepo::find_by_email(&pool, "ADMIN@agency.test").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap().email, user.email);
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_email_is_unique_regardless_of_case(pool: PgPool) {
    let user = |email: &str| CreateUser {
        name: "Agent".into(),
        email: email.into(),
        phone: None,
        role: "User".into(),
        password_hash: "not-a-real-hash".into(),
    };
    UserRepo::create(&pool, &user("agent@agency.test")).await.unwrap();

    let err = UserRepo::create(&pool, &user("Agent@Agency.TEST")).await.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// SMS logs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sms_log_read_flags(pool: PgPool) {
    for n in 0..3 {
        SmsLogRepo::create(
            &pool,
            &CreateSmsLog {
                phone_number: format!("+25470000000{n}"),
                message: "Your policy expires soon".into(),
                cost: 0.8,
                status: "sent".into(),
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(SmsLogRepo::unread_count(&pool).await.unwrap(), 3);

    let newest = SmsLogRepo::list(&pool, false, 10, 0).await.unwrap();
    assert_eq!(newest.len(), 3);
    let marked = SmsLogRepo::mark_read(&pool, newest[0].id).await.unwrap().unwrap();
    assert!(marked.is_read);
    assert_eq!(SmsLogRepo::list(&pool, true, 10, 0).await.unwrap().len(), 2);

    assert_eq!(SmsLogRepo::mark_all_read(&pool).await.unwrap(), 2);
    assert_eq!(SmsLogRepo::unread_count(&pool).await.unwrap(), 0);
    assert!(SmsLogRepo::mark_read(&pool, 999_999).await.unwrap().is_none());
}
