//! First-run Admin seeding.

mod common;

use policydesk_api::bootstrap::ensure_admin;
use policydesk_api::config::BootstrapAdmin;
use policydesk_core::roles::{ROLE_ADMIN, ROLE_USER};
use policydesk_db::repositories::UserRepo;
use sqlx::PgPool;

fn admin() -> BootstrapAdmin {
    BootstrapAdmin {
        email: "owner@policydesk.test".to_string(),
        password: "a-long-enough-password".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn creates_admin_on_empty_store(pool: PgPool) {
    let user = ensure_admin(&pool, &admin()).await.unwrap().expect("admin created");

    assert_eq!(user.role, ROLE_ADMIN);
    assert_eq!(user.email, "owner@policydesk.test");

    // A second start is a no-op.
    assert!(ensure_admin(&pool, &admin()).await.unwrap().is_none());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn skipped_when_users_exist(pool: PgPool) {
    common::create_user(&pool, "agent@policydesk.test", ROLE_USER).await;

    assert!(ensure_admin(&pool, &admin()).await.unwrap().is_none());
    assert!(UserRepo::find_by_email(&pool, "owner@policydesk.test")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_is_rejected(pool: PgPool) {
    let weak = BootstrapAdmin {
        password: "short".to_string(),
        ..admin()
    };

    assert!(ensure_admin(&pool, &weak).await.is_err());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);
}
