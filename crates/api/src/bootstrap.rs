//! First-run Admin account.

use policydesk_core::roles::ROLE_ADMIN;
use policydesk_db::models::user::{CreateUser, User};
use policydesk_db::repositories::UserRepo;
use policydesk_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Display name given to the bootstrap account.
const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

/// Create the configured Admin if the `users` table is empty.
///
/// Returns `None` when users already exist, so restarts are no-ops.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<Option<User>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    validate_password_strength(&admin.password).map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: BOOTSTRAP_ADMIN_NAME.to_string(),
            email: admin.email.trim().to_string(),
            phone: None,
            role: ROLE_ADMIN.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(Some(user))
}
