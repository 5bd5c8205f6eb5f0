//! Well-known role and account status names.
//!
//! These must match the CHECK constraints in `20261001000002_create_users.sql`.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MANAGER: &str = "Manager";
pub const ROLE_USER: &str = "User";

/// Only active accounts may log in.
pub const STATUS_ACTIVE: &str = "Active";
