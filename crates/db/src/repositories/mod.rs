//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod policy_repo;
pub mod sms_log_repo;
pub mod user_repo;

pub use policy_repo::PolicyRepo;
pub use sms_log_repo::SmsLogRepo;
pub use user_repo::UserRepo;
