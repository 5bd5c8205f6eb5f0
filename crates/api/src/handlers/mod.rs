//! Request handlers, one submodule per resource.
//!
//! Handlers delegate persistence to the repositories in `policydesk_db`,
//! derived state to `policydesk_core`, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod followup;
pub mod policy;
pub mod report;
pub mod sms_log;
