//! Domain logic for policydesk.
//!
//! Everything here is pure: no database, no clock, no I/O. Callers load
//! rows, pick the reference date, and pass both in.

pub mod csv;
pub mod error;
pub mod expiry;
pub mod followup;
pub mod lifecycle;
pub mod pagination;
pub mod policy;
pub mod roles;
pub mod sms;
pub mod summary;
pub mod trends;
pub mod types;
