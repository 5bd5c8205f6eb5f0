//! Change-feed event bus.
//!
//! Every write to a policy or SMS log publishes a [`ChangeEvent`] on the
//! shared [`EventBus`]. The API crate forwards those events to WebSocket
//! subscribers so dashboards refresh without polling.

pub mod bus;

pub use bus::{ChangeEvent, EventBus};
