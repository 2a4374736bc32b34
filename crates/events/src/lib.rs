//! DetailHQ real-time change notifications.
//!
//! - [`ChangeEvent`]: the envelope describing an INSERT, UPDATE or DELETE on
//!   a remote table.
//! - [`ChangeBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. The Postgres listener and the in-memory
//!   remote both publish here; stores and the SSE stream subscribe.

pub mod bus;

pub use bus::{ChangeBus, ChangeEvent, ChangeKind};
