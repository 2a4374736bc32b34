//! Domain model and pure business rules for DetailHQ.
//!
//! This crate has no I/O. Stores, the database layer, the report generator
//! and the HTTP API all build on the types and validation defined here.

pub mod assistant;
pub mod coupon;
pub mod customer;
pub mod error;
pub mod files;
pub mod hashing;
pub mod library;
pub mod message;
pub mod notes;
pub mod pro_tip;
pub mod record;
pub mod task;
pub mod types;
