//! Shared domain model for the Prometheus generation protocol.
//!
//! Defines the generation request/response payloads exchanged with the
//! task service, the task lifecycle wire types polled by clients, the
//! seed catalog, and the core error type.

pub mod chat;
pub mod error;
pub mod seeds;
pub mod task;
pub mod types;
