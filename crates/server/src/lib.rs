//! Prometheus task service.
//!
//! Accepts generation requests over HTTP, runs them asynchronously
//! against a generative-AI backend, and exposes task status for
//! polling clients. Exposes the building blocks (config, state,
//! registry, routes) so integration tests and the binary entrypoint
//! share the same wiring.

pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod routes;
pub mod state;
