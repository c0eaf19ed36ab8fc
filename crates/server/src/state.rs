use std::sync::Arc;

use prometheus_core::seeds::SeedCatalog;

use crate::generator::Generator;
use crate::registry::TaskRegistry;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// In-memory generation task registry.
    pub registry: Arc<TaskRegistry>,
    /// The generation backend (Gemini in production, stubs in tests).
    pub generator: Arc<dyn Generator>,
    /// Seed catalog loaded at startup.
    pub seeds: Arc<SeedCatalog>,
}
