#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Seed data error: {0}")]
    SeedData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
