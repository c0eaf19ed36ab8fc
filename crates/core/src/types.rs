/// Task identifiers are opaque strings assigned by the task service
/// (UUID v4 in this implementation).
pub type TaskId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Mint a fresh task identifier.
pub fn new_task_id() -> TaskId {
    uuid::Uuid::new_v4().to_string()
}
