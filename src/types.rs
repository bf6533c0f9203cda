use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::db::{Database, DatabaseHealth};

#[derive(Serialize, Deserialize)]
pub struct ResponsePayload {
    pub status: i32,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db_health: Option<DatabaseHealth>,
    pub uptime_seconds: u64,
}

// Define an AppState struct to hold shared application state; `db` is None
// when the service runs on the JSON file store alone
pub struct AppState {
    pub start_time: Instant,
    pub db: Option<Database>,
    pub version: String,
}
