// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validations::{validate_alias, validate_target_url};

// DTO for a shorten request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShortenRequestDto {
    #[validate(custom(function = "validate_target_url"))]
    pub url: String,

    #[validate(custom(function = "validate_alias"))]
    pub alias: Option<String>,
}

/// A single code-to-URL mapping, the only entity in the system
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShortLink {
    /// The short identifier, lowercase alphanumeric, unique per backend
    pub code: String,

    /// The absolute URL the code redirects to, immutable once created
    pub target_url: String,

    /// When this link was created (UTC)
    pub created_at: DateTime<Utc>,

    /// Times this link has been resolved; best-effort under concurrency
    pub hits: i64,
}

// DTO for the shorten response
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponseDto {
    pub success: bool,
    pub code: String,
    #[serde(rename = "shortUrl")]
    pub short_url: String,
}

impl ShortenResponseDto {
    pub fn new(code: String, short_url: String) -> Self {
        Self {
            success: true,
            code,
            short_url,
        }
    }
}
