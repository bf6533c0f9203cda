use thiserror::Error;

/// Domain errors produced by the shortening service and redirect resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    /// The submitted URL is not an absolute http/https URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTPS enforcement is on and the URL uses plain http
    #[error("Only HTTPS target URLs are accepted")]
    HttpsRequired,

    /// The custom alias is malformed or too long
    #[error("Invalid alias: {0}")]
    InvalidAlias(String),

    /// The custom alias is already mapped to another URL
    #[error("Alias is already in use")]
    AliasTaken,

    /// No free code was found within the retry budget
    #[error("Could not generate a unique short code, try again")]
    GenerationExhausted,

    /// Every configured backend failed the request
    #[error("Short link storage is unavailable")]
    StorageUnavailable,

    /// No mapping exists for the requested code
    #[error("Short link not found")]
    NotFound,
}
