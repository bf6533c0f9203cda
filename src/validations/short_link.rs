use url::Url;
use validator::ValidationError;

/// Hard ceiling on stored URLs
pub const MAX_URL_LENGTH: usize = 2000;

/// Hard ceiling on aliases; the configured limit may be lower
pub const MAX_ALIAS_LENGTH: usize = 12;

/// Validates that a target URL is absolute, uses http/https and fits the
/// length limit
pub fn validate_target_url(url_str: &str) -> Result<(), ValidationError> {
    if url_str.len() > MAX_URL_LENGTH {
        let mut err = ValidationError::new("target_url_length");
        err.message = Some("URL is too long (max 2000 characters)".into());
        return Err(err);
    }

    match Url::parse(url_str) {
        Ok(url) => {
            // Ensure URL has a scheme and host
            if url.scheme().is_empty() || url.host().is_none() {
                return Err(ValidationError::new("URL must have a scheme and host"));
            }

            // Only accept HTTP and HTTPS URLs
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ValidationError::new("URL scheme must be http or https"));
            }

            Ok(())
        }
        Err(_) => Err(ValidationError::new("Invalid URL format")),
    }
}

/// Validates that a custom alias (if provided) meets requirements:
/// - Between 1-12 characters (a configured limit may shorten this further)
/// - Only ASCII letters and digits
pub fn validate_alias(alias: &str) -> Result<(), ValidationError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        let mut err = ValidationError::new("alias_length");
        err.message = Some("Alias must be between 1 and 12 characters".into());
        return Err(err);
    }

    if !alias.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("alias_charset");
        err.message = Some("Alias can only contain letters and digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target_url() {
        // Valid URLs
        assert!(validate_target_url("https://example.com").is_ok());
        assert!(validate_target_url("http://example.com/path?query=value").is_ok());

        // Invalid URLs
        assert!(validate_target_url("not-a-url").is_err());
        assert!(validate_target_url("ftp://example.com").is_err()); // Not http/https
        assert!(validate_target_url("/relative/path").is_err());

        // Length ceiling
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(validate_target_url(&long).is_err());
    }

    #[test]
    fn test_validate_alias() {
        // Valid aliases
        assert!(validate_alias("promo").is_ok());
        assert!(validate_alias("Promo2024").is_ok());
        assert!(validate_alias("a").is_ok());

        // Invalid aliases
        assert!(validate_alias("").is_err());
        assert!(validate_alias(&"a".repeat(13)).is_err());
        assert!(validate_alias("with-dash").is_err());
        assert!(validate_alias("with space").is_err());
    }
}
