mod short_link;

pub use short_link::{validate_alias, validate_target_url, MAX_ALIAS_LENGTH, MAX_URL_LENGTH};
