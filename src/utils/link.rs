use url::Url;

/// Builds the public short URL from the configured base and a code.
///
/// A base ending in `=` (query form, e.g. `https://host/?s=`) or `/` takes
/// the code directly; anything else gets a `/` separator.
pub fn build_short_url(base: &str, code: &str) -> String {
    if base.ends_with('=') || base.ends_with('/') {
        format!("{}{}", base, code)
    } else {
        format!("{}/{}", base, code)
    }
}

/// Normalizes a raw short code: lowercased, everything outside `[a-z0-9]`
/// stripped. An empty result means the request carries no usable code.
pub fn normalize_code(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Strips CR/LF from a stored URL before it is placed in a Location header.
pub fn strip_crlf(url: &str) -> String {
    url.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Appends the configured `utm_campaign` parameter unless the URL already
/// carries one. The key comparison is case-insensitive so `UTM_Campaign=x`
/// is not duplicated.
pub fn ensure_utm_campaign(url_str: &str, campaign: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    let already_tagged = url
        .query_pairs()
        .any(|(key, _)| key.eq_ignore_ascii_case("utm_campaign"));
    if already_tagged {
        return url_str.to_string();
    }

    url.query_pairs_mut().append_pair("utm_campaign", campaign);
    url.to_string()
}
