// src/utils/url.rs

//! URL manipulation utilities.

/// Normalize a stream URL so that equivalent endpoints compare equal.
///
/// Scheme and host are lower-cased, default ports and fragments dropped,
/// and a trailing slash removed from non-root paths. Strings that do not
/// parse as URLs are trimmed and lower-cased.
///
/// # Examples
/// ```
/// use stationcheck::utils::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTPS://Stream.Example:443/live/#top"),
///     "https://stream.example/live"
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut parsed) = url::Url::parse(trimmed) else {
        return trimmed.to_lowercase();
    };

    parsed.set_fragment(None);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_port() {
        assert_eq!(
            normalize_url("HTTP://Ice1.SomaFM.com:80/groovesalad-256-mp3"),
            "http://ice1.somafm.com/groovesalad-256-mp3"
        );
    }

    #[test]
    fn test_normalize_keeps_query_and_custom_port() {
        assert_eq!(
            normalize_url("https://radio.example:8443/stream?type=.mp3"),
            "https://radio.example:8443/stream?type=.mp3"
        );
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(
            normalize_url("https://a.example/live/"),
            normalize_url("https://a.example/live")
        );
        assert_eq!(normalize_url("https://a.example"), "https://a.example/");
    }

    #[test]
    fn test_normalize_unparseable() {
        assert_eq!(normalize_url("  Not A URL "), "not a url");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_url("HTTPS://A.example/x/#f");
        assert_eq!(normalize_url(&once), once);
    }
}
