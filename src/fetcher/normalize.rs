use std::borrow::Cow;

/// Scheme prefixes that are dispatched as-is
const KNOWN_SCHEMES: &[&str] = &["http://", "https://"];

/// Scheme added to bare hosts
const DEFAULT_SCHEME: &str = "https://";

/// Returns true if `url` already starts with `http://` or `https://`
///
/// The comparison ignores ASCII case.
pub fn has_known_scheme(url: &str) -> bool {
    let bytes = url.as_bytes();
    KNOWN_SCHEMES.iter().any(|scheme| {
        bytes.len() >= scheme.len() && bytes[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    })
}

/// Prefixes `https://` onto URLs without a recognized scheme
///
/// Applied just before dispatch; the queued record keeps the original text.
/// Idempotent: a normalized URL is returned unchanged.
///
/// Only a full `http://` or `https://` prefix counts as a scheme. A bare
/// host whose name merely begins with `http` (`httpbin.org`) is still
/// prefixed, unlike a plain `starts_with("http")` test.
///
/// # Examples
///
/// ```
/// use urlq::fetcher::normalize_url;
///
/// assert_eq!(normalize_url("example.com"), "https://example.com");
/// assert_eq!(normalize_url("http://example.com"), "http://example.com");
/// assert_eq!(normalize_url("httpbin.org"), "https://httpbin.org");
/// ```
pub fn normalize_url(url: &str) -> Cow<'_, str> {
    if has_known_scheme(url) {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("{}{}", DEFAULT_SCHEME, url))
    }
}
