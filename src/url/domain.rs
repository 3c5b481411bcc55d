use url::Url;

/// Returns the part of a URL that decides crawl scope: its host and explicit port
///
/// Default ports are already stripped by the URL parser, so
/// `https://example.com:443/` and `https://example.com/` share a key while
/// `http://example.com:8080/` does not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use blackscout::url::scope_key;
///
/// let url = Url::parse("https://Example.com:8443/path").unwrap();
/// assert_eq!(scope_key(&url), Some(("example.com", Some(8443))));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(scope_key(&url), None);
/// ```
pub fn scope_key(url: &Url) -> Option<(&str, Option<u16>)> {
    url.host_str().map(|host| (host, url.port()))
}

/// Checks whether two URLs share the same host (and port)
///
/// URLs without a host are never in scope.
pub fn same_origin_host(candidate: &Url, base: &Url) -> bool {
    match (scope_key(candidate), scope_key(base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
