use crate::url::domain::same_origin_host;
use crate::UrlError;
use url::Url;

/// Parses the crawl target
///
/// The target must be an absolute `http` or `https` URL with a host. This is
/// the only URL parse whose failure is fatal: a crawl cannot start without a
/// scope boundary.
///
/// # Examples
///
/// ```
/// use blackscout::url::parse_target;
///
/// let target = parse_target("https://example.com").unwrap();
/// assert_eq!(target.as_str(), "https://example.com/");
///
/// assert!(parse_target("/relative/path").is_err());
/// assert!(parse_target("ftp://example.com/").is_err());
/// ```
pub fn parse_target(target: &str) -> Result<Url, UrlError> {
    let url = Url::parse(target.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", target, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(target.to_string()));
    }

    Ok(url)
}

/// Resolves a raw link against a base URL and keeps it only if it is in scope
///
/// # Resolution Rules
///
/// 1. Parse `raw` as a URL reference; malformed input yields `None`
/// 2. Absolute references are kept as-is, relative references are resolved
///    against `base` (RFC 3986 reference resolution)
/// 3. Keep the result only if it is `http`/`https` and its host (and
///    explicit port) equals the base host
///
/// No further canonicalization happens: trailing slashes, fragments and the
/// order of query parameters are preserved, so `/a?x=1&y=2` and `/a?y=2&x=1`
/// are distinct URLs.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use blackscout::url::normalize;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
///
/// let about = normalize("../about", &base).unwrap();
/// assert_eq!(about.as_str(), "https://example.com/about");
///
/// assert!(normalize("https://other.com/x", &base).is_none());
/// assert!(normalize("mailto:team@example.com", &base).is_none());
/// ```
pub fn normalize(raw: &str, base: &Url) -> Option<Url> {
    let resolved = match base.join(raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Dropping unparsable link {:?}: {}", raw, e);
            return None;
        }
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    if !same_origin_host(&resolved, base) {
        return None;
    }

    Some(resolved)
}
