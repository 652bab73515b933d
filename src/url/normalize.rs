use crate::UrlError;
use url::Url;

/// Parses and checks a site base URL
///
/// # Arguments
///
/// * `url_str` - The base URL from a site descriptor
///
/// # Returns
///
/// * `Ok(Url)` - Parsed http(s) URL with a host
/// * `Err(UrlError)` - Malformed URL, unsupported scheme, or missing host
pub fn parse_base_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with('#')
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}

/// Resolves a product link and reduces it to its canonical form
///
/// The query string and fragment are dropped and a trailing slash is removed
/// (except for the root path), so the same product reached through different
/// listing pages yields one URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wheel_harvest::url::canonical_product_url;
///
/// let base = Url::parse("https://parts.example.com/search?page=2").unwrap();
/// let url = canonical_product_url("/oem-parts/ford-wheel-fl3z1007a/?c=1#top", &base);
/// assert_eq!(url.as_deref(), Some("https://parts.example.com/oem-parts/ford-wheel-fl3z1007a"));
/// ```
pub fn canonical_product_url(href: &str, base_url: &Url) -> Option<String> {
    let mut url = resolve_link(href, base_url)?;
    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut canonical = url.to_string();
    if url.path() == "/" && canonical.ends_with('/') {
        canonical.pop();
    }
    Some(canonical)
}
