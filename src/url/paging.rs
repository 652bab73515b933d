use crate::UrlError;
use url::Url;

/// Joins a site-relative path (or absolute URL) onto a base URL
pub fn join_site_path(base_url: &Url, path: &str) -> Result<Url, UrlError> {
    base_url
        .join(path.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", path, e)))
}

/// URL of page `page` of a category listing
///
/// Page 1 is the category URL itself; later pages carry `page=N`, replacing
/// any `page` parameter already present.
pub fn category_page_url(category_url: &Url, page: u32) -> Url {
    if page <= 1 {
        return category_url.clone();
    }

    let kept: Vec<(String, String)> = category_url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = category_url.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}

/// URL of page `page` of the platform keyword search
///
/// `<base>/search?search_str=<term>&page=<page>`
pub fn search_page_url(base_url: &Url, term: &str, page: u32) -> Result<Url, UrlError> {
    let mut url = join_site_path(base_url, "/search")?;
    url.query_pairs_mut()
        .append_pair("search_str", term)
        .append_pair("page", &page.to_string());
    Ok(url)
}
