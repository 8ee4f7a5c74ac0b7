//! URL handling for paginated listings
//!
//! Listing pages are addressed by appending a `page` query parameter to the
//! configured base URL.

use url::Url;

/// Name of the query parameter carrying the page number
pub const PAGE_PARAM: &str = "page";

/// Builds the URL of listing page `page`
///
/// Existing query parameters on `base_url` are preserved, except for a
/// previous `page` parameter, which is replaced.
///
/// # Example
///
/// ```
/// use venue_crawler::url::page_url;
///
/// let url = page_url("https://example.com/venues?city=atlanta", 3).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/venues?city=atlanta&page=3");
/// ```
pub fn page_url(base_url: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PAGE_PARAM, &page.to_string());

    Ok(url)
}
