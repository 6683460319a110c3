//! `Link` header cursors for the Admin REST `products.json` endpoint.
//!
//! Each page response carries the adjacent pages as URLs with a `page_info`
//! query parameter:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

use reqwest::Url;

/// Returns the `page_info` cursor of the `rel="next"` link, or `None` on the
/// last page (no header, no next link, or no cursor in its URL).
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .filter_map(parse_link)
        .find(|(_, rel)| *rel == "next")
        .and_then(|(url, _)| page_info(url))
}

/// Splits one `<url>; rel="name"` directive into its URL and relation.
fn parse_link(directive: &str) -> Option<(&str, &str)> {
    let (target, params) = directive.trim().split_once(';')?;
    let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
    let rel = params
        .split(';')
        .find_map(|param| param.trim().strip_prefix("rel="))?
        .trim_matches('"');
    Some((url, rel))
}

fn page_info(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .query_pairs()
        .find_map(|(key, value)| {
            (key == "page_info" && !value.is_empty()).then(|| value.into_owned())
        })
}
