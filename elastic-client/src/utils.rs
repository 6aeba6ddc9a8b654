//! Utility functions for building API paths.

use url::Url;

use crate::errors::ElasticError;

/// Validate named path segments and collect them in order.
///
/// Every segment must be non-empty; an empty index, doctype or id would
/// otherwise silently address a different endpoint.
///
/// # Example
///
/// ```
/// use elastic_client::utils::segments;
///
/// let path = segments(&[("index", "logs"), ("doctype", "doc"), ("id", "42")])
///     .expect("non-empty segments");
/// assert_eq!(path, vec!["logs", "doc", "42"]);
/// ```
pub fn segments(named: &[(&str, &str)]) -> Result<Vec<String>, ElasticError> {
    named
        .iter()
        .map(|(name, value)| {
            if value.is_empty() {
                Err(ElasticError::validation(format!("{} is required", name)))
            } else {
                Ok(value.to_string())
            }
        })
        .collect()
}

/// Resolve raw path segments against a base URL, percent-encoding each segment.
///
/// Any path already present on the base (e.g. a reverse-proxy prefix) is kept.
pub fn resolve_url(
    base: &Url,
    segments: &[String],
    query: &[(String, String)],
) -> Result<Url, ElasticError> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            ElasticError::configuration(format!("{} cannot be used as a base URL", base))
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(query);
    }
    Ok(url)
}
