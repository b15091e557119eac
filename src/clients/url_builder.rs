//! Query parameter merging for request URLs.
//!
//! The supplied parameters replace the URL's query component. Parameters
//! already present on the input URL are not kept.

use std::collections::HashMap;

use reqwest::Url;

use crate::clients::errors::UrlConstructionError;

/// Returns `original_url` with `parameters` as its query component.
///
/// Keys and values are percent-encoded (a space becomes `%20`). The input URL
/// is never modified. If `parameters` is empty the input is returned as is.
///
/// # Errors
///
/// Returns [`UrlConstructionError`] if the URL cannot carry a query
/// component, such as `mailto:` or `data:` URLs.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use bms_core::clients::try_append_query_parameters;
/// use reqwest::Url;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// let mut parameters = HashMap::new();
/// parameters.insert("name".to_string(), "x y".to_string());
///
/// let merged = try_append_query_parameters(&parameters, &url).unwrap();
/// assert_eq!(merged.as_str(), "https://example.com/path?name=x%20y");
/// assert_eq!(url.as_str(), "https://example.com/path");
/// ```
pub fn try_append_query_parameters(
    parameters: &HashMap<String, String>,
    original_url: &Url,
) -> Result<Url, UrlConstructionError> {
    if parameters.is_empty() {
        return Ok(original_url.clone());
    }

    if original_url.cannot_be_a_base() {
        return Err(UrlConstructionError {
            url: original_url.to_string(),
            reason: "URL cannot carry a query component".to_string(),
        });
    }

    let query = parameters
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut new_url = original_url.clone();
    new_url.set_query(Some(&query));
    Ok(new_url)
}

/// Returns `original_url` with `parameters` as its query component, falling
/// back to the unmodified URL when that is not possible.
///
/// The fallback is logged as a warning. Use [`try_append_query_parameters`]
/// to handle the failure instead.
#[must_use]
pub fn append_query_parameters(parameters: &HashMap<String, String>, original_url: &Url) -> Url {
    try_append_query_parameters(parameters, original_url).unwrap_or_else(|err| {
        tracing::warn!("{err}; sending request to the original URL");
        original_url.clone()
    })
}
