//! Query string handling.

use std::collections::HashMap;

/// Splits raw input into pathname and query on the first `?`.
///
/// A fragment (`#...`) is dropped from whichever part contains it.
pub fn split_path_and_query(raw: &str) -> (&str, &str) {
	let without_fragment = raw.split_once('#').map_or(raw, |(before, _)| before);
	without_fragment
		.split_once('?')
		.unwrap_or((without_fragment, ""))
}

/// Parses a query string into a flat key/value map.
///
/// Values are percent-decoded and `+` is read as a space. When a key
/// repeats, the last occurrence wins. Malformed input yields the pairs that
/// could be decoded and never fails.
pub fn parse_query(query: &str) -> HashMap<String, String> {
	let query = query.strip_prefix('?').unwrap_or(query);
	if query.is_empty() {
		return HashMap::new();
	}

	match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
		Ok(pairs) => pairs.into_iter().collect(),
		Err(e) => {
			tracing::debug!(query, error = %e, "falling back to lenient query parsing");
			query
				.split('&')
				.filter(|pair| !pair.is_empty())
				.filter_map(|pair| {
					let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
					let key = urlencoding::decode(key).ok()?.into_owned();
					let value = urlencoding::decode(value)
						.map(|v| v.into_owned())
						.unwrap_or_else(|_| value.to_string());
					Some((key, value))
				})
				.collect()
		}
	}
}
