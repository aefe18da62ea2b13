use serde_json::{Value, json};

use crate::api::models::ResultSource;

const CANNED_ENTRIES: [(&str, &str); 4] = [
    (
        "Encrypted Communications",
        "Intercepted encrypted communications matching your search parameters across multiple onion networks.",
    ),
    (
        "Network Intelligence",
        "Compiled intelligence report based on network traffic analysis and pattern recognition algorithms.",
    ),
    (
        "Security Analysis",
        "Security assessment and vulnerability analysis for systems mentioned in the search context.",
    ),
    (
        "Data Correlation",
        "Cross-referenced data from multiple darkweb sources showing significant correlation with search terms.",
    ),
];

pub const FALLBACK_RESULT_COUNT: usize = CANNED_ENTRIES.len() + 1;

/// Static results served when the manager cannot answer. The query is echoed
/// in the first entry's title; everything else is fixed.
pub fn fallback_results(query: &str) -> Vec<Value> {
    let source = ResultSource::Fallback.as_str();
    let mut results = Vec::with_capacity(FALLBACK_RESULT_COUNT);
    results.push(json!({
        "title": format!("Search result: {query}"),
        "description": "Analysis of encrypted network patterns and darkweb intelligence for the provided search query.",
        "source": source,
    }));
    results.extend(CANNED_ENTRIES.iter().map(|(title, description)| {
        json!({
            "title": title,
            "description": description,
            "source": source,
        })
    }));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_results() {
        let results = fallback_results("onion routing");
        assert_eq!(results.len(), 5);
        assert_eq!(results.len(), FALLBACK_RESULT_COUNT);
        assert_eq!(results[0]["title"], "Search result: onion routing");
        for result in &results {
            assert_eq!(result["source"], "fallback");
            assert!(result["description"].as_str().is_some_and(|d| !d.is_empty()));
        }
        assert_eq!(results[4]["title"], "Data Correlation");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(fallback_results("x"), fallback_results("x"));
        assert_eq!(fallback_results("x")[1..], fallback_results("y")[1..]);
    }
}
