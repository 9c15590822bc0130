//! Result generator — builds the synthetic [`SearchResult`] for a query.
//!
//! Pure functions: the same inputs always produce the same result. Timing is
//! the service's concern, never the generator's.

use crate::types::{BackendId, SearchResult};

/// Result of a unary Search call.
pub fn unary(query: &str, backend: &BackendId) -> SearchResult {
    SearchResult {
        title: format!("result for [{query}] from backend {backend}"),
        query: query.to_string(),
        index: None,
        backend: backend.to_string(),
    }
}

/// Result number `index` of a Watch session.
pub fn streamed(index: u64, query: &str, backend: &BackendId) -> SearchResult {
    SearchResult {
        title: format!("result {index} for [{query}] from backend {backend}"),
        query: query.to_string(),
        index: Some(index),
        backend: backend.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("golang", "result for [golang] from backend be-1")]
    #[case("", "result for [] from backend be-1")]
    #[case("  spaced  ", "result for [  spaced  ] from backend be-1")]
    #[case("[nested]", "result for [[nested]] from backend be-1")]
    fn unary_title(#[case] query: &str, #[case] expected: &str) {
        let result = unary(query, &BackendId::new("be-1"));
        assert_eq!(result.title, expected);
        assert_eq!(result.query, query);
        assert_eq!(result.backend, "be-1");
        assert_eq!(result.index, None);
    }

    #[test]
    fn streamed_title_embeds_index() {
        let result = streamed(7, "x", &BackendId::new("be-2"));
        assert_eq!(result.title, "result 7 for [x] from backend be-2");
        assert_eq!(result.index, Some(7));
    }

    #[test]
    fn generation_is_deterministic() {
        let backend = BackendId::new("be-3");
        assert_eq!(unary("q", &backend), unary("q", &backend));
        assert_eq!(streamed(2, "q", &backend), streamed(2, "q", &backend));
    }
}
