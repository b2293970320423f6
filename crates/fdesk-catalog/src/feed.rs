#![forbid(unsafe_code)]

//! The option list behind one remote-search selector.
//!
//! A feed holds two lists: the default page loaded on mount, and the results
//! of the latest debounced search. While the debounced query is empty the
//! defaults are shown and no search is issued. Answers for a query that has
//! since been superseded are dropped.

use crate::option::SelectOption;

/// Default list size requested from the backend.
pub const DEFAULT_FETCH_LIMIT: usize = 50;

/// What the host should ask the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub query: String,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct OptionFeed<E> {
    defaults: Vec<SelectOption<E>>,
    results: Vec<SelectOption<E>>,
    query: String,
    loading: bool,
    limit: usize,
}

impl<E> Default for OptionFeed<E> {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_LIMIT)
    }
}

impl<E> OptionFeed<E> {
    pub fn new(limit: usize) -> Self {
        Self {
            defaults: Vec::new(),
            results: Vec::new(),
            query: String::new(),
            loading: false,
            limit: limit.max(1),
        }
    }

    /// Request for the default list.
    pub fn default_request(&self) -> FetchRequest {
        FetchRequest {
            query: String::new(),
            page: 1,
            limit: self.limit,
        }
    }

    pub fn set_defaults(&mut self, options: Vec<SelectOption<E>>) {
        self.defaults = options;
    }

    /// React to a new debounced query.
    ///
    /// Returns the fetch to issue, or `None` when the query is blank and the
    /// defaults apply again. Previous results stay visible until the answer
    /// arrives.
    pub fn begin_search(&mut self, query: &str) -> Option<FetchRequest> {
        if query.trim().is_empty() {
            self.query.clear();
            self.results.clear();
            self.loading = false;
            return None;
        }
        self.query = query.to_owned();
        self.loading = true;
        tracing::debug!(query, limit = self.limit, "remote option search");
        Some(FetchRequest {
            query: self.query.clone(),
            page: 1,
            limit: self.limit,
        })
    }

    /// Deliver results for `query`. Returns `false` if the query is stale.
    pub fn resolve(&mut self, query: &str, results: Vec<SelectOption<E>>) -> bool {
        if self.query.is_empty() || query != self.query {
            tracing::debug!(query, current = %self.query, "stale search results dropped");
            return false;
        }
        self.results = results;
        self.loading = false;
        true
    }

    /// The fetch for `query` failed; keep whatever was shown before.
    pub fn fail(&mut self, query: &str) {
        if query == self.query {
            self.loading = false;
        }
    }

    /// The list a selector should render right now.
    pub fn options(&self) -> &[SelectOption<E>] {
        if self.query.is_empty() {
            &self.defaults
        } else {
            &self.results
        }
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Query whose results are being shown or awaited.
    pub fn active_query(&self) -> &str {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(ids: &[&str]) -> Vec<SelectOption> {
        ids.iter().map(|id| SelectOption::plain(*id, *id)).collect()
    }

    fn ids(feed: &OptionFeed<()>) -> Vec<&str> {
        feed.options().iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn defaults_shown_without_query() {
        let mut feed = OptionFeed::default();
        feed.set_defaults(opts(&["a", "b"]));
        assert_eq!(feed.default_request().limit, DEFAULT_FETCH_LIMIT);
        assert_eq!(feed.begin_search("   "), None);
        assert_eq!(ids(&feed), ["a", "b"]);
    }

    #[test]
    fn search_then_resolve() {
        let mut feed = OptionFeed::default();
        feed.set_defaults(opts(&["a"]));
        let req = feed.begin_search("mae").unwrap();
        assert_eq!(req, FetchRequest { query: "mae".into(), page: 1, limit: 50 });
        assert!(feed.is_loading());
        assert!(feed.options().is_empty());
        assert!(feed.resolve("mae", opts(&["m1"])));
        assert!(!feed.is_loading());
        assert_eq!(ids(&feed), ["m1"]);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut feed = OptionFeed::default();
        feed.begin_search("ma");
        feed.begin_search("mae");
        assert!(!feed.resolve("ma", opts(&["old"])));
        assert!(feed.is_loading());
        assert!(feed.resolve("mae", opts(&["new"])));
        assert_eq!(ids(&feed), ["new"]);
    }

    #[test]
    fn clearing_query_returns_to_defaults() {
        let mut feed = OptionFeed::default();
        feed.set_defaults(opts(&["d"]));
        feed.begin_search("x");
        feed.resolve("x", opts(&["x1"]));
        feed.begin_search("");
        assert_eq!(ids(&feed), ["d"]);
        assert!(!feed.resolve("x", opts(&["late"])));
    }

    #[test]
    fn failure_stops_loading_and_keeps_stale_list() {
        let mut feed = OptionFeed::default();
        feed.begin_search("x");
        feed.resolve("x", opts(&["x1"]));
        feed.begin_search("xy");
        feed.fail("xy");
        assert!(!feed.is_loading());
        assert_eq!(ids(&feed), ["x1"]);
    }
}
