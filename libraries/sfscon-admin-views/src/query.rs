//! View state mirrored into a link's query string.
//!
//! Updates merge into the existing parameters: setting `sort` leaves
//! `search` and any unknown parameters alone, and a `None` value removes the
//! parameter.

use sfscon_admin_client::sort::{decode_param, encode_param};
use sfscon_admin_client::SortSpec;
use std::fmt;
use url::form_urlencoded;

pub const SEARCH_PARAM: &str = "search";
pub const SORT_PARAM: &str = "sort";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pairs: Vec<(String, String)>,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            parsed.set(&key, Some(value.into_owned()));
        }
        parsed
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge a single parameter. `None` removes it.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => match self.pairs.iter_mut().find(|(k, _)| k == key) {
                Some(pair) => pair.1 = value,
                None => self.pairs.push((key.to_string(), value)),
            },
            None => self.pairs.retain(|(k, _)| k != key),
        }
    }

    /// The search term; absent means empty.
    pub fn search(&self) -> &str {
        self.get(SEARCH_PARAM).unwrap_or_default()
    }

    pub fn set_search(&mut self, term: &str) {
        self.set(SEARCH_PARAM, (!term.is_empty()).then(|| term.to_string()));
    }

    pub fn sort(&self) -> Option<SortSpec> {
        decode_param(self.get(SORT_PARAM))
    }

    pub fn set_sort(&mut self, sort: Option<&SortSpec>) {
        self.set(SORT_PARAM, encode_param(sort));
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.set_search(term);
        self
    }

    pub fn with_sort(mut self, sort: Option<&SortSpec>) -> Self {
        self.set_sort(sort);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for ViewQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish();
        f.write_str(&encoded)
    }
}
