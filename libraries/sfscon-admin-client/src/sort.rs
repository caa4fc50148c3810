//! Sort specs and their query-string encoding.
//!
//! A sort spec travels as a single value: `field` for ascending, `-field`
//! for descending, and no parameter at all when unsorted. The same encoding
//! is used for the API's `order` parameter and the dashboard's `sort`
//! parameter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
    #[default]
    Unsorted,
}

impl SortOrder {
    pub fn is_active(self) -> bool {
        self != Self::Unsorted
    }
}

/// A field name paired with a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn ascend(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Ascend)
    }

    pub fn descend(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Descend)
    }

    /// Encode as a query value. `None` means the parameter is omitted.
    pub fn to_param(&self) -> Option<String> {
        if self.field.is_empty() {
            return None;
        }
        match self.order {
            SortOrder::Ascend => Some(self.field.clone()),
            SortOrder::Descend => Some(format!("-{}", self.field)),
            SortOrder::Unsorted => None,
        }
    }

    /// Decode a query value. Empty values (and a bare `-`) decode to `None`.
    pub fn parse(param: &str) -> Option<Self> {
        let param = param.trim();
        match param.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::descend(field)),
            None if param.is_empty() => None,
            None => Some(Self::ascend(param)),
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_param() {
            Some(param) => f.write_str(&param),
            None => f.write_str(""),
        }
    }
}

/// Encode an optional spec, the form every caller actually holds.
pub fn encode_param(spec: Option<&SortSpec>) -> Option<String> {
    spec.and_then(SortSpec::to_param)
}

/// Decode an optional query value.
pub fn decode_param(param: Option<&str>) -> Option<SortSpec> {
    param.and_then(SortSpec::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_directions() {
        assert_eq!(
            SortSpec::ascend("bookmarks").to_param().as_deref(),
            Some("bookmarks")
        );
        assert_eq!(
            SortSpec::descend("bookmarks").to_param().as_deref(),
            Some("-bookmarks")
        );
        assert_eq!(
            SortSpec::new("bookmarks", SortOrder::Unsorted).to_param(),
            None
        );
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            SortSpec::parse("-nr_ratings"),
            Some(SortSpec::descend("nr_ratings"))
        );
        assert_eq!(
            SortSpec::parse("register_at"),
            Some(SortSpec::ascend("register_at"))
        );
        assert_eq!(SortSpec::parse(""), None);
        assert_eq!(SortSpec::parse("-"), None);
    }

    #[test]
    fn test_round_trip_of_fixed_values() {
        for value in ["avg_rate", "-avg_rate"] {
            assert_eq!(encode_param(decode_param(Some(value)).as_ref()).as_deref(), Some(value));
        }
        assert_eq!(encode_param(decode_param(None).as_ref()), None);
    }

    #[test]
    fn test_empty_field_never_encodes() {
        assert_eq!(SortSpec::ascend("").to_param(), None);
    }
}
