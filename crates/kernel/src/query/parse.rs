//! Lenient parsing of toy list query parameters.
//!
//! Clients send `filterBy` and `sortBy` as JSON strings and `pageIdx` as a
//! number. Malformed input never fails the request: each parser falls back to
//! its default and logs a warning. Fields are read independently, so one bad
//! field does not discard the others. A key repeated in the query string
//! resolves to its first value.

use serde_json::Value;
use tracing::warn;

use super::types::{FilterSpec, SortDirection, SortField, SortSpec, ToyQuery};

/// Raw query string of `GET /api/toy`.
#[derive(Debug, Clone, Default)]
pub struct ToyListParams {
    pub filter_by: Option<String>,
    pub sort_by: Option<String>,
    pub page_idx: Option<String>,
}

impl ToyListParams {
    /// Collect the known keys from decoded query pairs, keeping the first
    /// value of each and ignoring unknown keys.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "filterBy" => &mut params.filter_by,
                "sortBy" => &mut params.sort_by,
                "pageIdx" => &mut params.page_idx,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_string());
            }
        }
        params
    }

    /// Resolve the raw parameters into a query.
    ///
    /// An explicit `pageIdx` parameter wins over one embedded in `filterBy`.
    pub fn to_query(&self) -> ToyQuery {
        let filter = parse_filter(self.filter_by.as_deref());
        let sort = parse_sort(self.sort_by.as_deref());
        let page_idx = parse_page_idx(self.page_idx.as_deref())
            .or(filter.page_idx)
            .unwrap_or(0);

        ToyQuery {
            filter,
            sort,
            page_idx,
        }
    }
}

/// Parse a `filterBy` JSON document. Falls back to an empty filter.
pub fn parse_filter(raw: Option<&str>) -> FilterSpec {
    let Some(value) = parse_json("filterBy", raw) else {
        return FilterSpec::default();
    };

    FilterSpec {
        txt: value
            .get("txt")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        in_stock: value.get("inStock").and_then(lenient_bool),
        labels: value.get("labels").map(label_list).unwrap_or_default(),
        page_idx: value.get("pageIdx").and_then(lenient_index),
    }
}

/// Parse a `sortBy` JSON document. Unknown fields mean "no sort requested".
pub fn parse_sort(raw: Option<&str>) -> SortSpec {
    let Some(value) = parse_json("sortBy", raw) else {
        return SortSpec::default();
    };

    let field = value
        .get("type")
        .and_then(Value::as_str)
        .and_then(SortField::from_name);

    let desc = match value.get("desc") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => s == "true",
        _ => false,
    };

    SortSpec {
        field,
        direction: if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        },
    }
}

/// Parse a `pageIdx` parameter. Negative or non-numeric input yields `None`.
pub fn parse_page_idx(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(idx) => Some(idx),
        Err(e) => {
            warn!(value = %raw, error = %e, "ignoring malformed pageIdx");
            None
        }
    }
}

fn parse_json(param: &'static str, raw: Option<&str>) -> Option<Value> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            warn!(param, "ignoring non-object query parameter");
            None
        }
        Err(e) => {
            warn!(param, error = %e, "ignoring malformed query parameter");
            None
        }
    }
}

/// Accept `true`/`false` as booleans or strings. Everything else is unset.
fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn lenient_index(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn label_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
