//! Toy query types.
//!
//! Provides the shared vocabulary for both query executors:
//! - FilterSpec: text, stock and label predicates
//! - SortSpec: field and direction
//! - ToyQuery / ToyPage: the full request and its paged result

use serde::{Deserialize, Serialize};

use crate::models::Toy;

/// Number of toys per page.
pub const PAGE_SIZE: u32 = 6;

/// Predicates narrowing the toy result set. All active predicates must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive substring of the toy name.
    pub txt: Option<String>,

    /// Exact stock flag. `None` matches both.
    pub in_stock: Option<bool>,

    /// Labels the toy must all carry.
    pub labels: Vec<String>,

    /// Page index carried inside the filter payload, if any.
    pub page_idx: Option<u32>,
}

impl FilterSpec {
    /// Check a toy against every active predicate.
    pub fn matches(&self, toy: &Toy) -> bool {
        if let Some(txt) = &self.txt
            && !toy.name.to_lowercase().contains(&txt.to_lowercase())
        {
            return false;
        }

        if let Some(in_stock) = self.in_stock
            && toy.in_stock != in_stock
        {
            return false;
        }

        toy.has_all_labels(&self.labels)
    }
}

/// Fields a toy list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    CreatedAt,
}

impl SortField {
    /// Resolve a wire name. Unknown names resolve to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Requested ordering. A missing field means the default order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Default ordering when no sort field is requested: newest first.
    pub const DEFAULT: (SortField, SortDirection) = (SortField::CreatedAt, SortDirection::Desc);

    /// The ordering actually applied.
    pub fn effective(&self) -> (SortField, SortDirection) {
        match self.field {
            Some(field) => (field, self.direction),
            None => Self::DEFAULT,
        }
    }
}

/// A complete toy list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToyQuery {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    /// Zero-based page index.
    pub page_idx: u32,
}

impl ToyQuery {
    /// Offset of the first toy on the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_idx) * u64::from(PAGE_SIZE)
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyPage {
    pub toys: Vec<Toy>,
    pub total_pages: u32,
}

/// Number of pages needed for `count` matching toys.
pub fn total_pages(count: u64) -> u32 {
    u32::try_from(count.div_ceil(u64::from(PAGE_SIZE))).unwrap_or(u32::MAX)
}
