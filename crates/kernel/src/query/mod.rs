//! Toy query engine.
//!
//! One set of filter/sort/page types with two executors that must agree:
//! - [`engine::run`] filters, sorts and slices an in-memory toy list
//! - [`criteria::ToyQueryBuilder`] translates the same query into SQL over a
//!   JSONB document table
//!
//! Raw request parameters are turned into a [`ToyQuery`] by the lenient
//! parsers in [`parse`], which never fail.

pub mod criteria;
pub mod engine;
pub mod parse;
pub mod types;

pub use criteria::ToyQueryBuilder;
pub use parse::{ToyListParams, parse_filter, parse_page_idx, parse_sort};
pub use types::{
    FilterSpec, PAGE_SIZE, SortDirection, SortField, SortSpec, ToyPage, ToyQuery, total_pages,
};
