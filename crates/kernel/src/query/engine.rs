//! In-memory toy query executor.
//!
//! Runs the filter → sort → paginate pipeline over a slice of toys. The order
//! of the steps matters: the page count is computed from the filtered set
//! before slicing, so it does not depend on which page was requested.

use std::cmp::Ordering;

use super::types::{PAGE_SIZE, SortDirection, SortField, ToyPage, ToyQuery, total_pages};
use crate::models::Toy;

/// Execute a query against an in-memory toy list.
pub fn run(toys: &[Toy], query: &ToyQuery) -> ToyPage {
    let mut matched: Vec<&Toy> = toys.iter().filter(|t| query.filter.matches(t)).collect();

    let (field, direction) = query.sort.effective();
    // Equal sort keys fall back to ascending id whatever the direction.
    matched.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
        .then_with(|| a.id.cmp(&b.id))
    });

    let total_pages = total_pages(matched.len() as u64);
    let start = usize::try_from(query.offset()).unwrap_or(usize::MAX);

    let toys = matched
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE as usize)
        .cloned()
        .collect();

    ToyPage { toys, total_pages }
}

fn compare(a: &Toy, b: &Toy, field: SortField) -> Ordering {
    match field {
        SortField::Name => compare_names(&a.name, &b.name),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Case-insensitive name order with a code-point tie-break, so "ant" and
/// "Ant" sort together but still deterministically. Both comparisons are by
/// code point, never by locale.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
