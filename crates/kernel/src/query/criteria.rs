//! Toy query builder using SeaQuery.
//!
//! Translates a [`ToyQuery`] into SQL over a table of JSONB toy documents
//! (`id TEXT, doc JSONB`), matching the in-memory executor:
//! - text filter: `ILIKE` on the name with LIKE wildcards escaped
//! - stock filter: boolean cast of `inStock`
//! - label filter: JSONB containment, so every label must be present
//! - sort: the same field casts, with `id` as a deterministic tie-break;
//!   text keys use the "C" collation so they order by code point

use sea_query::{Alias, Expr, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr};

use super::types::{PAGE_SIZE, SortDirection, SortField, ToyQuery};

/// Query builder for toy list queries.
pub struct ToyQueryBuilder<'a> {
    query: &'a ToyQuery,
    table: &'a str,
}

impl<'a> ToyQueryBuilder<'a> {
    /// Create a builder targeting the given document table.
    pub fn new(query: &'a ToyQuery, table: &'a str) -> Self {
        Self { query, table }
    }

    /// Build the page SELECT returning one `doc` column per toy.
    pub fn build(&self) -> String {
        let mut select = Query::select();
        select.expr(Expr::cust(format!("{}.doc", self.table)));
        select.from(Alias::new(self.table));

        self.add_filters(&mut select);
        self.add_sorts(&mut select);

        select.limit(u64::from(PAGE_SIZE));
        select.offset(self.query.offset());

        select.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the filtered set.
    pub fn build_count(&self) -> String {
        let mut select = Query::select();
        select.expr(Expr::cust("COUNT(*)"));
        select.from(Alias::new(self.table));

        self.add_filters(&mut select);

        select.to_string(PostgresQueryBuilder)
    }

    fn add_filters(&self, select: &mut SelectStatement) {
        for condition in self.conditions() {
            select.and_where(condition);
        }
    }

    /// One condition per active predicate.
    fn conditions(&self) -> Vec<SimpleExpr> {
        let filter = &self.query.filter;
        let table = self.table;
        let mut conditions = Vec::new();

        if let Some(txt) = &filter.txt {
            conditions.push(Expr::cust_with_values(
                format!("{table}.doc->>'name' ILIKE $1"),
                [format!("%{}%", escape_like_wildcards(txt))],
            ));
        }

        if let Some(in_stock) = filter.in_stock {
            conditions.push(Expr::cust_with_values(
                format!("({table}.doc->>'inStock')::boolean = $1"),
                [in_stock],
            ));
        }

        if !filter.labels.is_empty() {
            let labels = serde_json::Value::from(filter.labels.clone()).to_string();
            conditions.push(Expr::cust_with_values(
                format!("{table}.doc->'labels' @> CAST($1 AS jsonb)"),
                [labels],
            ));
        }

        conditions
    }

    fn add_sorts(&self, select: &mut SelectStatement) {
        let (field, direction) = self.query.sort.effective();
        let order = match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let table = self.table;

        match field {
            SortField::Name => {
                select.order_by_expr(
                    Expr::cust(format!("LOWER({table}.doc->>'name') COLLATE \"C\"")),
                    order.clone(),
                );
                select.order_by_expr(
                    Expr::cust(format!("{table}.doc->>'name' COLLATE \"C\"")),
                    order,
                );
            }
            SortField::Price => {
                select.order_by_expr(
                    Expr::cust(format!("({table}.doc->>'price')::numeric")),
                    order,
                );
            }
            SortField::CreatedAt => {
                select.order_by_expr(
                    Expr::cust(format!("({table}.doc->>'createdAt')::bigint")),
                    order,
                );
            }
        }

        select.order_by_expr(
            Expr::cust(format!("{table}.id COLLATE \"C\"")),
            Order::Asc,
        );
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
