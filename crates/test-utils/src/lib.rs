//! Toystore test utilities.
//!
//! Fixtures for integration testing: toy documents in their stored JSON
//! shape, a data-file writer, and assertion helpers for API responses.

use std::path::Path;

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

/// Name of the toy data file inside a data directory.
pub const TOY_FILE: &str = "toy.json";

/// Create a test toy with default values: in stock and unlabelled.
pub fn test_toy(name: &str, price: f64) -> TestToy {
    TestToy {
        id: Uuid::now_v7().simple().to_string(),
        name: name.to_string(),
        price,
        labels: Vec::new(),
        in_stock: true,
        created_at: 0,
    }
}

/// A toy fixture builder.
#[derive(Debug, Clone)]
pub struct TestToy {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub labels: Vec<String>,
    pub in_stock: bool,
    pub created_at: i64,
}

impl TestToy {
    /// Set a custom ID.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Set the labels.
    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Mark as out of stock.
    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Set the creation timestamp (epoch milliseconds).
    pub fn created_at(mut self, millis: i64) -> Self {
        self.created_at = millis;
        self
    }

    /// The toy as it is stored on disk.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "_id": self.id,
            "name": self.name,
            "price": self.price,
            "labels": self.labels,
            "inStock": self.in_stock,
            "createdAt": self.created_at,
            "msgs": [],
        })
    }
}

/// Write `toys` as the toy data file of `data_dir`.
pub fn write_toy_file(data_dir: &Path, toys: &[TestToy]) -> std::io::Result<()> {
    let docs: Vec<JsonValue> = toys.iter().map(TestToy::to_json).collect();
    let body = serde_json::to_string_pretty(&docs)?;
    std::fs::write(data_dir.join(TOY_FILE), body)
}

/// Assertion helpers for JSON responses.
#[allow(clippy::unwrap_used)]
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Toy names of a `{ toys, totalPages }` page, in order.
    pub fn page_names(page: &Value) -> Vec<String> {
        page["toys"]
            .as_array()
            .map(|toys| {
                toys.iter()
                    .filter_map(|t| t["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Assert that every toy of a page carries every label.
    pub fn all_have_labels(page: &Value, labels: &[&str]) {
        for toy in page["toys"].as_array().unwrap() {
            let toy_labels: Vec<&str> = toy["labels"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(Value::as_str)
                .collect();
            for label in labels {
                assert!(
                    toy_labels.contains(label),
                    "toy {} is missing label '{label}'",
                    toy["name"]
                );
            }
        }
    }
}
