//! Toy model and its embedded message thread.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Length of generated message identifiers.
const MESSAGE_ID_LEN: usize = 5;

/// Toy record as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toy {
    /// Unique identifier, immutable after creation.
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub price: f64,

    /// Category tags. Order is preserved and duplicates are allowed.
    #[serde(default)]
    pub labels: Vec<String>,

    pub in_stock: bool,

    /// Creation time in epoch milliseconds, assigned once at insert.
    pub created_at: i64,

    #[serde(default)]
    pub msgs: Vec<Message>,
}

/// A message posted on a toy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub txt: String,
    pub by: MessageAuthor,
}

/// Author reference embedded in a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
}

/// Input for creating a toy.
#[derive(Debug, Clone, Deserialize)]
pub struct NewToy {
    pub name: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Input for updating a toy.
///
/// Only supplied fields are merged into the stored toy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyUpdate {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

/// Input for posting a message. The author comes from the session.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub txt: String,
}

/// Per-label tally used by the label statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub total: u64,
    pub in_stock: u64,
}

/// Prices arrive from form inputs as numbers or numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::String(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid price: {s:?}"))),
        }
    }
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn lenient_optional_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(NumberOrString::into_f64)
        .transpose()
}

impl Toy {
    /// Build a new toy with a fresh id, the current timestamp and stock set.
    pub fn create(input: NewToy) -> Self {
        Self {
            id: Uuid::now_v7().simple().to_string(),
            name: input.name,
            price: input.price,
            labels: input.labels,
            in_stock: true,
            created_at: chrono::Utc::now().timestamp_millis(),
            msgs: Vec::new(),
        }
    }

    /// Shallow-merge an update into this toy. Id and creation time never change.
    pub fn apply(&mut self, update: ToyUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(labels) = update.labels {
            self.labels = labels;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
    }

    /// Whether the toy carries every one of the given labels.
    pub fn has_all_labels(&self, labels: &[String]) -> bool {
        labels.iter().all(|label| self.labels.contains(label))
    }
}

impl NewToy {
    /// Reject inputs that could never be listed sensibly.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("toy name is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("toy price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl ToyUpdate {
    /// Same rules as [`NewToy::validate`], applied to the supplied fields only.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("toy id is required".to_string());
        }
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("toy name cannot be empty".to_string());
        }
        if let Some(price) = self.price
            && (!price.is_finite() || price < 0.0)
        {
            return Err("toy price must be a non-negative number".to_string());
        }
        Ok(())
    }
}

impl Message {
    /// Build a message with a generated id.
    pub fn create(input: NewMessage, by: MessageAuthor) -> Self {
        Self {
            id: generate_message_id(),
            txt: input.txt,
            by,
        }
    }
}

/// Generate a short alphanumeric message id, unique within its toy in practice.
pub fn generate_message_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MESSAGE_ID_LEN)
        .map(char::from)
        .collect()
}
