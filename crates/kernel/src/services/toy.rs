//! Toy catalogue operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{LabelCount, Message, MessageAuthor, NewMessage, NewToy, Toy, ToyUpdate};
use crate::query::{ToyPage, ToyQuery};
use crate::store::ToyStore;

/// The fixed label catalogue offered to the frontend.
pub const TOY_LABELS: &[&str] = &[
    "On wheels",
    "Box game",
    "Art",
    "Baby",
    "Doll",
    "Puzzle",
    "Outdoor",
    "Battery Powered",
];

/// Toy operations over whichever [`ToyStore`] is configured.
#[derive(Clone)]
pub struct ToyService {
    store: Arc<dyn ToyStore>,
}

impl ToyService {
    pub fn new(store: Arc<dyn ToyStore>) -> Self {
        Self { store }
    }

    /// Run a list query: filter, sort, then cut one page.
    pub async fn query(&self, query: &ToyQuery) -> AppResult<ToyPage> {
        let page = self.store.query(query).await?;
        debug!(
            page_idx = query.page_idx,
            returned = page.toys.len(),
            total_pages = page.total_pages,
            "toy query"
        );
        Ok(page)
    }

    pub async fn get(&self, id: &str) -> AppResult<Toy> {
        Ok(self.store.get(id).await?)
    }

    pub async fn add(&self, input: NewToy) -> AppResult<Toy> {
        input.validate().map_err(AppError::BadRequest)?;
        let toy = self.store.add(input).await?;
        info!(toy_id = %toy.id, name = %toy.name, "toy added");
        Ok(toy)
    }

    pub async fn update(&self, update: ToyUpdate) -> AppResult<Toy> {
        update.validate().map_err(AppError::BadRequest)?;
        let toy = self.store.update(update).await?;
        info!(toy_id = %toy.id, "toy updated");
        Ok(toy)
    }

    pub async fn remove(&self, id: &str) -> AppResult<()> {
        self.store.remove(id).await?;
        info!(toy_id = %id, "toy removed");
        Ok(())
    }

    /// Post a message on a toy. The author is whoever is logged in.
    pub async fn add_message(
        &self,
        toy_id: &str,
        input: NewMessage,
        by: MessageAuthor,
    ) -> AppResult<Message> {
        if input.txt.trim().is_empty() {
            return Err(AppError::BadRequest("message text is required".to_string()));
        }

        let message = self
            .store
            .add_message(toy_id, Message::create(input, by))
            .await?;
        info!(toy_id = %toy_id, msg_id = %message.id, "message added");
        Ok(message)
    }

    pub async fn remove_message(&self, toy_id: &str, msg_id: &str) -> AppResult<String> {
        let removed = self.store.remove_message(toy_id, msg_id).await?;
        info!(toy_id = %toy_id, msg_id = %removed, "message removed");
        Ok(removed)
    }

    /// The label catalogue.
    pub fn labels(&self) -> Vec<String> {
        TOY_LABELS.iter().map(|label| label.to_string()).collect()
    }

    /// Per-label totals over the whole catalogue.
    pub async fn label_statistics(&self) -> AppResult<BTreeMap<String, LabelCount>> {
        let toys = self.store.list().await?;
        Ok(count_labels(&toys))
    }

    pub async fn healthy(&self) -> bool {
        self.store.healthy().await
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }
}

/// Tally every label across `toys`: how many times it occurs, and how many
/// of those occurrences are on toys in stock.
pub fn count_labels(toys: &[Toy]) -> BTreeMap<String, LabelCount> {
    let mut counts: BTreeMap<String, LabelCount> = BTreeMap::new();

    for toy in toys {
        for label in &toy.labels {
            let count = counts.entry(label.clone()).or_default();
            count.total += 1;
            if toy.in_stock {
                count.in_stock += 1;
            }
        }
    }

    counts
}
