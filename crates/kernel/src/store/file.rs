//! Flat JSON file backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{StoreError, StoreResult, ToyStore, UserStore};
use crate::models::{Message, NewToy, Toy, ToyUpdate, User};
use crate::query::{ToyPage, ToyQuery, engine};

/// Toy data file name inside the data directory.
pub const TOY_FILE: &str = "toy.json";

/// User data file name inside the data directory.
pub const USER_FILE: &str = "user.json";

/// Store keeping the whole dataset in memory and rewriting a pretty-printed
/// JSON array on every mutation.
///
/// A mutation is applied to a copy first and only becomes visible once the
/// file write succeeded.
pub struct JsonFileStore {
    toys_path: PathBuf,
    users_path: PathBuf,
    toys: RwLock<Vec<Toy>>,
    users: RwLock<Vec<User>>,
}

impl JsonFileStore {
    /// Open the store, loading existing data files. Missing files start empty.
    pub async fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;

        let toys_path = data_dir.join(TOY_FILE);
        let users_path = data_dir.join(USER_FILE);

        let toys: Vec<Toy> = load(&toys_path).await?;
        let users: Vec<User> = load(&users_path).await?;

        info!(
            path = %data_dir.display(),
            toys = toys.len(),
            users = users.len(),
            "JSON file store opened"
        );

        Ok(Self {
            toys_path,
            users_path,
            toys: RwLock::new(toys),
            users: RwLock::new(users),
        })
    }

    /// Apply `mutate` to a copy of the toy list, persist it, then publish it.
    async fn mutate_toys<R>(
        &self,
        mutate: impl FnOnce(&mut Vec<Toy>) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut toys = self.toys.write().await;
        let mut next = toys.clone();
        let result = mutate(&mut next)?;
        persist(&self.toys_path, &next).await?;
        *toys = next;
        Ok(result)
    }
}

fn position(toys: &[Toy], id: &str) -> StoreResult<usize> {
    toys.iter()
        .position(|t| t.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("toy {id}")))
}

#[async_trait]
impl ToyStore for JsonFileStore {
    async fn query(&self, query: &ToyQuery) -> StoreResult<ToyPage> {
        let toys = self.toys.read().await;
        Ok(engine::run(&toys, query))
    }

    async fn list(&self) -> StoreResult<Vec<Toy>> {
        Ok(self.toys.read().await.clone())
    }

    async fn get(&self, id: &str) -> StoreResult<Toy> {
        let toys = self.toys.read().await;
        let idx = position(&toys, id)?;
        Ok(toys[idx].clone())
    }

    async fn add(&self, input: NewToy) -> StoreResult<Toy> {
        let toy = Toy::create(input);
        let added = toy.clone();
        self.mutate_toys(move |toys| {
            toys.insert(0, toy);
            Ok(())
        })
        .await?;
        Ok(added)
    }

    async fn update(&self, update: ToyUpdate) -> StoreResult<Toy> {
        self.mutate_toys(|toys| {
            let idx = position(toys, &update.id)?;
            toys[idx].apply(update);
            Ok(toys[idx].clone())
        })
        .await
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.mutate_toys(|toys| {
            let idx = position(toys, id)?;
            toys.remove(idx);
            Ok(())
        })
        .await
    }

    async fn add_message(&self, toy_id: &str, message: Message) -> StoreResult<Message> {
        self.mutate_toys(|toys| {
            let idx = position(toys, toy_id)?;
            toys[idx].msgs.push(message.clone());
            Ok(message)
        })
        .await
    }

    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> StoreResult<String> {
        self.mutate_toys(|toys| {
            let idx = position(toys, toy_id)?;
            let msgs = &mut toys[idx].msgs;
            let msg_idx = msgs
                .iter()
                .position(|m| m.id == msg_id)
                .ok_or_else(|| StoreError::NotFound(format!("message {msg_id}")))?;
            Ok(msgs.remove(msg_idx).id)
        })
        .await
    }

    async fn healthy(&self) -> bool {
        let dir = self.toys_path.parent().unwrap_or(Path::new("."));
        fs::metadata(dir).await.is_ok_and(|m| m.is_dir())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        let mut next = users.clone();
        next.push(user.clone());
        persist(&self.users_path, &next).await?;
        *users = next;
        Ok(user)
    }
}

/// Read a JSON array file. A missing file is an empty list.
async fn load<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    match fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "data file missing, starting empty");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Rewrite a data file as a 4-space indented JSON array.
async fn persist<T: Serialize>(path: &Path, items: &[T]) -> StoreResult<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut serializer)?;

    fs::write(path, &buf).await?;
    debug!(path = %path.display(), items = items.len(), "data file written");
    Ok(())
}
