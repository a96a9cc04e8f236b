//! PostgreSQL JSONB document backend.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{StoreError, StoreResult, ToyStore, UserStore};
use crate::models::{Message, NewToy, Toy, ToyUpdate, User};
use crate::query::{ToyPage, ToyQuery, ToyQueryBuilder, total_pages};

/// Toy document table.
pub const TOY_TABLE: &str = "toy";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS toy (id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
    "CREATE INDEX IF NOT EXISTS toy_labels_idx ON toy USING GIN ((doc->'labels'))",
    "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_idx ON users ((doc->>'username'))",
];

/// Store keeping toys and users as JSONB documents, one row per document.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the document tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("document tables ready");
        Ok(())
    }
}

fn toy_from_doc(doc: Value) -> StoreResult<Toy> {
    Ok(serde_json::from_value(doc)?)
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("toy {id}"))
}

#[async_trait]
impl ToyStore for PgDocumentStore {
    async fn query(&self, query: &ToyQuery) -> StoreResult<ToyPage> {
        let builder = ToyQueryBuilder::new(query, TOY_TABLE);

        let count_sql = builder.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&self.pool)
            .await?;

        let main_sql = builder.build();
        debug!(sql = %main_sql, "toy query");
        let docs: Vec<Value> = sqlx::query_scalar(&main_sql)
            .fetch_all(&self.pool)
            .await?;

        let toys = docs
            .into_iter()
            .map(toy_from_doc)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(ToyPage {
            toys,
            total_pages: total_pages(u64::try_from(total).unwrap_or(0)),
        })
    }

    async fn list(&self) -> StoreResult<Vec<Toy>> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM toy ORDER BY (doc->>'createdAt')::bigint DESC, id COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await?;

        docs.into_iter().map(toy_from_doc).collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Toy> {
        let doc: Option<Value> = sqlx::query_scalar("SELECT doc FROM toy WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        toy_from_doc(doc.ok_or_else(|| not_found(id))?)
    }

    async fn add(&self, input: NewToy) -> StoreResult<Toy> {
        let toy = Toy::create(input);

        sqlx::query("INSERT INTO toy (id, doc) VALUES ($1, $2)")
            .bind(&toy.id)
            .bind(serde_json::to_value(&toy)?)
            .execute(&self.pool)
            .await?;

        Ok(toy)
    }

    async fn update(&self, update: ToyUpdate) -> StoreResult<Toy> {
        let id = update.id.clone();
        let mut patch = serde_json::to_value(&update)?;
        if let Value::Object(fields) = &mut patch {
            fields.remove("_id");
        }

        // `||` replaces top-level keys only: a shallow merge.
        let doc: Option<Value> =
            sqlx::query_scalar("UPDATE toy SET doc = doc || $2 WHERE id = $1 RETURNING doc")
                .bind(&id)
                .bind(patch)
                .fetch_optional(&self.pool)
                .await?;

        toy_from_doc(doc.ok_or_else(|| not_found(&id))?)
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM toy WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn add_message(&self, toy_id: &str, message: Message) -> StoreResult<Message> {
        let result = sqlx::query(
            r#"
            UPDATE toy
            SET doc = jsonb_set(
                doc,
                '{msgs}',
                COALESCE(doc->'msgs', '[]'::jsonb) || jsonb_build_array($2::jsonb)
            )
            WHERE id = $1
            "#,
        )
        .bind(toy_id)
        .bind(serde_json::to_value(&message)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(toy_id));
        }
        Ok(message)
    }

    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> StoreResult<String> {
        let result = sqlx::query(
            r#"
            UPDATE toy
            SET doc = jsonb_set(
                doc,
                '{msgs}',
                COALESCE(
                    (SELECT jsonb_agg(e.m ORDER BY e.i)
                     FROM jsonb_array_elements(doc->'msgs') WITH ORDINALITY AS e(m, i)
                     WHERE e.m->>'id' <> $2),
                    '[]'::jsonb
                )
            )
            WHERE id = $1
              AND EXISTS (
                SELECT 1
                FROM jsonb_array_elements(COALESCE(doc->'msgs', '[]'::jsonb)) AS m
                WHERE m->>'id' = $2
              )
            "#,
        )
        .bind(toy_id)
        .bind(msg_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "message {msg_id} on toy {toy_id}"
            )));
        }
        Ok(msg_id.to_string())
    }

    async fn healthy(&self) -> bool {
        crate::db::check_health(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl UserStore for PgDocumentStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let doc: Option<Value> = sqlx::query_scalar("SELECT doc FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(doc.map(serde_json::from_value::<User>).transpose()?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let doc: Option<Value> =
            sqlx::query_scalar("SELECT doc FROM users WHERE doc->>'username' = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(doc.map(serde_json::from_value::<User>).transpose()?)
    }

    async fn create(&self, user: User) -> StoreResult<User> {
        let result =
            sqlx::query("INSERT INTO users (id, doc) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(&user.id)
                .bind(serde_json::to_value(&user)?)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }
        Ok(user)
    }
}
