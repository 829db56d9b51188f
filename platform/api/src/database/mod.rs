use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use common::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use uuid::Uuid;

mod memory;
mod name;

pub use memory::MemoryNameStore;
pub use name::PgNameStore;

/// A saved name suggestion. Serialized with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
	/// The unique identifier for the name.
	pub id: i32,
	/// The suggested name, never empty.
	pub name: String,
	/// When the row was inserted.
	pub created_at: DateTime<Utc>,
	/// The user who saved the name.
	pub user_id: Uuid,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error("database error")]
	Database(#[from] sqlx::Error),
	#[error("name must not be empty")]
	EmptyName,
	#[error("store is closed")]
	Closed,
}

#[async_trait::async_trait]
pub trait NameStore: Send + Sync {
	/// Appends one row owned by `owner` and returns it as stored.
	async fn insert(&self, name: &str, owner: Uuid) -> Result<NameRecord, StoreError>;

	/// Every row owned by `owner`, oldest first.
	async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<NameRecord>, StoreError>;
}

pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<Arc<PgPool>> {
	let options = PgConnectOptions::from_str(&config.uri)
		.context("invalid database uri")?
		.disable_statement_logging();

	let db = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.connect_with(options)
		.await
		.context("failed to connect to database")?;

	if config.migrate {
		sqlx::migrate!("./migrations")
			.run(&db)
			.await
			.context("failed to run migrations")?;
		tracing::info!("database migrations applied");
	}

	Ok(Arc::new(db))
}
