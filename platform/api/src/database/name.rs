use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use super::{NameRecord, NameStore, StoreError};

pub struct PgNameStore {
	db: Arc<PgPool>,
}

impl PgNameStore {
	pub fn new(db: Arc<PgPool>) -> Self {
		Self { db }
	}
}

#[async_trait::async_trait]
impl NameStore for PgNameStore {
	async fn insert(&self, name: &str, owner: Uuid) -> Result<NameRecord, StoreError> {
		Ok(sqlx::query_as::<_, NameRecord>(
			"INSERT INTO names (name, user_id) VALUES ($1, $2) RETURNING id, name, created_at, user_id",
		)
		.bind(name)
		.bind(owner)
		.fetch_one(self.db.as_ref())
		.await?)
	}

	async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<NameRecord>, StoreError> {
		Ok(
			sqlx::query_as::<_, NameRecord>("SELECT id, name, created_at, user_id FROM names WHERE user_id = $1 ORDER BY id")
				.bind(owner)
				.fetch_all(self.db.as_ref())
				.await?,
		)
	}
}
