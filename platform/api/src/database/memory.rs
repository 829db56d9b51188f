use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NameRecord, NameStore, StoreError};

#[derive(Default)]
struct Rows {
	last_id: i32,
	records: Vec<NameRecord>,
}

/// Process local store with the same contract as the postgres table.
#[derive(Default)]
pub struct MemoryNameStore {
	rows: RwLock<Rows>,
	closed: AtomicBool,
}

impl MemoryNameStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every later call fails with [`StoreError::Closed`].
	pub fn close(&self) {
		self.closed.store(true, Ordering::Relaxed);
	}

	pub async fn len(&self) -> usize {
		self.rows.read().await.records.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}

	fn check_open(&self) -> Result<(), StoreError> {
		if self.closed.load(Ordering::Relaxed) {
			Err(StoreError::Closed)
		} else {
			Ok(())
		}
	}
}

#[async_trait::async_trait]
impl NameStore for MemoryNameStore {
	async fn insert(&self, name: &str, owner: Uuid) -> Result<NameRecord, StoreError> {
		self.check_open()?;

		if name.is_empty() {
			return Err(StoreError::EmptyName);
		}

		let mut rows = self.rows.write().await;
		rows.last_id += 1;

		let record = NameRecord {
			id: rows.last_id,
			name: name.to_string(),
			created_at: Utc::now(),
			user_id: owner,
		};
		rows.records.push(record.clone());

		Ok(record)
	}

	async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<NameRecord>, StoreError> {
		self.check_open()?;

		Ok(self
			.rows
			.read()
			.await
			.records
			.iter()
			.filter(|record| record.user_id == owner)
			.cloned()
			.collect())
	}
}
