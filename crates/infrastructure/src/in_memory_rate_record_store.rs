use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hookforge_application::{RateRecordStore, VersionedRateRecord};
use hookforge_core::{AppError, AppResult};
use hookforge_domain::RateRecord;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct RateRecordEntry {
    record: RateRecord,
    version: u64,
    /// `None` when the TTL is too large to represent as an `Instant`.
    expires_at: Option<Instant>,
}

impl RateRecordEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Default)]
struct RateRecordTable {
    entries: HashMap<String, RateRecordEntry>,
    last_version: u64,
}

/// In-memory rate record store for tests and single-instance deployments.
///
/// Versions come from one store-wide counter, so a key that expires and is
/// recreated never reuses a version an in-flight writer might still hold.
#[derive(Default)]
pub struct InMemoryRateRecordStore {
    table: RwLock<RateRecordTable>,
}

impl InMemoryRateRecordStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live records.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.table
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Returns whether no live records are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RateRecordStore for InMemoryRateRecordStore {
    async fn load(&self, key: &str) -> AppResult<VersionedRateRecord> {
        let table = self.table.read().await;
        let loaded = table
            .entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| VersionedRateRecord {
                record: entry.record.clone(),
                version: entry.version,
            })
            .unwrap_or_default();

        Ok(loaded)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        record: &RateRecord,
        ttl_ms: i64,
    ) -> AppResult<bool> {
        let ttl_ms = u64::try_from(ttl_ms)
            .ok()
            .filter(|ttl_ms| *ttl_ms > 0)
            .ok_or_else(|| {
                AppError::Validation("rate record ttl must be greater than zero".to_owned())
            })?;

        let now = Instant::now();
        let mut table = self.table.write().await;

        let current_version = table
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map_or(0, |entry| entry.version);
        if current_version != expected_version {
            return Ok(false);
        }

        table.entries.retain(|_, entry| entry.is_live(now));

        let expires_at = now.checked_add(Duration::from_millis(ttl_ms));
        table.last_version += 1;
        let version = table.last_version;

        table.entries.insert(
            key.to_owned(),
            RateRecordEntry {
                record: record.clone(),
                version,
                expires_at,
            },
        );

        Ok(true)
    }
}
