//! Short-lived response cache for back-office reads.
//!
//! Entries are JSON payloads with their own TTL. Expiry is decided by the
//! entry's insertion timestamp on read (`elapsed > ttl`); moka only reclaims
//! memory, and only after a grace period past the TTL, so an entry is never
//! dropped early.
//!
//! The cache has no size bound. Entries leave only on expiry or an explicit
//! delete/clear, and the key space is small (a few keys per admin).

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::Op;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use slick_core::AdminUserId;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
pub const ORDERS_TTL: Duration = Duration::from_secs(30);
pub const PRODUCTS_TTL: Duration = Duration::from_secs(30);
pub const DASHBOARD_TTL: Duration = Duration::from_secs(60);

/// Extra lifetime moka grants past an entry's TTL before evicting it.
const EVICTION_GRACE: Duration = Duration::from_secs(5);

/// Cache key builders.
pub mod keys {
    use slick_core::AdminUserId;

    /// Prefix shared by every back-office key.
    pub const ADMIN_PREFIX: &str = "admin:";
    pub const ORDERS: &str = "admin:orders";
    pub const PRODUCTS_PREFIX: &str = "admin:products:";
    pub const DASHBOARD_PREFIX: &str = "admin:dashboard:";

    #[must_use]
    pub fn products(admin_id: AdminUserId) -> String {
        format!("{PRODUCTS_PREFIX}{admin_id}")
    }

    #[must_use]
    pub fn dashboard(admin_id: AdminUserId) -> String {
        format!("{DASHBOARD_PREFIX}{admin_id}")
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

struct GraceExpiry;

impl Expiry<String, Arc<CacheEntry>> for GraceExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl.saturating_add(EVICTION_GRACE))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<CacheEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl.saturating_add(EVICTION_GRACE))
    }
}

/// Concurrent TTL cache shared by all admin request handlers.
#[derive(Clone)]
pub struct AdminCache {
    entries: Cache<String, Arc<CacheEntry>>,
}

impl Default for AdminCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder()
                .expire_after(GraceExpiry)
                .build(),
        }
    }

    /// The value under `key`, unless it is missing or older than its TTL.
    ///
    /// Expired entries are removed as a side effect.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key).await?;
        if entry.is_expired() {
            debug!(key, "Cache entry expired");
            self.remove_if_same(key, &entry).await;
            return None;
        }
        debug!(key, "Cache hit");
        Some(entry.value.clone())
    }

    /// Remove `key` only while it still holds `seen`. A value written after
    /// `seen` was read is left alone.
    async fn remove_if_same(&self, key: &str, seen: &Arc<CacheEntry>) {
        self.entries
            .entry_by_ref(key)
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) if Arc::ptr_eq(current.value(), seen) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
    }

    /// [`get`](Self::get) deserialized into `T`. A payload that no longer
    /// matches `T` is treated as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.get(key).await?).ok()
    }

    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
            ttl,
        };
        self.entries.insert(key.into(), Arc::new(entry)).await;
    }

    /// [`set`](Self::set) with [`DEFAULT_TTL`].
    pub async fn set_default(&self, key: impl Into<String>, value: Value) {
        self.set(key, value, DEFAULT_TTL).await;
    }

    /// Serialize `value` and store it. Values that fail to serialize are skipped.
    pub async fn set_as<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json, ttl).await,
            Err(e) => tracing::warn!(error = %e, "Skipping cache write for unserializable value"),
        }
    }

    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Remove every key starting with `prefix`.
    pub async fn clear_prefix(&self, prefix: &str) {
        let matching: Vec<Arc<String>> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();

        for key in matching {
            self.entries.invalidate(key.as_str()).await;
        }
    }

    /// Remove every back-office key.
    pub async fn clear_admin(&self) {
        self.clear_prefix(keys::ADMIN_PREFIX).await;
    }

    /// Forget cached product lists and dashboards after a catalog change.
    pub async fn invalidate_catalog(&self) {
        self.clear_prefix(keys::PRODUCTS_PREFIX).await;
        self.clear_prefix(keys::DASHBOARD_PREFIX).await;
    }

    /// Forget the cached order list and dashboards after an order change.
    pub async fn invalidate_orders(&self) {
        self.delete(keys::ORDERS).await;
        self.clear_prefix(keys::DASHBOARD_PREFIX).await;
    }

    /// Forget cached reads scoped to one admin.
    pub async fn invalidate_admin(&self, admin_id: AdminUserId) {
        self.delete(&keys::products(admin_id)).await;
        self.delete(&keys::dashboard(admin_id)).await;
    }
}
