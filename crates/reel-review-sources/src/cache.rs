use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use std::num::NonZeroUsize;
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at < ttl
    }
}

/// Read-through cache for upstream responses.
///
/// Entries are keyed by endpoint name plus a canonical rendering of the call
/// parameters and stay valid for `ttl`. Expired entries are not purged; they
/// read as absent until the next `store` under the same key replaces them.
/// Once `capacity` entries are held the least recently used one is evicted.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn from_config(config: &reel_review_config::CacheConfig) -> Self {
        Self::new(config.ttl(), config.capacity)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build the cache key for an endpoint and its parameters.
    ///
    /// Object keys are sorted, so the same parameter set always yields the
    /// same key regardless of insertion order.
    pub fn cache_key(endpoint: &str, params: &Value) -> String {
        let mut rendered = String::new();
        write_canonical(params, &mut rendered);
        format!("{}-{}", endpoint, rendered)
    }

    pub fn lookup(&self, endpoint: &str, params: &Value) -> Option<Value> {
        self.lookup_at(endpoint, params, Utc::now())
    }

    pub fn lookup_at(&self, endpoint: &str, params: &Value, now: DateTime<Utc>) -> Option<Value> {
        let key = Self::cache_key(endpoint, params);
        let mut entries = self.entries.lock();
        match entries.get(&key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                debug!("Cache hit: {}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache miss: {} (expired)", key);
                None
            }
            None => {
                debug!("Cache miss: {}", key);
                None
            }
        }
    }

    pub fn store(&self, endpoint: &str, params: &Value, value: Value) {
        self.store_at(endpoint, params, value, Utc::now());
    }

    pub fn store_at(&self, endpoint: &str, params: &Value, value: Value, now: DateTime<Utc>) {
        let key = Self::cache_key(endpoint, params);
        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at: now,
        };
        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                debug!("Cache evicted least recently used entry: {}", evicted);
            }
        }
        debug!("Cache saved: {}", key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
