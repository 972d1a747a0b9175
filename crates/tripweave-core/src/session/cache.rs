//! Bounded conversation cache with LRU eviction and a time-to-live.
//!
//! Handles are shared as `Arc`s: an evicted or expired handle stays valid for
//! whoever still holds it, but the next `get_or_create` for that key starts a
//! fresh conversation. Never hold a `DashMap` guard across an await; the
//! methods here clone the `Arc` out and drop the guard before returning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use tripweave_types::config::CacheConfig;
use tripweave_types::conversation::ConversationKey;

use super::context::SessionContext;

/// One conversation's state behind a per-key async lock.
#[derive(Debug)]
pub struct ConversationHandle {
    key: ConversationKey,
    session: Mutex<SessionContext>,
}

impl ConversationHandle {
    fn new(key: ConversationKey, max_history_turns: usize) -> Self {
        Self {
            session: Mutex::new(SessionContext::new(key.clone(), max_history_turns)),
            key,
        }
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// Exclusive access to the session; held across a whole planning run or
    /// follow-up so reads and the following write are observed together.
    pub async fn lock(&self) -> MutexGuard<'_, SessionContext> {
        self.session.lock().await
    }
}

#[derive(Debug)]
struct CacheEntry {
    handle: Arc<ConversationHandle>,
    last_access: Instant,
}

/// Conversation handles keyed by `(user_id, conversation_id)`.
#[derive(Debug)]
pub struct ConversationCache {
    entries: DashMap<ConversationKey, CacheEntry>,
    capacity: usize,
    ttl: Duration,
    max_history_turns: usize,
}

impl ConversationCache {
    pub fn new(capacity: usize, ttl: Duration, max_history_turns: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            ttl,
            max_history_turns,
        }
    }

    pub fn from_config(config: &CacheConfig, max_history_turns: usize) -> Self {
        Self::new(
            config.capacity,
            Duration::from_secs(config.ttl_secs),
            max_history_turns,
        )
    }

    /// The live handle for `key`, creating it on first use or after expiry.
    pub fn get_or_create(&self, key: &ConversationKey) -> Arc<ConversationHandle> {
        let now = Instant::now();
        let mut created = false;

        let handle = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if self.is_expired(occupied.get(), now) {
                    debug!(conversation = %key, "conversation expired, starting fresh");
                    let handle = Arc::new(ConversationHandle::new(key.clone(), self.max_history_turns));
                    occupied.insert(CacheEntry {
                        handle: Arc::clone(&handle),
                        last_access: now,
                    });
                    handle
                } else {
                    let entry = occupied.get_mut();
                    entry.last_access = now;
                    Arc::clone(&entry.handle)
                }
            }
            Entry::Vacant(vacant) => {
                let handle = Arc::new(ConversationHandle::new(key.clone(), self.max_history_turns));
                vacant.insert(CacheEntry {
                    handle: Arc::clone(&handle),
                    last_access: now,
                });
                created = true;
                handle
            }
        };

        if created {
            self.evict_over_capacity(key);
        }
        handle
    }

    /// The live handle for `key` without creating one.
    pub fn get(&self, key: &ConversationKey) -> Option<Arc<ConversationHandle>> {
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !self.is_expired(&entry, now) {
                entry.last_access = now;
                return Some(Arc::clone(&entry.handle));
            }
        }
        self.entries.remove_if(key, |_, entry| self.is_expired(entry, now));
        None
    }

    pub fn remove(&self, key: &ConversationKey) -> Option<Arc<ConversationHandle>> {
        self.entries.remove(key).map(|(_, entry)| entry.handle)
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!(purged, "purged expired conversations");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_access) >= self.ttl
    }

    /// Evict least-recently-used entries until within capacity, sparing `keep`.
    fn evict_over_capacity(&self, keep: &ConversationKey) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .filter(|e| e.key() != keep)
                .min_by_key(|e| e.value().last_access)
                .map(|e| e.key().clone());
            match oldest {
                Some(victim) => {
                    debug!(conversation = %victim, "evicting least recently used conversation");
                    self.entries.remove(&victim);
                }
                None => break,
            }
        }
    }
}

impl Default for ConversationCache {
    fn default() -> Self {
        Self::from_config(
            &CacheConfig::default(),
            super::context::DEFAULT_MAX_HISTORY_TURNS,
        )
    }
}
