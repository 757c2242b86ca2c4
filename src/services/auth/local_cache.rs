//! In-process cache of verified tokens, keyed by `jti`.
//!
//! Backed by a sharded `DashMap`: readers of different keys never contend on a
//! single lock, and removal is atomic per key. Expiry is checked on every read;
//! the janitor only reclaims memory for entries nobody asks about again.

use std::sync::Arc;

use dashmap::DashMap;

use crate::services::auth::claims::Claims;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub claims: Arc<Claims>,
    /// Seconds since the epoch.
    pub exp: i64,
    /// Fingerprint of the exact token that was verified.
    pub fingerprint: String,
}

impl CacheEntry {
    fn is_live(&self, now: i64) -> bool {
        self.exp > now
    }
}

#[derive(Debug, Default)]
pub struct LocalValidationCache {
    entries: DashMap<String, CacheEntry>,
}

impl LocalValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry if present and not expired at `now`.
    ///
    /// An expired entry is removed on the way out.
    pub fn lookup(&self, jti: &str, now: i64) -> Option<CacheEntry> {
        let expired = match self.entries.get(jti) {
            None => return None,
            Some(entry) if entry.is_live(now) => return Some(entry.clone()),
            Some(_) => true,
        };

        // The read guard is released above. Re-check under the shard write lock
        // so a fresh entry stored in the meantime is not discarded.
        if expired {
            self.entries.remove_if(jti, |_, entry| !entry.is_live(now));
        }
        None
    }

    /// Inserts or replaces the entry for `jti`.
    ///
    /// Callers must only pass claims that passed signature verification.
    pub fn store(&self, jti: impl Into<String>, claims: Arc<Claims>, exp: i64, fingerprint: String) {
        self.entries.insert(
            jti.into(),
            CacheEntry {
                claims,
                exp,
                fingerprint,
            },
        );
    }

    /// Removes every entry whose expiry is `<= now`; returns how many were purged.
    pub fn sweep(&self, now: i64) -> usize {
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.is_live(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
