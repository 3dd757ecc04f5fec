//! Advisory-lock helpers.
//!
//! Postgres advisory locks are session-scoped, so a lock must be acquired and
//! released on the same connection. [`AdvisoryLock`] pins a pooled connection
//! for the lock's lifetime; different keys never contend, which keeps
//! distinct SKUs fully parallel while serializing work on any single SKU.

use sha2::{Digest, Sha256};
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};

use crate::DbError;

/// Global key guarding schema bootstrap. Distinct from the SKU key space.
pub const SCHEMA_LOCK_KEY: i64 = 0x6d6b_7368_6f70_0001;

/// Stable lock key for one SKU: the first 8 bytes of `SHA-256(sku)`,
/// big-endian, as a signed 64-bit integer.
#[must_use]
pub fn sku_lock_key(sku: &str) -> i64 {
    let digest = Sha256::digest(sku.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// An acquired advisory lock holding its dedicated connection.
pub struct AdvisoryLock {
    conn: PoolConnection<Postgres>,
    key: i64,
}

impl AdvisoryLock {
    /// Block until the advisory lock for `key` is held.
    ///
    /// Contention is intentional backpressure, not an error; the call simply
    /// waits for the current holder.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if a connection cannot be acquired or the
    /// lock query fails.
    pub async fn acquire(pool: &PgPool, key: i64) -> Result<Self, DbError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(key)
            .execute(&mut *conn)
            .await?;
        Ok(Self { conn, key })
    }

    /// The pinned connection holding the lock.
    ///
    /// Work done under the lock should run on this connection rather than
    /// drawing a second one from the pool; one lock, one connection.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Release the lock and return the connection to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the unlock query fails; the connection is
    /// dropped either way, which ends the session and frees the lock.
    pub async fn release(mut self) -> Result<(), DbError> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(self.key)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_key_is_stable() {
        assert_eq!(sku_lock_key("SKU-001"), sku_lock_key("SKU-001"));
    }

    #[test]
    fn distinct_skus_get_distinct_keys() {
        let keys = ["SKU-001", "SKU-002", "sku-001", "A", ""]
            .iter()
            .map(|s| sku_lock_key(s))
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn schema_key_does_not_collide_with_common_skus() {
        for sku in ["SKU-001", "A", "product-1"] {
            assert_ne!(sku_lock_key(sku), SCHEMA_LOCK_KEY);
        }
    }
}
