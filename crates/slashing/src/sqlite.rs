use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::{check_lengths, ProtectedKind, SlashingStore, StoreError};

pub const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS signed_attestations (
    validator_pubkey BLOB NOT NULL,
    signing_root BLOB NOT NULL,
    PRIMARY KEY (validator_pubkey, signing_root)
);
CREATE TABLE IF NOT EXISTS signed_blocks (
    validator_pubkey BLOB NOT NULL,
    signing_root BLOB NOT NULL,
    PRIMARY KEY (validator_pubkey, signing_root)
);";

/// Durable store backed by a single SQLite connection. The schema is applied
/// on open, so `open` doubles as the migration entry point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SlashingStore for SqliteStore {
    fn can_sign(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError> {
        check_lengths(validator_pubkey, signing_root)?;

        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE validator_pubkey = ?1 AND signing_root = ?2)",
            kind.table()
        );
        let exists: bool = self.conn.lock().query_row(
            &query,
            params![validator_pubkey, signing_root],
            |row| row.get(0),
        )?;
        Ok(!exists)
    }

    fn try_insert(
        &self,
        kind: ProtectedKind,
        validator_pubkey: &[u8],
        signing_root: &[u8],
    ) -> Result<bool, StoreError> {
        check_lengths(validator_pubkey, signing_root)?;

        let statement = format!(
            "INSERT INTO {} (validator_pubkey, signing_root) VALUES (?1, ?2) \
             ON CONFLICT (validator_pubkey, signing_root) DO NOTHING",
            kind.table()
        );
        let inserted = self
            .conn
            .lock()
            .execute(&statement, params![validator_pubkey, signing_root])?;
        Ok(inserted == 1)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn pair() -> ([u8; 48], [u8; 32]) {
        ([0x85; 48], [0x54; 32])
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        let (pubkey, root) = pair();

        assert!(store.can_sign(ProtectedKind::Block, &pubkey, &root).unwrap());
        assert!(store.try_insert(ProtectedKind::Block, &pubkey, &root).unwrap());
        assert!(!store.can_sign(ProtectedKind::Block, &pubkey, &root).unwrap());
        assert!(!store.try_insert(ProtectedKind::Block, &pubkey, &root).unwrap());
    }

    #[test]
    fn test_tables_are_independent() {
        let store = SqliteStore::in_memory().unwrap();
        let (pubkey, root) = pair();

        assert!(store
            .try_insert(ProtectedKind::Attestation, &pubkey, &root)
            .unwrap());
        assert!(store.can_sign(ProtectedKind::Block, &pubkey, &root).unwrap());
    }

    #[test]
    fn test_distinct_pairs_do_not_conflict() {
        let store = SqliteStore::in_memory().unwrap();
        let (pubkey, root) = pair();
        let other_root = [0x55u8; 32];

        assert!(store
            .try_insert(ProtectedKind::Attestation, &pubkey, &root)
            .unwrap());
        assert!(store
            .try_insert(ProtectedKind::Attestation, &pubkey, &other_root)
            .unwrap());
    }

    #[test]
    fn test_length_validation() {
        let store = SqliteStore::in_memory().unwrap();

        assert!(matches!(
            store.can_sign(ProtectedKind::Block, &[0u8; 47], &[0u8; 32]),
            Err(StoreError::InvalidPubkeyLength(47))
        ));
        assert!(matches!(
            store.try_insert(ProtectedKind::Block, &[0u8; 48], &[0u8; 31]),
            Err(StoreError::InvalidRootLength(31))
        ));
    }

    #[test]
    fn test_concurrent_identical_inserts_admit_exactly_one() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let (pubkey, root) = pair();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .try_insert(ProtectedKind::Block, &pubkey, &root)
                        .unwrap()
                })
            })
            .collect();

        let inserted = handles
            .into_iter()
            .filter(|handle| handle.join().unwrap())
            .count();
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_open_reapplies_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protection.db");
        let (pubkey, root) = pair();

        {
            let store = SqliteStore::open(&path).unwrap();
            assert!(store.try_insert(ProtectedKind::Block, &pubkey, &root).unwrap());
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(!store.try_insert(ProtectedKind::Block, &pubkey, &root).unwrap());
    }
}
