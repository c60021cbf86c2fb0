//! Adapter exposing nested buckets on top of the embedded `redb` engine.
//!
//! The engine owns page layout, B+trees, durability and MVCC. This module
//! only maps bucket paths onto tables and tags each child record as a
//! nested bucket or a leaf value.

mod record;
mod stats;
mod transaction;

pub use record::{Child, MAX_KEY_SIZE, MAX_VALUE_SIZE};
pub use stats::BucketStats;
pub use transaction::{Bucket, BucketMut, ReadTx, WriteTx};

use std::path::Path;
use std::thread;
use std::time::Instant;

use redb::{Database, DatabaseError, ReadableDatabase};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};

/// An open store file. The file lock is released when this is dropped.
pub struct Store {
    db: Database,
}

impl Store {
    /// Opens an existing store file for reading and writing.
    ///
    /// The file must already exist; a zero-length file is initialised as an
    /// empty store. If another handle holds the file lock, opening is retried
    /// until `config.open_timeout` elapses.
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();

        std::fs::File::open(path).map_err(|source| Error::FileOpen {
            path: path.display().to_string(),
            source,
        })?;

        let deadline = Instant::now() + config.open_timeout;
        loop {
            match Database::create(path) {
                Ok(db) => {
                    debug!(path = %path.display(), "opened store");
                    return Ok(Self { db });
                }
                Err(DatabaseError::DatabaseAlreadyOpen) => {
                    if Instant::now() >= deadline {
                        debug!(path = %path.display(), "gave up waiting for store lock");
                        return Err(Error::LockTimeout(config.open_timeout));
                    }
                    debug!(path = %path.display(), "store locked, retrying");
                    thread::sleep(config.retry_interval);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Creates a new empty store file at `path`, failing if it exists.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| Error::FileOpen {
                path: path.display().to_string(),
                source,
            })?;
        Self::open(path, &StoreConfig::default())
    }

    pub fn begin_read(&self) -> Result<ReadTx> {
        Ok(ReadTx::new(self.db.begin_read()?))
    }

    pub fn begin_write(&self) -> Result<WriteTx> {
        Ok(WriteTx::new(self.db.begin_write()?))
    }

    /// Runs `f` in a read-only transaction that is always rolled back.
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx) -> Result<T>,
    {
        let tx = self.begin_read()?;
        let result = f(&tx);
        tx.rollback();
        result
    }

    /// Runs `f` in a read-write transaction, committing if it succeeds and
    /// rolling back otherwise.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteTx) -> Result<T>,
    {
        let tx = self.begin_write()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = tx.rollback() {
                    warn!(error = %abort_err, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::create(dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = Store::open(dir.path().join("missing.db"), &StoreConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::FileOpen { .. }));
        assert!(err.is_open_error());
    }

    #[test]
    fn test_open_empty_file_initialises_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.db");
        std::fs::File::create(&path).unwrap();

        let store = Store::open(&path, &StoreConfig::default()).unwrap();
        let mut count = 0;
        store
            .view(|tx| tx.for_each_bucket(|_, _| {
                count += 1;
                Ok(())
            }))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_rejects_non_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0xAB; 8192]).unwrap();

        let err = Store::open(&path, &StoreConfig::default()).err().unwrap();
        assert!(err.is_open_error());
    }

    #[test]
    fn test_open_times_out_while_locked() {
        let (dir, _store) = temp_store();
        let config = StoreConfig {
            open_timeout: Duration::from_millis(100),
            retry_interval: Duration::from_millis(10),
        };

        let started = Instant::now();
        let err = Store::open(dir.path().join("test.db"), &config).err().unwrap();
        assert!(matches!(err, Error::LockTimeout(_)));
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_update_commits_on_success() {
        let (_dir, store) = temp_store();
        store
            .update(|tx| tx.create_bucket_if_not_exists(b"widgets")?.put(b"foo", b"bar"))
            .unwrap();

        let value = store
            .view(|tx| match tx.bucket(b"widgets")? {
                Some(bucket) => bucket.get(b"foo"),
                None => Ok(None),
            })
            .unwrap();
        assert_eq!(value, Some(b"bar".to_vec()));
    }

    #[test]
    fn test_update_rolls_back_on_error() {
        let (_dir, store) = temp_store();
        let result: Result<()> = store.update(|tx| {
            tx.create_bucket_if_not_exists(b"widgets")?.put(b"foo", b"bar")?;
            Err(Error::KeyRequired)
        });
        assert!(result.is_err());

        let exists = store.view(|tx| Ok(tx.bucket(b"widgets")?.is_some())).unwrap();
        assert!(!exists);
    }

    #[test]
    fn test_nested_buckets_and_values_are_distinct() {
        let (_dir, store) = temp_store();
        store
            .update(|tx| {
                let bar = tx.create_bucket_if_not_exists(b"bar")?;
                bar.create_bucket_if_not_exists(b"b1")?;
                bar.put(b"k", b"v")?;
                Ok(())
            })
            .unwrap();

        store
            .view(|tx| {
                let bar = tx.bucket(b"bar")?.unwrap();
                assert!(bar.bucket(b"b1")?.is_some());
                assert!(bar.bucket(b"k")?.is_none());
                assert_eq!(bar.get(b"b1")?, None);
                assert_eq!(bar.get(b"k")?, Some(b"v".to_vec()));

                let mut children = Vec::new();
                bar.for_each(|name, child| {
                    children.push((name.to_vec(), child));
                    Ok(())
                })?;
                assert_eq!(
                    children,
                    vec![
                        (b"b1".to_vec(), Child::Bucket),
                        (b"k".to_vec(), Child::Value(b"v".to_vec())),
                    ]
                );
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_incompatible_value() {
        let (_dir, store) = temp_store();
        store
            .update(|tx| {
                let bar = tx.create_bucket_if_not_exists(b"bar")?;
                bar.create_bucket_if_not_exists(b"sub")?;
                bar.put(b"leaf", b"1")
            })
            .unwrap();

        let err = store
            .update(|tx| tx.create_bucket_if_not_exists(b"bar")?.put(b"sub", b"x"))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleValue));

        let err = store
            .update(|tx| {
                tx.create_bucket_if_not_exists(b"bar")?
                    .create_bucket_if_not_exists(b"leaf")
                    .map(|_| ())
            })
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleValue));
    }

    #[test]
    fn test_stats_aggregate_descendants() {
        let (_dir, store) = temp_store();
        store
            .update(|tx| {
                let top = tx.create_bucket_if_not_exists(b"top")?;
                top.put(b"a", b"1")?;
                let inner = top.create_bucket_if_not_exists(b"inner")?;
                inner.put(b"b", b"2")?;
                inner.put(b"c", b"3")?;
                Ok(())
            })
            .unwrap();

        let stats = store
            .view(|tx| tx.bucket(b"top")?.unwrap().stats())
            .unwrap();
        // "a" and the "inner" marker, plus "b" and "c".
        assert_eq!(stats.key_n, 4);
        assert_eq!(stats.bucket_n, 2);
        assert_eq!(stats.branch_overflow_n, 0);
        assert_eq!(stats.leaf_overflow_n, 0);
    }
}
