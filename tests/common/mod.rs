#![allow(dead_code)]

use bucketq::{QueryCli, QueryConfig, Store, StoreConfig};
use tempfile::{tempdir, TempDir};

/// A fresh, empty store file inside a temporary directory.
pub struct TestStore {
    pub dir: TempDir,
    pub path: std::path::PathBuf,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        drop(Store::create(&path).unwrap());
        Self { dir, path }
    }

    pub fn open(&self) -> Store {
        Store::open(&self.path, &StoreConfig::default()).unwrap()
    }

    pub fn cli(&self, verbose: bool) -> QueryCli {
        self.cli_with(QueryConfig::new(".", verbose))
    }

    pub fn cli_with(&self, config: QueryConfig) -> QueryCli {
        QueryCli::new(self.open(), config).unwrap()
    }

    /// Writes each `(bucket path, key, value)` through `set_key`.
    pub fn seed(&self, entries: &[(&str, &str, &str)]) {
        let cli = self.cli(false);
        for (bucket, key, value) in entries {
            cli.set_key(bucket, key, value.as_bytes()).unwrap();
        }
    }

    /// Creates nested buckets without writing any key into them.
    pub fn seed_buckets(&self, paths: &[&[&str]]) {
        let store = self.open();
        store
            .update(|tx| {
                for path in paths {
                    let mut bucket = tx.create_bucket_if_not_exists(path[0].as_bytes())?;
                    for segment in &path[1..] {
                        bucket = bucket.create_bucket_if_not_exists(segment.as_bytes())?;
                    }
                }
                Ok(())
            })
            .unwrap();
    }
}

pub fn capture<F>(f: F) -> (bucketq::Result<()>, String)
where
    F: FnOnce(&mut Vec<u8>) -> bucketq::Result<()>,
{
    let mut out = Vec::new();
    let result = f(&mut out);
    (result, String::from_utf8(out).unwrap())
}
