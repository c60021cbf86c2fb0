//! Read-only and read-write transactions over the bucket tree.

use redb::{
    ReadOnlyTable, ReadTransaction, ReadableTable, ReadableTableMetadata, TableError,
    WriteTransaction,
};
use tracing::{debug, trace};

use super::record::{child_table, table_name, validate_entry, validate_name, Child};
use super::stats::BucketStats;
use crate::error::{Error, Result};

type ReadChildren = ReadOnlyTable<&'static [u8], &'static [u8]>;

/// A read-only snapshot of the whole store.
///
/// Never committed; dropping it (or calling [`ReadTx::rollback`]) releases
/// the snapshot.
pub struct ReadTx {
    txn: ReadTransaction,
}

impl ReadTx {
    pub(crate) fn new(txn: ReadTransaction) -> Self {
        debug!("began read transaction");
        Self { txn }
    }

    /// The root namespace; its children are the top-level buckets.
    pub fn root(&self) -> Bucket<'_> {
        Bucket {
            tx: self,
            path: Vec::new(),
        }
    }

    /// Looks up a top-level bucket.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'_>>> {
        self.root().bucket(name)
    }

    /// Calls `f` for each top-level bucket in name order.
    pub fn for_each_bucket<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &Bucket<'_>) -> Result<()>,
    {
        let root = self.root();
        let mut names = Vec::new();
        root.for_each(|name, child| {
            if child.is_bucket() {
                names.push(name.to_vec());
            }
            Ok(())
        })?;

        for name in names {
            let bucket = root.child_bucket(&name);
            f(&name, &bucket)?;
        }
        Ok(())
    }

    pub fn rollback(self) {
        debug!("rolled back read transaction");
    }

    fn open_children(&self, path: &[Vec<u8>]) -> Result<Option<ReadChildren>> {
        let name = table_name(path);
        match self.txn.open_table(child_table(&name)) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// A bucket seen through a read-only transaction.
pub struct Bucket<'tx> {
    tx: &'tx ReadTx,
    path: Vec<Vec<u8>>,
}

impl<'tx> Bucket<'tx> {
    /// Looks up a nested bucket. A leaf value under `name` is not a bucket.
    pub fn bucket(&self, name: &[u8]) -> Result<Option<Bucket<'tx>>> {
        match self.child(name)? {
            Some(Child::Bucket) => Ok(Some(self.child_bucket(name))),
            _ => Ok(None),
        }
    }

    /// Returns the leaf value stored under `key`; `None` if the key is
    /// absent or names a nested bucket.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.child(key)? {
            Some(Child::Value(value)) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    /// Calls `f` for every direct child in key order.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], Child) -> Result<()>,
    {
        let table_name = table_name(&self.path);
        let Some(table) = self.tx.open_children(&self.path)? else {
            return Ok(());
        };

        for item in table.iter()? {
            let (key, record) = item?;
            let child = Child::decode(&table_name, record.value())?;
            trace!(table = %table_name, bucket = child.is_bucket(), "visit child");
            f(key.value(), child)?;
        }
        Ok(())
    }

    /// Statistics for this bucket and everything nested under it.
    pub fn stats(&self) -> Result<BucketStats> {
        let mut stats = match self.tx.open_children(&self.path)? {
            Some(table) => BucketStats::from_table(table.len()?, &table.stats()?),
            None => BucketStats {
                bucket_n: 1,
                ..Default::default()
            },
        };

        let mut nested = Vec::new();
        self.for_each(|name, child| {
            if child.is_bucket() {
                nested.push(name.to_vec());
            }
            Ok(())
        })?;

        for name in nested {
            stats.add(&self.child_bucket(&name).stats()?);
        }
        Ok(stats)
    }

    fn child(&self, name: &[u8]) -> Result<Option<Child>> {
        let Some(table) = self.tx.open_children(&self.path)? else {
            return Ok(None);
        };
        let record = table.get(name)?;
        match record {
            Some(record) => Ok(Some(Child::decode(&table_name(&self.path), record.value())?)),
            None => Ok(None),
        }
    }

    fn child_bucket(&self, name: &[u8]) -> Bucket<'tx> {
        let mut path = self.path.clone();
        path.push(name.to_vec());
        Bucket { tx: self.tx, path }
    }
}

/// A read-write transaction. Nothing is persisted until [`WriteTx::commit`].
pub struct WriteTx {
    txn: WriteTransaction,
}

impl WriteTx {
    pub(crate) fn new(txn: WriteTransaction) -> Self {
        debug!("began write transaction");
        Self { txn }
    }

    pub fn root(&self) -> BucketMut<'_> {
        BucketMut {
            tx: self,
            path: Vec::new(),
        }
    }

    /// Returns the top-level bucket `name`, creating it if absent.
    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<BucketMut<'_>> {
        self.root().create_bucket_if_not_exists(name)
    }

    pub fn commit(self) -> Result<()> {
        self.txn.commit()?;
        debug!("committed write transaction");
        Ok(())
    }

    pub fn rollback(self) -> Result<()> {
        self.txn.abort()?;
        debug!("rolled back write transaction");
        Ok(())
    }
}

/// A bucket seen through a read-write transaction.
pub struct BucketMut<'tx> {
    tx: &'tx WriteTx,
    path: Vec<Vec<u8>>,
}

impl<'tx> BucketMut<'tx> {
    /// Returns the nested bucket `name`, creating it if absent.
    ///
    /// Fails with `IncompatibleValue` if `name` already holds a leaf value.
    pub fn create_bucket_if_not_exists(&self, name: &[u8]) -> Result<BucketMut<'tx>> {
        validate_name(name)?;

        let parent = table_name(&self.path);
        {
            let mut table = self.tx.txn.open_table(child_table(&parent))?;
            let existing = match table.get(name)? {
                Some(record) => Some(Child::decode(&parent, record.value())?),
                None => None,
            };
            match existing {
                Some(Child::Bucket) => {}
                Some(Child::Value(_)) => return Err(Error::IncompatibleValue),
                None => {
                    table.insert(name, Child::Bucket.encode().as_slice())?;
                    debug!(table = %parent, "created bucket");
                }
            }
        }

        let mut path = self.path.clone();
        path.push(name.to_vec());
        // Materialise the bucket's own table so empty buckets still report stats.
        self.tx.txn.open_table(child_table(&table_name(&path)))?;

        Ok(BucketMut { tx: self.tx, path })
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Fails with `IncompatibleValue` if `key` names a nested bucket.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        validate_entry(key, value)?;

        let name = table_name(&self.path);
        let mut table = self.tx.txn.open_table(child_table(&name))?;
        let is_bucket = match table.get(key)? {
            Some(record) => Child::decode(&name, record.value())?.is_bucket(),
            None => false,
        };
        if is_bucket {
            return Err(Error::IncompatibleValue);
        }

        table.insert(key, Child::Value(value.to_vec()).encode().as_slice())?;
        trace!(table = %name, len = value.len(), "put value");
        Ok(())
    }
}
