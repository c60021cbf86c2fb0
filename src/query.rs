//! The query and mutation operations behind the command line.
//!
//! Every operation runs inside exactly one transaction: reads in a
//! read-only one that is always rolled back, writes in a read-write one
//! that commits only if every step succeeds.

use std::io::Write;

use tracing::debug;

use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::path::BucketPath;
use crate::store::{Bucket, BucketStats, Child, ReadTx, Store};

/// An open store plus the options every operation shares.
pub struct QueryCli {
    store: Store,
    config: QueryConfig,
}

impl QueryCli {
    pub fn new(store: Store, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Resolves a separator-delimited bucket path inside `tx`.
    ///
    /// Returns `None` as soon as a segment is empty or does not name an
    /// existing bucket. Never creates anything.
    pub fn resolve<'tx>(&self, tx: &'tx ReadTx, path: &str) -> Result<Option<Bucket<'tx>>> {
        let Ok(path) = BucketPath::parse(path, &self.config.separator) else {
            return Ok(None);
        };

        let Some(mut bucket) = tx.bucket(path.first())? else {
            return Ok(None);
        };
        for segment in path.rest() {
            match bucket.bucket(segment)? {
                Some(child) => bucket = child,
                None => return Ok(None),
            }
        }
        Ok(Some(bucket))
    }

    /// Writes the name of every top-level bucket, plus its statistics in
    /// verbose mode.
    pub fn list_buckets<W: Write>(&self, out: &mut W) -> Result<()> {
        self.store.view(|tx| {
            tx.for_each_bucket(|name, bucket| {
                out.write_all(name)?;
                out.write_all(b"\n")?;
                if self.config.verbose {
                    write_stats(out, &bucket.stats()?)?;
                }
                Ok(())
            })
        })?;
        out.flush()?;
        Ok(())
    }

    /// Writes the direct children of the bucket at `bucket`.
    ///
    /// Only leaf keys are listed unless verbose, in which case nested
    /// buckets are tagged `(bucket)` and leaves are shown with their value.
    pub fn list_keys<W: Write>(&self, out: &mut W, bucket: &str) -> Result<()> {
        let verbose = self.config.verbose;
        self.store.view(|tx| {
            let target = self.resolve(tx, bucket)?.ok_or_else(|| Error::BucketNotFound {
                bucket: bucket.to_string(),
            })?;

            target.for_each(|name, child| {
                match child {
                    Child::Bucket if verbose => {
                        out.write_all(name)?;
                        out.write_all(b" (bucket)\n")?;
                    }
                    Child::Bucket => {}
                    Child::Value(value) if verbose => {
                        out.write_all(name)?;
                        out.write_all(b" -> ")?;
                        out.write_all(&value)?;
                        out.write_all(b"\n")?;
                    }
                    Child::Value(_) => {
                        out.write_all(name)?;
                        out.write_all(b"\n")?;
                    }
                }
                Ok(())
            })
        })?;
        out.flush()?;
        Ok(())
    }

    /// Writes the raw value of `key`; verbose mode appends a newline.
    pub fn get_key<W: Write>(&self, out: &mut W, bucket: &str, key: &str) -> Result<()> {
        let value = self.store.view(|tx| {
            let target = self.resolve(tx, bucket)?.ok_or_else(|| Error::BucketNotFound {
                bucket: bucket.to_string(),
            })?;
            target.get(key.as_bytes())?.ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
                bucket: bucket.to_string(),
            })
        })?;

        write_value(out, &value)?;
        if self.config.verbose {
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Stores `value` under `key`, creating every missing bucket on the way.
    pub fn set_key(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        let path = BucketPath::parse(bucket, &self.config.separator)?;
        self.store.update(|tx| {
            let mut target = tx.create_bucket_if_not_exists(path.first())?;
            for segment in path.rest() {
                target = target.create_bucket_if_not_exists(segment)?;
            }
            target.put(key.as_bytes(), value)
        })?;
        debug!(bucket = %path, key, len = value.len(), "set key");
        Ok(())
    }

    /// Renders the whole bucket hierarchy from a single snapshot.
    pub fn dump_tree<W: Write>(&self, out: &mut W) -> Result<()> {
        self.store.view(|tx| display_bucket(out, &tx.root(), 0))?;
        out.flush()?;
        Ok(())
    }
}

/// Writes all of `value`, failing with `ShortWrite` if the writer stops
/// accepting bytes before the end.
fn write_value<W: Write>(out: &mut W, value: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < value.len() {
        match out.write(&value[written..]) {
            Ok(0) => {
                return Err(Error::ShortWrite {
                    written,
                    expected: value.len(),
                })
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Nested buckets first, sorted by name and fully expanded, then the leaf
/// keys of this level in key order.
fn display_bucket<W: Write>(out: &mut W, bucket: &Bucket<'_>, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    let mut buckets = Vec::new();
    let mut keys = Vec::new();

    bucket.for_each(|name, child| {
        match child {
            Child::Bucket => buckets.push(name.to_vec()),
            Child::Value(value) => keys.push((name.to_vec(), value.len())),
        }
        Ok(())
    })?;

    buckets.sort();
    for name in &buckets {
        write!(out, "{}* ", indent)?;
        out.write_all(name)?;
        out.write_all(b"\n")?;
        if let Some(child) = bucket.bucket(name)? {
            display_bucket(out, &child, depth + 1)?;
        }
    }

    for (name, len) in &keys {
        write!(out, "{} - ", indent)?;
        out.write_all(name)?;
        writeln!(out, " ({} bytes)", len)?;
    }
    Ok(())
}

fn write_stats<W: Write>(out: &mut W, stats: &BucketStats) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "  Keys:  {}", pad(stats.key_n, 10))?;
    writeln!(out, "  Depth: {}", pad(stats.depth, 10))?;
    writeln!(out)?;
    writeln!(out, "  Logical Branch Pages:           {}", pad(stats.branch_page_n, 6))?;
    writeln!(out, "  Physical Branch Overflow Pages: {}", pad(stats.branch_overflow_n, 6))?;
    writeln!(out, "  Logical Leaf Pages:             {}", pad(stats.leaf_page_n, 6))?;
    writeln!(out, "  Physical Leaf Overflow Pages:   {}", pad(stats.leaf_overflow_n, 6))?;
    writeln!(out)?;
    writeln!(out, "  Bytes allocated for physical branch pages: {}", pad(stats.branch_alloc, 12))?;
    writeln!(out, "  Bytes in-use for branch data:              {}", pad(stats.branch_inuse, 12))?;
    writeln!(out, "  Bytes allocated for physical leaf pages:   {}", pad(stats.leaf_alloc, 12))?;
    writeln!(out, "  Bytes in-use for leaf data:                {}", pad(stats.leaf_inuse, 12))?;
    writeln!(out)?;
    Ok(())
}

/// Right-aligns `n` in `width` columns; zero renders as blanks.
fn pad(n: u64, width: usize) -> String {
    if n == 0 {
        " ".repeat(width)
    } else {
        format!("{:>width$}", n, width = width)
    }
}
