//! On-disk layout of buckets inside the embedded store.
//!
//! Every bucket (and the root namespace) is one table keyed by child name.
//! The first byte of each record says whether the child is a nested bucket
//! or a leaf value.

use std::fmt::Write;

use redb::TableDefinition;

use crate::error::{Error, Result};

const TABLE_PREFIX: &str = "bucketq:";
const BUCKET_TAG: u8 = 0x00;
const VALUE_TAG: u8 = 0x01;

/// Largest accepted key or bucket name.
pub const MAX_KEY_SIZE: usize = 32768;
/// Largest accepted value.
pub const MAX_VALUE_SIZE: usize = (1 << 31) - 2;

pub(crate) type ChildTable<'a> = TableDefinition<'a, &'static [u8], &'static [u8]>;

/// A direct child of a bucket: either a nested bucket or a leaf value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Bucket,
    Value(Vec<u8>),
}

impl Child {
    pub fn is_bucket(&self) -> bool {
        matches!(self, Child::Bucket)
    }

    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Child::Bucket => None,
            Child::Value(value) => Some(value),
        }
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        match self {
            Child::Bucket => vec![BUCKET_TAG],
            Child::Value(value) => {
                let mut record = Vec::with_capacity(value.len() + 1);
                record.push(VALUE_TAG);
                record.extend_from_slice(value);
                record
            }
        }
    }

    pub(crate) fn decode(table: &str, record: &[u8]) -> Result<Self> {
        match record.split_first() {
            Some((&BUCKET_TAG, [])) => Ok(Child::Bucket),
            Some((&VALUE_TAG, value)) => Ok(Child::Value(value.to_vec())),
            Some((&tag, _)) => Err(Error::CorruptRecord {
                table: table.to_string(),
                tag,
            }),
            None => Err(Error::CorruptRecord {
                table: table.to_string(),
                tag: 0xff,
            }),
        }
    }
}

/// Table name for the bucket at `path`; the empty path is the root namespace.
pub(crate) fn table_name(path: &[Vec<u8>]) -> String {
    let mut name = String::from(TABLE_PREFIX);
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            name.push('/');
        }
        for b in segment {
            let _ = write!(name, "{:02x}", b);
        }
    }
    name
}

pub(crate) fn child_table(name: &str) -> ChildTable<'_> {
    TableDefinition::new(name)
}

pub(crate) fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() {
        return Err(Error::BucketNameRequired);
    }
    if name.len() > MAX_KEY_SIZE {
        return Err(Error::KeyTooLarge(name.len()));
    }
    Ok(())
}

pub(crate) fn validate_entry(key: &[u8], value: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::KeyRequired);
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(Error::KeyTooLarge(key.len()));
    }
    if value.len() > MAX_VALUE_SIZE {
        return Err(Error::ValueTooLarge(value.len()));
    }
    Ok(())
}
