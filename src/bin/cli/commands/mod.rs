//! Maps positional arguments onto query operations.

use std::io::Write;

use bucketq::{QueryCli, Result};

/// One top-level operation per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListBuckets,
    ListKeys { bucket: String },
    GetKey { bucket: String, key: String },
    SetKey { bucket: String, key: String, value: String },
    DumpTree,
}

impl Operation {
    /// Picks the operation from the positionals after the db path.
    ///
    /// Returns `None` when the argument count is not one the tool accepts.
    pub fn from_args(tree: bool, rest: &[String]) -> Option<Self> {
        if tree {
            return Some(Operation::DumpTree);
        }
        match rest {
            [] => Some(Operation::ListBuckets),
            [bucket] => Some(Operation::ListKeys {
                bucket: bucket.clone(),
            }),
            [bucket, key] => Some(Operation::GetKey {
                bucket: bucket.clone(),
                key: key.clone(),
            }),
            [bucket, key, value] => Some(Operation::SetKey {
                bucket: bucket.clone(),
                key: key.clone(),
                value: value.clone(),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListBuckets => "list-buckets",
            Operation::ListKeys { .. } => "list-keys",
            Operation::GetKey { .. } => "get-key",
            Operation::SetKey { .. } => "set-key",
            Operation::DumpTree => "dump-tree",
        }
    }

    pub fn execute<W: Write>(&self, cli: &QueryCli, out: &mut W) -> Result<()> {
        tracing::debug!(operation = self.name(), "executing");
        match self {
            Operation::ListBuckets => cli.list_buckets(out),
            Operation::ListKeys { bucket } => cli.list_keys(out, bucket),
            Operation::GetKey { bucket, key } => cli.get_key(out, bucket, key),
            Operation::SetKey { bucket, key, value } => cli.set_key(bucket, key, value.as_bytes()),
            Operation::DumpTree => cli.dump_tree(out),
        }
    }
}
