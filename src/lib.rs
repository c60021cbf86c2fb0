pub mod config;
pub mod error;
pub mod logging;
pub mod path;
pub mod query;
pub mod store;

pub use config::{QueryConfig, StoreConfig};
pub use error::{Error, Result};
pub use path::BucketPath;
pub use query::QueryCli;
pub use store::{Bucket, BucketMut, BucketStats, Child, ReadTx, Store, WriteTx};
