use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    StoreOpen(#[from] redb::DatabaseError),

    #[error("timed out after {0:?} waiting for the database lock")]
    LockTimeout(std::time::Duration),

    #[error("bucket {bucket:?} does not exist")]
    BucketNotFound { bucket: String },

    #[error("key {key:?} in bucket {bucket:?} does not exist")]
    KeyNotFound { key: String, bucket: String },

    #[error("only wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),

    #[error(transparent)]
    Commit(#[from] redb::CommitError),

    #[error(transparent)]
    Table(#[from] redb::TableError),

    #[error(transparent)]
    Storage(#[from] redb::StorageError),

    #[error("corrupt record in table {table}: unknown tag {tag:#04x}")]
    CorruptRecord { table: String, tag: u8 },

    #[error("incompatible value")]
    IncompatibleValue,

    #[error("bucket name required")]
    BucketNameRequired,

    #[error("key required")]
    KeyRequired,

    #[error("key too large: {0} bytes")]
    KeyTooLarge(usize),

    #[error("value too large: {0} bytes")]
    ValueTooLarge(usize),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures that happen before the store is usable; these are
    /// reported with the `error opening db:` prefix.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Error::FileOpen { .. } | Error::StoreOpen(_) | Error::LockTimeout(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Operator-facing line, without the trailing newline.
    pub fn report(&self) -> String {
        if self.is_open_error() {
            format!("error opening db: {}", self)
        } else {
            format!("error: {}", self)
        }
    }
}
