use std::time::Duration;

use crate::error::{Error, Result};

/// Default bucket path separator.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Page size the store is created with; used to turn page counts into bytes.
pub const PAGE_SIZE: u64 = 4096;

/// Options for opening the store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long to keep retrying while another handle holds the file lock.
    pub open_timeout: Duration,
    pub retry_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            open_timeout: Duration::from_secs(1),
            retry_interval: Duration::from_millis(50),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval.is_zero() {
            return Err(Error::Config("retry interval must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Options shared by every query operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Splits a bucket path string into nested bucket names.
    pub separator: String,
    /// Adds type tags, trailing newlines and statistics to the output.
    pub verbose: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            verbose: false,
        }
    }
}

impl QueryConfig {
    pub fn new(separator: impl Into<String>, verbose: bool) -> Self {
        Self {
            separator: separator.into(),
            verbose,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("separator cannot be empty".to_string()));
        }
        Ok(())
    }
}
