use redb::TableStats;

use crate::config::PAGE_SIZE;

/// Page and key statistics for a bucket, aggregated over all of its
/// descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Child records, sub-bucket markers included.
    pub key_n: u64,
    /// Maximum B+tree height among the bucket and its descendants.
    pub depth: u64,

    pub branch_page_n: u64,
    pub branch_overflow_n: u64,
    pub leaf_page_n: u64,
    pub leaf_overflow_n: u64,

    pub branch_alloc: u64,
    pub branch_inuse: u64,
    pub leaf_alloc: u64,
    pub leaf_inuse: u64,

    /// Buckets counted, including this one.
    pub bucket_n: u64,
}

impl BucketStats {
    pub(crate) fn from_table(len: u64, table: &TableStats) -> Self {
        let branch_pages = table.branch_pages();
        let leaf_pages = table.leaf_pages();
        let branch_alloc = branch_pages * PAGE_SIZE;
        let leaf_alloc = leaf_pages * PAGE_SIZE;

        // redb reports page metadata for the whole tree; charge branch pages
        // their share by page count.
        let branch_meta = share(table.metadata_bytes(), branch_pages, branch_pages + leaf_pages);
        let leaf_meta = table.metadata_bytes() - branch_meta;

        // Oversized values live in higher-order pages rather than overflow
        // chains, so there are no overflow pages to count.
        Self {
            key_n: len,
            depth: u64::from(table.tree_height()),
            branch_page_n: branch_pages,
            branch_overflow_n: 0,
            leaf_page_n: leaf_pages,
            leaf_overflow_n: 0,
            branch_alloc,
            branch_inuse: branch_meta.min(branch_alloc),
            leaf_alloc,
            leaf_inuse: (table.stored_bytes() + leaf_meta).min(leaf_alloc),
            bucket_n: 1,
        }
    }

    /// Folds a descendant's statistics into this one.
    pub fn add(&mut self, other: &BucketStats) {
        self.key_n += other.key_n;
        self.depth = self.depth.max(other.depth);
        self.branch_page_n += other.branch_page_n;
        self.branch_overflow_n += other.branch_overflow_n;
        self.leaf_page_n += other.leaf_page_n;
        self.leaf_overflow_n += other.leaf_overflow_n;
        self.branch_alloc += other.branch_alloc;
        self.branch_inuse += other.branch_inuse;
        self.leaf_alloc += other.leaf_alloc;
        self.leaf_inuse += other.leaf_inuse;
        self.bucket_n += other.bucket_n;
    }
}

/// `total * part / whole`, rounded down; zero when `whole` is zero.
fn share(total: u64, part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (u128::from(total) * u128::from(part) / u128::from(whole)) as u64
}
