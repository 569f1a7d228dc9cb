//! Bulk N-PORT objects mirrored on the public `sec-edgar` S3 bucket.
//!
//! Objects under `forms/nport-p/` ending in `.jsonl.gz` hold one JSON record
//! per line, gzip-compressed. [`BulkClient`] lists and downloads them without
//! credentials; [`decode_jsonl_gz`] streams an object's records to a visitor.

pub mod client;
pub mod jsonl;
pub mod listing;

pub use client::BulkClient;
pub use jsonl::{LineStats, decode_jsonl_gz, visit_json_lines};
pub use listing::ListBucketPage;

/// Bucket holding the N-PORT mirror.
pub const BULK_BUCKET: &str = "sec-edgar";

/// Key prefix of N-PORT objects.
pub const BULK_PREFIX: &str = "forms/nport-p/";

/// Key suffix of holdings-bearing objects.
pub const BULK_SUFFIX: &str = ".jsonl.gz";
