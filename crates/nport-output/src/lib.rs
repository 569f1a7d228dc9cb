#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nport/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod record;
pub mod summary;

pub use export::{ExportError, ExportFormat, ExportOutcome, Exporter, write_results};
pub use record::{HoldingRecord, ResultSet, columns};
pub use summary::{RunSummary, SkipEntry};
