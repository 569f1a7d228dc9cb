#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/nport/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod extract;
pub mod pipeline;
pub mod resolver;
pub mod source;
pub mod universe;

// Re-export main types from sub-crates
pub use nport_data as data;
pub use nport_output as output;

pub use config::{ConfigError, PipelineConfig, ResolverMode, SourceMode};
pub use pipeline::{Pipeline, PipelineError, RunReport, Skip, SkipReason};
pub use source::{EdgarSource, FilingSource};
pub use universe::{CefUniverse, TickerSet};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
