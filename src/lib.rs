//! Hiber Flux - Body temperature phase segmentation for hibernating animals
//!
//! Hiber Flux turns a core body temperature series and a set of per-subject
//! parameters into labelled hibernation events through a deterministic
//! pipeline: parameter normalization → interval estimation → segmentation scan
//! → event repair → report encoding.
//!
//! ## Modules
//!
//! - **Analysis**: `normalizer`, `interval`, `predicates`, `segmentation`, `repair`
//! - **Facade**: `pipeline` runs one subject or a parallel batch
//! - **I/O**: `adapters` read logger exports and parameter sheets, `report`
//!   writes summary tables and JSON reports

pub mod adapters;
pub mod error;
pub mod interval;
pub mod normalizer;
pub mod pipeline;
pub mod predicates;
pub mod repair;
pub mod report;
pub mod segmentation;
pub mod types;

pub use error::AnalysisError;
pub use interval::SamplingInterval;
pub use normalizer::{ParameterNormalizer, RawSubjectParams, SubjectParams};
pub use pipeline::{analyze, analyze_batch, analyze_series, HibernationProcessor};
pub use report::{AnalysisReport, ReportEncoder};
pub use types::{EventCategory, HibernationResult, SampleSeries, TerminalStatus};

/// Hiber Flux version embedded in all reports
pub const HIBER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "hiber-flux";
