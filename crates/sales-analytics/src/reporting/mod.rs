//! Report output.
//!
//! The pipeline produces an [`AnalysisReport`](crate::pipeline::AnalysisReport);
//! this module only formats it:
//! - JSON file output (`--emit-report` CLI flag) via [`ReportGenerator`]
//! - Console text via [`render_text`] or the [`ReportText`] display wrapper
//!
//! Neither path re-derives any aggregate.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_analytics::reporting::{render_text, ReportGenerator};
//!
//! println!("{}", render_text(&report));
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"), None);
//! generator.write_report_to_file(&report, "vgsales")?;
//! ```

mod generator;
mod text;

pub use generator::{DEFAULT_REPORT_NAME, ReportGenerator};
pub use text::{ReportText, render_text};
