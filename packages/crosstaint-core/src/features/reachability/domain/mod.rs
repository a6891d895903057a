//! Reachability Domain
//!
//! Counting results, the counted-node set and the report model.

pub mod count;
pub mod error;
pub mod report;
pub mod visited;

pub use count::BoundCheckCount;
pub use error::ReachabilityError;
pub use report::{AnalysisReport, Category, CategoryCounts, ProgramReport, ReportedPath};
pub use visited::VisitedSet;
