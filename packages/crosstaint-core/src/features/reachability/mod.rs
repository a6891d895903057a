//! Reachability
//!
//! Array-bound check counting from local, network and cross-program inputs,
//! and the service that runs a whole analysis and assembles the report.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{AnalysisOutcome, AnalysisService};
pub use domain::{
    AnalysisReport, BoundCheckCount, Category, CategoryCounts, ProgramReport, ReachabilityError, ReportedPath,
    VisitedSet,
};
pub use infrastructure::{NearestSource, ReachabilityEngine};
