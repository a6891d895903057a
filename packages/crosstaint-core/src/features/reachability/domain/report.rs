//! Analysis report
//!
//! Per-program array totals, the four vulnerability counts and the
//! contributing paths as label sequences. Rendering is left to callers; the
//! report serializes to JSON as-is.

use crate::features::dependency_graph::GraphStats;
use crate::shared::models::ProgramId;
use serde::{Deserialize, Serialize};

/// Which counting pass a path or count belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Local,
    Network,
    Cross,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Local, Category::Network, Category::Cross];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Local => "local",
            Category::Network => "network",
            Category::Cross => "cross",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub local: u64,
    /// Network-driven, excluding what local inputs already reach
    pub network: u64,
    pub cross: u64,
    /// Network-driven count not attributable to the other program
    pub false_positive: u64,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Local => self.local,
            Category::Network => self.network,
            Category::Cross => self.cross,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedPath {
    pub category: Category,
    /// Node labels from source to Mem node
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramReport {
    pub program: ProgramId,
    /// Total array-bound checks of the program's Mem nodes
    pub array_count: u64,
    pub counts: CategoryCounts,
    pub paths: Vec<ReportedPath>,
}

impl ProgramReport {
    pub fn paths_of(&self, category: Category) -> impl Iterator<Item = &ReportedPath> + '_ {
        self.paths.iter().filter(move |p| p.category == category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub programs: Vec<ProgramReport>,
    pub graph: GraphStats,
}

impl AnalysisReport {
    pub fn program(&self, program: ProgramId) -> Option<&ProgramReport> {
        self.programs.iter().find(|r| r.program == program)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisReport {
        AnalysisReport {
            programs: vec![ProgramReport {
                program: ProgramId::Second,
                array_count: 7,
                counts: CategoryCounts {
                    local: 1,
                    network: 4,
                    cross: 3,
                    false_positive: 1,
                },
                paths: vec![ReportedPath {
                    category: Category::Cross,
                    labels: vec!["input:net:recv".into(), "mem:buf".into()],
                }],
            }],
            graph: GraphStats::default(),
        }
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"false_positive\": 1"));
        assert!(json.contains("\"category\": \"cross\""));
        assert_eq!(AnalysisReport::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_lookup_helpers() {
        let report = sample();
        let p2 = report.program(ProgramId::Second).unwrap();
        assert_eq!(p2.counts.get(Category::Network), 4);
        assert_eq!(p2.paths_of(Category::Cross).count(), 1);
        assert_eq!(p2.paths_of(Category::Local).count(), 0);
        assert!(report.program(ProgramId::First).is_none());
    }
}
