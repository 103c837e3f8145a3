//! The verification report: severity/category rollups over a batch of
//! `CheckResult`s, plus the JSON shape external callers consume.

use crate::error::Result;
use crate::schema::{CheckCategory, CheckMetadata, CheckResult, OverallHealth, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub pass: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
            Severity::Pass => self.pass += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub company_name: String,
    pub timestamp: String,
    pub overall_health: OverallHealth,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub by_severity: SeverityCounts,
    pub by_category: BTreeMap<String, CategorySummary>,
    pub periods_analyzed: Vec<String>,
}

/// The engine's final output: a summary rollup alongside the full result and
/// check-failure-metadata lists, serializable as the report JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub summary: ReportSummary,
    pub check_metadata: Vec<CheckMetadata>,
    pub results: Vec<CheckResult>,
}

impl VerificationReport {
    pub fn build(
        company_name: &str,
        timestamp: impl Into<String>,
        periods_analyzed: Vec<String>,
        results: Vec<CheckResult>,
        check_metadata: Vec<CheckMetadata>,
    ) -> Self {
        let overall_health = OverallHealth::from_results(&results);

        let mut by_severity = SeverityCounts::default();
        let mut by_category: BTreeMap<String, CategorySummary> = BTreeMap::new();
        for category in [
            CheckCategory::Structural,
            CheckCategory::CrossStatement,
            CheckCategory::Reasonableness,
        ] {
            by_category.insert(category.as_str().to_string(), CategorySummary::default());
        }

        let mut passed = 0usize;
        let mut failed = 0usize;

        for result in &results {
            by_severity.record(result.severity);
            let entry = by_category.entry(result.category.as_str().to_string()).or_default();
            entry.total += 1;
            if result.severity == Severity::Pass {
                entry.passed += 1;
                passed += 1;
            } else {
                entry.failed += 1;
                failed += 1;
            }
        }

        for entry in by_category.values_mut() {
            entry.pass_rate = if entry.total == 0 {
                1.0
            } else {
                entry.passed as f64 / entry.total as f64
            };
        }

        let total_checks = results.len();
        let pass_rate = if total_checks == 0 {
            1.0
        } else {
            passed as f64 / total_checks as f64
        };

        Self {
            summary: ReportSummary {
                company_name: company_name.to_string(),
                timestamp: timestamp.into(),
                overall_health,
                total_checks,
                passed,
                failed,
                pass_rate,
                by_severity,
                by_category,
                periods_analyzed,
            },
            check_metadata,
            results,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Results at or above the given severity, in their original order.
    pub fn results_at_least(&self, minimum: Severity) -> Vec<&CheckResult> {
        self.results.iter().filter(|r| r.severity >= minimum).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CheckCategory;

    fn result(severity: Severity, category: CheckCategory) -> CheckResult {
        CheckResult {
            check_id: "TEST-001".to_string(),
            check_name: "test".to_string(),
            category,
            severity,
            period: Some("FY2024".to_string()),
            message: "ok".to_string(),
            expected_value: None,
            actual_value: None,
            delta: None,
            delta_pct: None,
            tolerance: None,
            details: None,
        }
    }

    #[test]
    fn summary_tallies_severities_and_categories() {
        let results = vec![
            result(Severity::Pass, CheckCategory::Structural),
            result(Severity::Error, CheckCategory::Structural),
            result(Severity::Warning, CheckCategory::Reasonableness),
        ];
        let report = VerificationReport::build(
            "ACME",
            "2024-01-01T00:00:00Z",
            vec!["FY2024".to_string()],
            results,
            vec![],
        );

        assert_eq!(report.summary.total_checks, 3);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.overall_health, OverallHealth::ErrorsFound);
        assert_eq!(report.summary.by_severity.error, 1);
        assert_eq!(report.summary.by_severity.warning, 1);

        let structural = &report.summary.by_category["structural"];
        assert_eq!(structural.total, 2);
        assert_eq!(structural.passed, 1);
    }

    #[test]
    fn empty_results_are_clean_with_full_pass_rate() {
        let report = VerificationReport::build("ACME", "t", vec![], vec![], vec![]);
        assert_eq!(report.summary.overall_health, OverallHealth::Clean);
        assert_eq!(report.summary.pass_rate, 1.0);
    }

    #[test]
    fn to_json_round_trips_through_serde() {
        let report = VerificationReport::build(
            "ACME",
            "t",
            vec!["FY2024".to_string()],
            vec![result(Severity::Pass, CheckCategory::CrossStatement)],
            vec![],
        );
        let json = report.to_json().unwrap();
        assert!(json.contains("\"company_name\": \"ACME\""));
    }
}
