//! Shared check infrastructure: the `Check` trait every rule implements,
//! the tolerance primitives they're built from, and the registry that runs
//! the full catalog with per-check panic containment.

use crate::schema::{CheckCategory, CheckMetadata, CheckResult, FinancialModel, Severity};
use std::panic::{self, AssertUnwindSafe};

/// Absolute/relative tolerance pair a check is instantiated with.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    pub abs: f64,
    pub pct: f64,
}

impl Tolerance {
    pub fn new(abs: f64, pct: f64) -> Self {
        Self { abs, pct }
    }

    /// True when `|a - b| <= max(abs_tol, rel_tol * max(|a|, |b|))`, using
    /// this tolerance's defaults unless `abs_tol` is overridden.
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        self.is_close_abs(a, b, self.abs)
    }

    pub fn is_close_abs(&self, a: f64, b: f64, abs_tol: f64) -> bool {
        let rel = self.pct * a.abs().max(b.abs());
        (a - b).abs() <= abs_tol.max(rel)
    }
}

pub fn delta(actual: f64, expected: f64) -> f64 {
    actual - expected
}

/// `(actual - expected) / |expected|`, `None` when both are zero, `+inf`
/// when only `expected` is zero.
pub fn delta_pct(actual: f64, expected: f64) -> Option<f64> {
    if expected == 0.0 {
        if actual == 0.0 {
            None
        } else {
            Some(f64::INFINITY)
        }
    } else {
        Some((actual - expected) / expected.abs())
    }
}

/// A single verification rule. Implementors are stateless beyond their
/// tolerance and are shared behind `&dyn Check` by the registry.
pub trait Check: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn category(&self) -> CheckCategory;
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult>;
}

/// Builds a `CheckResult`, deriving `delta`/`delta_pct` when both values are
/// present so individual checks don't repeat the arithmetic.
pub fn build_result(
    check: &dyn Check,
    period: Option<&str>,
    severity: Severity,
    message: impl Into<String>,
    expected: Option<f64>,
    actual: Option<f64>,
    tolerance: Option<f64>,
) -> CheckResult {
    let (d, dp) = match (actual, expected) {
        (Some(a), Some(e)) => (Some(delta(a, e)), delta_pct(a, e)),
        _ => (None, None),
    };
    CheckResult {
        check_id: check.id().to_string(),
        check_name: check.name().to_string(),
        category: check.category(),
        severity,
        period: period.map(str::to_string),
        message: message.into(),
        expected_value: expected,
        actual_value: actual,
        delta: d,
        delta_pct: dp,
        tolerance,
        details: None,
    }
}

pub fn passed(check: &dyn Check, period: &str, expected: f64, actual: f64, tolerance: f64) -> CheckResult {
    build_result(
        check,
        Some(period),
        Severity::Pass,
        format!("{} holds for {period}", check.name()),
        Some(expected),
        Some(actual),
        Some(tolerance),
    )
}

pub fn failed(
    check: &dyn Check,
    period: &str,
    severity: Severity,
    message: impl Into<String>,
    expected: f64,
    actual: f64,
    tolerance: f64,
) -> CheckResult {
    build_result(
        check,
        Some(period),
        severity,
        message,
        Some(expected),
        Some(actual),
        Some(tolerance),
    )
}

/// Runs `tol.is_close(actual, expected)` and emits the matching pass/fail
/// result — the common shape behind most structural and cross-statement
/// checks.
pub fn check_close(
    check: &dyn Check,
    period: &str,
    tol: &Tolerance,
    expected: f64,
    actual: f64,
    fail_severity: Severity,
) -> CheckResult {
    if tol.is_close(expected, actual) {
        passed(check, period, expected, actual, tol.abs)
    } else {
        failed(
            check,
            period,
            fail_severity,
            format!(
                "{}: expected {:.4}, got {:.4} (delta {:.4})",
                check.name(),
                expected,
                actual,
                actual - expected
            ),
            expected,
            actual,
            tol.abs,
        )
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked with a non-string payload".to_string()
    }
}

/// The populated, filterable set of checks the engine runs against a model.
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new(
        tolerance_abs: f64,
        tolerance_pct: f64,
        category_allowlist: Option<&[CheckCategory]>,
        check_id_denylist: &[String],
    ) -> Self {
        let tol = Tolerance::new(tolerance_abs, tolerance_pct);
        let checks = crate::checks::all_checks(tol)
            .into_iter()
            .filter(|c| category_allowlist.map_or(true, |allow| allow.contains(&c.category())))
            .filter(|c| !check_id_denylist.iter().any(|id| id == c.id()))
            .collect();
        Self { checks }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every registered check against `model`. A check that panics is
    /// isolated via `catch_unwind` and recorded in the returned metadata
    /// list instead of aborting the run.
    pub fn run(&self, model: &FinancialModel) -> (Vec<CheckResult>, Vec<CheckMetadata>) {
        let mut results = Vec::new();
        let mut metadata = Vec::new();

        for check in &self.checks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.run(model)));
            match outcome {
                Ok(mut rs) => results.append(&mut rs),
                Err(payload) => {
                    log::error!("check {} panicked", check.id());
                    metadata.push(CheckMetadata {
                        check_id: check.id().to_string(),
                        status: "error".to_string(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }

        (results, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_close_honors_absolute_and_relative_tolerance() {
        let tol = Tolerance::new(1.0, 0.01);
        assert!(tol.is_close(1000.0, 1005.0));
        assert!(!tol.is_close(1000.0, 1020.0));
        assert!(tol.is_close(0.5, 1.0));
    }

    #[test]
    fn delta_pct_handles_zero_expected() {
        assert_eq!(delta_pct(0.0, 0.0), None);
        assert_eq!(delta_pct(5.0, 0.0), Some(f64::INFINITY));
        assert_eq!(delta_pct(110.0, 100.0), Some(0.1));
    }

    struct AlwaysPanics;
    impl Check for AlwaysPanics {
        fn id(&self) -> &'static str {
            "TEST-PANIC"
        }
        fn name(&self) -> &'static str {
            "always panics"
        }
        fn category(&self) -> CheckCategory {
            CheckCategory::Structural
        }
        fn run(&self, _model: &FinancialModel) -> Vec<CheckResult> {
            panic!("boom");
        }
    }

    #[test]
    fn registry_contains_the_full_catalog_by_default() {
        let registry = CheckRegistry::new(1.0, 0.01, None, &[]);
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn registry_filters_by_category_and_denylist() {
        let registry = CheckRegistry::new(
            1.0,
            0.01,
            Some(&[CheckCategory::Structural]),
            &["STR-001".to_string()],
        );
        assert!(registry.len() > 0);
        assert!(!registry
            .checks
            .iter()
            .any(|c| c.category() != CheckCategory::Structural));
        assert!(!registry.checks.iter().any(|c| c.id() == "STR-001"));
    }
}
