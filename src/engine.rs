//! The verification engine: wires a mapping configuration and tolerance
//! settings into a populated [`CheckRegistry`], then runs it against a
//! parsed model (or a raw input path) to produce a [`VerificationReport`].

use crate::checks::CheckRegistry;
use crate::error::Result;
use crate::ingestion::auto_parse;
use crate::mapping::MappingConfig;
use crate::report::VerificationReport;
use crate::schema::{CheckCategory, FinancialModel, MappingDiagnostics};
use std::path::Path;

/// Tuning knobs for a verification run, separate from the mapping
/// configuration: tolerance defaults and which parts of the check catalog
/// to run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tolerance_abs: f64,
    pub tolerance_pct: f64,
    pub category_allowlist: Option<Vec<CheckCategory>>,
    pub check_id_denylist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance_abs: 0.01,
            tolerance_pct: 0.0001,
            category_allowlist: None,
            check_id_denylist: Vec::new(),
        }
    }
}

pub struct VerificationEngine {
    mapping_config: MappingConfig,
    registry: CheckRegistry,
}

impl VerificationEngine {
    pub fn new(mapping_config: MappingConfig, engine_config: &EngineConfig) -> Self {
        let registry = CheckRegistry::new(
            engine_config.tolerance_abs,
            engine_config.tolerance_pct,
            engine_config.category_allowlist.as_deref(),
            &engine_config.check_id_denylist,
        );
        Self {
            mapping_config,
            registry,
        }
    }

    pub fn check_count(&self) -> usize {
        self.registry.len()
    }

    /// Runs the full registered check catalog against an already-built
    /// model, producing a report timestamped with `timestamp`.
    pub fn verify_model(&self, model: &FinancialModel, timestamp: impl Into<String>) -> VerificationReport {
        let (results, check_metadata) = self.registry.run(model);
        VerificationReport::build(
            &model.company_name,
            timestamp,
            model.get_ordered_periods(),
            results,
            check_metadata,
        )
    }

    /// Ingests `path` via [`auto_parse`] using this engine's mapping
    /// configuration, then verifies the resulting model.
    pub fn verify_path(
        &self,
        path: impl AsRef<Path>,
        timestamp: impl Into<String>,
    ) -> Result<(VerificationReport, Vec<MappingDiagnostics>)> {
        let (model, diagnostics) = auto_parse(path, &self.mapping_config)?;
        Ok((self.verify_model(&model, timestamp), diagnostics))
    }
}
