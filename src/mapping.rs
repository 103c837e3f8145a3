//! Mapping configuration: the alias catalog that teaches the resolver which
//! human-written labels mean which canonical field, plus the post-ingest
//! cash-flow sign normalizer.

use crate::error::Result;
use crate::normalize::normalize;
use crate::schema::{CashFlowStatement, Statement, StatementType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedFieldsPolicy {
    #[default]
    Warn,
    Error,
    Ignore,
}

/// Engine-wide tuning knobs. Each field is optional so a partial document can
/// be layered as an override on top of a base config (spec: "override-wins
/// for settings" — applied per key, not wholesale).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSettings {
    pub fuzzy_threshold: Option<i32>,
    pub unmapped_fields: Option<UnmappedFieldsPolicy>,
    pub auto_sign_normalization: Option<bool>,
}

impl MappingSettings {
    pub fn fuzzy_threshold(&self) -> i32 {
        self.fuzzy_threshold.unwrap_or(85)
    }

    pub fn unmapped_fields(&self) -> UnmappedFieldsPolicy {
        self.unmapped_fields.unwrap_or_default()
    }

    pub fn auto_sign_normalization(&self) -> bool {
        self.auto_sign_normalization.unwrap_or(true)
    }

    fn merge(base: &Self, over: &Self) -> Self {
        Self {
            fuzzy_threshold: over.fuzzy_threshold.or(base.fuzzy_threshold),
            unmapped_fields: over.unmapped_fields.or(base.unmapped_fields),
            auto_sign_normalization: over
                .auto_sign_normalization
                .or(base.auto_sign_normalization),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldAliases {
    #[serde(default)]
    pub aliases: Vec<String>,
}

type Catalog = BTreeMap<String, FieldAliases>;

#[derive(Debug, Clone, Default)]
struct ReverseIndex {
    exact: BTreeMap<String, String>,
    /// `(normalized_alias, canonical_field)`, sorted by alias byte order —
    /// the deterministic iteration order the substring/fuzzy stages use.
    sorted: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub settings: MappingSettings,
    #[serde(default)]
    pub income_statement: Catalog,
    #[serde(default)]
    pub balance_sheet: Catalog,
    #[serde(default)]
    pub cash_flow: Catalog,

    #[serde(skip)]
    index: BTreeMap<StatementType, ReverseIndex>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

fn alias_set(canonical: &str, aliases: &FieldAliases) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    set.insert(normalize(canonical));
    for a in &aliases.aliases {
        set.insert(normalize(a));
    }
    set
}

/// Folds `base_catalog` in first (first-wins among its own entries, in
/// canonical-field sorted order), then `override_catalog` on top with
/// unconditional overwrite — the "override reverse-index entries win" rule.
fn resolve_index(
    base_catalog: &Catalog,
    override_catalog: Option<&Catalog>,
    stmt: StatementType,
    warnings: &mut Vec<String>,
) -> ReverseIndex {
    let mut exact: BTreeMap<String, String> = BTreeMap::new();

    for (canonical, aliases) in base_catalog {
        for norm in alias_set(canonical, aliases) {
            if norm.is_empty() {
                continue;
            }
            match exact.get(&norm) {
                None => {
                    exact.insert(norm, canonical.clone());
                }
                Some(existing) if existing != canonical => {
                    warnings.push(format!(
                        "{}: alias '{}' already mapped to '{}', ignoring duplicate for '{}'",
                        stmt.as_str(),
                        norm,
                        existing,
                        canonical
                    ));
                }
                _ => {}
            }
        }
    }

    if let Some(over) = override_catalog {
        for (canonical, aliases) in over {
            for norm in alias_set(canonical, aliases) {
                if norm.is_empty() {
                    continue;
                }
                match exact.get(&norm) {
                    None => {
                        exact.insert(norm, canonical.clone());
                    }
                    Some(existing) if existing != canonical => {
                        warnings.push(format!(
                            "{}: override alias '{}' reassigned from '{}' to '{}'",
                            stmt.as_str(),
                            norm,
                            existing,
                            canonical
                        ));
                        exact.insert(norm, canonical.clone());
                    }
                    _ => {}
                }
            }
        }
    }

    let mut sorted: Vec<(String, String)> =
        exact.iter().map(|(a, c)| (a.clone(), c.clone())).collect();
    sorted.sort();
    ReverseIndex { exact, sorted }
}

impl MappingConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut config: MappingConfig = serde_yaml::from_str(text)?;
        if let Some(threshold) = config.settings.fuzzy_threshold {
            if !(0..=100).contains(&threshold) {
                return Err(crate::error::VerifyError::InvalidFuzzyThreshold(threshold));
            }
        }
        config.build_index();
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    fn catalog(&self, stmt: StatementType) -> &Catalog {
        match stmt {
            StatementType::IncomeStatement => &self.income_statement,
            StatementType::BalanceSheet => &self.balance_sheet,
            StatementType::CashFlow => &self.cash_flow,
        }
    }

    fn build_index(&mut self) {
        self.index.clear();
        self.warnings.clear();
        for stmt in StatementType::all() {
            let mut warnings = Vec::new();
            let index = resolve_index(self.catalog(stmt), None, stmt, &mut warnings);
            self.warnings.extend(warnings);
            self.index.insert(stmt, index);
        }
    }

    /// Layers `over` on top of `base`: settings override per-key, alias
    /// tables union by canonical field, and override's own alias→field
    /// assignments win any reverse-index collision against base's.
    pub fn merge(base: &MappingConfig, over: &MappingConfig) -> MappingConfig {
        let mut merged = MappingConfig {
            settings: MappingSettings::merge(&base.settings, &over.settings),
            income_statement: merge_catalog(&base.income_statement, &over.income_statement),
            balance_sheet: merge_catalog(&base.balance_sheet, &over.balance_sheet),
            cash_flow: merge_catalog(&base.cash_flow, &over.cash_flow),
            index: BTreeMap::new(),
            warnings: Vec::new(),
        };

        for stmt in StatementType::all() {
            let (base_cat, over_cat) = match stmt {
                StatementType::IncomeStatement => (&base.income_statement, &over.income_statement),
                StatementType::BalanceSheet => (&base.balance_sheet, &over.balance_sheet),
                StatementType::CashFlow => (&base.cash_flow, &over.cash_flow),
            };
            let mut warnings = Vec::new();
            let index = resolve_index(base_cat, Some(over_cat), stmt, &mut warnings);
            merged.warnings.extend(warnings);
            merged.index.insert(stmt, index);
        }

        merged
    }

    /// Exact reverse-index lookup: `normalize(label)` or
    /// `normalize_aggressive(label)` → canonical field, if present.
    pub fn exact_lookup(&self, stmt: StatementType, normalized: &str) -> Option<&str> {
        self.index
            .get(&stmt)
            .and_then(|idx| idx.exact.get(normalized))
            .map(|s| s.as_str())
    }

    /// All `(normalized_alias, canonical_field)` pairs, sorted by alias byte
    /// order, for the substring-containment and fuzzy resolution stages.
    pub fn sorted_aliases(&self, stmt: StatementType) -> &[(String, String)] {
        self.index
            .get(&stmt)
            .map(|idx| idx.sorted.as_slice())
            .unwrap_or(&[])
    }
}

fn merge_catalog(base: &Catalog, over: &Catalog) -> Catalog {
    let mut out = base.clone();
    for (field, aliases) in over {
        out.entry(field.clone())
            .or_default()
            .aliases
            .extend(aliases.aliases.clone());
    }
    out
}

/// Fields forced to their accounting-convention sign on cash flow statements:
/// outflows are stored negative. Applying this twice is a no-op (it only
/// flips strictly-positive values, never a value already negative or zero).
const SIGN_NORMALIZED_FIELDS: &[&str] = &[
    "capex",
    "acquisitions",
    "purchase_of_investments",
    "debt_repayment",
    "share_repurchases",
    "dividends_paid",
];

pub fn normalize_signs(statement: &mut CashFlowStatement) {
    for field in SIGN_NORMALIZED_FIELDS {
        if let Some(value) = statement.get_field(field) {
            if value > 0.0 {
                statement.set_field(field, -value);
            }
        }
    }
}

/// Applies [`normalize_signs`] through the tagged `Statement` enum, a no-op
/// for the other two statement kinds. Lets ingestion code normalize signs
/// generically right after building a batch of mixed statements.
pub fn normalize_signs_if_cash_flow(statement: &mut Statement) {
    if let Statement::CashFlow(cf) = statement {
        normalize_signs(cf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
settings:
  fuzzy_threshold: 80
  unmapped_fields: error
  auto_sign_normalization: true
income_statement:
  revenue:
    aliases: ["sales", "net revenue"]
  revenue_other:
    aliases: ["other revenue"]
balance_sheet:
  cash:
    aliases: ["cash and equivalents"]
cash_flow: {}
"#;

    #[test]
    fn loads_settings_and_aliases() {
        let config = MappingConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.settings.fuzzy_threshold(), 80);
        assert_eq!(config.settings.unmapped_fields(), UnmappedFieldsPolicy::Error);
        assert_eq!(
            config.exact_lookup(StatementType::IncomeStatement, "sales"),
            Some("revenue")
        );
        assert_eq!(
            config.exact_lookup(StatementType::IncomeStatement, "revenue"),
            Some("revenue")
        );
    }

    #[test]
    fn out_of_range_fuzzy_threshold_is_rejected() {
        let text = r#"
settings:
  fuzzy_threshold: 150
"#;
        let err = MappingConfig::from_yaml(text).unwrap_err();
        assert!(matches!(err, crate::error::VerifyError::InvalidFuzzyThreshold(150)));
    }

    #[test]
    fn collision_keeps_first_and_warns() {
        let text = r#"
income_statement:
  revenue:
    aliases: ["topline"]
  revenue_other:
    aliases: ["topline"]
"#;
        let config = MappingConfig::from_yaml(text).unwrap();
        assert_eq!(
            config.exact_lookup(StatementType::IncomeStatement, "topline"),
            Some("revenue")
        );
        assert!(!config.warnings.is_empty());
    }

    #[test]
    fn merge_unions_aliases_and_override_wins_settings() {
        let base = MappingConfig::from_yaml(
            r#"
settings:
  fuzzy_threshold: 85
income_statement:
  revenue:
    aliases: ["sales"]
"#,
        )
        .unwrap();
        let over = MappingConfig::from_yaml(
            r#"
settings:
  fuzzy_threshold: 70
income_statement:
  revenue:
    aliases: ["topline"]
"#,
        )
        .unwrap();
        let merged = MappingConfig::merge(&base, &over);
        assert_eq!(merged.settings.fuzzy_threshold(), 70);
        assert_eq!(
            merged.exact_lookup(StatementType::IncomeStatement, "sales"),
            Some("revenue")
        );
        assert_eq!(
            merged.exact_lookup(StatementType::IncomeStatement, "topline"),
            Some("revenue")
        );
    }

    #[test]
    fn merge_override_wins_alias_collision() {
        let base = MappingConfig::from_yaml(
            r#"
income_statement:
  revenue:
    aliases: ["topline"]
"#,
        )
        .unwrap();
        let over = MappingConfig::from_yaml(
            r#"
income_statement:
  revenue_other:
    aliases: ["topline"]
"#,
        )
        .unwrap();
        let merged = MappingConfig::merge(&base, &over);
        assert_eq!(
            merged.exact_lookup(StatementType::IncomeStatement, "topline"),
            Some("revenue_other")
        );
    }

    #[test]
    fn sign_normalization_is_idempotent() {
        let mut cf = CashFlowStatement::new("FY2024");
        cf.capex = 50.0;
        cf.dividends_paid = 20.0;
        normalize_signs(&mut cf);
        let once = cf.clone();
        normalize_signs(&mut cf);
        assert_eq!(cf, once);
        assert_eq!(cf.capex, -50.0);
        assert_eq!(cf.dividends_paid, -20.0);
    }

    #[test]
    fn sign_normalization_leaves_negative_values_alone() {
        let mut cf = CashFlowStatement::new("FY2024");
        cf.capex = -50.0;
        normalize_signs(&mut cf);
        assert_eq!(cf.capex, -50.0);
    }
}
