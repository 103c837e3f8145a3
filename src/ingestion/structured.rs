//! Structured JSON ingestion: documents that already label their statements
//! and periods, needing only field-name reconciliation.

use crate::error::{Result, VerifyError};
use crate::mapping::{normalize_signs_if_cash_flow, MappingConfig};
use crate::resolver::FieldResolver;
use crate::schema::{FinancialModel, MappingDiagnostics, Statement, StatementType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const IS_KEYS: &[&str] = &["income_statements", "income_statement", "is", "pnl", "p&l"];
const BS_KEYS: &[&str] = &["balance_sheets", "balance_sheet", "bs"];
const CF_KEYS: &[&str] = &["cash_flows", "cash_flow", "cf", "cash_flow_statement"];

fn find_section<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| root.get(k))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(crate::normalize::parse_number(s)),
        _ => None,
    }
}

fn parse_section(
    section: &Value,
    stmt: StatementType,
    resolver: &FieldResolver,
    config: &MappingConfig,
) -> (BTreeMap<String, Statement>, MappingDiagnostics) {
    let mut statements = BTreeMap::new();

    let Value::Object(periods) = section else {
        return (statements, MappingDiagnostics::new(stmt));
    };

    // One label set for the whole section, in first-seen order across
    // periods, so field resolution (and its diagnostics) happens once per
    // statement rather than once per period.
    let mut labels = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    for fields in periods.values() {
        let Value::Object(fields) = fields else {
            continue;
        };
        for key in fields.keys() {
            if seen.insert(key.clone()) {
                labels.push(key.clone());
            }
        }
    }
    let (mapping, diagnostics) = resolver.map_fields(&labels, stmt);

    for (period, fields) in periods {
        let Value::Object(fields) = fields else {
            continue;
        };
        let mut statement = Statement::new(stmt, period.clone());
        for (label, canonical) in &mapping {
            if let Some(raw) = fields.get(label) {
                if let Some(value) = as_number(raw) {
                    statement.set_field(canonical, value);
                }
            }
        }
        if config.settings.auto_sign_normalization() {
            normalize_signs_if_cash_flow(&mut statement);
        }
        statements.insert(period.clone(), statement);
    }

    (statements, diagnostics)
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_json_str(
    text: &str,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let root: Value = serde_json::from_str(text)?;
    let resolver = FieldResolver::new(config);

    let mut model = FinancialModel::new();
    if let Some(name) = root.get("company_name").and_then(Value::as_str) {
        model.company_name = name.to_string();
    }
    if let Some(currency) = root.get("currency").and_then(Value::as_str) {
        model.currency = currency.to_string();
    }
    if let Some(unit) = root.get("unit").and_then(Value::as_str) {
        model.unit = unit.to_string();
    }
    model.periods = string_array(root.get("periods"));
    model.historical_periods = string_array(root.get("historical_periods"));
    model.projected_periods = string_array(root.get("projected_periods"));
    if let Some(Value::Object(meta)) = root.get("metadata") {
        for (k, v) in meta {
            model.metadata.insert(k.clone(), v.clone());
        }
    }

    let mut diagnostics = Vec::new();

    for (stmt, keys) in [
        (StatementType::IncomeStatement, IS_KEYS),
        (StatementType::BalanceSheet, BS_KEYS),
        (StatementType::CashFlow, CF_KEYS),
    ] {
        if let Some(section) = find_section(&root, keys) {
            let (statements, diag) = parse_section(section, stmt, &resolver, config);
            model.insert_statements(statements);
            diagnostics.push(diag);
        }
    }

    if model.income_statements.is_empty()
        && model.balance_sheets.is_empty()
        && model.cash_flows.is_empty()
    {
        return Err(VerifyError::EmptyInput(
            "no recognized statement section in JSON document".to_string(),
        ));
    }

    if model.periods.is_empty() {
        model.periods = model.get_ordered_periods();
    }

    Ok((model, diagnostics))
}

pub fn parse_json_file(
    path: impl AsRef<Path>,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(VerifyError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_json_str(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MappingConfig {
        MappingConfig::from_yaml(
            r#"
income_statement:
  revenue:
    aliases: ["sales"]
cash_flow:
  capex:
    aliases: ["capital expenditures"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_company_metadata_and_sections() {
        let json = r#"
        {
          "company_name": "Acme Corp",
          "currency": "USD",
          "periods": ["FY2023", "FY2024"],
          "income_statement": {
            "FY2023": {"sales": 1000, "cogs": 400},
            "FY2024": {"sales": 1200, "cogs": 500}
          }
        }
        "#;
        let cfg = config();
        let (model, diagnostics) = parse_json_str(json, &cfg).unwrap();
        assert_eq!(model.company_name, "Acme Corp");
        assert_eq!(model.periods, vec!["FY2023", "FY2024"]);
        assert_eq!(model.income_statements["FY2024"].revenue, 1200.0);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn accepts_alternate_top_level_keys() {
        let json = r#"{"pnl": {"FY2024": {"sales": 500}}}"#;
        let cfg = config();
        let (model, _) = parse_json_str(json, &cfg).unwrap();
        assert!(model.income_statements.contains_key("FY2024"));
    }

    #[test]
    fn applies_sign_normalization_to_cash_flow() {
        let json = r#"{"cash_flow": {"FY2024": {"capital expenditures": 80}}}"#;
        let cfg = config();
        let (model, _) = parse_json_str(json, &cfg).unwrap();
        assert_eq!(model.cash_flows["FY2024"].capex, -80.0);
    }

    #[test]
    fn empty_document_is_an_error() {
        let cfg = config();
        let result = parse_json_str("{}", &cfg);
        assert!(result.is_err());
    }

    #[test]
    fn string_values_are_parsed_as_numbers() {
        let json = r#"{"income_statement": {"FY2024": {"sales": "$1,000"}}}"#;
        let cfg = config();
        let (model, _) = parse_json_str(json, &cfg).unwrap();
        assert_eq!(model.income_statements["FY2024"].revenue, 1000.0);
    }
}
