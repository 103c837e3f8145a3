//! Tabular ingestion: rows-as-line-items, columns-as-periods. Shared by the
//! CSV-directory entry point and the explicit-sheet spreadsheet entry point
//! — both produce the same `Vec<Vec<String>>` grid before delegating to
//! [`parse_grid`].

use crate::error::{Result, VerifyError};
use crate::mapping::{normalize_signs_if_cash_flow, MappingConfig};
use crate::normalize::parse_number;
use crate::resolver::FieldResolver;
use crate::schema::{FinancialModel, MappingDiagnostics, Statement, StatementType};
use calamine::{open_workbook_auto, Reader};
use std::collections::BTreeMap;
use std::path::Path;

pub type Grid = Vec<Vec<String>>;

const IS_FILENAMES: &[&str] = &[
    "income_statement.csv",
    "income_statements.csv",
    "is.csv",
    "pnl.csv",
    "p&l.csv",
];
const BS_FILENAMES: &[&str] = &["balance_sheet.csv", "balance_sheets.csv", "bs.csv"];
const CF_FILENAMES: &[&str] = &[
    "cash_flow.csv",
    "cash_flows.csv",
    "cf.csv",
    "cash_flow_statement.csv",
];

const IS_KEYWORDS: &[&str] = &["income", "p&l", "pnl", "profit"];
const BS_KEYWORDS: &[&str] = &["balance"];
const CF_KEYWORDS: &[&str] = &["cash flow", "cash_flow", "cashflow", "cf"];

fn statement_probes() -> [(StatementType, &'static [&'static str], &'static [&'static str]); 3] {
    [
        (StatementType::IncomeStatement, IS_FILENAMES, IS_KEYWORDS),
        (StatementType::BalanceSheet, BS_FILENAMES, BS_KEYWORDS),
        (StatementType::CashFlow, CF_FILENAMES, CF_KEYWORDS),
    ]
}

/// True if a sheet/file name keyword-matches one of the three statement
/// kinds — used by auto-detection to decide whether a workbook is laid out
/// as multiple named sheets versus a single stacked sheet.
pub fn looks_financial(name: &str) -> bool {
    let lower = name.to_lowercase();
    IS_KEYWORDS
        .iter()
        .chain(BS_KEYWORDS)
        .chain(CF_KEYWORDS)
        .any(|kw| lower.contains(kw))
}

pub fn sheet_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path.as_ref())?;
    Ok(workbook.sheet_names().to_vec())
}

/// Parses a rectangular grid: row 0 is the period header (columns 1..N),
/// subsequent rows are labeled line items in column 0.
pub fn parse_grid(
    grid: &Grid,
    stmt: StatementType,
    resolver: &FieldResolver,
    config: &MappingConfig,
) -> (BTreeMap<String, Statement>, MappingDiagnostics) {
    let mut statements: BTreeMap<String, Statement> = BTreeMap::new();

    let Some(header) = grid.first() else {
        return (statements, MappingDiagnostics::new(stmt));
    };

    let period_columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(col, cell)| {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some((col, trimmed.to_string()))
            }
        })
        .collect();

    for (_, period) in &period_columns {
        statements
            .entry(period.clone())
            .or_insert_with(|| Statement::new(stmt, period.clone()));
    }

    let labels: Vec<String> = grid
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let (mapping, diagnostics) = resolver.map_fields(&labels, stmt);

    for row in grid.iter().skip(1) {
        let Some(label) = row.first().map(|s| s.trim().to_string()) else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        let Some(canonical) = mapping.get(&label) else {
            continue;
        };
        for (col, period) in &period_columns {
            let raw = row.get(*col).map(|s| s.as_str()).unwrap_or("");
            let value = parse_number(raw);
            if let Some(statement) = statements.get_mut(period) {
                statement.set_field(canonical, value);
            }
        }
    }

    if config.settings.auto_sign_normalization() {
        for statement in statements.values_mut() {
            normalize_signs_if_cash_flow(statement);
        }
    }

    (statements, diagnostics)
}

fn read_csv_grid(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid = Grid::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(grid)
}

fn find_csv_file(dir: &Path, candidates: &[&str]) -> Option<std::path::PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

pub fn parse_csv_dir(
    dir: impl AsRef<Path>,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(VerifyError::FileNotFound(dir.display().to_string()));
    }

    let mut model = FinancialModel::new();
    let mut diagnostics = Vec::new();
    let resolver = FieldResolver::new(config);

    for (stmt, filenames, _) in statement_probes() {
        let Some(path) = find_csv_file(dir, filenames) else {
            log::debug!("no {} file found under {}", stmt.as_str(), dir.display());
            continue;
        };
        log::info!("reading {} from {}", stmt.as_str(), path.display());
        let grid = read_csv_grid(&path)?;
        let (statements, diag) = parse_grid(&grid, stmt, &resolver, config);
        model.insert_statements(statements);
        diagnostics.push(diag);
    }

    if model.income_statements.is_empty()
        && model.balance_sheets.is_empty()
        && model.cash_flows.is_empty()
    {
        return Err(VerifyError::EmptyInput(dir.display().to_string()));
    }

    model.periods = model.get_ordered_periods();
    Ok((model, diagnostics))
}

fn range_to_grid(range: &calamine::Range<calamine::Data>) -> Grid {
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn parse_workbook_file(
    path: impl AsRef<Path>,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut model = FinancialModel::new();
    let mut diagnostics = Vec::new();
    let resolver = FieldResolver::new(config);

    for (stmt, _, keywords) in statement_probes() {
        let Some(sheet_name) = sheet_names
            .iter()
            .find(|name| keywords.iter().any(|kw| name.to_lowercase().contains(kw)))
            .cloned()
        else {
            log::debug!("no sheet matching {} in {}", stmt.as_str(), path.display());
            continue;
        };
        let range = workbook.worksheet_range(&sheet_name)?;
        let grid = range_to_grid(&range);
        let (statements, diag) = parse_grid(&grid, stmt, &resolver, config);
        model.insert_statements(statements);
        diagnostics.push(diag);
    }

    if model.income_statements.is_empty()
        && model.balance_sheets.is_empty()
        && model.cash_flows.is_empty()
    {
        return Err(VerifyError::EmptyInput(path.display().to_string()));
    }

    model.periods = model.get_ordered_periods();
    Ok((model, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingConfig;

    fn config() -> MappingConfig {
        MappingConfig::from_yaml(
            r#"
income_statement:
  revenue:
    aliases: ["sales"]
  cogs:
    aliases: ["cost of goods sold"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_grid_extracts_periods_and_values() {
        let grid: Grid = vec![
            vec!["".into(), "FY2023".into(), "FY2024".into()],
            vec!["Sales".into(), "1000".into(), "1200".into()],
            vec!["Cost of Goods Sold".into(), "600".into(), "700".into()],
        ];
        let cfg = config();
        let resolver = FieldResolver::new(&cfg);
        let (statements, diagnostics) =
            parse_grid(&grid, StatementType::IncomeStatement, &resolver, &cfg);
        assert_eq!(statements.len(), 2);
        assert_eq!(diagnostics.mapped_count, 2);
        match &statements["FY2024"] {
            Statement::IncomeStatement(is) => {
                assert_eq!(is.revenue, 1200.0);
                assert_eq!(is.cogs, 700.0);
            }
            _ => panic!("expected income statement"),
        }
    }

    #[test]
    fn parse_grid_ignores_blank_label_rows() {
        let grid: Grid = vec![
            vec!["".into(), "FY2024".into()],
            vec!["".into(), "999".into()],
            vec!["Sales".into(), "500".into()],
        ];
        let cfg = config();
        let resolver = FieldResolver::new(&cfg);
        let (statements, _) = parse_grid(&grid, StatementType::IncomeStatement, &resolver, &cfg);
        match &statements["FY2024"] {
            Statement::IncomeStatement(is) => assert_eq!(is.revenue, 500.0),
            _ => panic!("expected income statement"),
        }
    }

    #[test]
    fn looks_financial_matches_keywords() {
        assert!(looks_financial("Income Statement"));
        assert!(looks_financial("Balance Sheet"));
        assert!(looks_financial("Cash Flow"));
        assert!(!looks_financial("DCF Valuation"));
    }
}
