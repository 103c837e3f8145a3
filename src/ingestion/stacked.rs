//! Stacked-sheet ingestion: one spreadsheet tab containing the income
//! statement, balance sheet, and cash flow statement stacked vertically,
//! interleaved with other blocks (DCF, sensitivity, comps) that must be
//! excluded by layout inference rather than by any declared structure.

use crate::error::{Result, VerifyError};
use crate::mapping::{normalize_signs_if_cash_flow, MappingConfig};
use crate::resolver::FieldResolver;
use crate::schema::{FinancialModel, MappingDiagnostics, Statement, StatementType};
use calamine::{open_workbook_auto, Reader};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use super::tabular::Grid;

static IS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)income\s*statement",
        r"(?i)profit\s*(&|and)?\s*loss",
        r"(?i)\bp\s*&?\s*l\b",
        r"(?i)statement\s*of\s*(profit|income|operations)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static BS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)balance\s*sheet",
        r"(?i)statement\s*of\s*(financial\s*)?position",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static CF_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(?i)cash\s*flow", r"(?i)statement\s*of\s*cash\s*flows?"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static STOP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)dcf",
        r"(?i)valuation",
        r"(?i)sensitivity",
        r"(?i)scenario\s*(assum|analy)",
        r"(?i)football\s*field",
        r"(?i)wacc",
        r"(?i)comps?\s*(table|analy)",
        r"(?i)comparable",
        r"(?i)multiples",
        r"(?i)\blbo\b",
        r"(?i)monte\s*carlo",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SKIP_SUBLABEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bassets\b",
        r"(?i)equity\s*(and|&)\s*liabilities",
        r"(?i)current\s*(assets|liabilities)",
        r"(?i)non-current\s*(assets|liabilities)",
        r"(?i)operating\s*activities",
        r"(?i)investing\s*activities",
        r"(?i)financing\s*activities",
        r"(?i)changes\s*in\s*working\s*capital",
        r"(?i)total\s*income",
        r"(?i)total\s*expenses",
        r"(?i)total\s*expenditure",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static STRICT_PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(FY|CY|Q[1-4][-\s]?|H[12][-\s]?)?\d{4}\s*[EPFAB]?$").unwrap()
});

static NUMERIC_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\(\$€£¥\s]*-?[\d,]+(\.\d+)?%?\)?$").unwrap());

static IGNORE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)balance check|eps \(").unwrap());

fn is_period_cell(s: &str) -> bool {
    STRICT_PERIOD_RE.is_match(s.trim())
}

fn looks_numeric(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && NUMERIC_CELL_RE.is_match(t)
}

fn is_scorable_label(s: &str) -> bool {
    let t = s.trim();
    t.chars().count() > 2 && !is_period_cell(t) && !looks_numeric(t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Stop,
    Section(StatementType),
    None,
}

fn classify_row(row: &[String]) -> RowKind {
    let cells: Vec<&str> = row.iter().take(4).map(|s| s.trim()).collect();
    if cells.iter().any(|c| STOP_PATTERNS.iter().any(|p| p.is_match(c))) {
        return RowKind::Stop;
    }
    if cells.iter().any(|c| IS_PATTERNS.iter().any(|p| p.is_match(c))) {
        return RowKind::Section(StatementType::IncomeStatement);
    }
    if cells.iter().any(|c| BS_PATTERNS.iter().any(|p| p.is_match(c))) {
        return RowKind::Section(StatementType::BalanceSheet);
    }
    if cells.iter().any(|c| CF_PATTERNS.iter().any(|p| p.is_match(c))) {
        return RowKind::Section(StatementType::CashFlow);
    }
    RowKind::None
}

fn is_section_header(s: &str) -> bool {
    let t = s.trim();
    IS_PATTERNS.iter().any(|p| p.is_match(t))
        || BS_PATTERNS.iter().any(|p| p.is_match(t))
        || CF_PATTERNS.iter().any(|p| p.is_match(t))
}

fn is_skip_sublabel(s: &str) -> bool {
    SKIP_SUBLABEL_PATTERNS.iter().any(|p| p.is_match(s.trim()))
}

/// Phase 1: scan rows top to bottom, partitioning into `(kind, start, end)`
/// sections. A stop-pattern row suppresses extraction until the next
/// financial-section header, encoded by leaving `current` as `None`.
fn find_sections(grid: &Grid) -> Vec<(StatementType, usize, usize)> {
    let mut sections = Vec::new();
    let mut current: Option<(StatementType, usize)> = None;

    for (i, row) in grid.iter().enumerate() {
        match classify_row(row) {
            RowKind::Stop => {
                if let Some((kind, start)) = current.take() {
                    sections.push((kind, start, i.saturating_sub(1)));
                }
            }
            RowKind::Section(kind) => {
                if let Some((prev_kind, start)) = current.take() {
                    sections.push((prev_kind, start, i.saturating_sub(1)));
                }
                current = Some((kind, i));
            }
            RowKind::None => {}
        }
    }
    if let Some((kind, start)) = current.take() {
        sections.push((kind, start, grid.len().saturating_sub(1)));
    }
    sections
}

struct PeriodRow {
    row_idx: usize,
    columns: Vec<(usize, String)>,
}

fn find_period_row(grid: &Grid, header_idx: usize, end_idx: usize) -> Option<PeriodRow> {
    let scan_end = (header_idx + 5).min(end_idx);
    for row_idx in header_idx..=scan_end {
        let Some(row) = grid.get(row_idx) else {
            continue;
        };
        let matches: usize = row.iter().filter(|c| is_period_cell(c)).count();
        if matches >= 2 {
            let mut seen = std::collections::BTreeSet::new();
            let mut columns = Vec::new();
            for (col, cell) in row.iter().enumerate() {
                let trimmed = cell.trim();
                if is_period_cell(trimmed) && seen.insert(trimmed.to_string()) {
                    columns.push((col, trimmed.to_string()));
                }
            }
            return Some(PeriodRow { row_idx, columns });
        }
    }
    None
}

fn find_label_column(grid: &Grid, period_row: &PeriodRow, end_idx: usize) -> usize {
    let period_cols: std::collections::BTreeSet<usize> =
        period_row.columns.iter().map(|(c, _)| *c).collect();
    let mut scores: BTreeMap<usize, usize> = BTreeMap::new();

    for row in grid.iter().take(end_idx + 1).skip(period_row.row_idx + 1) {
        for (col, cell) in row.iter().enumerate() {
            if period_cols.contains(&col) {
                continue;
            }
            if is_scorable_label(cell) {
                *scores.entry(col).or_insert(0) += 1;
            }
        }
    }

    scores
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(col, _)| col)
        .unwrap_or(0)
}

fn extract_label(
    row: &[String],
    label_col: usize,
    period_cols: &std::collections::BTreeSet<usize>,
) -> Option<String> {
    let mut candidates = vec![label_col, label_col + 1];
    if let Some(prev) = label_col.checked_sub(1) {
        candidates.push(prev);
    }
    for col in candidates {
        if period_cols.contains(&col) {
            continue;
        }
        if let Some(cell) = row.get(col) {
            let trimmed = cell.trim();
            if trimmed.chars().count() > 1 && !looks_numeric(trimmed) {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

struct ExtractedSection {
    stmt: StatementType,
    periods: Vec<String>,
    lines: Vec<(String, BTreeMap<String, f64>)>,
}

fn extract_section(
    grid: &Grid,
    stmt: StatementType,
    header_idx: usize,
    end_idx: usize,
) -> Option<ExtractedSection> {
    let period_row = find_period_row(grid, header_idx, end_idx)?;
    let label_col = find_label_column(grid, &period_row, end_idx);
    let period_cols: std::collections::BTreeSet<usize> =
        period_row.columns.iter().map(|(c, _)| *c).collect();

    let mut lines = Vec::new();

    for row in grid.iter().take(end_idx + 1).skip(period_row.row_idx + 1) {
        let Some(label) = extract_label(row, label_col, &period_cols) else {
            continue;
        };
        if is_section_header(&label) {
            break;
        }
        if is_skip_sublabel(&label) || IGNORE_LINE_RE.is_match(&label) {
            continue;
        }
        let mut values = BTreeMap::new();
        for (col, period) in &period_row.columns {
            let raw = row.get(*col).map(|s| s.as_str()).unwrap_or("");
            values.insert(period.clone(), crate::normalize::parse_number(raw));
        }
        lines.push((label, values));
    }

    Some(ExtractedSection {
        stmt,
        periods: period_row.columns.into_iter().map(|(_, p)| p).collect(),
        lines,
    })
}

fn find_company_name(grid: &Grid) -> Option<String> {
    for row in grid.iter().take(5) {
        for cell in row {
            if let Some(idx) = cell.find('\u{2014}') {
                let prefix = cell[..idx].trim();
                if !prefix.is_empty() {
                    return Some(prefix.to_string());
                }
            }
        }
    }
    None
}

/// Parses an already-loaded grid containing a stacked sheet. Kept separate
/// from the file-reading entry point so the layout-inference logic is
/// testable without a spreadsheet dependency.
pub fn parse_stacked_grid(
    grid: &Grid,
    resolver: &FieldResolver,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let sections = find_sections(grid);
    if sections.is_empty() {
        return Err(VerifyError::EmptyInput(
            "no income statement, balance sheet, or cash flow section detected".to_string(),
        ));
    }

    let mut model = FinancialModel::new();
    if let Some(name) = find_company_name(grid) {
        model.company_name = name;
    }
    let mut diagnostics = Vec::new();
    let mut all_periods = std::collections::BTreeSet::new();

    for (stmt, start, end) in sections {
        let Some(extracted) = extract_section(grid, stmt, start, end) else {
            continue;
        };
        all_periods.extend(extracted.periods.iter().cloned());

        let labels: Vec<String> = extracted.lines.iter().map(|(l, _)| l.clone()).collect();
        let (mapping, diag) = resolver.map_fields(&labels, stmt);
        diagnostics.push(diag);

        let mut statements: BTreeMap<String, Statement> = extracted
            .periods
            .iter()
            .map(|p| (p.clone(), Statement::new(stmt, p.clone())))
            .collect();

        for (label, values) in &extracted.lines {
            let Some(canonical) = mapping.get(label) else {
                continue;
            };
            for (period, value) in values {
                if let Some(statement) = statements.get_mut(period) {
                    statement.set_field(canonical, *value);
                }
            }
        }

        if config.settings.auto_sign_normalization() {
            for statement in statements.values_mut() {
                normalize_signs_if_cash_flow(statement);
            }
        }

        model.insert_statements(statements);
    }

    let (historical, projected): (Vec<String>, Vec<String>) = all_periods
        .iter()
        .cloned()
        .partition(|p| !p.trim_end().ends_with(['E', 'e', 'P', 'p']));
    model.historical_periods = historical;
    model.projected_periods = projected;
    model.periods = all_periods.into_iter().collect();

    if model.income_statements.is_empty()
        && model.balance_sheets.is_empty()
        && model.cash_flows.is_empty()
    {
        return Err(VerifyError::EmptyInput(
            "stacked-sheet layout inference produced no statements".to_string(),
        ));
    }

    Ok((model, diagnostics))
}

pub fn parse_stacked_file(
    path: impl AsRef<Path>,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| VerifyError::SheetNotFound(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;
    let grid: Grid = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let resolver = FieldResolver::new(config);
    parse_stacked_grid(&grid, &resolver, config)
}
