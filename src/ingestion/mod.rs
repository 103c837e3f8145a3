//! Ingestion entry points: one function per supported input shape, plus
//! [`auto_parse`] which inspects the path and dispatches per §6 of the
//! external interface contract.

pub mod stacked;
pub mod structured;
pub mod tabular;

pub use stacked::{parse_stacked_file, parse_stacked_grid};
pub use structured::{parse_json_file, parse_json_str};
pub use tabular::{looks_financial, parse_csv_dir, parse_grid, parse_workbook_file, sheet_names};

use crate::error::{Result, VerifyError};
use crate::mapping::MappingConfig;
use crate::schema::{FinancialModel, MappingDiagnostics};
use std::path::Path;

/// Dispatches on the input path: a directory is read as a CSV bundle, a
/// `.json` file is read as structured JSON, and `.xlsx`/`.xlsm` files are
/// inspected for multiple financial-section sheet names before choosing
/// between the multi-sheet and stacked-sheet spreadsheet parsers.
pub fn auto_parse(
    path: impl AsRef<Path>,
    config: &MappingConfig,
) -> Result<(FinancialModel, Vec<MappingDiagnostics>)> {
    let path = path.as_ref();

    if path.is_dir() {
        return parse_csv_dir(path, config);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => parse_json_file(path, config),
        Some("xlsx") | Some("xlsm") => {
            let names = sheet_names(path)?;
            let financial_count = names.iter().filter(|n| looks_financial(n)).count();
            if financial_count > 1 {
                parse_workbook_file(path, config)
            } else {
                match parse_stacked_file(path, config) {
                    Ok(result) => Ok(result),
                    Err(_) => parse_workbook_file(path, config),
                }
            }
        }
        Some(ext) => Err(VerifyError::UnsupportedExtension(ext.to_string())),
        None => Err(VerifyError::UnsupportedExtension(path.display().to_string())),
    }
}
