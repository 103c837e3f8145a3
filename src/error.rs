use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("input file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),

    #[error("no data extracted from input: {0}")]
    EmptyInput(String),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("invalid fuzzy_threshold {0}: must be between 0 and 100")]
    InvalidFuzzyThreshold(i32),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
