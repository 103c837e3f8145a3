//! # fs-verify
//!
//! Verifies three-statement financial models (income statement, balance
//! sheet, cash flow statement) across multiple periods for internal
//! consistency and plausibility.
//!
//! ## Core concepts
//!
//! - **Financial model**: an in-memory, period-indexed record of the three
//!   statements, built by one of several [`ingestion`] parsers.
//! - **Field resolver**: reconciles arbitrary human-written line-item labels
//!   to the canonical field catalog in [`schema`].
//! - **Check engine**: a registry of structural, cross-statement, and
//!   reasonableness rules evaluated against a model, yielding a
//!   severity-ranked [`report::VerificationReport`].
//!
//! ## Example
//!
//! ```rust
//! use fs_verify::{EngineConfig, MappingConfig, VerificationEngine};
//!
//! let engine = VerificationEngine::new(MappingConfig::default(), &EngineConfig::default());
//! assert_eq!(engine.check_count(), 32);
//! ```

pub mod checks;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod mapping;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod schema;

pub use checks::{Check, CheckRegistry, Tolerance};
pub use engine::{EngineConfig, VerificationEngine};
pub use error::{Result, VerifyError};
pub use mapping::MappingConfig;
pub use report::VerificationReport;
pub use resolver::FieldResolver;
pub use schema::*;
