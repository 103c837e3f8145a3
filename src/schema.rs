//! Canonical field catalog and the in-memory financial model.
//!
//! Each statement type is a closed Rust struct of numeric slots rather than
//! a dynamic property bag. Parsers assign values by name through
//! `set_field`, which is a plain `match` over the field table — the
//! practical equivalent of a `(field_id, offset, default)` table without
//! unsafe offset arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which of the three statement types a label or row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::IncomeStatement => "income_statement",
            StatementType::BalanceSheet => "balance_sheet",
            StatementType::CashFlow => "cash_flow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income_statement" => Some(StatementType::IncomeStatement),
            "balance_sheet" => Some(StatementType::BalanceSheet),
            "cash_flow" => Some(StatementType::CashFlow),
            _ => None,
        }
    }

    pub fn all() -> [StatementType; 3] {
        [
            StatementType::IncomeStatement,
            StatementType::BalanceSheet,
            StatementType::CashFlow,
        ]
    }

    /// The closed set of canonical field names for this statement type.
    pub fn canonical_fields(&self) -> &'static [&'static str] {
        match self {
            StatementType::IncomeStatement => IncomeStatement::FIELDS,
            StatementType::BalanceSheet => BalanceSheet::FIELDS,
            StatementType::CashFlow => CashFlowStatement::FIELDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: String,
    pub revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub sga: f64,
    pub rd: f64,
    pub other_opex: f64,
    pub depreciation: f64,
    pub amortization: f64,
    pub total_opex: f64,
    pub ebit: f64,
    pub interest_expense: f64,
    pub interest_income: f64,
    pub other_income_expense: f64,
    pub ebt: f64,
    pub tax_expense: f64,
    pub net_income: f64,
    // Optional granularity — absent unless the input supplies it.
    pub ebitda: Option<f64>,
    pub effective_tax_rate: Option<f64>,
    pub shares_outstanding_basic: Option<f64>,
    pub shares_outstanding_diluted: Option<f64>,
    pub eps_basic: Option<f64>,
    pub eps_diluted: Option<f64>,
}

impl IncomeStatement {
    pub const FIELDS: &'static [&'static str] = &[
        "revenue",
        "cogs",
        "gross_profit",
        "sga",
        "rd",
        "other_opex",
        "depreciation",
        "amortization",
        "total_opex",
        "ebit",
        "interest_expense",
        "interest_income",
        "other_income_expense",
        "ebt",
        "tax_expense",
        "net_income",
        "ebitda",
        "effective_tax_rate",
        "shares_outstanding_basic",
        "shares_outstanding_diluted",
        "eps_basic",
        "eps_diluted",
    ];

    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn set_field(&mut self, name: &str, value: f64) -> bool {
        match name {
            "revenue" => self.revenue = value,
            "cogs" => self.cogs = value,
            "gross_profit" => self.gross_profit = value,
            "sga" => self.sga = value,
            "rd" => self.rd = value,
            "other_opex" => self.other_opex = value,
            "depreciation" => self.depreciation = value,
            "amortization" => self.amortization = value,
            "total_opex" => self.total_opex = value,
            "ebit" => self.ebit = value,
            "interest_expense" => self.interest_expense = value,
            "interest_income" => self.interest_income = value,
            "other_income_expense" => self.other_income_expense = value,
            "ebt" => self.ebt = value,
            "tax_expense" => self.tax_expense = value,
            "net_income" => self.net_income = value,
            "ebitda" => self.ebitda = Some(value),
            "effective_tax_rate" => self.effective_tax_rate = Some(value),
            "shares_outstanding_basic" => self.shares_outstanding_basic = Some(value),
            "shares_outstanding_diluted" => self.shares_outstanding_diluted = Some(value),
            "eps_basic" => self.eps_basic = Some(value),
            "eps_diluted" => self.eps_diluted = Some(value),
            _ => return false,
        }
        true
    }

    pub fn get_field(&self, name: &str) -> Option<f64> {
        match name {
            "revenue" => Some(self.revenue),
            "cogs" => Some(self.cogs),
            "gross_profit" => Some(self.gross_profit),
            "sga" => Some(self.sga),
            "rd" => Some(self.rd),
            "other_opex" => Some(self.other_opex),
            "depreciation" => Some(self.depreciation),
            "amortization" => Some(self.amortization),
            "total_opex" => Some(self.total_opex),
            "ebit" => Some(self.ebit),
            "interest_expense" => Some(self.interest_expense),
            "interest_income" => Some(self.interest_income),
            "other_income_expense" => Some(self.other_income_expense),
            "ebt" => Some(self.ebt),
            "tax_expense" => Some(self.tax_expense),
            "net_income" => Some(self.net_income),
            "ebitda" => self.ebitda,
            "effective_tax_rate" => self.effective_tax_rate,
            "shares_outstanding_basic" => self.shares_outstanding_basic,
            "shares_outstanding_diluted" => self.shares_outstanding_diluted,
            "eps_basic" => self.eps_basic,
            "eps_diluted" => self.eps_diluted,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period: String,
    // Current assets
    pub cash: f64,
    pub short_term_investments: f64,
    pub accounts_receivable: f64,
    pub inventory: f64,
    pub prepaid_expenses: f64,
    pub other_current_assets: f64,
    pub total_current_assets: f64,
    // Non-current assets
    pub ppe_gross: f64,
    pub accumulated_depreciation: f64,
    pub ppe_net: f64,
    pub goodwill: f64,
    pub intangible_assets: f64,
    pub other_non_current_assets: f64,
    pub total_non_current_assets: f64,
    pub total_assets: f64,
    // Current liabilities
    pub accounts_payable: f64,
    pub accrued_liabilities: f64,
    pub short_term_debt: f64,
    pub current_portion_ltd: f64,
    pub other_current_liabilities: f64,
    pub total_current_liabilities: f64,
    // Non-current liabilities
    pub long_term_debt: f64,
    pub deferred_tax_liability: f64,
    pub other_non_current_liabilities: f64,
    pub total_non_current_liabilities: f64,
    pub total_liabilities: f64,
    // Equity
    pub common_stock: f64,
    pub additional_paid_in_capital: f64,
    pub retained_earnings: f64,
    pub treasury_stock: f64,
    pub accumulated_other_comprehensive_income: f64,
    pub total_equity: f64,
    pub total_liabilities_and_equity: f64,
}

impl BalanceSheet {
    pub const FIELDS: &'static [&'static str] = &[
        "cash",
        "short_term_investments",
        "accounts_receivable",
        "inventory",
        "prepaid_expenses",
        "other_current_assets",
        "total_current_assets",
        "ppe_gross",
        "accumulated_depreciation",
        "ppe_net",
        "goodwill",
        "intangible_assets",
        "other_non_current_assets",
        "total_non_current_assets",
        "total_assets",
        "accounts_payable",
        "accrued_liabilities",
        "short_term_debt",
        "current_portion_ltd",
        "other_current_liabilities",
        "total_current_liabilities",
        "long_term_debt",
        "deferred_tax_liability",
        "other_non_current_liabilities",
        "total_non_current_liabilities",
        "total_liabilities",
        "common_stock",
        "additional_paid_in_capital",
        "retained_earnings",
        "treasury_stock",
        "accumulated_other_comprehensive_income",
        "total_equity",
        "total_liabilities_and_equity",
    ];

    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn set_field(&mut self, name: &str, value: f64) -> bool {
        match name {
            "cash" => self.cash = value,
            "short_term_investments" => self.short_term_investments = value,
            "accounts_receivable" => self.accounts_receivable = value,
            "inventory" => self.inventory = value,
            "prepaid_expenses" => self.prepaid_expenses = value,
            "other_current_assets" => self.other_current_assets = value,
            "total_current_assets" => self.total_current_assets = value,
            "ppe_gross" => self.ppe_gross = value,
            "accumulated_depreciation" => self.accumulated_depreciation = value,
            "ppe_net" => self.ppe_net = value,
            "goodwill" => self.goodwill = value,
            "intangible_assets" => self.intangible_assets = value,
            "other_non_current_assets" => self.other_non_current_assets = value,
            "total_non_current_assets" => self.total_non_current_assets = value,
            "total_assets" => self.total_assets = value,
            "accounts_payable" => self.accounts_payable = value,
            "accrued_liabilities" => self.accrued_liabilities = value,
            "short_term_debt" => self.short_term_debt = value,
            "current_portion_ltd" => self.current_portion_ltd = value,
            "other_current_liabilities" => self.other_current_liabilities = value,
            "total_current_liabilities" => self.total_current_liabilities = value,
            "long_term_debt" => self.long_term_debt = value,
            "deferred_tax_liability" => self.deferred_tax_liability = value,
            "other_non_current_liabilities" => self.other_non_current_liabilities = value,
            "total_non_current_liabilities" => self.total_non_current_liabilities = value,
            "total_liabilities" => self.total_liabilities = value,
            "common_stock" => self.common_stock = value,
            "additional_paid_in_capital" => self.additional_paid_in_capital = value,
            "retained_earnings" => self.retained_earnings = value,
            "treasury_stock" => self.treasury_stock = value,
            "accumulated_other_comprehensive_income" => {
                self.accumulated_other_comprehensive_income = value
            }
            "total_equity" => self.total_equity = value,
            "total_liabilities_and_equity" => self.total_liabilities_and_equity = value,
            _ => return false,
        }
        true
    }

    pub fn get_field(&self, name: &str) -> Option<f64> {
        Some(match name {
            "cash" => self.cash,
            "short_term_investments" => self.short_term_investments,
            "accounts_receivable" => self.accounts_receivable,
            "inventory" => self.inventory,
            "prepaid_expenses" => self.prepaid_expenses,
            "other_current_assets" => self.other_current_assets,
            "total_current_assets" => self.total_current_assets,
            "ppe_gross" => self.ppe_gross,
            "accumulated_depreciation" => self.accumulated_depreciation,
            "ppe_net" => self.ppe_net,
            "goodwill" => self.goodwill,
            "intangible_assets" => self.intangible_assets,
            "other_non_current_assets" => self.other_non_current_assets,
            "total_non_current_assets" => self.total_non_current_assets,
            "total_assets" => self.total_assets,
            "accounts_payable" => self.accounts_payable,
            "accrued_liabilities" => self.accrued_liabilities,
            "short_term_debt" => self.short_term_debt,
            "current_portion_ltd" => self.current_portion_ltd,
            "other_current_liabilities" => self.other_current_liabilities,
            "total_current_liabilities" => self.total_current_liabilities,
            "long_term_debt" => self.long_term_debt,
            "deferred_tax_liability" => self.deferred_tax_liability,
            "other_non_current_liabilities" => self.other_non_current_liabilities,
            "total_non_current_liabilities" => self.total_non_current_liabilities,
            "total_liabilities" => self.total_liabilities,
            "common_stock" => self.common_stock,
            "additional_paid_in_capital" => self.additional_paid_in_capital,
            "retained_earnings" => self.retained_earnings,
            "treasury_stock" => self.treasury_stock,
            "accumulated_other_comprehensive_income" => {
                self.accumulated_other_comprehensive_income
            }
            "total_equity" => self.total_equity,
            "total_liabilities_and_equity" => self.total_liabilities_and_equity,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub period: String,
    // Operating
    pub net_income: f64,
    pub depreciation_amortization: f64,
    pub stock_based_compensation: f64,
    pub deferred_taxes: f64,
    pub change_in_receivables: f64,
    pub change_in_inventory: f64,
    pub change_in_payables: f64,
    pub change_in_other_working_capital: f64,
    pub other_operating: f64,
    pub cash_from_operations: f64,
    // Investing
    pub capex: f64,
    pub acquisitions: f64,
    pub purchase_of_investments: f64,
    pub sale_of_investments: f64,
    pub other_investing: f64,
    pub cash_from_investing: f64,
    // Financing
    pub debt_issuance: f64,
    pub debt_repayment: f64,
    pub equity_issuance: f64,
    pub share_repurchases: f64,
    pub dividends_paid: f64,
    pub other_financing: f64,
    pub cash_from_financing: f64,
    // Summary
    pub net_change_in_cash: f64,
    pub beginning_cash: f64,
    pub ending_cash: f64,
    pub free_cash_flow: Option<f64>,
}

impl CashFlowStatement {
    pub const FIELDS: &'static [&'static str] = &[
        "net_income",
        "depreciation_amortization",
        "stock_based_compensation",
        "deferred_taxes",
        "change_in_receivables",
        "change_in_inventory",
        "change_in_payables",
        "change_in_other_working_capital",
        "other_operating",
        "cash_from_operations",
        "capex",
        "acquisitions",
        "purchase_of_investments",
        "sale_of_investments",
        "other_investing",
        "cash_from_investing",
        "debt_issuance",
        "debt_repayment",
        "equity_issuance",
        "share_repurchases",
        "dividends_paid",
        "other_financing",
        "cash_from_financing",
        "net_change_in_cash",
        "beginning_cash",
        "ending_cash",
        "free_cash_flow",
    ];

    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn set_field(&mut self, name: &str, value: f64) -> bool {
        match name {
            "net_income" => self.net_income = value,
            "depreciation_amortization" => self.depreciation_amortization = value,
            "stock_based_compensation" => self.stock_based_compensation = value,
            "deferred_taxes" => self.deferred_taxes = value,
            "change_in_receivables" => self.change_in_receivables = value,
            "change_in_inventory" => self.change_in_inventory = value,
            "change_in_payables" => self.change_in_payables = value,
            "change_in_other_working_capital" => self.change_in_other_working_capital = value,
            "other_operating" => self.other_operating = value,
            "cash_from_operations" => self.cash_from_operations = value,
            "capex" => self.capex = value,
            "acquisitions" => self.acquisitions = value,
            "purchase_of_investments" => self.purchase_of_investments = value,
            "sale_of_investments" => self.sale_of_investments = value,
            "other_investing" => self.other_investing = value,
            "cash_from_investing" => self.cash_from_investing = value,
            "debt_issuance" => self.debt_issuance = value,
            "debt_repayment" => self.debt_repayment = value,
            "equity_issuance" => self.equity_issuance = value,
            "share_repurchases" => self.share_repurchases = value,
            "dividends_paid" => self.dividends_paid = value,
            "other_financing" => self.other_financing = value,
            "cash_from_financing" => self.cash_from_financing = value,
            "net_change_in_cash" => self.net_change_in_cash = value,
            "beginning_cash" => self.beginning_cash = value,
            "ending_cash" => self.ending_cash = value,
            "free_cash_flow" => self.free_cash_flow = Some(value),
            _ => return false,
        }
        true
    }

    pub fn get_field(&self, name: &str) -> Option<f64> {
        match name {
            "net_income" => Some(self.net_income),
            "depreciation_amortization" => Some(self.depreciation_amortization),
            "stock_based_compensation" => Some(self.stock_based_compensation),
            "deferred_taxes" => Some(self.deferred_taxes),
            "change_in_receivables" => Some(self.change_in_receivables),
            "change_in_inventory" => Some(self.change_in_inventory),
            "change_in_payables" => Some(self.change_in_payables),
            "change_in_other_working_capital" => Some(self.change_in_other_working_capital),
            "other_operating" => Some(self.other_operating),
            "cash_from_operations" => Some(self.cash_from_operations),
            "capex" => Some(self.capex),
            "acquisitions" => Some(self.acquisitions),
            "purchase_of_investments" => Some(self.purchase_of_investments),
            "sale_of_investments" => Some(self.sale_of_investments),
            "other_investing" => Some(self.other_investing),
            "cash_from_investing" => Some(self.cash_from_investing),
            "debt_issuance" => Some(self.debt_issuance),
            "debt_repayment" => Some(self.debt_repayment),
            "equity_issuance" => Some(self.equity_issuance),
            "share_repurchases" => Some(self.share_repurchases),
            "dividends_paid" => Some(self.dividends_paid),
            "other_financing" => Some(self.other_financing),
            "cash_from_financing" => Some(self.cash_from_financing),
            "net_change_in_cash" => Some(self.net_change_in_cash),
            "beginning_cash" => Some(self.beginning_cash),
            "ending_cash" => Some(self.ending_cash),
            "free_cash_flow" => self.free_cash_flow,
            _ => None,
        }
    }
}

/// A freshly constructed statement of one of the three types, tagged so
/// ingestion code can build and field-assign generically before folding the
/// result into `FinancialModel`'s three concrete maps.
#[derive(Debug, Clone)]
pub enum Statement {
    IncomeStatement(IncomeStatement),
    BalanceSheet(BalanceSheet),
    CashFlow(CashFlowStatement),
}

impl Statement {
    pub fn new(kind: StatementType, period: impl Into<String>) -> Self {
        match kind {
            StatementType::IncomeStatement => {
                Statement::IncomeStatement(IncomeStatement::new(period))
            }
            StatementType::BalanceSheet => Statement::BalanceSheet(BalanceSheet::new(period)),
            StatementType::CashFlow => Statement::CashFlow(CashFlowStatement::new(period)),
        }
    }

    pub fn set_field(&mut self, name: &str, value: f64) -> bool {
        match self {
            Statement::IncomeStatement(s) => s.set_field(name, value),
            Statement::BalanceSheet(s) => s.set_field(name, value),
            Statement::CashFlow(s) => s.set_field(name, value),
        }
    }

    pub fn period(&self) -> &str {
        match self {
            Statement::IncomeStatement(s) => &s.period,
            Statement::BalanceSheet(s) => &s.period,
            Statement::CashFlow(s) => &s.period,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialModel {
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub periods: Vec<String>,
    #[serde(default)]
    pub historical_periods: Vec<String>,
    #[serde(default)]
    pub projected_periods: Vec<String>,
    #[serde(default)]
    pub income_statements: BTreeMap<String, IncomeStatement>,
    #[serde(default)]
    pub balance_sheets: BTreeMap<String, BalanceSheet>,
    #[serde(default)]
    pub cash_flows: BTreeMap<String, CashFlowStatement>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn default_company_name() -> String {
    "Unknown".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_unit() -> String {
    "millions".to_string()
}

impl FinancialModel {
    pub fn new() -> Self {
        Self {
            company_name: default_company_name(),
            currency: default_currency(),
            unit: default_unit(),
            ..Default::default()
        }
    }

    /// Periods in declared order if populated, else the sorted union of the
    /// three statement maps' keys.
    pub fn get_ordered_periods(&self) -> Vec<String> {
        if !self.periods.is_empty() {
            return self.periods.clone();
        }
        let mut set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        set.extend(self.income_statements.keys().cloned());
        set.extend(self.balance_sheets.keys().cloned());
        set.extend(self.cash_flows.keys().cloned());
        set.into_iter().collect()
    }

    pub fn has_complete_period(&self, period: &str) -> bool {
        self.income_statements.contains_key(period)
            && self.balance_sheets.contains_key(period)
            && self.cash_flows.contains_key(period)
    }

    /// Folds a batch of freshly built, tagged statements (as produced by a
    /// parser) into this model's three concrete maps.
    pub fn insert_statements(&mut self, statements: BTreeMap<String, Statement>) {
        for (period, stmt) in statements {
            match stmt {
                Statement::IncomeStatement(s) => {
                    self.income_statements.insert(period, s);
                }
                Statement::BalanceSheet(s) => {
                    self.balance_sheets.insert(period, s);
                }
                Statement::CashFlow(s) => {
                    self.cash_flows.insert(period, s);
                }
            }
        }
    }
}

/// Severity of a single check result, ordered PASS < INFO < WARNING < ERROR
/// < CRITICAL for reporting and `overall_health` purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Pass,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Pass => "pass",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    Structural,
    CrossStatement,
    Reasonableness,
}

impl CheckCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::Structural => "structural",
            CheckCategory::CrossStatement => "cross_statement",
            CheckCategory::Reasonableness => "reasonableness",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub check_name: String,
    pub category: CheckCategory,
    pub severity: Severity,
    pub period: Option<String>,
    pub message: String,
    pub expected_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub delta: Option<f64>,
    pub delta_pct: Option<f64>,
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Records that a check threw instead of returning results, so the engine
/// can surface the failure without aborting the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckMetadata {
    pub check_id: String,
    pub status: String,
    pub message: String,
}

/// Coarse summary of a verification run, computed from the worst severity
/// seen across all results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallHealth {
    Clean,
    Warnings,
    ErrorsFound,
    Critical,
}

impl OverallHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallHealth::Clean => "clean",
            OverallHealth::Warnings => "warnings",
            OverallHealth::ErrorsFound => "errors_found",
            OverallHealth::Critical => "critical",
        }
    }

    pub fn from_results(results: &[CheckResult]) -> Self {
        let worst = results.iter().map(|r| r.severity).max();
        match worst {
            Some(Severity::Critical) => OverallHealth::Critical,
            Some(Severity::Error) => OverallHealth::ErrorsFound,
            Some(Severity::Warning) => OverallHealth::Warnings,
            _ => OverallHealth::Clean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Alias,
    Fuzzy,
    Unmapped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResult {
    pub input_name: String,
    pub normalized_name: String,
    pub internal_field: Option<String>,
    pub match_type: MatchType,
    pub confidence: f64,
    pub fuzzy_candidates: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingDiagnostics {
    pub statement_type: String,
    pub total_input_fields: usize,
    pub mapped_count: usize,
    pub unmapped_count: usize,
    pub exact_matches: usize,
    pub alias_matches: usize,
    pub fuzzy_matches: usize,
    #[serde(default)]
    pub results: Vec<MappingResult>,
    #[serde(default)]
    pub unmapped_fields: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl MappingDiagnostics {
    pub fn new(statement_type: StatementType) -> Self {
        Self {
            statement_type: statement_type.as_str().to_string(),
            ..Default::default()
        }
    }
}
