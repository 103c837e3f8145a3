//! Structural checks: intra-statement arithmetic that must hold for any
//! single income statement, balance sheet, or cash flow statement on its
//! own, independent of any other period or statement.

use super::base::{check_close, Check, Tolerance};
use crate::schema::{BalanceSheet, CashFlowStatement, CheckCategory, CheckResult, FinancialModel, IncomeStatement, Severity};

macro_rules! structural_check {
    ($struct_name:ident, $id:literal, $name:literal, $severity:expr, $map:ident, $statement_ty:ty, |$s:ident| $expected:expr, |$s2:ident| $actual:expr) => {
        pub struct $struct_name {
            pub tol: Tolerance,
        }

        impl Check for $struct_name {
            fn id(&self) -> &'static str {
                $id
            }
            fn name(&self) -> &'static str {
                $name
            }
            fn category(&self) -> CheckCategory {
                CheckCategory::Structural
            }
            fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
                model
                    .$map
                    .iter()
                    .map(|(period, $s): (&String, &$statement_ty)| {
                        let expected = $expected;
                        let $s2 = $s;
                        let actual = $actual;
                        check_close(self, period, &self.tol, expected, actual, $severity)
                    })
                    .collect()
            }
        }
    };
}

structural_check!(
    Str001TotalAssetsEqualsLiabilitiesAndEquity,
    "STR-001",
    "total assets equals total liabilities and equity",
    Severity::Critical,
    balance_sheets,
    BalanceSheet,
    |s| s.total_assets,
    |s| s.total_liabilities_and_equity
);

structural_check!(
    Str002TotalAssetsIsSumOfCurrentAndNonCurrent,
    "STR-002",
    "total assets equals current plus non-current assets",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_assets,
    |s| s.total_current_assets + s.total_non_current_assets
);

structural_check!(
    Str003TotalLiabilitiesIsSumOfCurrentAndNonCurrent,
    "STR-003",
    "total liabilities equals current plus non-current liabilities",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_liabilities,
    |s| s.total_current_liabilities + s.total_non_current_liabilities
);

structural_check!(
    Str004LiabilitiesAndEquityIsSum,
    "STR-004",
    "total liabilities and equity equals liabilities plus equity",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_liabilities_and_equity,
    |s| s.total_liabilities + s.total_equity
);

structural_check!(
    Str010GrossProfit,
    "STR-010",
    "gross profit equals revenue minus cogs",
    Severity::Error,
    income_statements,
    IncomeStatement,
    |s| s.gross_profit,
    |s| s.revenue - s.cogs
);

pub struct Str011Ebit {
    pub tol: Tolerance,
}

impl Check for Str011Ebit {
    fn id(&self) -> &'static str {
        "STR-011"
    }
    fn name(&self) -> &'static str {
        "EBIT equals gross profit minus operating expenses"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Structural
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .income_statements
            .iter()
            .map(|(period, s)| {
                let opex = if s.total_opex != 0.0 {
                    s.total_opex
                } else {
                    s.sga + s.rd + s.depreciation + s.amortization + s.other_opex
                };
                let expected = s.gross_profit - opex;
                check_close(self, period, &self.tol, expected, s.ebit, self.fail_severity())
            })
            .collect()
    }
}

impl Str011Ebit {
    fn fail_severity(&self) -> Severity {
        Severity::Error
    }
}

structural_check!(
    Str012Ebt,
    "STR-012",
    "EBT equals EBIT minus net interest plus other income/expense",
    Severity::Error,
    income_statements,
    IncomeStatement,
    |s| s.ebt,
    |s| s.ebit - s.interest_expense + s.interest_income + s.other_income_expense
);

structural_check!(
    Str013NetIncome,
    "STR-013",
    "net income equals EBT minus tax expense",
    Severity::Error,
    income_statements,
    IncomeStatement,
    |s| s.net_income,
    |s| s.ebt - s.tax_expense
);

structural_check!(
    Str020EndingCash,
    "STR-020",
    "ending cash equals beginning cash plus net change in cash",
    Severity::Critical,
    cash_flows,
    CashFlowStatement,
    |s| s.ending_cash,
    |s| s.beginning_cash + s.net_change_in_cash
);

structural_check!(
    Str021NetChangeInCash,
    "STR-021",
    "net change in cash equals sum of the three cash flow sections",
    Severity::Critical,
    cash_flows,
    CashFlowStatement,
    |s| s.net_change_in_cash,
    |s| s.cash_from_operations + s.cash_from_investing + s.cash_from_financing
);

structural_check!(
    Str022CashFromOperations,
    "STR-022",
    "cash from operations reconciles to net income plus non-cash and working-capital items",
    Severity::Error,
    cash_flows,
    CashFlowStatement,
    |s| s.cash_from_operations,
    |s| s.net_income
        + s.depreciation_amortization
        + s.stock_based_compensation
        + s.deferred_taxes
        + s.change_in_receivables
        + s.change_in_inventory
        + s.change_in_payables
        + s.change_in_other_working_capital
        + s.other_operating
);

pub struct Str030PpeNet {
    pub tol: Tolerance,
}

impl Check for Str030PpeNet {
    fn id(&self) -> &'static str {
        "STR-030"
    }
    fn name(&self) -> &'static str {
        "net PPE equals gross PPE minus accumulated depreciation"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Structural
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .balance_sheets
            .iter()
            .filter(|(_, s)| s.ppe_gross != 0.0 || s.accumulated_depreciation != 0.0 || s.ppe_net != 0.0)
            .map(|(period, s)| {
                let expected = s.ppe_gross - s.accumulated_depreciation;
                check_close(self, period, &self.tol, expected, s.ppe_net, Severity::Error)
            })
            .collect()
    }
}

structural_check!(
    Str031TotalCurrentAssets,
    "STR-031",
    "total current assets equals the sum of its components",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_current_assets,
    |s| s.cash
        + s.short_term_investments
        + s.accounts_receivable
        + s.inventory
        + s.prepaid_expenses
        + s.other_current_assets
);

structural_check!(
    Str032TotalCurrentLiabilities,
    "STR-032",
    "total current liabilities equals the sum of its components",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_current_liabilities,
    |s| s.accounts_payable
        + s.accrued_liabilities
        + s.short_term_debt
        + s.current_portion_ltd
        + s.other_current_liabilities
);

structural_check!(
    Str033TotalEquity,
    "STR-033",
    "total equity equals the sum of its components",
    Severity::Error,
    balance_sheets,
    BalanceSheet,
    |s| s.total_equity,
    |s| s.common_stock
        + s.additional_paid_in_capital
        + s.retained_earnings
        + s.treasury_stock
        + s.accumulated_other_comprehensive_income
);

pub fn all(tol: Tolerance) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(Str001TotalAssetsEqualsLiabilitiesAndEquity { tol }),
        Box::new(Str002TotalAssetsIsSumOfCurrentAndNonCurrent { tol }),
        Box::new(Str003TotalLiabilitiesIsSumOfCurrentAndNonCurrent { tol }),
        Box::new(Str004LiabilitiesAndEquityIsSum { tol }),
        Box::new(Str010GrossProfit { tol }),
        Box::new(Str011Ebit { tol }),
        Box::new(Str012Ebt { tol }),
        Box::new(Str013NetIncome { tol }),
        Box::new(Str020EndingCash { tol }),
        Box::new(Str021NetChangeInCash { tol }),
        Box::new(Str022CashFromOperations { tol }),
        Box::new(Str030PpeNet { tol }),
        Box::new(Str031TotalCurrentAssets { tol }),
        Box::new(Str032TotalCurrentLiabilities { tol }),
        Box::new(Str033TotalEquity { tol }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BalanceSheet;

    fn tol() -> Tolerance {
        Tolerance::new(0.01, 0.0001)
    }

    #[test]
    fn str001_flags_imbalanced_sheet() {
        let mut model = FinancialModel::new();
        let mut bs = BalanceSheet::new("FY2024");
        bs.total_assets = 100.0;
        bs.total_liabilities_and_equity = 90.0;
        model.balance_sheets.insert("FY2024".to_string(), bs);

        let check = Str001TotalAssetsEqualsLiabilitiesAndEquity { tol: tol() };
        let results = check.run(&model);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Critical);
    }

    #[test]
    fn str010_passes_when_consistent() {
        let mut model = FinancialModel::new();
        let mut is = IncomeStatement::new("FY2024");
        is.revenue = 1000.0;
        is.cogs = 400.0;
        is.gross_profit = 600.0;
        model.income_statements.insert("FY2024".to_string(), is);

        let check = Str010GrossProfit { tol: tol() };
        let results = check.run(&model);
        assert_eq!(results[0].severity, Severity::Pass);
    }

    #[test]
    fn str030_skips_periods_with_no_ppe_data() {
        let mut model = FinancialModel::new();
        model
            .balance_sheets
            .insert("FY2024".to_string(), BalanceSheet::new("FY2024"));
        let check = Str030PpeNet { tol: tol() };
        assert!(check.run(&model).is_empty());
    }

    #[test]
    fn all_returns_fifteen_checks() {
        assert_eq!(all(tol()).len(), 15);
    }
}
