//! Cross-statement checks: reconciliations between two statements of the
//! same period, or between consecutive periods of one or two statements.

use super::base::{build_result, check_close, passed, Check, Tolerance};
use crate::schema::{CheckCategory, CheckResult, FinancialModel, Severity};

fn ordered_pairs(model: &FinancialModel) -> Vec<(String, String)> {
    let periods = model.get_ordered_periods();
    periods.windows(2).map(|w| (w[0].clone(), w[1].clone())).collect()
}

pub struct Xst001NetIncomeMatchesCashFlow {
    pub tol: Tolerance,
}

impl Check for Xst001NetIncomeMatchesCashFlow {
    fn id(&self) -> &'static str {
        "XST-001"
    }
    fn name(&self) -> &'static str {
        "income statement net income matches cash flow net income"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .get_ordered_periods()
            .iter()
            .filter_map(|period| {
                let is = model.income_statements.get(period)?;
                let cf = model.cash_flows.get(period)?;
                Some(check_close(
                    self,
                    period,
                    &self.tol,
                    is.net_income,
                    cf.net_income,
                    Severity::Critical,
                ))
            })
            .collect()
    }
}

pub struct Xst002RetainedEarningsRollforward {
    pub tol: Tolerance,
}

impl Check for Xst002RetainedEarningsRollforward {
    fn id(&self) -> &'static str {
        "XST-002"
    }
    fn name(&self) -> &'static str {
        "retained earnings rolls forward by net income plus dividends"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        ordered_pairs(model)
            .into_iter()
            .filter_map(|(prev, cur)| {
                let bs_prev = model.balance_sheets.get(&prev)?;
                let bs_cur = model.balance_sheets.get(&cur)?;
                let is_cur = model.income_statements.get(&cur)?;
                let cf_cur = model.cash_flows.get(&cur)?;
                let expected =
                    bs_prev.retained_earnings + is_cur.net_income + cf_cur.dividends_paid;
                let actual = bs_cur.retained_earnings;
                let abs_tol = self.tol.abs.max(0.02 * actual.abs());
                Some(if self.tol.is_close_abs(expected, actual, abs_tol) {
                    passed(self, &cur, expected, actual, abs_tol)
                } else {
                    super::base::failed(
                        self,
                        &cur,
                        Severity::Error,
                        format!(
                            "retained earnings rollforward broken for {cur}: expected {expected:.4}, got {actual:.4}"
                        ),
                        expected,
                        actual,
                        abs_tol,
                    )
                })
            })
            .collect()
    }
}

pub struct Xst003EndingCashMatchesBalanceSheet {
    pub tol: Tolerance,
}

impl Check for Xst003EndingCashMatchesBalanceSheet {
    fn id(&self) -> &'static str {
        "XST-003"
    }
    fn name(&self) -> &'static str {
        "cash flow ending cash matches balance sheet cash"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .get_ordered_periods()
            .iter()
            .filter_map(|period| {
                let cf = model.cash_flows.get(period)?;
                let bs = model.balance_sheets.get(period)?;
                Some(check_close(
                    self,
                    period,
                    &self.tol,
                    cf.ending_cash,
                    bs.cash,
                    Severity::Critical,
                ))
            })
            .collect()
    }
}

pub struct Xst004BeginningCashMatchesPriorEnding {
    pub tol: Tolerance,
}

impl Check for Xst004BeginningCashMatchesPriorEnding {
    fn id(&self) -> &'static str {
        "XST-004"
    }
    fn name(&self) -> &'static str {
        "beginning cash matches the prior period's ending cash"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        ordered_pairs(model)
            .into_iter()
            .filter_map(|(prev, cur)| {
                let cf_prev = model.cash_flows.get(&prev)?;
                let cf_cur = model.cash_flows.get(&cur)?;
                Some(check_close(
                    self,
                    &cur,
                    &self.tol,
                    cf_prev.ending_cash,
                    cf_cur.beginning_cash,
                    Severity::Critical,
                ))
            })
            .collect()
    }
}

pub struct Xst005DepreciationAmortizationMatches {
    pub tol: Tolerance,
}

impl Check for Xst005DepreciationAmortizationMatches {
    fn id(&self) -> &'static str {
        "XST-005"
    }
    fn name(&self) -> &'static str {
        "income statement D&A matches cash flow D&A"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .get_ordered_periods()
            .iter()
            .filter_map(|period| {
                let is = model.income_statements.get(period)?;
                let cf = model.cash_flows.get(period)?;
                let is_da = is.depreciation + is.amortization;
                if is_da == 0.0 || cf.depreciation_amortization == 0.0 {
                    return None;
                }
                Some(check_close(
                    self,
                    period,
                    &self.tol,
                    is_da,
                    cf.depreciation_amortization,
                    Severity::Warning,
                ))
            })
            .collect()
    }
}

pub struct Xst006PpeRollforward {
    pub tol: Tolerance,
}

impl Check for Xst006PpeRollforward {
    fn id(&self) -> &'static str {
        "XST-006"
    }
    fn name(&self) -> &'static str {
        "net PPE rolls forward by capex minus depreciation"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        ordered_pairs(model)
            .into_iter()
            .filter_map(|(prev, cur)| {
                let bs_prev = model.balance_sheets.get(&prev)?;
                let bs_cur = model.balance_sheets.get(&cur)?;
                let is_cur = model.income_statements.get(&cur)?;
                let cf_cur = model.cash_flows.get(&cur)?;
                let expected = bs_prev.ppe_net + (-cf_cur.capex) - is_cur.depreciation;
                let actual = bs_cur.ppe_net;
                let abs_tol = self.tol.abs.max(0.05 * actual.abs());
                Some(if self.tol.is_close_abs(expected, actual, abs_tol) {
                    passed(self, &cur, expected, actual, abs_tol)
                } else {
                    super::base::failed(
                        self,
                        &cur,
                        Severity::Warning,
                        format!(
                            "PPE rollforward broken for {cur}: expected {expected:.4}, got {actual:.4}"
                        ),
                        expected,
                        actual,
                        abs_tol,
                    )
                })
            })
            .collect()
    }
}

pub struct Xst007DebtRollforward {
    pub tol: Tolerance,
}

impl Check for Xst007DebtRollforward {
    fn id(&self) -> &'static str {
        "XST-007"
    }
    fn name(&self) -> &'static str {
        "total debt rolls forward by issuance and repayment"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        ordered_pairs(model)
            .into_iter()
            .filter_map(|(prev, cur)| {
                let bs_prev = model.balance_sheets.get(&prev)?;
                let bs_cur = model.balance_sheets.get(&cur)?;
                let cf_cur = model.cash_flows.get(&cur)?;
                let debt_prev =
                    bs_prev.short_term_debt + bs_prev.current_portion_ltd + bs_prev.long_term_debt;
                let debt_cur =
                    bs_cur.short_term_debt + bs_cur.current_portion_ltd + bs_cur.long_term_debt;
                let expected = debt_prev + cf_cur.debt_issuance + cf_cur.debt_repayment;
                let abs_tol = self.tol.abs.max(0.03 * debt_cur.abs());
                Some(if self.tol.is_close_abs(expected, debt_cur, abs_tol) {
                    passed(self, &cur, expected, debt_cur, abs_tol)
                } else {
                    super::base::failed(
                        self,
                        &cur,
                        Severity::Warning,
                        format!(
                            "debt rollforward broken for {cur}: expected {expected:.4}, got {debt_cur:.4}"
                        ),
                        expected,
                        debt_cur,
                        abs_tol,
                    )
                })
            })
            .collect()
    }
}

pub struct Xst008ImpliedInterestRate;

impl Check for Xst008ImpliedInterestRate {
    fn id(&self) -> &'static str {
        "XST-008"
    }
    fn name(&self) -> &'static str {
        "implied interest rate on average debt is plausible"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        ordered_pairs(model)
            .into_iter()
            .filter_map(|(prev, cur)| {
                let bs_prev = model.balance_sheets.get(&prev)?;
                let bs_cur = model.balance_sheets.get(&cur)?;
                let is_cur = model.income_statements.get(&cur)?;
                let debt_prev =
                    bs_prev.short_term_debt + bs_prev.current_portion_ltd + bs_prev.long_term_debt;
                let debt_cur =
                    bs_cur.short_term_debt + bs_cur.current_portion_ltd + bs_cur.long_term_debt;
                let avg_debt = (debt_prev + debt_cur) / 2.0;
                if avg_debt <= 0.0 || is_cur.interest_expense <= 0.0 {
                    return None;
                }
                let implied_rate = is_cur.interest_expense / avg_debt;
                let result = if (0.005..=0.15).contains(&implied_rate) {
                    build_result(
                        self,
                        Some(&cur),
                        Severity::Pass,
                        format!("implied interest rate {:.2}% is plausible", implied_rate * 100.0),
                        None,
                        Some(implied_rate),
                        None,
                    )
                } else {
                    build_result(
                        self,
                        Some(&cur),
                        Severity::Warning,
                        format!(
                            "implied interest rate {:.2}% outside the plausible 0.5%-15% band",
                            implied_rate * 100.0
                        ),
                        None,
                        Some(implied_rate),
                        None,
                    )
                };
                Some(result)
            })
            .collect()
    }
}

pub struct Xst009WorkingCapitalDeltaMatches {
    pub tol: Tolerance,
}

impl Check for Xst009WorkingCapitalDeltaMatches {
    fn id(&self) -> &'static str {
        "XST-009"
    }
    fn name(&self) -> &'static str {
        "working capital deltas agree between balance sheet and cash flow"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        const LINES: [(&str, bool); 3] = [
            ("accounts_receivable", true),
            ("inventory", true),
            ("accounts_payable", false),
        ];

        ordered_pairs(model)
            .into_iter()
            .flat_map(|(prev, cur)| {
                let mut results = Vec::new();
                let (Some(bs_prev), Some(bs_cur), Some(cf)) = (
                    model.balance_sheets.get(&prev),
                    model.balance_sheets.get(&cur),
                    model.cash_flows.get(&cur),
                ) else {
                    return results;
                };

                for (field, is_asset) in LINES {
                    let prev_v = bs_prev.get_field(field).unwrap_or(0.0);
                    let cur_v = bs_cur.get_field(field).unwrap_or(0.0);
                    let bs_delta = cur_v - prev_v;
                    let sign_adjusted = if is_asset { -bs_delta } else { bs_delta };
                    let cf_field = match field {
                        "accounts_receivable" => "change_in_receivables",
                        "inventory" => "change_in_inventory",
                        "accounts_payable" => "change_in_payables",
                        _ => continue,
                    };
                    let cf_value = cf.get_field(cf_field).unwrap_or(0.0);
                    let abs_tol = self.tol.abs.max(0.05 * sign_adjusted.abs().max(cf_value.abs()));
                    let label = format!("{}: balance sheet vs cash flow delta for {field}", &cur);
                    results.push(if self.tol.is_close_abs(sign_adjusted, cf_value, abs_tol) {
                        passed(self, &cur, sign_adjusted, cf_value, abs_tol)
                    } else {
                        super::base::failed(
                            self,
                            &cur,
                            Severity::Warning,
                            label,
                            sign_adjusted,
                            cf_value,
                            abs_tol,
                        )
                    });
                }
                results
            })
            .collect()
    }
}

pub struct Xst010EffectiveTaxRate;

impl Check for Xst010EffectiveTaxRate {
    fn id(&self) -> &'static str {
        "XST-010"
    }
    fn name(&self) -> &'static str {
        "effective tax rate is plausible"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::CrossStatement
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .income_statements
            .iter()
            .filter(|(_, s)| s.ebt != 0.0)
            .map(|(period, s)| {
                let rate = s.tax_expense / s.ebt;
                if (-0.05..=0.50).contains(&rate) {
                    build_result(
                        self,
                        Some(period),
                        Severity::Pass,
                        format!("effective tax rate {:.2}% is plausible", rate * 100.0),
                        None,
                        Some(rate),
                        None,
                    )
                } else {
                    build_result(
                        self,
                        Some(period),
                        Severity::Warning,
                        format!(
                            "effective tax rate {:.2}% outside the plausible -5%-50% band",
                            rate * 100.0
                        ),
                        None,
                        Some(rate),
                        None,
                    )
                }
            })
            .collect()
    }
}

pub fn all(tol: Tolerance) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(Xst001NetIncomeMatchesCashFlow { tol }),
        Box::new(Xst002RetainedEarningsRollforward { tol }),
        Box::new(Xst003EndingCashMatchesBalanceSheet { tol }),
        Box::new(Xst004BeginningCashMatchesPriorEnding { tol }),
        Box::new(Xst005DepreciationAmortizationMatches { tol }),
        Box::new(Xst006PpeRollforward { tol }),
        Box::new(Xst007DebtRollforward { tol }),
        Box::new(Xst008ImpliedInterestRate),
        Box::new(Xst009WorkingCapitalDeltaMatches { tol }),
        Box::new(Xst010EffectiveTaxRate),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BalanceSheet, CashFlowStatement, IncomeStatement};

    fn tol() -> Tolerance {
        Tolerance::new(0.01, 0.0001)
    }

    #[test]
    fn xst001_compares_net_income_across_statements() {
        let mut model = FinancialModel::new();
        let mut is = IncomeStatement::new("FY2024");
        is.net_income = 100.0;
        let mut cf = CashFlowStatement::new("FY2024");
        cf.net_income = 90.0;
        model.income_statements.insert("FY2024".to_string(), is);
        model.cash_flows.insert("FY2024".to_string(), cf);

        let check = Xst001NetIncomeMatchesCashFlow { tol: tol() };
        let results = check.run(&model);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Critical);
    }

    #[test]
    fn xst004_requires_two_consecutive_periods() {
        let mut model = FinancialModel::new();
        model.periods = vec!["FY2023".to_string(), "FY2024".to_string()];
        let mut cf_prev = CashFlowStatement::new("FY2023");
        cf_prev.ending_cash = 50.0;
        let mut cf_cur = CashFlowStatement::new("FY2024");
        cf_cur.beginning_cash = 50.0;
        model.cash_flows.insert("FY2023".to_string(), cf_prev);
        model.cash_flows.insert("FY2024".to_string(), cf_cur);

        let check = Xst004BeginningCashMatchesPriorEnding { tol: tol() };
        let results = check.run(&model);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Pass);
    }

    #[test]
    fn xst008_skips_periods_with_no_debt() {
        let mut model = FinancialModel::new();
        model.periods = vec!["FY2023".to_string(), "FY2024".to_string()];
        model
            .balance_sheets
            .insert("FY2023".to_string(), BalanceSheet::new("FY2023"));
        model
            .balance_sheets
            .insert("FY2024".to_string(), BalanceSheet::new("FY2024"));
        model
            .income_statements
            .insert("FY2024".to_string(), IncomeStatement::new("FY2024"));

        let check = Xst008ImpliedInterestRate;
        assert!(check.run(&model).is_empty());
    }

    #[test]
    fn all_returns_ten_checks() {
        assert_eq!(all(tol()).len(), 10);
    }
}
