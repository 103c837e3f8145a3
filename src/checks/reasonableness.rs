//! Reasonableness checks: not strict arithmetic but plausibility bands a
//! well-formed model should sit inside — margin stability, growth rates,
//! leverage, working-capital cycle days, and sign sanity.

use super::base::{build_result, Check, Tolerance};
use crate::schema::{CheckCategory, CheckResult, FinancialModel, Severity};

fn mean_stdev(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn safe_div(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        None
    } else {
        Some(a / b)
    }
}

pub struct Rsn001MarginStability;

impl Check for Rsn001MarginStability {
    fn id(&self) -> &'static str {
        "RSN-001"
    }
    fn name(&self) -> &'static str {
        "projected margins stay within historical range"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        const MARGINS: [&str; 3] = ["gross_margin", "ebit_margin", "net_margin"];

        let mut results = Vec::new();

        for margin_name in MARGINS {
            let historical: Vec<(String, f64)> = model
                .historical_periods
                .iter()
                .filter_map(|p| {
                    let is = model.income_statements.get(p)?;
                    let value = match margin_name {
                        "gross_margin" => safe_div(is.gross_profit, is.revenue),
                        "ebit_margin" => safe_div(is.ebit, is.revenue),
                        "net_margin" => safe_div(is.net_income, is.revenue),
                        _ => None,
                    }?;
                    Some((p.clone(), value))
                })
                .collect();

            if historical.len() < 2 {
                continue;
            }

            let values: Vec<f64> = historical.iter().map(|(_, v)| *v).collect();
            let (mean, stdev) = mean_stdev(&values);
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            for period in &model.projected_periods {
                let Some(is) = model.income_statements.get(period) else {
                    continue;
                };
                let Some(value) = (match margin_name {
                    "gross_margin" => safe_div(is.gross_profit, is.revenue),
                    "ebit_margin" => safe_div(is.ebit, is.revenue),
                    "net_margin" => safe_div(is.net_income, is.revenue),
                    _ => None,
                }) else {
                    continue;
                };

                let z_score = if stdev > 0.0 {
                    (value - mean) / stdev
                } else {
                    0.0
                };
                let out_of_range = value < min - 0.05 || value > max + 0.05;
                let flagged = out_of_range || z_score.abs() > 2.5;

                let message = format!(
                    "{margin_name} for {period}: {:.2}% (historical [{:.2}%, {:.2}%], z={:.2})",
                    value * 100.0,
                    min * 100.0,
                    max * 100.0,
                    z_score
                );
                results.push(build_result(
                    self,
                    Some(period),
                    if flagged { Severity::Warning } else { Severity::Pass },
                    message,
                    Some(mean),
                    Some(value),
                    None,
                ));
            }
        }

        results
    }
}

pub struct Rsn002RevenueGrowthBand;

impl Check for Rsn002RevenueGrowthBand {
    fn id(&self) -> &'static str {
        "RSN-002"
    }
    fn name(&self) -> &'static str {
        "period-over-period revenue growth is within a plausible band"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        let periods = model.get_ordered_periods();
        periods
            .windows(2)
            .filter_map(|w| {
                let prev = model.income_statements.get(&w[0])?;
                let cur = model.income_statements.get(&w[1])?;
                let growth = safe_div(cur.revenue - prev.revenue, prev.revenue)?;
                let message = format!("revenue growth for {}: {:.2}%", w[1], growth * 100.0);
                let severity = if growth.abs() >= 1.0 {
                    Severity::Error
                } else if !(-0.30..=0.50).contains(&growth) {
                    Severity::Warning
                } else {
                    Severity::Pass
                };
                Some(build_result(
                    self,
                    Some(&w[1]),
                    severity,
                    message,
                    None,
                    Some(growth),
                    None,
                ))
            })
            .collect()
    }
}

pub struct Rsn003Leverage;

impl Check for Rsn003Leverage {
    fn id(&self) -> &'static str {
        "RSN-003"
    }
    fn name(&self) -> &'static str {
        "leverage and interest coverage are within plausible bounds"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        let mut results = Vec::new();
        for period in model.get_ordered_periods() {
            let Some(is) = model.income_statements.get(&period) else {
                continue;
            };
            let Some(bs) = model.balance_sheets.get(&period) else {
                continue;
            };
            let debt = bs.short_term_debt + bs.current_portion_ltd + bs.long_term_debt;
            let ebitda = is
                .ebitda
                .unwrap_or(is.ebit + is.depreciation + is.amortization);

            if let Some(leverage) = safe_div(debt, ebitda) {
                let severity = if leverage > 8.0 {
                    Severity::Warning
                } else {
                    Severity::Pass
                };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!("debt/ebitda for {period}: {leverage:.2}x"),
                    Some(8.0),
                    Some(leverage),
                    None,
                ));
            }

            if let Some(coverage) = safe_div(is.ebit, is.interest_expense) {
                let severity = if coverage < 1.0 {
                    Severity::Error
                } else {
                    Severity::Pass
                };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!("interest coverage for {period}: {coverage:.2}x"),
                    Some(1.0),
                    Some(coverage),
                    None,
                ));
            }
        }
        results
    }
}

pub struct Rsn004WorkingCapitalDays;

impl Check for Rsn004WorkingCapitalDays {
    fn id(&self) -> &'static str {
        "RSN-004"
    }
    fn name(&self) -> &'static str {
        "days sales/inventory/payable outstanding are within plausible ranges"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        let mut results = Vec::new();
        for period in model.get_ordered_periods() {
            let Some(is) = model.income_statements.get(&period) else {
                continue;
            };
            let Some(bs) = model.balance_sheets.get(&period) else {
                continue;
            };

            if let Some(dso) = safe_div(is.revenue, 365.0).and_then(|daily| safe_div(bs.accounts_receivable, daily)) {
                let severity = if (0.0..=180.0).contains(&dso) { Severity::Pass } else { Severity::Warning };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!("DSO for {period}: {dso:.1} days"),
                    None,
                    Some(dso),
                    None,
                ));
            }
            if let Some(dio) = safe_div(is.cogs, 365.0).and_then(|daily| safe_div(bs.inventory, daily)) {
                let severity = if (0.0..=365.0).contains(&dio) { Severity::Pass } else { Severity::Warning };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!("DIO for {period}: {dio:.1} days"),
                    None,
                    Some(dio),
                    None,
                ));
            }
            if let Some(dpo) = safe_div(is.cogs, 365.0).and_then(|daily| safe_div(bs.accounts_payable, daily)) {
                let severity = if (0.0..=180.0).contains(&dpo) { Severity::Pass } else { Severity::Warning };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!("DPO for {period}: {dpo:.1} days"),
                    None,
                    Some(dpo),
                    None,
                ));
            }
        }
        results
    }
}

pub struct Rsn005NoNegativeBalances;

impl Check for Rsn005NoNegativeBalances {
    fn id(&self) -> &'static str {
        "RSN-005"
    }
    fn name(&self) -> &'static str {
        "fields that should never go negative don't"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        let mut results = Vec::new();
        for (period, bs) in &model.balance_sheets {
            for (field, value) in [
                ("cash", bs.cash),
                ("accounts_receivable", bs.accounts_receivable),
                ("inventory", bs.inventory),
                ("total_assets", bs.total_assets),
                ("accounts_payable", bs.accounts_payable),
            ] {
                if value < 0.0 {
                    results.push(build_result(
                        self,
                        Some(period),
                        Severity::Error,
                        format!("{field} is negative for {period}: {value:.4}"),
                        Some(0.0),
                        Some(value),
                        None,
                    ));
                }
            }
        }
        for (period, is) in &model.income_statements {
            for (field, value) in [("revenue", is.revenue), ("cogs", is.cogs)] {
                if value < 0.0 {
                    results.push(build_result(
                        self,
                        Some(period),
                        Severity::Error,
                        format!("{field} is negative for {period}: {value:.4}"),
                        Some(0.0),
                        Some(value),
                        None,
                    ));
                }
            }
        }
        results
    }
}

pub struct Rsn006CapexRatio;

impl Check for Rsn006CapexRatio {
    fn id(&self) -> &'static str {
        "RSN-006"
    }
    fn name(&self) -> &'static str {
        "capex as a share of revenue is plausible"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        model
            .get_ordered_periods()
            .iter()
            .filter_map(|period| {
                let is = model.income_statements.get(period)?;
                let cf = model.cash_flows.get(period)?;
                let ratio = safe_div(cf.capex.abs(), is.revenue)?;
                let severity = if ratio > 0.40 { Severity::Warning } else { Severity::Pass };
                Some(build_result(
                    self,
                    Some(period),
                    severity,
                    format!("capex/revenue for {period}: {:.2}%", ratio * 100.0),
                    Some(0.40),
                    Some(ratio),
                    None,
                ))
            })
            .collect()
    }
}

pub struct Rsn007FreeCashFlowConsistency;

impl Check for Rsn007FreeCashFlowConsistency {
    fn id(&self) -> &'static str {
        "RSN-007"
    }
    fn name(&self) -> &'static str {
        "free cash flow reconciles and doesn't stay negative too long"
    }
    fn category(&self) -> CheckCategory {
        CheckCategory::Reasonableness
    }
    fn run(&self, model: &FinancialModel) -> Vec<CheckResult> {
        let mut results = Vec::new();
        let mut consecutive_negative = 0u32;

        for period in model.get_ordered_periods() {
            let Some(cf) = model.cash_flows.get(&period) else {
                continue;
            };
            let implied_fcf = cf.cash_from_operations + cf.capex;

            if let Some(stated) = cf.free_cash_flow {
                let severity = if (implied_fcf - stated).abs() <= 1e-6.max(0.01 * stated.abs()) {
                    Severity::Pass
                } else {
                    Severity::Error
                };
                results.push(build_result(
                    self,
                    Some(&period),
                    severity,
                    format!(
                        "free cash flow for {period}: stated {stated:.4}, implied {implied_fcf:.4}"
                    ),
                    Some(implied_fcf),
                    Some(stated),
                    None,
                ));
            }

            if implied_fcf < 0.0 {
                consecutive_negative += 1;
                if consecutive_negative >= 3 {
                    results.push(build_result(
                        self,
                        Some(&period),
                        Severity::Warning,
                        format!("free cash flow has been negative for {consecutive_negative} consecutive periods through {period}"),
                        None,
                        Some(implied_fcf),
                        None,
                    ));
                }
            } else {
                consecutive_negative = 0;
            }
        }

        results
    }
}

pub fn all(_tol: Tolerance) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(Rsn001MarginStability),
        Box::new(Rsn002RevenueGrowthBand),
        Box::new(Rsn003Leverage),
        Box::new(Rsn004WorkingCapitalDays),
        Box::new(Rsn005NoNegativeBalances),
        Box::new(Rsn006CapexRatio),
        Box::new(Rsn007FreeCashFlowConsistency),
    ]
}
