use fs_verify::{
    BalanceSheet, CashFlowStatement, CheckCategory, EngineConfig, FinancialModel, IncomeStatement,
    MappingConfig, Severity, VerificationEngine,
};

fn s1_model() -> FinancialModel {
    let mut model = FinancialModel::new();
    model.company_name = "Acme Corp".to_string();
    model.periods = vec!["FY2024".to_string()];
    model.historical_periods = vec!["FY2024".to_string()];

    let mut is = IncomeStatement::new("FY2024");
    is.revenue = 1000.0;
    is.cogs = 600.0;
    is.gross_profit = 400.0;
    is.sga = 100.0;
    is.rd = 50.0;
    is.depreciation = 30.0;
    is.amortization = 10.0;
    is.other_opex = 10.0;
    is.total_opex = 200.0;
    is.ebit = 200.0;
    is.interest_expense = 20.0;
    is.interest_income = 0.0;
    is.other_income_expense = 0.0;
    is.ebt = 180.0;
    is.tax_expense = 36.0;
    is.net_income = 144.0;

    let mut bs = BalanceSheet::new("FY2024");
    bs.cash = 160.0;
    bs.accounts_receivable = 200.0;
    bs.inventory = 140.0;
    bs.total_current_assets = 500.0;
    bs.ppe_gross = 1200.0;
    bs.accumulated_depreciation = 200.0;
    bs.ppe_net = 1000.0;
    bs.total_non_current_assets = 1000.0;
    bs.total_assets = 1500.0;
    bs.accounts_payable = 150.0;
    bs.accrued_liabilities = 50.0;
    bs.total_current_liabilities = 200.0;
    bs.long_term_debt = 500.0;
    bs.total_non_current_liabilities = 500.0;
    bs.total_liabilities = 700.0;
    bs.common_stock = 100.0;
    bs.retained_earnings = 700.0;
    bs.total_equity = 800.0;
    bs.total_liabilities_and_equity = 1500.0;

    let mut cf = CashFlowStatement::new("FY2024");
    cf.net_income = 144.0;
    cf.depreciation_amortization = 40.0;
    cf.change_in_receivables = -20.0;
    cf.change_in_inventory = 10.0;
    cf.change_in_payables = 26.0;
    cf.cash_from_operations = 200.0;
    cf.capex = -80.0;
    cf.cash_from_investing = -80.0;
    cf.dividends_paid = -60.0;
    cf.cash_from_financing = -60.0;
    cf.net_change_in_cash = 60.0;
    cf.beginning_cash = 100.0;
    cf.ending_cash = 160.0;

    model.income_statements.insert("FY2024".to_string(), is);
    model.balance_sheets.insert("FY2024".to_string(), bs);
    model.cash_flows.insert("FY2024".to_string(), cf);
    model
}

fn engine() -> VerificationEngine {
    VerificationEngine::new(MappingConfig::default(), &EngineConfig::default())
}

#[test]
fn s1_identity_model_is_clean() {
    let report = engine().verify_model(&s1_model(), "2024-01-01T00:00:00Z");
    assert_eq!(report.summary.overall_health.as_str(), "clean");
    assert!(report.results.iter().all(|r| r.severity == Severity::Pass));
    assert!(report.summary.total_checks > 0);
}

#[test]
fn s2_broken_balance_sheet_is_critical_with_exact_delta() {
    let mut model = s1_model();
    {
        let bs = model.balance_sheets.get_mut("FY2024").unwrap();
        // Inflate retained earnings and total equity together so STR-033 and
        // STR-004 still balance; only the assets-vs-liabilities-and-equity
        // identity (STR-001) is broken.
        bs.retained_earnings = 710.0;
        bs.total_equity = 810.0;
        bs.total_liabilities_and_equity = 1510.0;
    }

    let report = engine().verify_model(&model, "2024-01-01T00:00:00Z");
    assert_eq!(report.summary.overall_health.as_str(), "critical");

    let str001 = report
        .results
        .iter()
        .find(|r| r.check_id == "STR-001")
        .unwrap();
    assert_eq!(str001.severity, Severity::Critical);
    assert_eq!(str001.delta, Some(10.0));

    let other_structural_failures = report
        .results
        .iter()
        .filter(|r| r.category == CheckCategory::Structural && r.check_id != "STR-001")
        .filter(|r| r.severity != Severity::Pass)
        .count();
    assert_eq!(other_structural_failures, 0);
}

#[test]
fn s3_retained_earnings_rollforward_passes_then_fails() {
    let mut model = FinancialModel::new();
    model.periods = vec!["FY2023".to_string(), "FY2024".to_string()];

    let mut bs_prev = BalanceSheet::new("FY2023");
    bs_prev.retained_earnings = 500.0;
    let mut bs_cur = BalanceSheet::new("FY2024");
    bs_cur.retained_earnings = 570.0;
    model.balance_sheets.insert("FY2023".to_string(), bs_prev);
    model.balance_sheets.insert("FY2024".to_string(), bs_cur);

    let mut is_cur = IncomeStatement::new("FY2024");
    is_cur.net_income = 100.0;
    model.income_statements.insert("FY2024".to_string(), is_cur);

    let mut cf_cur = CashFlowStatement::new("FY2024");
    cf_cur.dividends_paid = -30.0;
    model.cash_flows.insert("FY2024".to_string(), cf_cur);

    let report = engine().verify_model(&model, "t");
    let xst002 = report
        .results
        .iter()
        .find(|r| r.check_id == "XST-002")
        .unwrap();
    assert_eq!(xst002.severity, Severity::Pass);

    model.balance_sheets.get_mut("FY2024").unwrap().retained_earnings = 590.0;
    let report = engine().verify_model(&model, "t");
    let xst002 = report
        .results
        .iter()
        .find(|r| r.check_id == "XST-002")
        .unwrap();
    assert_eq!(xst002.severity, Severity::Error);
    assert_eq!(xst002.delta, Some(20.0));
}

#[test]
fn s4_ambiguous_fuzzy_candidates_stay_unmapped() {
    let config = MappingConfig::from_yaml(
        r#"
settings:
  fuzzy_threshold: 50
income_statement:
  other_income:
    aliases: ["alpha"]
  other_expense:
    aliases: ["alphb"]
"#,
    )
    .unwrap();
    let resolver = fs_verify::FieldResolver::new(&config);
    let result = resolver.resolve("alphx", fs_verify::StatementType::IncomeStatement);
    assert_eq!(result.match_type, fs_verify::MatchType::Unmapped);
    assert_eq!(result.internal_field, None);
    assert_eq!(result.fuzzy_candidates.len(), 2);
}

#[test]
fn s5_stacked_sheet_stops_before_the_second_revenue_section() {
    let config = MappingConfig::from_yaml(
        r#"
income_statement:
  revenue:
    aliases: []
  cogs:
    aliases: []
"#,
    )
    .unwrap();
    let resolver = fs_verify::FieldResolver::new(&config);

    let grid: Vec<Vec<String>> = vec![
        vec!["AcmeCo \u{2014} Model".to_string()],
        vec![],
        vec!["Income Statement".to_string()],
        vec!["".to_string(), "FY2023".to_string(), "FY2024E".to_string()],
        vec!["Revenue".to_string(), "1000".to_string(), "1200".to_string()],
        vec!["COGS".to_string(), "600".to_string(), "700".to_string()],
        vec!["DCF Valuation".to_string()],
        vec!["Revenue".to_string(), "2000".to_string(), "2500".to_string()],
    ];

    let (model, _) = fs_verify::ingestion::parse_stacked_grid(&grid, &resolver, &config).unwrap();
    assert_eq!(model.company_name, "AcmeCo");

    let fy2023 = model.income_statements.get("FY2023").unwrap();
    assert_eq!(fy2023.revenue, 1000.0);
    assert_eq!(fy2023.cogs, 600.0);

    let fy2024 = model.income_statements.get("FY2024E").unwrap();
    assert_eq!(fy2024.revenue, 1200.0);
    assert_eq!(fy2024.cogs, 700.0);
}

#[test]
fn s6_interest_coverage_below_one_is_an_error() {
    let mut model = FinancialModel::new();
    model.periods = vec!["FY2024".to_string()];
    let mut is = IncomeStatement::new("FY2024");
    is.ebit = 10.0;
    is.interest_expense = 15.0;
    model.income_statements.insert("FY2024".to_string(), is);
    model
        .balance_sheets
        .insert("FY2024".to_string(), BalanceSheet::new("FY2024"));

    let report = engine().verify_model(&model, "t");
    let rsn003 = report
        .results
        .iter()
        .filter(|r| r.check_id == "RSN-003")
        .collect::<Vec<_>>();
    assert!(rsn003.iter().any(|r| r.severity == Severity::Error));

    let mut healthy = FinancialModel::new();
    healthy.periods = vec!["FY2024".to_string()];
    let mut is2 = IncomeStatement::new("FY2024");
    is2.ebit = 20.0;
    is2.interest_expense = 10.0;
    healthy.income_statements.insert("FY2024".to_string(), is2);
    healthy
        .balance_sheets
        .insert("FY2024".to_string(), BalanceSheet::new("FY2024"));

    let report = engine().verify_model(&healthy, "t");
    let rsn003 = report
        .results
        .iter()
        .filter(|r| r.check_id == "RSN-003")
        .collect::<Vec<_>>();
    assert!(!rsn003.iter().any(|r| r.severity == Severity::Error));
}

#[test]
fn invariant_total_checks_equals_passed_plus_failed() {
    let report = engine().verify_model(&s1_model(), "t");
    assert_eq!(
        report.summary.total_checks,
        report.summary.passed + report.summary.failed
    );
    let by_severity = &report.summary.by_severity;
    let severity_sum = by_severity.critical
        + by_severity.error
        + by_severity.warning
        + by_severity.info
        + by_severity.pass;
    assert_eq!(severity_sum, report.summary.total_checks);
}

#[test]
fn invariant_self_consistent_model_is_all_pass() {
    let report = engine().verify_model(&s1_model(), "t");
    assert!(report.results.iter().all(|r| r.severity == Severity::Pass));
}

#[test]
fn invariant_structural_checks_are_order_invariant_on_insertion() {
    let model_a = s1_model();

    let mut model_b = FinancialModel::new();
    model_b.company_name = model_a.company_name.clone();
    model_b.periods = model_a.periods.clone();
    model_b.historical_periods = model_a.historical_periods.clone();
    model_b
        .cash_flows
        .insert("FY2024".to_string(), model_a.cash_flows["FY2024"].clone());
    model_b
        .balance_sheets
        .insert("FY2024".to_string(), model_a.balance_sheets["FY2024"].clone());
    model_b
        .income_statements
        .insert("FY2024".to_string(), model_a.income_statements["FY2024"].clone());

    let report_a = engine().verify_model(&model_a, "t");
    let report_b = engine().verify_model(&model_b, "t");

    let structural_a: Vec<Severity> = report_a
        .results
        .iter()
        .filter(|r| r.category == CheckCategory::Structural)
        .map(|r| r.severity)
        .collect();
    let structural_b: Vec<Severity> = report_b
        .results
        .iter()
        .filter(|r| r.category == CheckCategory::Structural)
        .map(|r| r.severity)
        .collect();
    assert_eq!(structural_a, structural_b);
}

#[test]
fn invariant_cross_statement_checks_are_order_sensitive_on_period_pairs() {
    let mut cf_a = CashFlowStatement::new("FY2023");
    cf_a.ending_cash = 50.0;
    let mut cf_b = CashFlowStatement::new("FY2024");
    cf_b.ending_cash = 999.0;

    let mut forward = FinancialModel::new();
    forward.periods = vec!["FY2023".to_string(), "FY2024".to_string()];
    forward.cash_flows.insert("FY2023".to_string(), cf_a.clone());
    forward.cash_flows.insert("FY2024".to_string(), cf_b.clone());

    let mut reversed = FinancialModel::new();
    reversed.periods = vec!["FY2024".to_string(), "FY2023".to_string()];
    reversed.cash_flows.insert("FY2023".to_string(), cf_a);
    reversed.cash_flows.insert("FY2024".to_string(), cf_b);

    let forward_report = engine().verify_model(&forward, "t");
    let reversed_report = engine().verify_model(&reversed, "t");

    let forward_xst004 = forward_report
        .results
        .iter()
        .find(|r| r.check_id == "XST-004")
        .unwrap();
    let reversed_xst004 = reversed_report
        .results
        .iter()
        .find(|r| r.check_id == "XST-004")
        .unwrap();

    assert_eq!(forward_xst004.expected_value, Some(50.0));
    assert_eq!(reversed_xst004.expected_value, Some(999.0));
}
