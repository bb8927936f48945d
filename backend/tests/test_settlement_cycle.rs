//! Settlement Cycle Tests
//!
//! Monthly collection, defaults, deposit interest and the lending halt,
//! driven through `Bank::step`.

use econosim_core_rs::credit::LoanRequest;
use econosim_core_rs::models::{
    BorrowerId, BorrowerKind, Depositor, Firm, Household, HouseholdParams, InvestmentPlan,
    LoanStatus,
};
use econosim_core_rs::{Bank, BankConfig, Event, Population};

// ============================================================================
// Test Helpers
// ============================================================================

fn zero_rate_config() -> BankConfig {
    BankConfig {
        loan_rate_base_annual: 0.0,
        household_spread: 0.0,
        firm_spread: 0.0,
        deposit_rate_annual: 0.0,
        ..Default::default()
    }
}

fn employed(cash: f64) -> Household {
    let mut hh = Household::new(40, cash, HouseholdParams::default());
    hh.hire(0, 5_000.0);
    hh
}

fn single_household(config: BankConfig, cash: f64) -> (Bank, Population) {
    let population = Population::new(vec![employed(cash)], vec![]);
    let bank = Bank::new(config, &population).unwrap();
    (bank, population)
}

fn approve(bank: &mut Bank, pop: &mut Population, amount: f64, term: i32) {
    let request = LoanRequest::new(BorrowerId::Household(0), amount).with_term(term);
    assert!(bank.request_loan(pop, request));
}

// ============================================================================
// Collection
// ============================================================================

#[test]
fn test_first_cycle_is_grace_month() {
    let (mut bank, mut pop) = single_household(zero_rate_config(), 0.0);
    approve(&mut bank, &mut pop, 1_200.0, 12);

    let totals = bank.step(&mut pop);

    assert_eq!(totals.payments, 0);
    assert_eq!(bank.total_loans(), 1_200.0);
    assert_eq!(bank.active_loans()[0].age_months(), 1);
    assert_eq!(bank.active_loans()[0].remaining_term(), 12);
}

#[test]
fn test_zero_rate_loan_repaid_in_term() {
    let (mut bank, mut pop) = single_household(zero_rate_config(), 20_000.0);
    approve(&mut bank, &mut pop, 12_000.0, 12);

    bank.step(&mut pop);
    for _ in 0..12 {
        let totals = bank.step(&mut pop);
        assert!((totals.principal_collected - 1_000.0).abs() < 1e-9);
    }

    assert_eq!(bank.ledger().count_with_status(LoanStatus::Repaid), 1);
    assert!(bank.total_loans().abs() < 1e-9);
    assert!(pop.debt_of(BorrowerId::Household(0)).unwrap().abs() < 1e-9);
    assert!((pop.households[0].cash() - 20_000.0).abs() < 1e-6);
    assert_eq!(bank.events().events_of_type("LoanRepaid").len(), 1);
    assert_eq!(bank.events().events_of_type("PaymentCollected").len(), 12);
}

#[test]
fn test_event_log_limit_keeps_latest_events() {
    let config = BankConfig {
        event_log_limit: Some(5),
        ..zero_rate_config()
    };
    let (mut bank, mut pop) = single_household(config, 20_000.0);
    approve(&mut bank, &mut pop, 12_000.0, 12);
    for _ in 0..13 {
        bank.step(&mut pop);
    }

    // One approval, twelve payments and one repayment
    let events = bank.events();
    assert_eq!(events.len(), 5);
    assert_eq!(events.dropped(), 9);
    assert!(events.events_of_type("LoanApproved").is_empty());
    assert!(matches!(events.iter().last(), Some(Event::LoanRepaid { .. })));

    let snapshot = bank.snapshot().unwrap();
    assert_eq!(snapshot.events.len(), 5);
    assert_eq!(bank.ledger().count_with_status(LoanStatus::Repaid), 1);
}

#[test]
fn test_interest_goes_to_equity() {
    let config = BankConfig {
        loan_rate_base_annual: 0.12,
        household_spread: 0.0,
        ..Default::default()
    };
    let (mut bank, mut pop) = single_household(config, 10_000.0);
    approve(&mut bank, &mut pop, 10_000.0, 12);
    let equity_before = bank.equity();

    bank.step(&mut pop);
    let totals = bank.step(&mut pop);

    assert!((totals.interest_income - 100.0).abs() < 1e-9);
    assert!((bank.equity() - equity_before - 100.0).abs() < 1e-9);
}

#[test]
fn test_zero_rates_conserve_money_net_of_loans() {
    let (mut bank, mut pop) = single_household(zero_rate_config(), 10_000.0);
    let baseline = bank.money_supply() - bank.total_loans();

    approve(&mut bank, &mut pop, 6_000.0, 12);
    for _ in 0..14 {
        bank.step(&mut pop);
        let net = bank.money_supply() - bank.total_loans();
        assert!((net - baseline).abs() <= 1e-6 * baseline);
    }
    assert!(bank.total_loans().abs() < 1e-6);
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_first_payment_shortfall_defaults() {
    let (mut bank, mut pop) = single_household(BankConfig::default(), 0.0);
    approve(&mut bank, &mut pop, 4_000.0, 24);
    pop.households[0].set_cash(0.0);

    let reserves_before = bank.cash_reserves();
    let equity_before = bank.equity();
    bank.step(&mut pop);
    let totals = bank.step(&mut pop);

    assert_eq!(totals.defaults, 1);
    assert!((totals.default_losses - 3_200.0).abs() < 1e-9);
    assert!((bank.total_defaulted() - 3_200.0).abs() < 1e-9);
    assert!((bank.cash_reserves() - reserves_before - 800.0).abs() < 1e-9);
    assert!((bank.equity() - equity_before + 3_200.0).abs() < 1e-9);
    assert_eq!(bank.total_loans(), 0.0);
    assert_eq!(pop.debt_of(BorrowerId::Household(0)), Some(0.0));
    assert_eq!(bank.ledger().count_with_status(LoanStatus::Defaulted), 1);
    assert_eq!(bank.loan_metrics().performing_share, 0.0);

    let defaulted = bank.events().events_of_type("LoanDefaulted");
    assert_eq!(defaulted.len(), 1);
    assert!(matches!(defaulted[0], Event::LoanDefaulted { balance, .. } if *balance == 4_000.0));
}

#[test]
fn test_default_loss_halts_lending() {
    let config = BankConfig {
        initial_equity: 1_000.0,
        ..Default::default()
    };
    let firm = Firm::new(2_500.0, 0.0, InvestmentPlan::default());
    let mut pop = Population::new(vec![employed(10_000.0)], vec![firm]);
    let mut bank = Bank::new(config, &pop).unwrap();

    approve(&mut bank, &mut pop, 1_000.0, 12);
    let request = LoanRequest::new(BorrowerId::Firm(0), 11_000.0)
        .with_kind(BorrowerKind::Firm)
        .with_term(12);
    assert!(bank.request_loan(&mut pop, request));
    pop.firms[0].set_cash(0.0);

    bank.step(&mut pop);
    assert!(!bank.stop_lending());
    bank.step(&mut pop);

    assert!(bank.equity() < 0.0);
    assert_eq!(bank.capital_ratio(), 0.0);
    assert!(bank.stop_lending());
    assert_eq!(bank.events().events_of_type("LendingHaltChanged").len(), 1);

    let request = LoanRequest::new(BorrowerId::Household(0), 100.0);
    assert!(!bank.request_loan(&mut pop, request));
}

/// Term-1 loan at 12%: instalment 1010, of which 10 is interest
fn final_instalment_outcome(cash_at_due: f64) -> (Bank, Population) {
    let config = BankConfig {
        loan_rate_base_annual: 0.12,
        household_spread: 0.0,
        ..Default::default()
    };
    let (mut bank, mut pop) = single_household(config, 0.0);
    approve(&mut bank, &mut pop, 1_000.0, 1);
    bank.step(&mut pop);
    pop.households[0].set_cash(cash_at_due);
    bank.step(&mut pop);
    (bank, pop)
}

#[test]
fn test_unpaid_principal_at_term_end_uses_recovery_rate() {
    let (below_interest, _) = final_instalment_outcome(9.0);
    let (interest_only, pop) = final_instalment_outcome(10.0);

    for bank in [&below_interest, &interest_only] {
        assert_eq!(bank.ledger().count_with_status(LoanStatus::Defaulted), 1);
        assert!((bank.total_defaulted() - 800.0).abs() < 1e-9);
        assert_eq!(bank.loan_metrics().nonperforming_balance, 1_000.0);
        assert_eq!(bank.total_loans(), 0.0);
    }

    // Paying the interest never leaves the bank worse off than missing it
    assert!((below_interest.equity() - 99_200.0).abs() < 1e-9);
    assert!((interest_only.equity() - 99_210.0).abs() < 1e-9);
    assert_eq!(pop.debt_of(BorrowerId::Household(0)), Some(0.0));
}

// ============================================================================
// Deposit interest
// ============================================================================

#[test]
fn test_deposit_interest_credited_to_positive_balances() {
    let config = BankConfig {
        deposit_rate_annual: 0.12,
        ..Default::default()
    };
    let households = vec![employed(1_000.0), employed(-50.0)];
    let firms = vec![Firm::new(2_500.0, 500.0, InvestmentPlan::default())];
    let mut pop = Population::new(households, firms);
    let mut bank = Bank::new(config, &pop).unwrap();
    let deposits_before = bank.total_deposits();
    let equity_before = bank.equity();

    let totals = bank.step(&mut pop);

    assert!((totals.deposit_interest_paid - 15.0).abs() < 1e-9);
    assert!((pop.households[0].cash() - 1_010.0).abs() < 1e-9);
    assert_eq!(pop.households[1].cash(), -50.0);
    assert!((pop.firms[0].cash() - 505.0).abs() < 1e-9);
    assert!((bank.total_deposits() - deposits_before - 15.0).abs() < 1e-9);
    assert!((bank.equity() - equity_before + 15.0).abs() < 1e-9);
}

#[test]
fn test_write_off_loss_reported_next_cycle() {
    let (mut bank, mut pop) = single_household(zero_rate_config(), 0.0);
    approve(&mut bank, &mut pop, 2_000.0, 12);
    pop.households[0].set_cash(500.0);

    let write_off = bank.write_off_borrower(&mut pop, BorrowerId::Household(0), 500.0);

    assert_eq!(write_off.loans, 1);
    assert_eq!(write_off.recovered, 500.0);
    assert_eq!(write_off.loss, 1_500.0);
    assert_eq!(bank.total_loans(), 0.0);
    assert_eq!(pop.households[0].cash(), 0.0);

    let totals = bank.step(&mut pop);
    assert_eq!(totals.write_off_losses, 1_500.0);
    assert_eq!(bank.step(&mut pop).write_off_losses, 0.0);
}
