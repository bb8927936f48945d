//! Loan Metrics Tests
//!
//! Shares, age buckets and performing ratio over a live loan book.

use econosim_core_rs::credit::{LoanLedger, LoanMetrics, LoanRequest, AGE_BUCKETS};
use econosim_core_rs::models::{BorrowerId, BorrowerKind, Household, HouseholdParams};
use econosim_core_rs::{Bank, BankConfig, Population};

fn zero_rate_bank(cash: f64) -> (Bank, Population) {
    let mut hh = Household::new(40, cash, HouseholdParams::default());
    hh.hire(0, 5_000.0);
    let population = Population::new(vec![hh], vec![]);
    let config = BankConfig {
        loan_rate_base_annual: 0.0,
        household_spread: 0.0,
        ..Default::default()
    };
    let bank = Bank::new(config, &population).unwrap();
    (bank, population)
}

fn request(amount: f64, term: i32, purpose: &str) -> LoanRequest {
    LoanRequest::new(BorrowerId::Household(0), amount)
        .with_term(term)
        .with_purpose(purpose)
}

#[test]
fn test_empty_book_defaults() {
    let metrics = LoanMetrics::compute(&LoanLedger::new());
    assert_eq!(metrics.active_balance, 0.0);
    assert_eq!(metrics.performing_share, 1.0);
    assert_eq!(metrics.avg_active_age, 0.0);
    for (label, _, _) in AGE_BUCKETS {
        assert_eq!(metrics.age_bucket_share(label), 0.0);
    }
    assert!(metrics.purpose_shares.is_empty());
}

#[test]
fn test_purpose_shares_sum_to_one() {
    let mut ledger = LoanLedger::new();
    let book = [
        (1_000.0, "investment"),
        (3_000.0, "buffer_top_up"),
        (1_000.0, "investment"),
    ];
    for (i, (amount, purpose)) in book.into_iter().enumerate() {
        ledger.book(
            BorrowerId::Household(i),
            BorrowerKind::Household,
            amount,
            0.02,
            12,
            purpose.to_string(),
            0,
        );
    }

    let metrics = LoanMetrics::compute(&ledger);

    assert_eq!(metrics.active_balance, 5_000.0);
    assert!((metrics.purpose_share("investment") - 0.4).abs() < 1e-12);
    assert!((metrics.purpose_share("buffer_top_up") - 0.6).abs() < 1e-12);
    assert_eq!(metrics.purpose_share("mortgage"), 0.0);
    let purpose_total: f64 = metrics.purpose_shares.values().sum();
    let bucket_total: f64 = metrics.age_bucket_shares.values().sum();
    assert!((purpose_total - 1.0).abs() < 1e-12);
    assert!((bucket_total - 1.0).abs() < 1e-12);
    assert_eq!(metrics.age_bucket_share("0_6"), 1.0);
}

#[test]
fn test_compute_is_idempotent() {
    let (mut bank, mut pop) = zero_rate_bank(50_000.0);
    bank.request_loan(&mut pop, request(1_200.0, 12, "buffer_top_up"));
    bank.step(&mut pop);
    bank.step(&mut pop);

    let first = LoanMetrics::compute(bank.ledger());
    let second = LoanMetrics::compute(bank.ledger());
    assert_eq!(first, second);
    assert_eq!(&first, bank.loan_metrics());
}

#[test]
fn test_age_buckets_follow_loan_age() {
    let (mut bank, mut pop) = zero_rate_bank(100_000.0);
    assert!(bank.request_loan(&mut pop, request(1_200.0, 12, "buffer_top_up")));
    for _ in 0..6 {
        bank.step(&mut pop);
    }
    assert!(bank.request_loan(&mut pop, request(2_400.0, 24, "investment")));

    let metrics = bank.loan_metrics();
    assert!((metrics.active_balance - 3_100.0).abs() < 1e-9);
    assert!((metrics.age_bucket_share("6_12") - 700.0 / 3_100.0).abs() < 1e-12);
    assert!((metrics.age_bucket_share("0_6") - 2_400.0 / 3_100.0).abs() < 1e-12);
    assert_eq!(metrics.age_bucket_share("12_24"), 0.0);
    assert!((metrics.avg_active_age - 3.0).abs() < 1e-12);
    assert_eq!(bank.loan_metrics_history().len(), 6);
}

#[test]
fn test_zero_rate_shortfall_defaults_at_end_of_term() {
    let (mut bank, mut pop) = zero_rate_bank(0.0);
    bank.request_loan(&mut pop, request(1_000.0, 12, "buffer_top_up"));
    bank.step(&mut pop);
    pop.households[0].set_cash(0.0);

    // Nothing is short of a zero interest charge, so the loan keeps performing
    bank.step(&mut pop);
    assert_eq!(bank.loan_metrics().performing_share, 1.0);
    assert_eq!(bank.total_loans(), 1_000.0);

    for _ in 0..11 {
        bank.step(&mut pop);
    }
    let metrics = bank.loan_metrics();
    assert_eq!(bank.total_loans(), 0.0);
    assert!((bank.total_defaulted() - 800.0).abs() < 1e-9);
    assert_eq!(metrics.active_balance, 0.0);
    assert_eq!(metrics.nonperforming_balance, 1_000.0);
    assert_eq!(metrics.performing_share, 0.0);
    assert!(bank.aggregates_consistent());
}

#[test]
fn test_flat_map_keys() {
    let mut ledger = LoanLedger::new();
    ledger.book(
        BorrowerId::Firm(0),
        BorrowerKind::Firm,
        500.0,
        0.0,
        6,
        "investment".to_string(),
        0,
    );
    let map = LoanMetrics::compute(&ledger).as_map();
    assert_eq!(map.get("purpose_investment_share"), Some(&1.0));
    assert_eq!(map.get("age_bucket_0_6_share"), Some(&1.0));
    assert_eq!(map.get("age_bucket_24_plus_share"), Some(&0.0));
    assert_eq!(map.get("performing_share"), Some(&1.0));
}
