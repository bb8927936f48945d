//! Amortization Tests
//!
//! Annuity formula against known values and an independent closed form,
//! plus schedule properties over random loans.

use econosim_core_rs::credit::{annuity_payment, split_payment};
use proptest::prelude::*;

/// Textbook form, used only as a cross-check
fn reference_payment(balance: f64, r: f64, n: u32) -> f64 {
    balance * r / (1.0 - (1.0 + r).powi(-(n as i32)))
}

#[test]
fn test_zero_rate_divides_evenly() {
    assert_eq!(annuity_payment(12_000.0, 0.0, 12), 1_000.0);
}

#[test]
fn test_one_percent_annual_over_a_year() {
    let payment = annuity_payment(10_000.0, 0.01 / 12.0, 12);
    assert!((payment - 837.854_115_558).abs() < 1e-6);
    assert!((payment - reference_payment(10_000.0, 0.01 / 12.0, 12)).abs() < 1e-6);
}

#[test]
fn test_tiny_rate_stays_close_to_linear() {
    let payment = annuity_payment(36_000.0, 1e-12, 360);
    assert!((payment - 100.0).abs() < 1e-6);
}

#[test]
fn test_long_term_matches_reference() {
    let r = 0.05 / 12.0;
    let payment = annuity_payment(250_000.0, r, 360);
    assert!((payment - reference_payment(250_000.0, r, 360)).abs() < 1e-6);
}

#[test]
fn test_split_interest_first() {
    let split = split_payment(10_000.0, 0.01, 12);
    assert!((split.interest_due - 100.0).abs() < 1e-9);
    assert!((split.principal_due - (split.payment - 100.0)).abs() < 1e-9);
    assert!((split.total_due() - split.payment).abs() < 1e-9);
}

proptest! {
    /// Paying each scheduled instalment retires the loan at the final month
    #[test]
    fn prop_schedule_retires_balance(
        principal in 100.0f64..500_000.0,
        annual_rate in 0.0f64..0.25,
        term in 1u32..361,
    ) {
        let r = annual_rate / 12.0;
        let mut balance = principal;
        for month in 0..term {
            let split = split_payment(balance, r, term - month);
            prop_assert!(split.principal_due >= 0.0);
            balance -= split.principal_due;
        }
        prop_assert!(balance.abs() <= 1e-6 * principal);
    }

    /// With a positive rate the borrower repays more than the principal
    #[test]
    fn prop_positive_rate_costs_interest(
        principal in 100.0f64..100_000.0,
        annual_rate in 0.001f64..0.25,
        term in 2u32..240,
    ) {
        let payment = annuity_payment(principal, annual_rate / 12.0, term);
        prop_assert!(payment * f64::from(term) > principal);
        prop_assert!(payment > principal / f64::from(term));
    }
}
