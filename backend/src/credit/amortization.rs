//! Fixed-annuity amortization
//!
//! Pure functions, no state. The payment for balance `B`, monthly rate `r`
//! and `n` remaining months is
//!
//! ```text
//! B · r / (1 − (1 + r)^−n)
//! ```
//!
//! evaluated as `B · r / −expm1(−n · ln1p(r))` so it stays accurate when
//! `r` is tiny and `n` is up to a few hundred months.

/// Interest and principal parts of one scheduled instalment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    /// Full instalment requested from the borrower
    pub payment: f64,

    /// `balance × monthly_rate`
    pub interest_due: f64,

    /// `max(payment − interest_due, 0)`
    pub principal_due: f64,
}

impl PaymentSplit {
    /// What the bank asks the borrower to pay
    pub fn total_due(&self) -> f64 {
        self.interest_due + self.principal_due
    }
}

/// Level monthly payment that retires `balance` over `term_months`
///
/// A term below one month is treated as one. A non-positive rate amortizes
/// linearly.
///
/// # Example
///
/// ```
/// use econosim_core_rs::credit::annuity_payment;
///
/// assert_eq!(annuity_payment(12_000.0, 0.0, 12), 1_000.0);
/// assert!((annuity_payment(10_000.0, 0.01 / 12.0, 12) - 837.854_115_558).abs() < 1e-6);
/// ```
pub fn annuity_payment(balance: f64, monthly_rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months.max(1));
    if monthly_rate <= 0.0 {
        return balance / n;
    }
    let denominator = -(-n * monthly_rate.ln_1p()).exp_m1();
    balance * monthly_rate / denominator
}

/// Instalment for the coming month split into interest and principal
pub fn split_payment(balance: f64, monthly_rate: f64, remaining_term: u32) -> PaymentSplit {
    let payment = annuity_payment(balance, monthly_rate, remaining_term);
    let interest_due = balance * monthly_rate;
    PaymentSplit {
        payment,
        interest_due,
        principal_due: (payment - interest_due).max(0.0),
    }
}
