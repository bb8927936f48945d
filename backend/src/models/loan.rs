//! Loan record model
//!
//! One origination event and its running state.
//!
//! # Critical Invariants
//!
//! 1. `balance` never increases and never goes below zero
//! 2. Status moves one way: Active → Repaid or Active → Defaulted
//! 3. `remaining_term` drops by at most one per settlement cycle
//! 4. `original_balance` is fixed at creation

use crate::models::borrower::{BorrowerId, BorrowerKind};
use serde::{Deserialize, Serialize};

/// Sequential loan identifier, unique within one bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoanId(pub u64);

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loan_{:06}", self.0)
    }
}

/// Loan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Performing, collected every settlement cycle
    Active,

    /// Fully amortized (terminal)
    Repaid,

    /// Written off after a payment shortfall or borrower failure (terminal)
    Defaulted,
}

/// A loan issued by the bank
///
/// # Example
/// ```
/// use econosim_core_rs::models::{BorrowerId, BorrowerKind, LoanId, LoanRecord, LoanStatus};
///
/// let loan = LoanRecord::new(
///     LoanId(1),
///     BorrowerId::Household(0),
///     BorrowerKind::Household,
///     6_000.0,
///     0.03,
///     12,
///     "buffer_top_up".to_string(),
///     4,
/// );
/// assert_eq!(loan.status(), LoanStatus::Active);
/// assert_eq!(loan.monthly_rate(), 0.0025);
/// assert_eq!(loan.age_months(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    id: LoanId,

    /// Handle to the borrowing agent (not owned)
    borrower: BorrowerId,

    kind: BorrowerKind,

    /// Outstanding principal
    balance: f64,

    /// Annual nominal rate
    annual_rate: f64,

    /// Original term in months
    term_months: u32,

    remaining_term: u32,

    status: LoanStatus,

    /// Months since origination; 0 until the first cycle has passed
    age_months: u32,

    /// Reporting tag ("investment", "buffer_top_up", ...)
    purpose: String,

    original_balance: f64,

    /// Month the loan was originated
    originated_month: u32,
}

impl LoanRecord {
    /// Create an active loan with the full principal outstanding
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LoanId,
        borrower: BorrowerId,
        kind: BorrowerKind,
        principal: f64,
        annual_rate: f64,
        term_months: u32,
        purpose: String,
        originated_month: u32,
    ) -> Self {
        Self {
            id,
            borrower,
            kind,
            balance: principal,
            annual_rate,
            term_months,
            remaining_term: term_months,
            status: LoanStatus::Active,
            age_months: 0,
            purpose,
            original_balance: principal,
            originated_month,
        }
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn borrower(&self) -> BorrowerId {
        self.borrower
    }

    pub fn kind(&self) -> BorrowerKind {
        self.kind
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    /// Annual rate divided evenly across twelve months
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn remaining_term(&self) -> u32 {
        self.remaining_term
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn age_months(&self) -> u32 {
        self.age_months
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn original_balance(&self) -> f64 {
        self.original_balance
    }

    pub fn originated_month(&self) -> u32 {
        self.originated_month
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Age the loan through its grace month without collecting
    pub(crate) fn pass_grace_month(&mut self) {
        debug_assert_eq!(self.age_months, 0);
        self.age_months += 1;
    }

    /// Apply one collected instalment's principal and advance the schedule
    ///
    /// Principal is capped at the outstanding balance so the balance can
    /// never go negative.
    pub(crate) fn apply_instalment(&mut self, principal_paid: f64) -> f64 {
        let applied = principal_paid.clamp(0.0, self.balance);
        self.balance -= applied;
        self.remaining_term = self.remaining_term.saturating_sub(1);
        self.age_months += 1;
        applied
    }

    /// Active → Repaid. No-op on terminal loans; returns whether it transitioned.
    pub(crate) fn mark_repaid(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = LoanStatus::Repaid;
        true
    }

    /// Active → Defaulted, zeroing balance and term
    ///
    /// Returns the balance written off, or `None` if the loan was not active.
    pub(crate) fn mark_defaulted(&mut self) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        let written_off = self.balance;
        self.balance = 0.0;
        self.remaining_term = 0;
        self.status = LoanStatus::Defaulted;
        Some(written_off)
    }
}
