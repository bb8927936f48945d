//! The bank
//!
//! Single commercial bank of the economy. Owns the loan ledger, the balance
//! sheet and the metrics history; borrowers are reached through a
//! [`BorrowerRegistry`] passed into each call.
//!
//! # Example
//!
//! ```rust
//! use econosim_core_rs::bank::{Bank, BankConfig};
//! use econosim_core_rs::credit::LoanRequest;
//! use econosim_core_rs::models::{BorrowerId, Household, HouseholdParams, Population};
//!
//! let mut hh = Household::new(35, 0.0, HouseholdParams::default());
//! hh.hire(0, 3_000.0);
//! let mut population = Population::new(vec![hh], vec![]);
//!
//! let mut bank = Bank::new(BankConfig::default(), &population).unwrap();
//! let request = LoanRequest::new(BorrowerId::Household(0), 6_000.0).with_term(24);
//! assert!(bank.request_loan(&mut population, request));
//! assert_eq!(bank.total_loans(), 6_000.0);
//!
//! bank.step(&mut population); // grace month
//! bank.step(&mut population); // first instalment
//! assert!(bank.total_loans() < 6_000.0);
//! ```

pub mod balance_sheet;
pub mod checkpoint;
pub mod config;

pub use balance_sheet::BalanceSheet;
pub use checkpoint::{compute_config_hash, BankSnapshot, CheckpointError, AGGREGATE_TOLERANCE};
pub use config::{BankConfig, ConfigError};

use crate::credit::ledger::LoanLedger;
use crate::credit::metrics::{LoanMetrics, MetricsSnapshot};
use crate::credit::underwriting::{self, LoanRequest, Rejection};
use crate::models::borrower::{BorrowerId, BorrowerRegistry};
use crate::models::event::{Event, EventLog};
use crate::models::loan::{LoanId, LoanRecord};
use crate::settlement::{self, Cycle, CycleTotals, WriteOff};

#[derive(Debug, Clone)]
pub struct Bank {
    config: BankConfig,
    ledger: LoanLedger,
    sheet: BalanceSheet,
    metrics: LoanMetrics,
    history: Vec<MetricsSnapshot>,
    last_cycle: CycleTotals,

    /// Write-off losses booked since the last settlement cycle
    pending_write_off_losses: f64,

    events: EventLog,

    /// Month stamped on events and metrics snapshots
    month: u32,
}

impl Bank {
    /// Open the bank, counting the population's existing cash as deposits
    pub fn new<R>(config: BankConfig, registry: &R) -> Result<Self, ConfigError>
    where
        R: BorrowerRegistry + ?Sized,
    {
        config.validate()?;
        let sheet = BalanceSheet::open(config.initial_equity, registry.total_cash());
        let ledger = LoanLedger::new();
        let metrics = LoanMetrics::compute(&ledger);
        let events = EventLog::with_limit(config.event_log_limit);
        Ok(Self {
            config,
            ledger,
            sheet,
            metrics,
            history: Vec::new(),
            last_cycle: CycleTotals::default(),
            pending_write_off_losses: 0.0,
            events,
            month: 0,
        })
    }

    /// Set the month used for event stamps until the next call
    pub fn set_month(&mut self, month: u32) {
        self.month = month;
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Underwrite and, if approved, book a loan
    ///
    /// Rejections leave the ledger and balance sheet untouched.
    pub fn request_loan<R>(&mut self, registry: &mut R, request: LoanRequest) -> bool
    where
        R: BorrowerRegistry + ?Sized,
    {
        self.try_request_loan(registry, request).is_ok()
    }

    /// [`Bank::request_loan`] with the rejection reason
    pub fn try_request_loan<R>(
        &mut self,
        registry: &mut R,
        request: LoanRequest,
    ) -> Result<LoanId, Rejection>
    where
        R: BorrowerRegistry + ?Sized,
    {
        if request.amount <= 0.0 || request.amount.is_nan() {
            // Not worth an event
            return Err(Rejection::NonPositiveAmount(request.amount));
        }

        let decision = match registry.borrower_mut(request.borrower) {
            Some(borrower) => {
                underwriting::evaluate(&request, &*borrower, &self.sheet, &self.config)
            }
            None => Err(Rejection::UnknownBorrower(request.borrower)),
        };

        if let Err(reason) = decision {
            tracing::debug!(
                "Rejected {:.2} for {}: {}",
                request.amount,
                request.borrower,
                reason
            );
            self.events.log(Event::LoanRejected {
                month: self.month,
                borrower: request.borrower,
                amount: request.amount,
                reason: reason.to_string(),
            });
            return Err(reason);
        }

        let term = request.effective_term();
        let rate = self.config.loan_rate_for(request.kind);
        let id = self.ledger.book(
            request.borrower,
            request.kind,
            request.amount,
            rate,
            term,
            request.purpose.clone(),
            self.month,
        );
        self.sheet.book_loan(request.amount);

        if let Some(borrower) = registry.borrower_mut(request.borrower) {
            borrower.receive_loan(request.amount);
            borrower.increase_debt(request.amount);
        }

        tracing::debug!(
            "Approved {} for {}: {:.2} at {:.4} over {} months ({})",
            id,
            request.borrower,
            request.amount,
            rate,
            term,
            request.purpose
        );
        self.events.log(Event::LoanApproved {
            month: self.month,
            loan_id: id,
            borrower: request.borrower,
            kind: request.kind,
            amount: request.amount,
            annual_rate: rate,
            term_months: term,
            purpose: request.purpose,
        });
        self.refresh_metrics();
        Ok(id)
    }

    /// Cash entering the economy from outside; ignored unless positive
    pub fn record_new_deposit(&mut self, amount: f64) {
        if amount <= 0.0 || amount.is_nan() {
            return;
        }
        self.sheet.record_deposit(amount);
        self.events.log(Event::NewDeposit {
            month: self.month,
            amount,
        });
    }

    /// Run the monthly settlement cycle
    pub fn step<R>(&mut self, registry: &mut R) -> CycleTotals
    where
        R: BorrowerRegistry + ?Sized,
    {
        let mut cycle = Cycle::new(self.month, &self.config, &mut self.events);
        cycle.totals.write_off_losses = std::mem::take(&mut self.pending_write_off_losses);

        settlement::collect_payments(&mut self.ledger, &mut self.sheet, registry, &mut cycle);
        settlement::pay_deposit_interest(&mut self.sheet, registry, &mut cycle);
        settlement::update_lending_halt(&mut self.sheet, &mut cycle);
        let totals = cycle.totals;

        self.last_cycle = totals;
        self.refresh_metrics();
        self.history.push(MetricsSnapshot {
            month: self.month,
            metrics: self.metrics.clone(),
        });

        tracing::info!(
            "Month {} settled: {} payments, {} defaults, {} repaid, interest {:.2}, losses {:.2}, capital ratio {:.4}",
            self.month,
            totals.payments,
            totals.defaults,
            totals.repaid,
            totals.interest_income,
            totals.default_losses + totals.write_off_losses,
            self.capital_ratio()
        );
        totals
    }

    /// Default every active loan of a borrower that is leaving the economy
    pub fn write_off_borrower<R>(
        &mut self,
        registry: &mut R,
        borrower: BorrowerId,
        recovery_value: f64,
    ) -> WriteOff
    where
        R: BorrowerRegistry + ?Sized,
    {
        let outcome = settlement::write_off_borrower(
            &mut self.ledger,
            &mut self.sheet,
            registry,
            borrower,
            recovery_value,
            &mut self.events,
            self.month,
        );
        if outcome.loans > 0 {
            self.pending_write_off_losses += outcome.loss;
            self.refresh_metrics();
        }
        outcome
    }

    /// Next month's instalments across the borrower's active loans
    pub fn expected_payment_for(&self, borrower: BorrowerId) -> f64 {
        self.ledger.expected_payment_for(borrower)
    }

    fn refresh_metrics(&mut self) {
        self.metrics = LoanMetrics::compute(&self.ledger);
    }

    /// Equity / total loans, floored at 0, 1.0 with no loans
    pub fn capital_ratio(&self) -> f64 {
        self.sheet.capital_ratio()
    }

    pub fn money_supply(&self) -> f64 {
        self.sheet.money_supply()
    }

    pub fn active_loans(&self) -> Vec<&LoanRecord> {
        self.ledger.active().collect()
    }

    pub fn loan_metrics(&self) -> &LoanMetrics {
        &self.metrics
    }

    pub fn loan_metrics_history(&self) -> &[MetricsSnapshot] {
        &self.history
    }

    pub fn total_defaulted(&self) -> f64 {
        self.sheet.total_defaulted()
    }

    pub fn stop_lending(&self) -> bool {
        self.sheet.stop_lending()
    }

    pub fn equity(&self) -> f64 {
        self.sheet.equity()
    }

    pub fn cash_reserves(&self) -> f64 {
        self.sheet.cash_reserves()
    }

    pub fn total_loans(&self) -> f64 {
        self.sheet.total_loans()
    }

    pub fn total_deposits(&self) -> f64 {
        self.sheet.total_deposits()
    }

    pub fn is_liquidity_stressed(&self) -> bool {
        self.sheet.is_liquidity_stressed(&self.config)
    }

    pub fn last_cycle(&self) -> &CycleTotals {
        &self.last_cycle
    }

    pub fn balance_sheet(&self) -> &BalanceSheet {
        &self.sheet
    }

    pub fn ledger(&self) -> &LoanLedger {
        &self.ledger
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Active principal recomputed from the ledger
    pub fn recomputed_total_loans(&self) -> f64 {
        self.ledger.outstanding_principal()
    }

    /// Cached total loans agrees with the ledger
    pub fn aggregates_consistent(&self) -> bool {
        self.sheet
            .loans_match(self.recomputed_total_loans(), AGGREGATE_TOLERANCE)
    }

    pub fn snapshot(&self) -> Result<BankSnapshot, CheckpointError> {
        Ok(BankSnapshot {
            month: self.month,
            config_hash: compute_config_hash(&self.config)?,
            ledger: self.ledger.clone(),
            balance_sheet: self.sheet.clone(),
            metrics_history: self.history.clone(),
            last_cycle: self.last_cycle,
            pending_write_off_losses: self.pending_write_off_losses,
            events: self.events.clone(),
        })
    }

    /// Rebuild a bank from a snapshot taken under the same config
    pub fn restore(config: BankConfig, snapshot: BankSnapshot) -> Result<Self, CheckpointError> {
        let actual = compute_config_hash(&config)?;
        if actual != snapshot.config_hash {
            return Err(CheckpointError::ConfigMismatch {
                expected: snapshot.config_hash,
                actual,
            });
        }
        snapshot.validate()?;

        let metrics = LoanMetrics::compute(&snapshot.ledger);
        Ok(Self {
            config,
            ledger: snapshot.ledger,
            sheet: snapshot.balance_sheet,
            metrics,
            history: snapshot.metrics_history,
            last_cycle: snapshot.last_cycle,
            pending_write_off_losses: snapshot.pending_write_off_losses,
            events: snapshot.events,
            month: snapshot.month,
        })
    }
}
