//! Credit event log
//!
//! Every state change the bank makes to a loan or to its balance sheet is
//! recorded as an [`Event`] stamped with the simulation month. The log is
//! append-only and is used for auditing a run and for tests that need to
//! see what happened inside a settlement cycle. A log built with a limit
//! keeps only the most recent events and counts the ones it dropped.
//!
//! # Example
//!
//! ```rust
//! use econosim_core_rs::models::{BorrowerId, Event, EventLog, LoanId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::LoanRepaid {
//!     month: 13,
//!     loan_id: LoanId(1),
//!     borrower: BorrowerId::Household(0),
//! });
//!
//! assert_eq!(log.events_of_type("LoanRepaid").len(), 1);
//! assert_eq!(log.events_at_month(13).len(), 1);
//! ```

use crate::models::borrower::{BorrowerId, BorrowerKind};
use crate::models::loan::LoanId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A credit or balance-sheet state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Underwriting approved a request and the loan was booked
    LoanApproved {
        month: u32,
        loan_id: LoanId,
        borrower: BorrowerId,
        kind: BorrowerKind,
        amount: f64,
        annual_rate: f64,
        term_months: u32,
        purpose: String,
    },

    /// Underwriting turned a request down
    LoanRejected {
        month: u32,
        borrower: BorrowerId,
        amount: f64,
        reason: String,
    },

    /// Scheduled instalment collected in full or above the interest due
    PaymentCollected {
        month: u32,
        loan_id: LoanId,
        borrower: BorrowerId,
        interest: f64,
        principal: f64,
        balance_after: f64,
    },

    LoanRepaid {
        month: u32,
        loan_id: LoanId,
        borrower: BorrowerId,
    },

    /// Shortfall against interest due; the loan was written off
    LoanDefaulted {
        month: u32,
        loan_id: LoanId,
        borrower: BorrowerId,
        balance: f64,
        recovered: f64,
        loss: f64,
    },

    DepositInterestPaid {
        month: u32,
        total: f64,
        depositors: usize,
    },

    LendingHaltChanged {
        month: u32,
        halted: bool,
        capital_ratio: f64,
        liquidity_stressed: bool,
    },

    /// All of a borrower's loans written off on bankruptcy or death
    BorrowerWrittenOff {
        month: u32,
        borrower: BorrowerId,
        loans: usize,
        outstanding: f64,
        recovered: f64,
        loss: f64,
    },

    NewDeposit {
        month: u32,
        amount: f64,
    },
}

impl Event {
    /// Month the event occurred in
    pub fn month(&self) -> u32 {
        match self {
            Event::LoanApproved { month, .. } => *month,
            Event::LoanRejected { month, .. } => *month,
            Event::PaymentCollected { month, .. } => *month,
            Event::LoanRepaid { month, .. } => *month,
            Event::LoanDefaulted { month, .. } => *month,
            Event::DepositInterestPaid { month, .. } => *month,
            Event::LendingHaltChanged { month, .. } => *month,
            Event::BorrowerWrittenOff { month, .. } => *month,
            Event::NewDeposit { month, .. } => *month,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::LoanApproved { .. } => "LoanApproved",
            Event::LoanRejected { .. } => "LoanRejected",
            Event::PaymentCollected { .. } => "PaymentCollected",
            Event::LoanRepaid { .. } => "LoanRepaid",
            Event::LoanDefaulted { .. } => "LoanDefaulted",
            Event::DepositInterestPaid { .. } => "DepositInterestPaid",
            Event::LendingHaltChanged { .. } => "LendingHaltChanged",
            Event::BorrowerWrittenOff { .. } => "BorrowerWrittenOff",
            Event::NewDeposit { .. } => "NewDeposit",
        }
    }

    /// Loan the event refers to, if any
    pub fn loan_id(&self) -> Option<LoanId> {
        match self {
            Event::LoanApproved { loan_id, .. } => Some(*loan_id),
            Event::PaymentCollected { loan_id, .. } => Some(*loan_id),
            Event::LoanRepaid { loan_id, .. } => Some(*loan_id),
            Event::LoanDefaulted { loan_id, .. } => Some(*loan_id),
            _ => None,
        }
    }

    /// Borrower the event refers to, if any
    pub fn borrower(&self) -> Option<BorrowerId> {
        match self {
            Event::LoanApproved { borrower, .. } => Some(*borrower),
            Event::LoanRejected { borrower, .. } => Some(*borrower),
            Event::PaymentCollected { borrower, .. } => Some(*borrower),
            Event::LoanRepaid { borrower, .. } => Some(*borrower),
            Event::LoanDefaulted { borrower, .. } => Some(*borrower),
            Event::BorrowerWrittenOff { borrower, .. } => Some(*borrower),
            _ => None,
        }
    }
}

/// Append-only list of events with simple queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<Event>,

    /// Most events retained; `None` keeps everything
    #[serde(default)]
    limit: Option<usize>,

    #[serde(default)]
    dropped: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that evicts its oldest events beyond `limit`
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push_back(event);
        if let Some(limit) = self.limit {
            while self.events.len() > limit {
                self.events.pop_front();
                self.dropped += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Events evicted to stay within the limit
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Retained events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    pub fn events_at_month(&self, month: u32) -> Vec<&Event> {
        self.events.iter().filter(|e| e.month() == month).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_loan(&self, loan_id: LoanId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.loan_id() == Some(loan_id))
            .collect()
    }

    pub fn events_for_borrower(&self, borrower: BorrowerId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.borrower() == Some(borrower))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(month: u32, id: u64, borrower: BorrowerId) -> Event {
        Event::LoanApproved {
            month,
            loan_id: LoanId(id),
            borrower,
            kind: borrower.kind(),
            amount: 1_000.0,
            annual_rate: 0.04,
            term_months: 12,
            purpose: "investment".to_string(),
        }
    }

    #[test]
    fn test_event_month_and_type() {
        let event = Event::NewDeposit {
            month: 7,
            amount: 50.0,
        };
        assert_eq!(event.month(), 7);
        assert_eq!(event.event_type(), "NewDeposit");
        assert_eq!(event.loan_id(), None);
        assert_eq!(event.borrower(), None);
    }

    #[test]
    fn test_queries() {
        let mut log = EventLog::new();
        log.log(approved(1, 1, BorrowerId::Firm(0)));
        log.log(approved(1, 2, BorrowerId::Household(3)));
        log.log(Event::LoanDefaulted {
            month: 4,
            loan_id: LoanId(2),
            borrower: BorrowerId::Household(3),
            balance: 900.0,
            recovered: 180.0,
            loss: 720.0,
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at_month(1).len(), 2);
        assert_eq!(log.events_for_loan(LoanId(2)).len(), 2);
        assert_eq!(log.events_for_borrower(BorrowerId::Firm(0)).len(), 1);
        assert_eq!(log.events_of_type("LoanDefaulted").len(), 1);
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let mut log = EventLog::with_limit(Some(2));
        for id in 1..=5 {
            log.log(approved(id as u32, id, BorrowerId::Firm(0)));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.dropped(), 3);
        let months: Vec<u32> = log.iter().map(|e| e.month()).collect();
        assert_eq!(months, vec![4, 5]);
    }

    #[test]
    fn test_zero_limit_records_nothing() {
        let mut log = EventLog::with_limit(Some(0));
        log.log(approved(1, 1, BorrowerId::Firm(0)));
        assert!(log.is_empty());
        assert_eq!(log.dropped(), 1);
    }

    #[test]
    fn test_clear() {
        let mut log = EventLog::new();
        log.log(approved(0, 1, BorrowerId::Firm(1)));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(Event::NewDeposit {
            month: 2,
            amount: 10.0,
        })
        .unwrap();
        assert_eq!(json["type"], "NewDeposit");
        assert_eq!(json["month"], 2);
    }
}
