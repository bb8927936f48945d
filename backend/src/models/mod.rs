//! Domain models for the economy

pub mod borrower;
pub mod event;
pub mod firm;
pub mod household;
pub mod loan;
pub mod population;

// Re-exports
pub use borrower::{Borrower, BorrowerId, BorrowerKind, BorrowerRegistry, Depositor};
pub use event::{Event, EventLog};
pub use firm::{BankruptcyCause, Firm, InvestmentPlan};
pub use household::{Household, HouseholdParams};
pub use loan::{LoanId, LoanRecord, LoanStatus};
pub use population::Population;
