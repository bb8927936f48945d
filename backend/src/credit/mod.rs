//! Credit engine building blocks
//!
//! - **amortization**: annuity payment and interest/principal split
//! - **ledger**: every loan issued, in insertion order
//! - **underwriting**: approve/reject decisions
//! - **metrics**: loan book statistics

pub mod amortization;
pub mod ledger;
pub mod metrics;
pub mod underwriting;

pub use amortization::{annuity_payment, split_payment, PaymentSplit};
pub use ledger::LoanLedger;
pub use metrics::{LoanMetrics, MetricsSnapshot, AGE_BUCKETS};
pub use underwriting::{evaluate, LoanRequest, Rejection, DEFAULT_TERM_MONTHS};
