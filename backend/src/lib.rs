//! Econosim Core - Rust Engine
//!
//! Monthly agent-based macro economy with a single commercial bank whose
//! lending creates money.
//!
//! # Architecture
//!
//! - **core**: Month calendar
//! - **rng**: Deterministic random number generation
//! - **models**: Domain types (Household, Firm, LoanRecord, Event)
//! - **credit**: Amortization, loan ledger, underwriting, loan metrics
//! - **bank**: Balance sheet, bank configuration, checkpoints
//! - **settlement**: Monthly settlement cycle and borrower write-offs
//! - **economy**: Monthly simulation loop (labour, state, firms, households)
//!
//! # Critical Invariants
//!
//! 1. Outstanding loans equal the sum of active loan balances
//! 2. Lending creates deposits; collection and charge-offs destroy them
//! 3. All randomness is deterministic (seeded RNG)

pub mod bank;
pub mod core;
pub mod credit;
pub mod economy;
pub mod models;
pub mod rng;
pub mod settlement;

pub use bank::{Bank, BankConfig, BankSnapshot, CheckpointError, ConfigError};
pub use core::time::Calendar;
pub use credit::{LoanMetrics, LoanRequest, Rejection};
pub use economy::{Economy, EconomyConfig, MonthRecord, SimulationError};
pub use models::{
    borrower::{Borrower, BorrowerId, BorrowerKind, BorrowerRegistry, Depositor},
    event::{Event, EventLog},
    loan::{LoanId, LoanRecord, LoanStatus},
    population::Population,
};
pub use rng::RngManager;
pub use settlement::CycleTotals;

#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn econosim_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::economy::PyEconomy>()?;
    Ok(())
}
