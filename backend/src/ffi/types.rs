//! Rust → Python conversions

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::bank::Bank;
use crate::credit::LoanMetrics;
use crate::economy::MonthRecord;

/// Convert a month record to a dict keyed by field name
pub fn month_record_to_py(py: Python, record: &MonthRecord) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("month", record.month)?;
    dict.set_item("money_supply", record.money_supply)?;
    dict.set_item("total_loans", record.total_loans)?;
    dict.set_item("capital_ratio", record.capital_ratio)?;
    dict.set_item("equity", record.equity)?;
    dict.set_item("default_losses", record.default_losses)?;
    dict.set_item("performing_share", record.performing_share)?;
    dict.set_item("investment_loan_share", record.investment_loan_share)?;
    dict.set_item("stop_lending", record.stop_lending)?;
    dict.set_item("unemployment_rate", record.unemployment_rate)?;
    dict.set_item("population", record.population)?;
    dict.set_item("active_firms", record.active_firms)?;
    dict.set_item("state_balance", record.state_balance)?;
    dict.set_item("consumption", record.consumption)?;
    Ok(dict.into())
}

/// Headline balance sheet figures
pub fn bank_summary_to_py(py: Python, bank: &Bank) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("month", bank.month())?;
    dict.set_item("equity", bank.equity())?;
    dict.set_item("cash_reserves", bank.cash_reserves())?;
    dict.set_item("total_loans", bank.total_loans())?;
    dict.set_item("total_deposits", bank.total_deposits())?;
    dict.set_item("total_defaulted", bank.total_defaulted())?;
    dict.set_item("capital_ratio", bank.capital_ratio())?;
    dict.set_item("money_supply", bank.money_supply())?;
    dict.set_item("stop_lending", bank.stop_lending())?;
    dict.set_item("liquidity_stressed", bank.is_liquidity_stressed())?;
    dict.set_item("active_loans", bank.active_loans().len())?;
    Ok(dict.into())
}

/// Flat metrics dict (`age_bucket_*_share` and `purpose_*_share` keys)
pub fn loan_metrics_to_py(py: Python, metrics: &LoanMetrics) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    for (key, value) in metrics.as_map() {
        dict.set_item(key, value)?;
    }
    Ok(dict.into())
}
