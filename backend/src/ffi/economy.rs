//! PyO3 wrapper for the economy

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{bank_summary_to_py, loan_metrics_to_py, month_record_to_py};
use crate::economy::Economy as RustEconomy;

/// Python handle on a running economy
///
/// ```python
/// from econosim._core import Economy
///
/// eco = Economy('{"agents": {"households": 50}}')
/// eco.run_for_months(12)
/// print(eco.bank_summary()["capital_ratio"])
/// ```
#[pyclass(name = "Economy")]
pub struct PyEconomy {
    inner: RustEconomy,
}

#[pymethods]
impl PyEconomy {
    /// Build an economy from a JSON configuration document
    ///
    /// Raises ValueError when the document does not parse or validate.
    #[new]
    fn new(config_json: &str) -> PyResult<Self> {
        let inner = RustEconomy::from_json_str(config_json)
            .map_err(|e| PyValueError::new_err(format!("Invalid configuration: {}", e)))?;
        Ok(PyEconomy { inner })
    }

    /// Run one month; returns that month's record
    fn step(&mut self, py: Python) -> PyResult<Py<PyDict>> {
        let record = self.inner.step().clone();
        month_record_to_py(py, &record)
    }

    fn run_for_months(&mut self, months: u32) {
        self.inner.run_for_months(months);
    }

    fn month(&self) -> u32 {
        self.inner.month()
    }

    fn bank_summary(&self, py: Python) -> PyResult<Py<PyDict>> {
        bank_summary_to_py(py, self.inner.bank())
    }

    fn loan_metrics(&self, py: Python) -> PyResult<Py<PyDict>> {
        loan_metrics_to_py(py, self.inner.bank().loan_metrics())
    }

    /// All month records as a JSON array
    fn records_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.records())
            .map_err(|e| PyRuntimeError::new_err(format!("Serialization failed: {}", e)))
    }

    /// Bank checkpoint as a JSON document
    fn bank_snapshot_json(&self) -> PyResult<String> {
        let snapshot = self
            .inner
            .bank()
            .snapshot()
            .map_err(|e| PyRuntimeError::new_err(format!("Snapshot failed: {}", e)))?;
        snapshot
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(format!("Serialization failed: {}", e)))
    }
}
