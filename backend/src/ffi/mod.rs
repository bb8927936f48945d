//! Python bindings
//!
//! Built only with the `pyo3` feature. Configuration crosses the boundary
//! as a JSON string; results come back as plain dicts.

pub mod economy;
pub mod types;
