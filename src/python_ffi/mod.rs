//! Python FFI
use pyo3::prelude::*;

pub mod multitask;
mod gen_macros;

#[pymodule]
fn mtnnet(_py: Python, m: &PyModule) -> PyResult<()> {
    multitask::construct_module(m)?;
    Ok(())
}
