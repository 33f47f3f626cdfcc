pub mod net;

use pyo3::{prelude::*, wrap_pymodule};

#[pymodule]
fn multitask(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<net::Net>()?;
    Ok(())
}

pub fn construct_module(m: &PyModule) -> PyResult<()> {
    m.add_wrapped(wrap_pymodule!(multitask))?;
    Ok(())
}
