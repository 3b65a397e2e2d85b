//! Case Combos - expand SQL CASE conditions into value combinations
//!
//! This crate turns `CASE WHEN <condition> THEN <value> ... END` blocks and
//! bare boolean conditions into the exhaustive list of concrete column-value
//! combinations that satisfy them, for building test fixtures and mapping
//! tables. Python bindings are provided via PyO3.

use pyo3::prelude::*;

pub mod case;
pub mod condition;
pub mod error;
pub mod render;
pub mod rules;

use crate::case::{combo_to_dict, CaseTable};
use crate::condition::{expand_cached, Combo};
use crate::error::CaseError;
use pyo3::types::{PyDict, PyList};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a Python dict to a combo; values are stringified with `str()`
fn dict_to_combo(dict: &Bound<'_, PyDict>) -> PyResult<Combo> {
    let mut combo = Combo::new();
    for (key, value) in dict.iter() {
        let column: String = key.extract()?;
        let text: String = value.str()?.extract()?;
        combo.insert(&column, &text);
    }
    Ok(combo)
}

fn build_workbook_json(path: &str, schema: Option<&[String]>) -> Result<String, CaseError> {
    rules::build_workbook_from_file(path, schema)?.to_json()
}

// ============================================================================
// Python Functions
// ============================================================================

/// Expand a bare condition into a list of dicts
///
/// # Arguments
/// * `condition` - Condition like "c1 IN ('a','b') AND c2 = 'x'"
///
/// # Raises
/// ValueError on a syntax error
#[pyfunction]
fn parse_condition(py: Python<'_>, condition: &str) -> PyResult<Py<PyAny>> {
    let combos = expand_cached(condition)?;
    let list = PyList::empty(py);
    for combo in &combos {
        list.append(combo_to_dict(py, combo)?)?;
    }
    Ok(list.into())
}

/// Expand a full CASE block
///
/// # Returns
/// A CaseTable holding the tagged combos and their column order
///
/// # Raises
/// AssertionError if the text does not start with CASE or lacks END,
/// ValueError on a syntax error in a branch
#[pyfunction]
fn parse_case_statement(text: &str) -> PyResult<CaseTable> {
    Ok(case::parse_case_statement(text)?)
}

/// Render a list of dicts as an aligned table with the given column order
#[pyfunction]
fn render_table<'py>(rows: Vec<Bound<'py, PyDict>>, columns: Vec<String>) -> PyResult<String> {
    let combos = rows
        .iter()
        .map(dict_to_combo)
        .collect::<PyResult<Vec<_>>>()?;
    Ok(render::render_table(&combos, &columns))
}

/// Load a rule file into (key, body) pairs in file order
#[pyfunction]
fn load_rules(path: &str) -> PyResult<Vec<(String, String)>> {
    let rules = rules::load_rules(path)?;
    Ok(rules
        .iter()
        .map(|r| (r.key.clone(), r.body.clone()))
        .collect())
}

/// Expand every rule of a rule file into a sheet and return the workbook as JSON
///
/// # Arguments
/// * `path` - Rule file path
/// * `schema` - Optional fixed column list; missing cells become ""
#[pyfunction]
#[pyo3(signature = (path, schema=None))]
fn build_workbook(path: &str, schema: Option<Vec<String>>) -> PyResult<String> {
    Ok(build_workbook_json(path, schema.as_deref())?)
}

/// Asynchronous variant of `build_workbook`
///
/// The file is read and expanded on a blocking Tokio thread so Python's
/// asyncio event loop stays responsive.
///
/// # Example (Python)
/// ```python
/// workbook_json = await build_workbook_async("rules.txt")
/// ```
#[pyfunction]
#[pyo3(signature = (path, schema=None))]
fn build_workbook_async<'py>(
    py: Python<'py>,
    path: String,
    schema: Option<Vec<String>>,
) -> PyResult<Bound<'py, PyAny>> {
    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let json = tokio::task::spawn_blocking(move || {
            build_workbook_json(&path, schema.as_deref()).map_err(PyErr::from)
        })
        .await
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Workbook task panicked: {}",
                e
            ))
        })??;

        Ok(json)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn case_combos(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_condition, m)?)?;
    m.add_function(wrap_pyfunction!(parse_case_statement, m)?)?;
    m.add_function(wrap_pyfunction!(render_table, m)?)?;
    m.add_function(wrap_pyfunction!(load_rules, m)?)?;
    m.add_function(wrap_pyfunction!(build_workbook, m)?)?;
    m.add_function(wrap_pyfunction!(build_workbook_async, m)?)?;
    m.add_class::<CaseTable>()?;
    Ok(())
}
