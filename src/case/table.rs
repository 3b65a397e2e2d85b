//! CaseTable - expanded combos with their presentation column order
//!
//! The table is also exposed to Python as a class, so callers can keep the
//! rows in Rust memory and pull them out lazily.

use std::fmt;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::condition::{evaluate, Combo, Expression};
use crate::render::render_table;

/// Expanded rows plus the column order they should be presented in
#[pyclass]
#[derive(Debug, Clone, PartialEq)]
pub struct CaseTable {
    columns: Vec<String>,
    combos: Vec<Combo>,
    output_column: Option<String>,
}

impl CaseTable {
    pub fn new(columns: Vec<String>, combos: Vec<Combo>, output_column: Option<String>) -> Self {
        Self {
            columns,
            combos,
            output_column,
        }
    }

    /// Table for a bare condition: columns in first-seen order, no output column
    pub fn from_condition(expr: &Expression) -> Self {
        Self::new(expr.columns(), evaluate(expr), None)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    pub fn output_column(&self) -> Option<&str> {
        self.output_column.as_deref()
    }

    pub fn into_combos(self) -> Vec<Combo> {
        self.combos
    }

    /// Row as cell strings in column order; missing cells are empty
    pub fn row_cells(&self, index: usize) -> Option<Vec<String>> {
        self.combos.get(index).map(|combo| cells(combo, &self.columns))
    }

    /// Render as an aligned console table
    pub fn render(&self) -> String {
        render_table(&self.combos, &self.columns)
    }
}

impl fmt::Display for CaseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Cells of a combo for the given columns; missing cells are empty
pub fn cells<S: AsRef<str>>(combo: &Combo, columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .map(|c| combo.get(c.as_ref()).unwrap_or("").to_string())
        .collect()
}

/// Convert a combo to a Python dict, preserving key order
pub fn combo_to_dict<'py>(py: Python<'py>, combo: &Combo) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    for (k, v) in combo.iter() {
        dict.set_item(k, v)?;
    }
    Ok(dict)
}

// ============================================================================
// PyMethods Implementation
// ============================================================================

#[pymethods]
impl CaseTable {
    /// Presentation column order
    #[getter(columns)]
    fn py_columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    /// Alias of the CASE output column, None for bare conditions
    #[getter(output_column)]
    fn py_output_column(&self) -> Option<String> {
        self.output_column.clone()
    }

    #[getter]
    fn row_count(&self) -> usize {
        self.combos.len()
    }

    /// Get a single row by index
    ///
    /// # Returns
    /// Row dict or None if out of bounds
    fn get_row(&self, py: Python<'_>, index: usize) -> PyResult<Py<PyAny>> {
        match self.combos.get(index) {
            Some(combo) => Ok(combo_to_dict(py, combo)?.into()),
            None => Ok(py.None()),
        }
    }

    /// All rows as a list of dicts
    fn to_dicts(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let list = PyList::empty(py);
        for combo in &self.combos {
            list.append(combo_to_dict(py, combo)?)?;
        }
        Ok(list.into())
    }

    /// Aligned console table
    #[pyo3(name = "render")]
    fn py_render(&self) -> String {
        self.render()
    }

    fn __len__(&self) -> usize {
        self.combos.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "CaseTable(columns={:?}, rows={})",
            self.columns,
            self.combos.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parse;

    #[test]
    fn test_from_condition_uses_first_seen_order() {
        let ast = parse("c2 = 'x' and c1 in ('a', 'b')").unwrap();
        let table = CaseTable::from_condition(&ast);
        assert_eq!(table.columns(), &["c2", "c1"]);
        assert_eq!(table.combos().len(), 2);
        assert_eq!(table.output_column(), None);
    }

    #[test]
    fn test_row_cells_fill_missing() {
        let ast = parse("c1 = 'a' or c2 = 'b'").unwrap();
        let table = CaseTable::from_condition(&ast);
        assert_eq!(table.row_cells(0), Some(vec!["a".to_string(), String::new()]));
        assert_eq!(table.row_cells(1), Some(vec![String::new(), "b".to_string()]));
        assert_eq!(table.row_cells(2), None);
    }

    #[test]
    fn test_display_matches_render() {
        let ast = parse("c1 = 'a'").unwrap();
        let table = CaseTable::from_condition(&ast);
        assert_eq!(table.to_string(), table.render());
    }
}
