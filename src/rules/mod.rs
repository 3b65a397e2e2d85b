//! Rule files and workbook export
//!
//! Loads named rule blocks from text files and expands each into a sheet.

mod loader;
mod workbook;

pub use loader::*;
pub use workbook::*;
