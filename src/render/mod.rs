//! Console rendering of combo tables

mod table;

pub use table::*;
