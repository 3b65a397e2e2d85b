//! CASE statement module
//!
//! Drives the condition pipeline once per WHEN branch and collects the
//! tagged combos into a table.

mod statement;
mod table;

#[cfg(test)]
mod property_tests;

pub use statement::*;
pub use table::*;
