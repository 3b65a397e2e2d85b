//! Condition parsing and expansion module
//!
//! This module turns condition strings like "c1 IN ('a','b') AND c2 = 'x'"
//! into the list of column-value combos that satisfy them.

mod ast;
pub mod cache;
mod combo;
mod evaluator;
pub mod parser;
pub mod token;


pub use ast::*;
pub use cache::*;
pub use combo::*;
pub use evaluator::*;
pub use parser::*;
pub use token::*;
