//! hilite - incremental syntax highlighting
//!
//! Pattern files describe a language as lists of regular expressions;
//! themes map lexical categories to colors. A `SyntaxEngine` per document
//! turns blocks (lines) of text into colored spans, carrying multi-line
//! comment state from one block to the next.

pub mod config;
pub mod error;
pub mod logging;
pub mod spell;
pub mod syntax;
pub mod terminal;

pub use config::Config;
pub use error::{Result, SyntaxError};
pub use syntax::{BlockState, SyntaxEngine, SyntaxManager, ThemeStore};
