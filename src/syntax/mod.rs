//! Syntax highlighting
//!
//! This module provides the incremental highlighting engine:
//! - Pattern sets loaded from `syn_<tag>.json` files
//! - Themes and the shared theme store
//! - Rule compilation and per-block tokenizing
//! - Per-document engines and the multi-document manager

mod style;
mod tokens;
mod patterns;
mod theme;
mod store;
mod rules;
mod tokenizer;
mod cache;
mod language;
mod engine;
mod manager;

pub use style::{paint, Color, Decoration, Span, TextAttributes, Underline, Weight};
pub use tokens::Category;
pub use patterns::PatternSet;
pub use theme::{builtin_themes, Theme, DEFAULT_THEME};
pub use store::{ThemeRegistry, ThemeSnapshot, ThemeStore};
pub use rules::{compile, CompiledPattern, CompiledRule, RuleSet, QUOTE_PATTERN};
pub use tokenizer::{BlockState, BlockTokenizer, HighlightResult};
pub use cache::PatternCache;
pub use language::{pattern_file, resolve_pattern_file, syntax_tag_for, SyntaxKind, TEXT_TAG};
pub use engine::{BlockCache, SyntaxEngine};
pub use manager::{DocumentId, SyntaxManager};
