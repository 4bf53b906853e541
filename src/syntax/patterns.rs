//! Pattern sets loaded from `syn_<tag>.json` files
//!
//! A pattern set holds the raw regex sources for one language. It is
//! immutable once loaded and identified by the file it came from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyntaxError};

/// On-disk layout of a pattern file. Absent fields default to empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct PatternFile {
    ignore_case: bool,
    keywords: Vec<String>,
    classes: Vec<String>,
    functions: Vec<String>,
    types: Vec<String>,
    constants: Vec<String>,
    comment_single: String,
    comment_multi_start: String,
    comment_multi_end: String,
}

/// Raw lexical patterns for one language
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternSet {
    /// File this set was loaded from
    pub path: PathBuf,
    pub ignore_case: bool,
    pub keywords: Vec<String>,
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub types: Vec<String>,
    pub constants: Vec<String>,
    pub comment_single: String,
    pub comment_multi_start: String,
    pub comment_multi_end: String,
}

impl PatternSet {
    /// Load a pattern set from a JSON file.
    ///
    /// Nothing is returned unless the whole file was read and decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyntaxError::MissingFile(path.to_path_buf()));
        }

        let data = fs::read_to_string(path).map_err(|e| SyntaxError::io(path, e))?;
        Self::from_json(path, &data)
    }

    /// Decode a pattern set from JSON text; `path` only names the source
    pub fn from_json(path: impl Into<PathBuf>, data: &str) -> Result<Self> {
        let path = path.into();
        let file: PatternFile = match serde_json::from_str(data) {
            Ok(file) => file,
            Err(source) => return Err(SyntaxError::Parse { path, source }),
        };

        Ok(Self {
            path,
            ignore_case: file.ignore_case,
            keywords: file.keywords,
            classes: file.classes,
            functions: file.functions,
            types: file.types,
            constants: file.constants,
            comment_single: file.comment_single,
            comment_multi_start: file.comment_multi_start,
            comment_multi_end: file.comment_multi_end,
        })
    }

    /// Number of non-blank entries across the category lists
    pub fn pattern_count(&self) -> usize {
        [&self.keywords, &self.classes, &self.functions, &self.types, &self.constants]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPP: &str = r#"{
        "ignore-case": false,
        "keywords": ["\\bif\\b", "\\bwhile\\b", "  "],
        "classes": ["\\bQ[A-Za-z]+\\b"],
        "functions": ["\\b[A-Za-z0-9_]+(?=\\()"],
        "types": ["\\bint\\b"],
        "comment-single": "//[^\n]*",
        "comment-multi-start": "/\\*",
        "comment-multi-end": "\\*/"
    }"#;

    #[test]
    fn test_from_json() {
        let set = PatternSet::from_json("syn_cpp.json", CPP).unwrap();
        assert!(!set.ignore_case);
        assert_eq!(set.keywords.len(), 3);
        assert_eq!(set.classes, vec![r"\bQ[A-Za-z]+\b".to_string()]);
        assert_eq!(set.comment_multi_start, r"/\*");
        assert!(set.constants.is_empty());
        assert_eq!(set.pattern_count(), 4);
    }

    #[test]
    fn test_absent_fields_default() {
        let set = PatternSet::from_json("syn_txt.json", "{}").unwrap();
        assert!(!set.ignore_case);
        assert!(set.keywords.is_empty());
        assert!(set.comment_single.is_empty());
        assert!(set.comment_multi_end.is_empty());
        assert_eq!(set.pattern_count(), 0);
    }

    #[test]
    fn test_parse_error() {
        let err = PatternSet::from_json("bad.json", "{ \"keywords\": [").unwrap_err();
        assert!(matches!(err, SyntaxError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PatternSet::load(dir.path().join("syn_nope.json")).unwrap_err();
        assert!(matches!(err, SyntaxError::MissingFile(_)));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syn_cpp.json");
        fs::write(&path, CPP).unwrap();

        let first = PatternSet::load(&path).unwrap();
        let second = PatternSet::load(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.path, path);
    }
}
