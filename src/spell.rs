//! Spell-check collaborator
//!
//! The engine only consumes the `SpellCheck` contract. `WordList` is a
//! plain word-list implementation for the command line tool and tests.
//!
//! Word list format: one word per line, `#` starts a comment line.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Result, SyntaxError};

/// Spell-check contract consumed by the block tokenizer
pub trait SpellCheck {
    /// True when `word` is spelled correctly
    fn spell(&self, word: &str) -> bool;

    /// Replacement candidates for `word`
    fn suggest(&self, word: &str) -> Vec<String>;
}

/// Suggestions for a word, empty when it is already spelled correctly
pub fn suggestions(checker: &dyn SpellCheck, word: &str) -> Vec<String> {
    if checker.spell(word) {
        Vec::new()
    } else {
        checker.suggest(word)
    }
}

/// Case-insensitive word list
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for word in words {
            list.add_word(word.as_ref());
        }
        list
    }

    /// Load a word list file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyntaxError::MissingFile(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|e| SyntaxError::io(path, e))?;
        Ok(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        Self::from_words(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Add a word (the user dictionary)
    pub fn add_word(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.words.insert(word.to_lowercase());
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl SpellCheck for WordList {
    fn spell(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        let word = word.to_lowercase();
        let mut found: Vec<String> = self
            .words
            .iter()
            .filter(|candidate| within_one_edit(&word, candidate))
            .cloned()
            .collect();
        found.sort();
        found
    }
}

/// True when `a` and `b` differ by exactly one insertion, deletion,
/// substitution or adjacent transposition
fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a == b {
        return false;
    }

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let (ra, rb) = (&a[prefix..], &b[prefix..]);

    match ra.len() as isize - rb.len() as isize {
        0 => {
            ra[1..] == rb[1..]
                || (ra.len() >= 2 && ra[0] == rb[1] && ra[1] == rb[0] && ra[2..] == rb[2..])
        }
        1 => ra[1..] == *rb,
        -1 => *ra == rb[1..],
        _ => false,
    }
}
