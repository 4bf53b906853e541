//! Rule compilation
//!
//! Combines a pattern set with a theme into the ordered rule list the block
//! tokenizer applies. Category order is fixed: key, class, func, type,
//! constant, then the quote rule and the single-line comment rule.

use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::error::{Result, SyntaxError};
use super::patterns::PatternSet;
use super::style::TextAttributes;
use super::theme::Theme;
use super::tokens::Category;

/// Pattern matching double-quoted text, non-greedy
pub const QUOTE_PATTERN: &str = r#"".*?""#;

#[derive(Debug, Clone)]
enum Engine {
    Plain(regex::Regex),
    /// Sources using look-around or backreferences
    Fancy(fancy_regex::Regex),
}

/// A compiled regular expression.
///
/// Sources the `regex` crate accepts compile with it; anything else
/// (look-ahead, look-behind, backreferences) is handed to `fancy-regex`.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    engine: Engine,
}

impl CompiledPattern {
    /// Compile a pattern source
    pub fn new(source: &str, ignore_case: bool) -> Result<Self> {
        let plain = RegexBuilder::new(source)
            .case_insensitive(ignore_case)
            .build();

        let engine = match plain {
            Ok(regex) => Engine::Plain(regex),
            Err(plain_err) => {
                let fancy_source = if ignore_case {
                    format!("(?i){}", source)
                } else {
                    source.to_string()
                };
                match fancy_regex::Regex::new(&fancy_source) {
                    Ok(regex) => Engine::Fancy(regex),
                    Err(fancy_err) => {
                        debug!(pattern = source, error = %plain_err, "regex rejected pattern");
                        return Err(SyntaxError::InvalidPattern {
                            pattern: source.to_string(),
                            message: fancy_err.to_string(),
                        });
                    }
                }
            }
        };

        Ok(Self {
            source: source.to_string(),
            engine,
        })
    }

    /// Compile a pattern, treating a blank source as "never matches"
    pub fn optional(source: &str) -> Result<Option<Self>> {
        if source.trim().is_empty() {
            return Ok(None);
        }
        Self::new(source, false).map(Some)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Find the first match starting at or after byte offset `start`.
    ///
    /// Text before `start` still counts as context for anchors and word
    /// boundaries. Returns `(start, end)` byte offsets.
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start > text.len() || !text.is_char_boundary(start) {
            return None;
        }
        match &self.engine {
            Engine::Plain(regex) => regex.find_at(text, start).map(|m| (m.start(), m.end())),
            Engine::Fancy(regex) => match regex.find_from_pos(text, start) {
                Ok(found) => found.map(|m| (m.start(), m.end())),
                Err(e) => {
                    // backtrack limit exceeded; treat as no match
                    debug!(pattern = %self.source, error = %e, "match aborted");
                    None
                }
            },
        }
    }
}

/// A compiled pattern paired with its resolved format
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub pattern: CompiledPattern,
    pub format: TextAttributes,
    pub category: Category,
}

impl CompiledRule {
    /// Iterate over non-overlapping matches, left to right.
    ///
    /// Empty matches produce nothing but still advance the search by one
    /// character.
    pub fn matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        let mut pos = 0;
        std::iter::from_fn(move || {
            while pos <= text.len() {
                let (start, end) = self.pattern.find_at(text, pos)?;
                if end > start {
                    pos = end;
                    return Some((start, end));
                }
                pos = next_char_boundary(text, start);
            }
            None
        })
    }
}

/// Byte offset of the character after `pos`, or `len + 1` past the end
pub(crate) fn next_char_boundary(text: &str, pos: usize) -> usize {
    match text[pos..].chars().next() {
        Some(c) => pos + c.len_utf8(),
        None => text.len() + 1,
    }
}

/// Everything the tokenizer needs for one document
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Ordered rules; later rules paint over earlier ones
    pub rules: Vec<CompiledRule>,
    /// `None` when the pattern file has no start delimiter
    pub comment_start: Option<CompiledPattern>,
    /// `None` when the pattern file has no end delimiter
    pub comment_end: Option<CompiledPattern>,
    pub mline_format: TextAttributes,
}

impl RuleSet {
    /// Number of rules built from the category pattern lists
    pub fn category_rule_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|r| !matches!(r.category, Category::Quote | Category::Comment))
            .count()
    }

    /// Whether the multi-line comment scanner can ever match
    pub fn has_multiline_comments(&self) -> bool {
        self.comment_start.is_some() && self.comment_end.is_some()
    }
}

/// Build the rule set for a pattern set under a theme.
///
/// Always returns a fresh rule set; callers replace their previous one.
/// Entries that fail to compile are skipped with a warning.
pub fn compile(patterns: &PatternSet, theme: &Theme) -> RuleSet {
    let mut rules = Vec::new();

    let lists = [
        (Category::Key, &patterns.keywords),
        (Category::Class, &patterns.classes),
        (Category::Func, &patterns.functions),
        (Category::Type, &patterns.types),
        (Category::Constant, &patterns.constants),
    ];

    for (category, list) in lists {
        let format = theme.attributes(category);
        for source in list.iter().filter(|p| !p.trim().is_empty()) {
            match CompiledPattern::new(source, patterns.ignore_case) {
                Ok(pattern) => rules.push(CompiledRule {
                    pattern,
                    format,
                    category,
                }),
                Err(e) => warn!(
                    file = %patterns.path.display(),
                    category = category.name(),
                    error = %e,
                    "skipping pattern"
                ),
            }
        }
    }

    match CompiledPattern::new(QUOTE_PATTERN, false) {
        Ok(pattern) => rules.push(CompiledRule {
            pattern,
            format: theme.attributes(Category::Quote),
            category: Category::Quote,
        }),
        Err(e) => warn!(error = %e, "quote rule failed to compile"),
    }

    if let Some(pattern) = optional_pattern(patterns, &patterns.comment_single, "comment-single") {
        rules.push(CompiledRule {
            pattern,
            format: theme.attributes(Category::Comment),
            category: Category::Comment,
        });
    }

    let rule_set = RuleSet {
        rules,
        comment_start: optional_pattern(patterns, &patterns.comment_multi_start, "comment-multi-start"),
        comment_end: optional_pattern(patterns, &patterns.comment_multi_end, "comment-multi-end"),
        mline_format: theme.attributes(Category::MLine),
    };

    debug!(
        file = %patterns.path.display(),
        theme = %theme.name,
        rules = rule_set.rules.len(),
        "compiled rules"
    );
    rule_set
}

fn optional_pattern(patterns: &PatternSet, source: &str, field: &str) -> Option<CompiledPattern> {
    match CompiledPattern::optional(source) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(file = %patterns.path.display(), field, error = %e, "ignoring pattern");
            None
        }
    }
}
