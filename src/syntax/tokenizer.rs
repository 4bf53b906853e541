//! Per-block highlighting
//!
//! A block is highlighted in three passes:
//!
//! 1. every compiled rule, in order, emits a span per match; later spans
//!    paint over earlier ones
//! 2. the multi-line comment scanner, which carries `BlockState` from one
//!    block to the next
//! 3. the optional spell overlay, which only adds decorations

use std::rc::Rc;

use unicode_segmentation::UnicodeSegmentation;

use crate::spell::SpellCheck;
use super::rules::{next_char_boundary, RuleSet};
use super::style::{Decoration, Span};
use super::tokens::Category;

/// Classification state carried across block boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum BlockState {
    #[default]
    Normal = 0,
    InComment = 1,
}

impl BlockState {
    /// Interpret a host-stored state; anything unknown is `Normal`
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => BlockState::InComment,
            _ => BlockState::Normal,
        }
    }

    pub fn to_raw(self) -> i32 {
        self as i32
    }

    pub fn is_in_comment(self) -> bool {
        self == BlockState::InComment
    }
}

/// Result of highlighting a single block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightResult {
    /// Spans in the order they were applied
    pub spans: Vec<Span>,
    /// Spell-check decorations
    pub decorations: Vec<Decoration>,
    /// State at end of block (for the next block)
    pub end_state: BlockState,
}

/// Applies a rule set to blocks of text
#[derive(Default)]
pub struct BlockTokenizer {
    rules: RuleSet,
    spell: Option<Rc<dyn SpellCheck>>,
    spell_enabled: bool,
}

impl BlockTokenizer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            spell: None,
            spell_enabled: false,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Replace the whole rule set
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    /// Bind (or unbind) the spell-check collaborator
    pub fn set_spell_checker(&mut self, checker: Option<Rc<dyn SpellCheck>>) {
        self.spell = checker;
    }

    pub fn set_spell_check(&mut self, enabled: bool) {
        self.spell_enabled = enabled;
    }

    /// Whether the spell overlay will run
    pub fn spell_active(&self) -> bool {
        self.spell_enabled && self.spell.is_some()
    }

    /// Highlight one block given the state the previous block ended in
    pub fn highlight_block(&self, text: &str, incoming: BlockState) -> HighlightResult {
        let mut spans = Vec::new();

        for rule in &self.rules.rules {
            for (start, end) in rule.matches(text) {
                spans.push(Span::new(start, end, rule.format, rule.category));
            }
        }

        let end_state = self.scan_comments(text, incoming, &mut spans);
        let decorations = self.spell_overlay(text);

        HighlightResult {
            spans,
            decorations,
            end_state,
        }
    }

    /// Multi-line comment state machine
    fn scan_comments(&self, text: &str, incoming: BlockState, spans: &mut Vec<Span>) -> BlockState {
        let (Some(start_pat), Some(end_pat)) = (&self.rules.comment_start, &self.rules.comment_end)
        else {
            return BlockState::Normal;
        };
        let format = self.rules.mline_format;

        let mut start = if incoming.is_in_comment() {
            Some(0)
        } else {
            start_pat.find_at(text, 0).map(|(s, _)| s)
        };

        while let Some(p) = start {
            let Some((_, e)) = end_pat.find_at(text, p) else {
                spans.push(Span::new(p, text.len(), format, Category::MLine));
                return BlockState::InComment;
            };

            if e > p {
                spans.push(Span::new(p, e, format, Category::MLine));
            }

            // an empty comment still moves the scan forward
            let resume = if e > p { e } else { next_char_boundary(text, p) };
            if resume > text.len() {
                break;
            }
            start = start_pat.find_at(text, resume).map(|(s, _)| s);
        }

        BlockState::Normal
    }

    /// Decorate every misspelled word run
    fn spell_overlay(&self, text: &str) -> Vec<Decoration> {
        let Some(checker) = self.spell.as_ref().filter(|_| self.spell_enabled) else {
            return Vec::new();
        };

        text.split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(char::is_alphabetic))
            .filter(|(_, word)| !checker.spell(word))
            .map(|(start, word)| Decoration::misspelled(start, start + word.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::WordList;
    use crate::syntax::patterns::PatternSet;
    use crate::syntax::rules::compile;
    use crate::syntax::style::{Color, TextAttributes};
    use crate::syntax::theme::Theme;

    fn c_like() -> PatternSet {
        PatternSet {
            keywords: vec![r"\bif\b".into(), r"\breturn\b".into()],
            types: vec![r"\bint\b".into()],
            comment_single: "//[^\n]*".into(),
            comment_multi_start: r"/\*".into(),
            comment_multi_end: r"\*/".into(),
            ..Default::default()
        }
    }

    fn tokenizer(set: &PatternSet) -> BlockTokenizer {
        BlockTokenizer::new(compile(set, &Theme::classic()))
    }

    fn mline_spans(result: &HighlightResult) -> Vec<(usize, usize)> {
        result
            .spans
            .iter()
            .filter(|s| s.category == Category::MLine)
            .map(|s| (s.start, s.end))
            .collect()
    }

    #[test]
    fn test_keyword_span() {
        let set = PatternSet {
            keywords: vec![r"\bif\b".into()],
            ..Default::default()
        };
        let result = tokenizer(&set).highlight_block("if (x) {}", BlockState::Normal);

        assert_eq!(result.spans.len(), 1);
        let span = &result.spans[0];
        assert_eq!((span.start, span.len()), (0, 2));
        assert_eq!(span.category, Category::Key);
        assert_eq!(span.format, Theme::classic().attributes(Category::Key));
        assert_eq!(result.end_state, BlockState::Normal);
    }

    #[test]
    fn test_empty_keywords() {
        let set = PatternSet::default();
        let result = tokenizer(&set).highlight_block("if while return", BlockState::Normal);
        assert!(result.spans.iter().all(|s| s.category != Category::Key));
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_ignore_case() {
        let set = PatternSet {
            ignore_case: true,
            keywords: vec!["class".into()],
            ..Default::default()
        };
        let result = tokenizer(&set).highlight_block("CLASS Foo", BlockState::Normal);
        assert_eq!(result.spans.len(), 1);
        assert_eq!((result.spans[0].start, result.spans[0].end), (0, 5));
    }

    #[test]
    fn test_quote_applied_after_keyword() {
        let tok = tokenizer(&c_like());
        let result = tok.highlight_block(r#"x = "if" + "return""#, BlockState::Normal);
        let order: Vec<Category> = result.spans.iter().map(|s| s.category).collect();
        assert_eq!(
            order,
            vec![Category::Key, Category::Key, Category::Quote, Category::Quote]
        );
        // non-greedy: two separate quote spans
        assert_eq!((result.spans[2].start, result.spans[2].end), (4, 8));
        assert_eq!((result.spans[3].start, result.spans[3].end), (11, 19));
    }

    #[test]
    fn test_multiline_open_and_close() {
        let tok = tokenizer(&c_like());

        let first = tok.highlight_block("code /* open", BlockState::Normal);
        assert_eq!(mline_spans(&first), vec![(5, 12)]);
        assert_eq!(first.end_state, BlockState::InComment);

        let second = tok.highlight_block("still inside */ done", first.end_state);
        assert_eq!(mline_spans(&second), vec![(0, 15)]);
        assert_eq!(second.end_state, BlockState::Normal);
    }

    #[test]
    fn test_continuation_ignores_own_content() {
        let tok = tokenizer(&c_like());
        let result = tok.highlight_block("int x; /* nested start", BlockState::InComment);
        // searched for the end from 0; none found, so the whole block is comment
        assert_eq!(mline_spans(&result), vec![(0, 22)]);
        assert_eq!(result.end_state, BlockState::InComment);
    }

    #[test]
    fn test_several_comments_in_one_block() {
        let tok = tokenizer(&c_like());
        let result = tok.highlight_block("a /* b */ c /* d */ e /* f", BlockState::Normal);
        assert_eq!(mline_spans(&result), vec![(2, 9), (12, 19), (22, 26)]);
        assert_eq!(result.end_state, BlockState::InComment);
    }

    #[test]
    fn test_no_comment_keeps_normal() {
        let tok = tokenizer(&c_like());
        let result = tok.highlight_block("return 0;", BlockState::Normal);
        assert!(mline_spans(&result).is_empty());
        assert_eq!(result.end_state, BlockState::Normal);
    }

    #[test]
    fn test_missing_delimiter_is_inert() {
        let set = PatternSet {
            comment_multi_start: r"/\*".into(),
            ..Default::default()
        };
        let tok = tokenizer(&set);
        let result = tok.highlight_block("/* never closed", BlockState::Normal);
        assert!(mline_spans(&result).is_empty());
        assert_eq!(result.end_state, BlockState::Normal);

        let result = tok.highlight_block("anything", BlockState::InComment);
        assert!(mline_spans(&result).is_empty());
        assert_eq!(result.end_state, BlockState::Normal);
    }

    #[test]
    fn test_bad_multiline_delimiter_is_inert() {
        let mut set = c_like();
        set.comment_multi_end = "*/(".into();
        let tok = tokenizer(&set);

        let result = tok.highlight_block("if x /* open", BlockState::Normal);
        assert!(mline_spans(&result).is_empty());
        assert_eq!(result.end_state, BlockState::Normal);
        // the other rules still apply
        assert_eq!(result.spans[0].category, Category::Key);
        assert_eq!((result.spans[0].start, result.spans[0].end), (0, 2));
    }

    #[test]
    fn test_determinism() {
        let tok = tokenizer(&c_like());
        let text = r#"if (a) return "x"; /* c */ // tail"#;
        for state in [BlockState::Normal, BlockState::InComment] {
            assert_eq!(tok.highlight_block(text, state), tok.highlight_block(text, state));
        }
    }

    #[test]
    fn test_theme_swap_keeps_offsets() {
        let set = c_like();
        let mut other = Theme::classic().renamed("other");
        for category in Category::ALL {
            other.set_attributes(category, TextAttributes::new(Color::rgb(7, 7, 7)).with_italic());
        }

        let text = r#"int f() { if (x) return "s"; } /* open"#;
        let a = BlockTokenizer::new(compile(&set, &Theme::classic())).highlight_block(text, BlockState::Normal);
        let b = BlockTokenizer::new(compile(&set, &other)).highlight_block(text, BlockState::Normal);

        let ranges = |r: &HighlightResult| -> Vec<(usize, usize, Category)> {
            r.spans.iter().map(|s| (s.start, s.end, s.category)).collect()
        };
        assert_eq!(ranges(&a), ranges(&b));
        assert_eq!(a.end_state, b.end_state);
        assert!(b.spans.iter().all(|s| s.format.color == Color::rgb(7, 7, 7)));
    }

    #[test]
    fn test_spell_overlay() {
        let set = PatternSet {
            keywords: vec![r"\bteh\b".into()],
            ..Default::default()
        };
        let mut tok = tokenizer(&set);
        tok.set_spell_checker(Some(Rc::new(WordList::from_words(["the", "cat"]))));

        // bound but disabled
        let result = tok.highlight_block("the teh cat", BlockState::Normal);
        assert!(result.decorations.is_empty());

        tok.set_spell_check(true);
        let result = tok.highlight_block("the teh cat", BlockState::Normal);
        assert_eq!(result.decorations, vec![Decoration::misspelled(4, 7)]);

        // the keyword span over the same range is unchanged
        assert_eq!(result.spans.len(), 1);
        assert_eq!((result.spans[0].start, result.spans[0].end), (4, 7));
        assert_eq!(result.spans[0].format, Theme::classic().attributes(Category::Key));
    }

    #[test]
    fn test_spell_skips_non_letters() {
        let mut tok = BlockTokenizer::default();
        tok.set_spell_checker(Some(Rc::new(WordList::new())));
        tok.set_spell_check(true);
        let result = tok.highlight_block("123 + 456;", BlockState::Normal);
        assert!(result.decorations.is_empty());
    }

    #[test]
    fn test_raw_state() {
        assert_eq!(BlockState::from_raw(1), BlockState::InComment);
        assert_eq!(BlockState::from_raw(-1), BlockState::Normal);
        assert_eq!(BlockState::InComment.to_raw(), 1);
    }
}
