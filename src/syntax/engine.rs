//! Per-document highlighting engine
//!
//! A `SyntaxEngine` is bound to one open document. It owns the compiled
//! rules and a per-block cache of results and outgoing states. The host
//! calls it directly when blocks change and reads spans back from it.

use std::collections::VecDeque;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::spell::SpellCheck;
use super::patterns::PatternSet;
use super::rules::{compile, RuleSet};
use super::store::{ThemeSnapshot, ThemeStore};
use super::style::Span;
use super::tokenizer::{BlockState, BlockTokenizer, HighlightResult};

/// Per-document block cache
#[derive(Debug, Default)]
pub struct BlockCache {
    /// Outgoing state per block (`None` = not computed)
    states: Vec<Option<BlockState>>,
    /// Cached results per block
    results: Vec<Option<HighlightResult>>,
}

impl BlockCache {
    /// Ensure cache vectors cover `block_count` blocks
    pub fn ensure_size(&mut self, block_count: usize) {
        if self.states.len() < block_count {
            self.states.resize(block_count, None);
        }
        if self.results.len() < block_count {
            self.results.resize(block_count, None);
        }
    }

    /// Drop entries beyond `block_count`
    pub fn truncate(&mut self, block_count: usize) {
        self.states.truncate(block_count);
        self.results.truncate(block_count);
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.states.clear();
        self.results.clear();
    }

    /// Outgoing state of a block, if known
    pub fn state(&self, block: usize) -> Option<BlockState> {
        self.states.get(block).copied().flatten()
    }

    /// State a block starts in: the previous block's outgoing state
    pub fn incoming(&self, block: usize) -> BlockState {
        if block == 0 {
            BlockState::Normal
        } else {
            self.state(block - 1).unwrap_or_default()
        }
    }

    pub fn result(&self, block: usize) -> Option<&HighlightResult> {
        self.results.get(block).and_then(Option::as_ref)
    }

    /// Store a result; returns true when the outgoing state changed
    fn store(&mut self, block: usize, result: HighlightResult) -> bool {
        self.ensure_size(block + 1);
        let changed = self.states[block] != Some(result.end_state);
        self.states[block] = Some(result.end_state);
        self.results[block] = Some(result);
        changed
    }

    /// Replace `removed` blocks at `at` with `inserted` uncomputed ones
    fn splice(&mut self, at: usize, removed: usize, inserted: usize) {
        let at = at.min(self.states.len());
        let end = (at + removed).min(self.states.len());
        self.states.splice(at..end, std::iter::repeat(None).take(inserted));
        self.results.splice(at..end, std::iter::repeat(None).take(inserted));
    }
}

/// Highlighting facade for one document
pub struct SyntaxEngine {
    /// `None` runs the engine in no-syntax mode
    patterns: Option<Arc<PatternSet>>,
    themes: ThemeStore,
    tokenizer: BlockTokenizer,
    cache: BlockCache,
    /// Theme generation the rules were compiled against
    compiled_generation: u64,
    needs_rehighlight: bool,
}

impl SyntaxEngine {
    /// Create an engine and compile its rules against the active theme
    pub fn new(patterns: Option<Arc<PatternSet>>, themes: ThemeStore) -> Self {
        let mut engine = Self {
            patterns,
            themes,
            tokenizer: BlockTokenizer::default(),
            cache: BlockCache::default(),
            compiled_generation: 0,
            needs_rehighlight: true,
        };
        engine.recompile();
        engine
    }

    /// Engine that produces no spans
    pub fn plain(themes: ThemeStore) -> Self {
        Self::new(None, themes)
    }

    pub fn pattern_set(&self) -> Option<&Arc<PatternSet>> {
        self.patterns.as_ref()
    }

    pub fn rules(&self) -> &RuleSet {
        self.tokenizer.rules()
    }

    /// Whether the host should rehighlight the whole document
    pub fn needs_rehighlight(&self) -> bool {
        self.needs_rehighlight
    }

    /// Rebuild the rule list from the pattern set and the active theme.
    ///
    /// The previous rules are replaced, never extended. Cached results are
    /// dropped and the document is marked for a full rehighlight.
    pub fn recompile(&mut self) {
        let ThemeSnapshot { generation, theme } = self.themes.snapshot();
        self.compiled_generation = generation;

        let rules = match &self.patterns {
            Some(patterns) => compile(patterns, &theme),
            None => RuleSet::default(),
        };
        self.tokenizer.set_rules(rules);
        self.cache.clear();
        self.needs_rehighlight = true;
        debug!(theme = %theme.name, generation = self.compiled_generation, "engine recompiled");
    }

    /// Recompile if the active theme changed since the last compile.
    ///
    /// Returns true when a recompile happened.
    pub fn sync_theme(&mut self) -> bool {
        if self.themes.generation() == self.compiled_generation {
            return false;
        }
        self.recompile();
        true
    }

    /// Switch to a different pattern set (or none)
    pub fn set_pattern_set(&mut self, patterns: Option<Arc<PatternSet>>) {
        self.patterns = patterns;
        self.recompile();
    }

    /// Bind the spell-check collaborator
    pub fn set_spell_checker(&mut self, checker: Option<Rc<dyn SpellCheck>>) {
        self.tokenizer.set_spell_checker(checker);
        self.cache.clear();
        self.needs_rehighlight = true;
    }

    /// Turn the spell overlay on or off
    pub fn set_spell_check(&mut self, enabled: bool) {
        self.tokenizer.set_spell_check(enabled);
        self.cache.clear();
        self.needs_rehighlight = true;
    }

    /// Highlight a block without touching the cache
    pub fn highlight_block(&self, text: &str, incoming: BlockState) -> HighlightResult {
        self.tokenizer.highlight_block(text, incoming)
    }

    /// Host notification that one block changed.
    ///
    /// Returns the spans to paint and the block's outgoing state.
    pub fn on_block_changed(
        &mut self,
        block: usize,
        text: &str,
        incoming: BlockState,
    ) -> (Vec<Span>, BlockState) {
        let result = self.tokenizer.highlight_block(text, incoming);
        let out = (result.spans.clone(), result.end_state);
        self.cache.store(block, result);
        out
    }

    /// Highlight every block of the document, in order
    pub fn rehighlight_all<S: AsRef<str>>(&mut self, blocks: &[S]) {
        self.cache.clear();
        self.cache.ensure_size(blocks.len());

        let mut state = BlockState::Normal;
        for (index, text) in blocks.iter().enumerate() {
            let result = self.tokenizer.highlight_block(text.as_ref(), state);
            state = result.end_state;
            self.cache.store(index, result);
        }
        self.needs_rehighlight = false;
    }

    /// Re-tokenize after blocks `first..=last` were edited.
    ///
    /// `blocks` is the whole document after the edit. Highlighting runs past
    /// `last` only while a block's outgoing state differs from what was
    /// cached, so the next block's assumed incoming state was wrong.
    /// Returns the range of blocks that were re-tokenized.
    pub fn update<S: AsRef<str>>(&mut self, first: usize, last: usize, blocks: &[S]) -> Range<usize> {
        if blocks.is_empty() || first >= blocks.len() {
            self.cache.truncate(blocks.len());
            return first..first;
        }
        let last = last.min(blocks.len() - 1).max(first);

        self.cache.truncate(blocks.len());
        self.cache.ensure_size(blocks.len());

        let mut queue: VecDeque<usize> = (first..=last).collect();
        let mut end = first;

        while let Some(index) = queue.pop_front() {
            let incoming = self.cache.incoming(index);
            let result = self.tokenizer.highlight_block(blocks[index].as_ref(), incoming);
            let changed = self.cache.store(index, result);
            end = end.max(index + 1);

            let next = index + 1;
            let next_pending = queue.front() == Some(&next);
            if next < blocks.len() && !next_pending && (changed || self.cache.result(next).is_none()) {
                queue.push_back(next);
            }
        }

        first..end
    }

    /// Adjust the cache for inserted or removed blocks.
    ///
    /// Replaces `removed` blocks at `at` with `inserted` new ones; follow
    /// with `update` over the inserted range.
    pub fn splice(&mut self, at: usize, removed: usize, inserted: usize) {
        self.cache.splice(at, removed, inserted);
    }

    /// Cached result for a block
    pub fn block(&self, index: usize) -> Option<&HighlightResult> {
        self.cache.result(index)
    }

    /// Cached outgoing state for a block
    pub fn block_state(&self, index: usize) -> Option<BlockState> {
        self.cache.state(index)
    }
}
