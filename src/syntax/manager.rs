//! Syntax highlighting manager
//!
//! Host-side coordinator: resolves each open document to a pattern set,
//! shares loaded pattern sets through one cache and keeps every document's
//! engine in step with the active theme.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SyntaxError};
use crate::spell::{SpellCheck, WordList};
use super::cache::PatternCache;
use super::engine::SyntaxEngine;
use super::language::{pattern_file, resolve_pattern_file, SyntaxKind};
use super::patterns::PatternSet;
use super::store::{ThemeRegistry, ThemeStore};
use super::theme::Theme;

/// Host-assigned document identifier
pub type DocumentId = usize;

/// Main syntax highlighting manager
pub struct SyntaxManager {
    /// Directory holding `syn_<tag>.json` files
    syntax_dir: PathBuf,
    /// Pattern sets shared by every document of a language
    cache: PatternCache,
    themes: ThemeStore,
    /// Per-document engines
    engines: HashMap<DocumentId, SyntaxEngine>,
    spell: Option<Rc<dyn SpellCheck>>,
    spell_enabled: bool,
}

impl SyntaxManager {
    pub fn new(syntax_dir: impl Into<PathBuf>, themes: ThemeStore) -> Self {
        Self {
            syntax_dir: syntax_dir.into(),
            cache: PatternCache::new(),
            themes,
            engines: HashMap::new(),
            spell: None,
            spell_enabled: false,
        }
    }

    /// Build a manager from user configuration.
    ///
    /// Nothing here is fatal: a broken theme store, unknown theme, missing
    /// dictionary or failed preload is logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let registry = match &config.themes_file {
            Some(path) if path.exists() => ThemeRegistry::load(path).unwrap_or_else(|e| {
                warn!(file = %path.display(), error = %e, "using built-in themes");
                ThemeRegistry::new()
            }),
            _ => ThemeRegistry::new(),
        };

        let mut manager = Self::new(&config.syntax_path, ThemeStore::new(registry));

        if let Some(name) = &config.active_theme {
            if let Err(e) = manager.themes.set_active(name) {
                warn!(theme = %name, error = %e, "keeping current theme");
            }
        }

        if let Some(path) = &config.dictionary {
            match WordList::load(path) {
                Ok(words) => manager.spell = Some(Rc::new(words)),
                Err(e) => warn!(file = %path.display(), error = %e, "spell check unavailable"),
            }
        }
        manager.spell_enabled = config.spell_check;

        manager.preload_paths(config.preload_paths());
        manager
    }

    pub fn syntax_dir(&self) -> &Path {
        &self.syntax_dir
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn pattern_cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Pattern set for a file, through the shared cache
    pub fn pattern_set_for(&mut self, path: impl AsRef<Path>) -> Result<Arc<PatternSet>> {
        self.cache.get(path)
    }

    /// Snapshot of the active theme
    pub fn active_theme(&self) -> Arc<Theme> {
        self.themes.active()
    }

    /// Bind an engine to a newly opened document, chosen from its file name.
    ///
    /// Without a usable pattern file the document runs with no syntax.
    pub fn open_document(&mut self, id: DocumentId, path: Option<&Path>) -> &mut SyntaxEngine {
        let patterns = match resolve_pattern_file(&self.syntax_dir, path) {
            Some(file) => self.load_logged(&file),
            None => {
                warn!(
                    dir = %self.syntax_dir.display(),
                    document = ?path,
                    "no pattern file, highlighting disabled"
                );
                None
            }
        };
        self.install(id, patterns)
    }

    /// Force a language regardless of the file name.
    ///
    /// `SyntaxKind::None` turns highlighting off. A pattern file that fails
    /// to load leaves the document with no syntax and returns the error.
    pub fn force_syntax(&mut self, id: DocumentId, kind: SyntaxKind) -> Result<()> {
        if kind == SyntaxKind::None {
            self.install(id, None);
            return Ok(());
        }

        let file = pattern_file(&self.syntax_dir, kind.tag());
        match self.cache.get(&file) {
            Ok(patterns) => {
                self.install(id, Some(patterns));
                Ok(())
            }
            Err(e) => {
                self.install(id, None);
                Err(e)
            }
        }
    }

    /// Drop a document's engine
    pub fn close_document(&mut self, id: DocumentId) -> Option<SyntaxEngine> {
        self.engines.remove(&id)
    }

    pub fn engine(&self, id: DocumentId) -> Option<&SyntaxEngine> {
        self.engines.get(&id)
    }

    pub fn engine_mut(&mut self, id: DocumentId) -> Option<&mut SyntaxEngine> {
        self.engines.get_mut(&id)
    }

    /// Open document ids, sorted
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.engines.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Warm the pattern cache for a list of syntax tags
    pub fn preload<I, S>(&mut self, tags: I) -> Vec<(PathBuf, SyntaxError)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths: Vec<PathBuf> = tags
            .into_iter()
            .map(|tag| pattern_file(&self.syntax_dir, tag.as_ref().trim()))
            .collect();
        self.preload_paths(paths)
    }

    fn preload_paths(&mut self, paths: Vec<PathBuf>) -> Vec<(PathBuf, SyntaxError)> {
        if paths.is_empty() {
            return Vec::new();
        }
        let failures = self.cache.preload(&paths);
        info!(
            requested = paths.len(),
            loaded = paths.len() - failures.len(),
            "pattern sets preloaded"
        );
        failures
    }

    /// Switch the active theme.
    ///
    /// Returns the documents that now need a full rehighlight.
    pub fn set_active_theme(&mut self, name: &str) -> Result<Vec<DocumentId>> {
        self.themes.set_active(name)?;
        Ok(self.sync_themes())
    }

    /// Edit the active theme in place (live preview).
    ///
    /// Returns the documents that now need a full rehighlight.
    pub fn edit_active_theme(&mut self, edit: impl FnOnce(&mut Theme)) -> Result<Vec<DocumentId>> {
        self.themes.edit_active(edit)?;
        Ok(self.sync_themes())
    }

    /// Recompile every engine whose rules predate the active theme
    pub fn sync_themes(&mut self) -> Vec<DocumentId> {
        let mut stale: Vec<DocumentId> = self
            .engines
            .iter_mut()
            .filter_map(|(id, engine)| engine.sync_theme().then_some(*id))
            .collect();
        stale.sort_unstable();
        stale
    }

    /// Turn the spell overlay on or off for every document
    pub fn set_spell_check(&mut self, enabled: bool) {
        self.spell_enabled = enabled;
        for engine in self.engines.values_mut() {
            engine.set_spell_check(enabled);
        }
    }

    pub fn spell_check(&self) -> bool {
        self.spell_enabled
    }

    /// Bind the spell-check collaborator for every document
    pub fn set_spell_checker(&mut self, checker: Option<Rc<dyn SpellCheck>>) {
        for engine in self.engines.values_mut() {
            engine.set_spell_checker(checker.clone());
        }
        self.spell = checker;
    }

    fn load_logged(&mut self, file: &Path) -> Option<Arc<PatternSet>> {
        match self.cache.get(file) {
            Ok(patterns) => Some(patterns),
            Err(e) => {
                warn!(file = %file.display(), error = %e, "highlighting disabled");
                None
            }
        }
    }

    fn install(&mut self, id: DocumentId, patterns: Option<Arc<PatternSet>>) -> &mut SyntaxEngine {
        let mut engine = SyntaxEngine::new(patterns, self.themes.clone());
        engine.set_spell_checker(self.spell.clone());
        engine.set_spell_check(self.spell_enabled);

        match self.engines.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(engine);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(engine),
        }
    }
}
