//! Theme registry and the shared store handle engines are bound to

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Result, SyntaxError};
use super::theme::{builtin_themes, Theme, DEFAULT_THEME};

/// All known themes plus the name of the active one.
///
/// The active name always resolves: lookups of a missing name fall back
/// to the built-in default.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Arc<Theme>>,
    active: String,
}

impl ThemeRegistry {
    /// Registry holding the built-in themes with the default active
    pub fn new() -> Self {
        let mut registry = Self {
            themes: BTreeMap::new(),
            active: DEFAULT_THEME.to_string(),
        };
        for theme in builtin_themes() {
            registry.themes.insert(theme.name.clone(), Arc::new(theme));
        }
        registry
    }

    /// Decode the persisted theme store: `{"active-theme": .., "themes": [..]}`.
    ///
    /// Built-in themes are always present; records replace them by name but
    /// cannot lift their protection.
    pub fn from_json(value: &Value) -> Self {
        let mut registry = Self::new();

        if let Some(list) = value.get("themes").and_then(Value::as_array) {
            for record in list {
                match Theme::from_json(record) {
                    Some(mut theme) => {
                        if registry.get(&theme.name).is_some_and(|t| t.protected) {
                            theme.protected = true;
                        }
                        registry.themes.insert(theme.name.clone(), Arc::new(theme));
                    }
                    None => warn!("skipping theme record without a name"),
                }
            }
        }

        if let Some(name) = value.get("active-theme").and_then(Value::as_str) {
            registry.active = name.to_string();
        }
        registry.ensure_active();
        registry
    }

    /// Load the theme store from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyntaxError::MissingFile(path.to_path_buf()));
        }
        let data = fs::read_to_string(path).map_err(|e| SyntaxError::io(path, e))?;
        let value: Value = serde_json::from_str(&data).map_err(|source| SyntaxError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&value))
    }

    /// Encode the whole registry in its persisted form
    pub fn to_json(&self) -> Value {
        let themes: Vec<Value> = self.themes.values().map(|t| t.to_json()).collect();
        json!({
            "active-theme": self.active,
            "themes": themes,
        })
    }

    /// Write the registry to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(&self.to_json())
            .map_err(|e| SyntaxError::Message(e.to_string()))?;
        fs::write(path, text).map_err(|e| SyntaxError::io(path, e))
    }

    /// Get a theme by name
    pub fn get(&self, name: &str) -> Option<&Arc<Theme>> {
        self.themes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Theme names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// The active theme, or the built-in default if the name is unknown.
    ///
    /// Looks the theme up by name. Engines read the snapshot published by
    /// `ThemeStore` instead.
    pub fn active(&self) -> Arc<Theme> {
        match self.themes.get(&self.active) {
            Some(theme) => Arc::clone(theme),
            None => {
                warn!(theme = %self.active, "active theme not found, using default");
                self.themes
                    .get(DEFAULT_THEME)
                    .cloned()
                    .unwrap_or_else(|| Arc::new(Theme::classic()))
            }
        }
    }

    /// Make a theme active
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        if !self.themes.contains_key(name) {
            return Err(SyntaxError::ThemeNotFound(name.to_string()));
        }
        self.active = name.to_string();
        Ok(())
    }

    /// Insert or replace a theme and make it active
    pub fn add_theme(&mut self, theme: Theme) {
        self.active = theme.name.clone();
        self.themes.insert(theme.name.clone(), Arc::new(theme));
    }

    /// Copy theme `src` to a new unprotected theme named `dest`
    pub fn copy_theme(&mut self, src: &str, dest: &str) -> Result<()> {
        let source = self
            .themes
            .get(src)
            .ok_or_else(|| SyntaxError::ThemeNotFound(src.to_string()))?;
        if self.themes.contains_key(dest) {
            return Err(SyntaxError::ThemeExists(dest.to_string()));
        }
        let copy = source.renamed(dest);
        self.themes.insert(dest.to_string(), Arc::new(copy));
        Ok(())
    }

    /// Delete a user theme; deleting the active theme re-activates the default.
    ///
    /// The default theme itself can never be deleted.
    pub fn delete_theme(&mut self, name: &str) -> Result<()> {
        let theme = self
            .themes
            .get(name)
            .ok_or_else(|| SyntaxError::ThemeNotFound(name.to_string()))?;
        if theme.protected || name == DEFAULT_THEME {
            return Err(SyntaxError::ThemeProtected(name.to_string()));
        }
        self.themes.remove(name);
        self.ensure_active();
        Ok(())
    }

    /// Edit a user theme in place.
    ///
    /// The edit runs on a copy which then replaces the stored theme, so
    /// snapshots handed out earlier never change underneath their holders.
    pub fn update_theme(&mut self, name: &str, edit: impl FnOnce(&mut Theme)) -> Result<()> {
        let current = self
            .themes
            .get(name)
            .ok_or_else(|| SyntaxError::ThemeNotFound(name.to_string()))?;
        if current.protected {
            return Err(SyntaxError::ThemeProtected(name.to_string()));
        }

        let mut copy = Theme::clone(current);
        edit(&mut copy);
        copy.name = name.to_string();
        self.themes.insert(name.to_string(), Arc::new(copy));
        Ok(())
    }

    fn ensure_active(&mut self) {
        if !self.themes.contains_key(&self.active) {
            warn!(theme = %self.active, "active theme not found, using default");
            self.active = DEFAULT_THEME.to_string();
        }
        if !self.themes.contains_key(DEFAULT_THEME) {
            self.themes
                .insert(DEFAULT_THEME.to_string(), Arc::new(Theme::classic()));
        }
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Active theme together with the generation it was published under
#[derive(Debug, Clone)]
pub struct ThemeSnapshot {
    pub generation: u64,
    pub theme: Arc<Theme>,
}

struct StoreInner {
    registry: Mutex<ThemeRegistry>,
    /// Theme and generation are swapped as one value
    active: ArcSwap<ThemeSnapshot>,
}

/// Shared handle to the process-wide theme registry.
///
/// Cloning the handle shares the registry. Writers hold the registry lock,
/// then publish the resulting active theme as a new snapshot; readers only
/// load the snapshot and never observe a half-updated theme.
#[derive(Clone)]
pub struct ThemeStore {
    inner: Arc<StoreInner>,
}

impl ThemeStore {
    pub fn new(registry: ThemeRegistry) -> Self {
        let active = registry.active();
        Self {
            inner: Arc::new(StoreInner {
                registry: Mutex::new(registry),
                active: ArcSwap::from_pointee(ThemeSnapshot {
                    generation: 0,
                    theme: active,
                }),
            }),
        }
    }

    /// Snapshot of the active theme
    pub fn active(&self) -> Arc<Theme> {
        Arc::clone(&self.inner.active.load().theme)
    }

    /// Counter bumped on every change to the active theme
    pub fn generation(&self) -> u64 {
        self.inner.active.load().generation
    }

    /// Active theme and its generation, read together
    pub fn snapshot(&self) -> ThemeSnapshot {
        ThemeSnapshot::clone(&self.inner.active.load())
    }

    /// Copy of the registry at this moment
    pub fn registry(&self) -> ThemeRegistry {
        self.lock().clone()
    }

    pub fn active_name(&self) -> String {
        self.lock().active_name().to_string()
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().names().into_iter().map(str::to_string).collect()
    }

    /// Switch the active theme
    pub fn set_active(&self, name: &str) -> Result<()> {
        self.modify(|registry| registry.set_active(name))
    }

    /// Edit the active theme's colors (live preview)
    pub fn edit_active(&self, edit: impl FnOnce(&mut Theme)) -> Result<()> {
        self.modify(|registry| {
            let name = registry.active_name().to_string();
            registry.update_theme(&name, edit)
        })
    }

    /// Run any registry change and publish the resulting active theme
    pub fn modify<T>(&self, change: impl FnOnce(&mut ThemeRegistry) -> Result<T>) -> Result<T> {
        let mut registry = self.lock();
        let value = change(&mut registry)?;

        // writers are serialized by the registry lock
        let active = registry.active();
        let current = self.inner.active.load_full();
        if *active != *current.theme {
            let generation = current.generation + 1;
            self.inner.active.store(Arc::new(ThemeSnapshot {
                generation,
                theme: active,
            }));
            debug!(theme = %registry.active_name(), generation, "active theme published");
        }
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, ThemeRegistry> {
        // A panic while editing cannot leave the registry half-written:
        // edits replace whole entries.
        self.inner
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new(ThemeRegistry::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::style::{Color, TextAttributes};
    use crate::syntax::tokens::Category;

    #[test]
    fn test_registry_defaults() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.active_name(), DEFAULT_THEME);
        assert!(registry.contains("COBALT"));
        assert_eq!(registry.active().name, DEFAULT_THEME);
    }

    #[test]
    fn test_unknown_active_falls_back() {
        let registry = ThemeRegistry::from_json(&json!({ "active-theme": "Gone" }));
        assert_eq!(registry.active_name(), DEFAULT_THEME);
        assert_eq!(registry.active().name, DEFAULT_THEME);
    }

    #[test]
    fn test_copy_and_delete() {
        let mut registry = ThemeRegistry::new();
        registry.copy_theme("COBALT", "MyCobalt").unwrap();
        assert!(!registry.get("MyCobalt").unwrap().protected);
        assert!(matches!(
            registry.copy_theme("COBALT", "MyCobalt"),
            Err(SyntaxError::ThemeExists(_))
        ));
        assert!(matches!(
            registry.copy_theme("Nope", "Other"),
            Err(SyntaxError::ThemeNotFound(_))
        ));

        registry.set_active("MyCobalt").unwrap();
        registry.delete_theme("MyCobalt").unwrap();
        assert_eq!(registry.active_name(), DEFAULT_THEME);

        assert!(matches!(
            registry.delete_theme("COBALT"),
            Err(SyntaxError::ThemeProtected(_))
        ));
    }

    #[test]
    fn test_stored_record_keeps_builtin_protected() {
        let mut registry = ThemeRegistry::from_json(&json!({
            "themes": [
                { "theme-name": DEFAULT_THEME, "theme-protected": false },
                { "theme-name": "COBALT", "theme-protected": false }
            ]
        }));
        assert!(registry.get(DEFAULT_THEME).unwrap().protected);
        assert!(registry.get("COBALT").unwrap().protected);

        assert!(matches!(
            registry.delete_theme(DEFAULT_THEME),
            Err(SyntaxError::ThemeProtected(_))
        ));
        assert!(registry.contains(registry.active_name()));
    }

    #[test]
    fn test_default_theme_never_deleted() {
        let mut registry = ThemeRegistry::new();
        let mut classic = Theme::classic();
        classic.protected = false;
        registry.add_theme(classic);
        registry.copy_theme(DEFAULT_THEME, "Mine").unwrap();
        registry.set_active("Mine").unwrap();

        assert!(matches!(
            registry.delete_theme(DEFAULT_THEME),
            Err(SyntaxError::ThemeProtected(_))
        ));
        registry.delete_theme("Mine").unwrap();
        assert_eq!(registry.active_name(), DEFAULT_THEME);
        assert!(registry.contains(registry.active_name()));
        assert!(registry.names().contains(&DEFAULT_THEME));
    }

    #[test]
    fn test_update_protected_refused() {
        let mut registry = ThemeRegistry::new();
        let result = registry.update_theme(DEFAULT_THEME, |t| t.text_color = Color::RED);
        assert!(matches!(result, Err(SyntaxError::ThemeProtected(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("themes.json");

        let mut registry = ThemeRegistry::new();
        registry.add_theme(Theme::classic().renamed("Mine"));
        registry.save(&path).unwrap();

        let loaded = ThemeRegistry::load(&path).unwrap();
        assert_eq!(loaded.active_name(), "Mine");
        assert_eq!(loaded.get("Mine").unwrap().as_ref(), registry.get("Mine").unwrap().as_ref());
    }

    #[test]
    fn test_store_snapshot_and_generation() {
        let mut registry = ThemeRegistry::new();
        registry.copy_theme(DEFAULT_THEME, "Live").unwrap();
        registry.set_active("Live").unwrap();

        let store = ThemeStore::new(registry);
        let before = store.active();
        let generation = store.generation();

        store
            .edit_active(|t| {
                t.set_attributes(Category::Key, TextAttributes::new(Color::rgb(9, 9, 9)))
            })
            .unwrap();

        // the old snapshot is untouched, the new one carries the edit
        assert_eq!(before.attributes(Category::Key), Theme::classic().attributes(Category::Key));
        assert_eq!(store.active().attributes(Category::Key).color, Color::rgb(9, 9, 9));
        assert_eq!(store.generation(), generation + 1);

        store.set_active("COBALT").unwrap();
        assert_eq!(store.active().name, "COBALT");
        assert_eq!(store.generation(), generation + 2);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.generation, generation + 2);
        assert_eq!(snapshot.theme.name, "COBALT");

        assert!(store.set_active("Nope").is_err());
        assert_eq!(store.generation(), generation + 2);
    }

    #[test]
    fn test_snapshot_pairs_theme_with_generation() {
        let mut registry = ThemeRegistry::new();
        registry.copy_theme(DEFAULT_THEME, "Live").unwrap();
        registry.set_active("Live").unwrap();
        let store = ThemeStore::new(registry);

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for shade in 1..=200u8 {
                    store
                        .edit_active(|t| t.text_color = Color::rgb(shade, shade, shade))
                        .unwrap();
                }
            })
        };

        // a snapshot's theme is always the one published with its generation
        for _ in 0..200 {
            let snapshot = store.snapshot();
            if snapshot.generation > 0 {
                let shade = snapshot.generation as u8;
                assert_eq!(snapshot.theme.text_color, Color::rgb(shade, shade, shade));
            }
        }
        writer.join().unwrap();
        assert_eq!(store.generation(), 200);
    }

    #[test]
    fn test_store_handles_share_registry() {
        let store = ThemeStore::default();
        let other = store.clone();
        other.set_active("TANGOLIGHT").unwrap();
        assert_eq!(store.active().name, "TANGOLIGHT");
        assert_eq!(store.active_name(), "TANGOLIGHT");
    }
}
