//! Lexical categories for syntax highlighting
//!
//! Every span carries the category that produced it; the active theme
//! resolves each category to concrete text attributes.

/// Lexical categories a theme assigns attributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Language keywords
    Key,
    /// Type names
    Type,
    /// Class names
    Class,
    /// Function names
    Func,
    /// Double-quoted text
    Quote,
    /// Single-line comments
    Comment,
    /// Multi-line comments
    MLine,
    /// Constants
    Constant,
}

impl Category {
    /// All categories, in the order themes persist them
    pub const ALL: [Category; 8] = [
        Category::Key,
        Category::Type,
        Category::Class,
        Category::Func,
        Category::Quote,
        Category::Comment,
        Category::MLine,
        Category::Constant,
    ];

    /// Short name used in settings keys (`theme-syntax-<name>`)
    pub fn name(&self) -> &'static str {
        match self {
            Category::Key => "key",
            Category::Type => "type",
            Category::Class => "class",
            Category::Func => "func",
            Category::Quote => "quote",
            Category::Comment => "comment",
            Category::MLine => "mline",
            Category::Constant => "constant",
        }
    }

    /// Parse a category from its short name
    pub fn from_name(name: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Key of this category's attributes in a persisted theme
    pub fn theme_key(&self) -> String {
        format!("theme-syntax-{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Category::from_name("mline"), Some(Category::MLine));
        assert_eq!(Category::from_name("func"), Some(Category::Func));
        assert_eq!(Category::from_name("Keyword"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn test_theme_key() {
        assert_eq!(Category::Constant.theme_key(), "theme-syntax-constant");
        assert_eq!(Category::Key.theme_key(), "theme-syntax-key");
    }
}
