//! Themes: named bundles of document colors and per-category attributes
//!
//! Themes persist as JSON objects inside the settings file:
//!
//! ```text
//! {
//!   "theme-name": "CLASSIC",
//!   "theme-protected": true,
//!   "theme-color-text": "0,0,0",
//!   "theme-color-back": "255,255,255",
//!   ...
//!   "theme-syntax-key": [75, false, "0,0,255"],
//!   ...
//! }
//! ```

use serde_json::{json, Map, Value};
use tracing::warn;

use super::style::{Color, TextAttributes, Weight};
use super::tokens::Category;

/// Name of the built-in theme used whenever a theme cannot be resolved
pub const DEFAULT_THEME: &str = "CLASSIC";

/// A named color theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Built-in themes are protected from editing and deletion
    pub protected: bool,
    pub text_color: Color,
    pub back_color: Color,
    pub gutter_text_color: Color,
    pub gutter_back_color: Color,
    pub current_line_back_color: Color,
    /// Attributes indexed by `Category as usize`
    syntax: [TextAttributes; 8],
}

impl Theme {
    /// The built-in default theme
    pub fn classic() -> Self {
        BUILTIN_THEMES
            .iter()
            .find(|row| row.name == DEFAULT_THEME)
            .map(BuiltinRow::to_theme)
            .unwrap_or_else(|| BUILTIN_THEMES[0].to_theme())
    }

    /// Copy of this theme under a new name, unprotected
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            protected: false,
            ..self.clone()
        }
    }

    /// Attributes for a category
    pub fn attributes(&self, category: Category) -> TextAttributes {
        self.syntax[category as usize]
    }

    /// Replace the attributes for a category
    pub fn set_attributes(&mut self, category: Category, attributes: TextAttributes) {
        self.syntax[category as usize] = attributes;
    }

    /// Decode a persisted theme.
    ///
    /// Missing or malformed fields take the value of the default theme;
    /// only a missing name rejects the record.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let name = object.get("theme-name")?.as_str()?.to_string();
        let base = Theme::classic();

        let color = |key: &str, fallback: Color| -> Color {
            match object.get(key).and_then(Value::as_str) {
                Some(s) => s.parse().unwrap_or_else(|e| {
                    warn!(theme = %name, key, error = %e, "bad theme color, using default");
                    fallback
                }),
                None => fallback,
            }
        };

        let mut theme = Theme {
            name: name.clone(),
            protected: object
                .get("theme-protected")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            text_color: color("theme-color-text", base.text_color),
            back_color: color("theme-color-back", base.back_color),
            gutter_text_color: color("theme-color-gutterText", base.gutter_text_color),
            gutter_back_color: color("theme-color-gutterBack", base.gutter_back_color),
            current_line_back_color: color("theme-color-currentLineBack", base.current_line_back_color),
            syntax: base.syntax,
        };

        for category in Category::ALL {
            let key = category.theme_key();
            match object.get(&key).and_then(attributes_from_json) {
                Some(attrs) => theme.set_attributes(category, attrs),
                None => {
                    if object.contains_key(&key) {
                        warn!(theme = %name, key = %key, "bad theme attributes, using default");
                    }
                }
            }
        }

        Some(theme)
    }

    /// Encode this theme in its persisted form
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("theme-name".into(), json!(self.name));
        object.insert("theme-protected".into(), json!(self.protected));
        object.insert("theme-color-text".into(), json!(self.text_color.to_value_string()));
        object.insert("theme-color-back".into(), json!(self.back_color.to_value_string()));
        object.insert(
            "theme-color-gutterText".into(),
            json!(self.gutter_text_color.to_value_string()),
        );
        object.insert(
            "theme-color-gutterBack".into(),
            json!(self.gutter_back_color.to_value_string()),
        );
        object.insert(
            "theme-color-currentLineBack".into(),
            json!(self.current_line_back_color.to_value_string()),
        );

        for category in Category::ALL {
            let attrs = self.attributes(category);
            object.insert(
                category.theme_key(),
                json!([attrs.weight.to_value(), attrs.italic, attrs.color.to_value_string()]),
            );
        }

        Value::Object(object)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

/// Decode `[weight, italic, "r,g,b"]`
fn attributes_from_json(value: &Value) -> Option<TextAttributes> {
    let list = value.as_array()?;
    if list.len() < 3 {
        return None;
    }

    let weight = list[0]
        .as_i64()
        .or_else(|| list[0].as_f64().map(|w| w as i64))?;
    let italic = list[1].as_bool()?;
    let color = list[2].as_str()?.parse().ok()?;

    Some(TextAttributes {
        color,
        weight: Weight::from_value(weight),
        italic,
    })
}

/// One row of the built-in theme table
struct BuiltinRow {
    name: &'static str,
    /// text, back, gutter text, gutter back, current line back
    colors: [u32; 5],
    /// (color, bold, italic) in `Category::ALL` order
    syntax: [(u32, bool, bool); 8],
}

const fn hex(value: u32) -> Color {
    Color::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

impl BuiltinRow {
    fn to_theme(&self) -> Theme {
        let attrs = |(color, bold, italic): (u32, bool, bool)| TextAttributes {
            color: hex(color),
            weight: if bold { Weight::Bold } else { Weight::Normal },
            italic,
        };

        Theme {
            name: self.name.to_string(),
            protected: true,
            text_color: hex(self.colors[0]),
            back_color: hex(self.colors[1]),
            gutter_text_color: hex(self.colors[2]),
            gutter_back_color: hex(self.colors[3]),
            current_line_back_color: hex(self.colors[4]),
            syntax: self.syntax.map(attrs),
        }
    }
}

const N: bool = false;
const Y: bool = true;

const BUILTIN_THEMES: [BuiltinRow; 8] = [
    BuiltinRow {
        name: "CLASSIC",
        colors: [0x000000, 0xFFFFFF, 0x808080, 0xD0D0D0, 0xFFFF99],
        syntax: [
            (0x0000FF, Y, N),
            (0x0000FF, N, N),
            (0x800080, N, N),
            (0x0000FF, N, N),
            (0x008000, N, N),
            (0x008000, N, N),
            (0x008000, N, N),
            (0x7F747E, N, N),
        ],
    },
    BuiltinRow {
        name: "SOLARIZEDLIGHT",
        colors: [0x657B83, 0xFDF6E3, 0x657B83, 0xE0DBCD, 0xE0DBCD],
        syntax: [
            (0x709D06, N, N),
            (0xB58900, N, N),
            (0x268BD2, N, N),
            (0x657B83, N, N),
            (0x2AA198, N, N),
            (0x93A1A1, N, Y),
            (0x93A1A1, N, Y),
            (0x2AA198, N, N),
        ],
    },
    BuiltinRow {
        name: "GRAYGREY",
        colors: [0x000000, 0xC7D1D3, 0x000000, 0xD1DED1, 0xD7DEDE],
        syntax: [
            (0x98061A, Y, N),
            (0x9C061A, N, N),
            (0x0000FF, N, N),
            (0x00007F, N, N),
            (0x005500, N, N),
            (0x434343, N, Y),
            (0x434343, N, Y),
            (0x9C061A, N, N),
        ],
    },
    BuiltinRow {
        name: "JUSTDARKENOUGH",
        colors: [0xF4F4F4, 0x424244, 0x000000, 0x848278, 0x232220],
        syntax: [
            (0x00C2C2, N, N),
            (0xC195B4, N, N),
            (0x55AAFF, N, N),
            (0x00EBAD, N, N),
            (0xFFFF00, N, N),
            (0xF59F00, N, Y),
            (0xF59F00, N, Y),
            (0xFF518C, N, N),
        ],
    },
    BuiltinRow {
        name: "TANGOLIGHT",
        colors: [0x2E3436, 0xFFFFFF, 0x2E3436, 0xD1E7D3, 0xD1E7D3],
        syntax: [
            (0x346604, N, N),
            (0xCE5C00, N, N),
            (0x234670, N, N),
            (0xA40000, N, N),
            (0x5C3566, N, N),
            (0x5F615C, N, Y),
            (0x5F615C, N, Y),
            (0x8F5902, N, N),
        ],
    },
    BuiltinRow {
        name: "COBALT",
        colors: [0xF8F8F8, 0x09223F, 0x888888, 0x111111, 0x00162A],
        syntax: [
            (0xFA9E18, N, N),
            (0xFFEF79, N, N),
            (0x42D915, N, N),
            (0xFFDD00, N, N),
            (0x42D915, N, N),
            (0x008AFF, N, N),
            (0x008AFF, N, N),
            (0xFF518C, N, N),
        ],
    },
    BuiltinRow {
        name: "GreenAndGold",
        colors: [0x000000, 0xF1EEC2, 0x000000, 0x6C9359, 0xD5D39B],
        syntax: [
            (0xAA0000, N, N),
            (0xAA007F, N, N),
            (0x0000FF, N, N),
            (0x00008D, N, N),
            (0x006200, N, N),
            (0x7C7C7C, N, N),
            (0x7C7C7C, N, N),
            (0x8D0000, N, N),
        ],
    },
    BuiltinRow {
        name: "DeepLedger",
        colors: [0x000000, 0x8EDAA0, 0x000000, 0x4B673E, 0x8EDAA0],
        syntax: [
            (0x555500, N, N),
            (0xAD1D3C, N, N),
            (0x2F5F8F, N, N),
            (0x780050, N, N),
            (0x005500, N, N),
            (0x7C7C7C, N, N),
            (0x7C7C7C, N, N),
            (0xAF7500, N, N),
        ],
    },
];

/// All built-in themes, protected
pub fn builtin_themes() -> Vec<Theme> {
    BUILTIN_THEMES.iter().map(BuiltinRow::to_theme).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_theme() {
        let theme = Theme::classic();
        assert_eq!(theme.name, DEFAULT_THEME);
        assert!(theme.protected);
        assert_eq!(theme.back_color, Color::WHITE);
        let key = theme.attributes(Category::Key);
        assert_eq!(key.color, Color::rgb(0, 0, 255));
        assert!(key.is_bold());
        assert_eq!(theme.attributes(Category::Constant).color, Color::rgb(0x7F, 0x74, 0x7E));
    }

    #[test]
    fn test_builtin_names_unique() {
        let themes = builtin_themes();
        let mut names: Vec<_> = themes.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), themes.len());
        assert!(themes.iter().all(|t| t.protected));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut theme = Theme::classic().renamed("Mine");
        theme.set_attributes(
            Category::Quote,
            TextAttributes::new(Color::rgb(1, 2, 3)).with_italic(),
        );

        let decoded = Theme::from_json(&theme.to_json()).unwrap();
        assert_eq!(decoded, theme);
        assert!(!decoded.protected);
    }

    #[test]
    fn test_missing_fields_default() {
        let value = json!({
            "theme-name": "Sparse",
            "theme-color-text": "10,20,30",
            "theme-syntax-key": [75, true, "1,1,1"],
            "theme-syntax-type": [50, false],
            "theme-syntax-func": [50, false, "not a color"]
        });

        let theme = Theme::from_json(&value).unwrap();
        let classic = Theme::classic();
        assert_eq!(theme.name, "Sparse");
        assert!(!theme.protected);
        assert_eq!(theme.text_color, Color::rgb(10, 20, 30));
        assert_eq!(theme.back_color, classic.back_color);

        let key = theme.attributes(Category::Key);
        assert!(key.is_bold());
        assert!(key.italic);
        assert_eq!(theme.attributes(Category::Type), classic.attributes(Category::Type));
        assert_eq!(theme.attributes(Category::Func), classic.attributes(Category::Func));
        assert_eq!(theme.attributes(Category::MLine), classic.attributes(Category::MLine));
    }

    #[test]
    fn test_nameless_record_rejected() {
        assert!(Theme::from_json(&json!({ "theme-color-text": "0,0,0" })).is_none());
        assert!(Theme::from_json(&json!([1, 2, 3])).is_none());
    }
}
