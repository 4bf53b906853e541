//! Style types for highlighted text
//!
//! This module provides the value types a host paints: colors, font
//! attributes per category, foreground spans and spell-check decorations.

use std::fmt;
use std::str::FromStr;

use crate::error::SyntaxError;
use super::tokens::Category;

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    /// Create a color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as the settings file representation, `"r,g,b"`
    pub fn to_value_string(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = SyntaxError;

    /// Parse either `"r,g,b"` or `"#RRGGBB"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SyntaxError::InvalidColor(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        Ok(Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

impl Weight {
    /// Weight as written to the settings file
    pub fn to_value(self) -> i64 {
        match self {
            Weight::Normal => 50,
            Weight::Bold => 75,
        }
    }

    /// Read a persisted weight; accepts both the 0-99 and 100-900 scales
    pub fn from_value(value: i64) -> Self {
        if (63..100).contains(&value) || value >= 600 {
            Weight::Bold
        } else {
            Weight::Normal
        }
    }
}

/// Font attributes for one lexical category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextAttributes {
    pub color: Color,
    pub weight: Weight,
    pub italic: bool,
}

impl TextAttributes {
    /// Create attributes with normal weight and no italics
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight == Weight::Bold
    }
}

/// A highlighted span of text within a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where this span starts (inclusive)
    pub start: usize,
    /// Byte offset where this span ends (exclusive)
    pub end: usize,
    /// Resolved font attributes
    pub format: TextAttributes,
    /// Category that produced this span
    pub category: Category,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, format: TextAttributes, category: Category) -> Self {
        Self {
            start,
            end,
            format,
            category,
        }
    }

    /// Check if this span contains a byte position
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the length of this span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Underline style of a decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underline {
    Wavy,
}

/// An additive decoration over a byte range; never changes the foreground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub start: usize,
    pub end: usize,
    pub underline: Underline,
    pub color: Color,
}

impl Decoration {
    /// Spell-check marker: red wavy underline
    pub fn misspelled(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            underline: Underline::Wavy,
            color: Color::RED,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Flatten spans applied in order into non-overlapping runs.
///
/// Later spans overwrite earlier ones where they overlap. Bytes not covered
/// by any span are omitted. The result is sorted by offset and adjacent runs
/// with equal format and category are merged.
pub fn paint(spans: &[Span], len: usize) -> Vec<Span> {
    let mut cells: Vec<Option<(TextAttributes, Category)>> = vec![None; len];
    for span in spans {
        let end = span.end.min(len);
        for cell in cells.iter_mut().take(end).skip(span.start) {
            *cell = Some((span.format, span.category));
        }
    }

    let mut runs: Vec<Span> = Vec::new();
    for (pos, cell) in cells.into_iter().enumerate() {
        let Some((format, category)) = cell else {
            continue;
        };
        match runs.last_mut() {
            Some(last) if last.end == pos && last.format == format && last.category == category => {
                last.end = pos + 1;
            }
            _ => runs.push(Span::new(pos, pos + 1, format, category)),
        }
    }
    runs
}
