//! Pattern file resolution
//!
//! Maps a document's file name to a syntax tag and the tag to its
//! `syn_<tag>.json` pattern file.

use std::path::{Path, PathBuf};

/// Tag used when nothing more specific applies
pub const TEXT_TAG: &str = "txt";

/// Languages a user can force regardless of the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    C,
    Clipper,
    CMake,
    Css,
    Doxy,
    ErrLog,
    Html,
    Java,
    Js,
    Json,
    Make,
    Nsis,
    Text,
    Shell,
    Perl,
    Php,
    Python,
    None,
}

impl SyntaxKind {
    pub const ALL: [SyntaxKind; 18] = [
        SyntaxKind::C,
        SyntaxKind::Clipper,
        SyntaxKind::CMake,
        SyntaxKind::Css,
        SyntaxKind::Doxy,
        SyntaxKind::ErrLog,
        SyntaxKind::Html,
        SyntaxKind::Java,
        SyntaxKind::Js,
        SyntaxKind::Json,
        SyntaxKind::Make,
        SyntaxKind::Nsis,
        SyntaxKind::Text,
        SyntaxKind::Shell,
        SyntaxKind::Perl,
        SyntaxKind::Php,
        SyntaxKind::Python,
        SyntaxKind::None,
    ];

    /// Tag naming this language's pattern file
    pub fn tag(&self) -> &'static str {
        match self {
            SyntaxKind::C => "cpp",
            SyntaxKind::Clipper => "clipper",
            SyntaxKind::CMake => "cmake",
            SyntaxKind::Css => "css",
            SyntaxKind::Doxy => "doxy",
            SyntaxKind::ErrLog => "errlog",
            SyntaxKind::Html => "html",
            SyntaxKind::Java => "java",
            SyntaxKind::Js => "js",
            SyntaxKind::Json => "json",
            SyntaxKind::Make => "make",
            SyntaxKind::Nsis => "nsi",
            SyntaxKind::Text => TEXT_TAG,
            SyntaxKind::Shell => "sh",
            SyntaxKind::Perl => "pl",
            SyntaxKind::Php => "php",
            SyntaxKind::Python => "py",
            SyntaxKind::None => "none",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        SyntaxKind::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

/// Syntax tag for a document, from its file name
pub fn syntax_tag_for(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return TEXT_TAG.to_string();
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let tag = match suffix.as_str() {
        "h" | "hh" | "hpp" | "c" | "cc" | "c++" | "cpp" | "l" | "m" | "mm" => "cpp",
        "prg" => "clipper",
        _ if name == "cmakelists.txt" || suffix == "cmake" => "cmake",
        "dox" | "doxypress" => "doxy",
        "err" | "log" => "errlog",
        "htm" | "shtml" => "html",
        _ if name == "configure" || name == "configure.ac" || suffix == "ac" => "make",
        _ if name == "makefile" || name == "makefile.in" || suffix == "am" => "make",
        "nsis" => "nsi",
        "perl" | "pm" => "pl",
        "php3" | "php4" => "php",
        "" => TEXT_TAG,
        other => other,
    };
    tag.to_string()
}

/// `dir/syn_<tag>.json`
pub fn pattern_file(dir: &Path, tag: &str) -> PathBuf {
    dir.join(format!("syn_{}.json", tag))
}

/// Pattern file for a document: its own tag's file, else the plain text
/// file, else `None` for no highlighting at all
pub fn resolve_pattern_file(dir: &Path, path: Option<&Path>) -> Option<PathBuf> {
    let specific = pattern_file(dir, &syntax_tag_for(path));
    if specific.exists() {
        return Some(specific);
    }

    let fallback = pattern_file(dir, TEXT_TAG);
    fallback.exists().then_some(fallback)
}
