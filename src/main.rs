//! hilite - print a file with syntax highlighting
//!
//! Highlights the file block by block, the way an editor would, and writes
//! it to stdout with ANSI colors.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use crossterm::tty::IsTty;
use tracing::debug;

use hilite::config::Config;
use hilite::error::{Result, SyntaxError};
use hilite::logging;
use hilite::spell::WordList;
use hilite::syntax::{SyntaxKind, SyntaxManager};
use hilite::terminal::Painter;

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    file: Option<PathBuf>,
    syntax: Option<String>,
    theme: Option<String>,
    config: Option<PathBuf>,
    dictionary: Option<PathBuf>,
    list_themes: bool,
    line_numbers: bool,
    background: bool,
    plain: bool,
}

enum Command {
    Run(Options),
    Help,
    Version,
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args)? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Version => {
            print_version();
            return Ok(());
        }
        Command::Run(options) => options,
    };

    let config = match &options.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    let mut manager = SyntaxManager::from_config(&config);

    if let Some(name) = &options.theme {
        manager.set_active_theme(name)?;
    }

    if options.list_themes {
        let active = manager.themes().active_name();
        for name in manager.themes().names() {
            let marker = if name == active { "*" } else { " " };
            println!("{} {}", marker, name);
        }
        return Ok(());
    }

    if let Some(path) = &options.dictionary {
        manager.set_spell_checker(Some(Rc::new(WordList::load(path)?)));
        manager.set_spell_check(true);
    }

    let Some(path) = options.file else {
        print_usage();
        return Err(SyntaxError::Message("no input file".to_string()));
    };
    let contents = fs::read_to_string(&path).map_err(|e| SyntaxError::io(&path, e))?;
    let blocks: Vec<&str> = contents.lines().collect();

    manager.open_document(0, Some(&path));
    if let Some(tag) = &options.syntax {
        let kind = SyntaxKind::from_tag(tag)
            .ok_or_else(|| SyntaxError::Message(format!("unknown syntax: {}", tag)))?;
        manager.force_syntax(0, kind)?;
    }

    let theme = manager.active_theme();
    let Some(engine) = manager.engine_mut(0) else {
        return Ok(());
    };
    engine.rehighlight_all(&blocks);
    debug!(file = %path.display(), blocks = blocks.len(), "document highlighted");

    let stdout = io::stdout();
    let color = !options.plain && stdout.is_tty();
    let mut painter = Painter::new(stdout.lock(), theme)
        .with_color(color)
        .with_background(options.background);
    if options.line_numbers {
        painter = painter.with_line_numbers(blocks.len());
    }

    for (index, text) in blocks.iter().enumerate() {
        if let Some(result) = engine.block(index) {
            painter.write_block(index, text, result)?;
        }
    }
    painter.flush()?;

    Ok(())
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let flag = arg.as_str();
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| SyntaxError::Message(format!("{} needs a value", name)))
        };

        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--syntax" | "-s" => options.syntax = Some(value(flag)?),
            "--theme" | "-t" => options.theme = Some(value(flag)?),
            "--config" | "-c" => options.config = Some(PathBuf::from(value(flag)?)),
            "--dict" | "-d" => options.dictionary = Some(PathBuf::from(value(flag)?)),
            "--list-themes" => options.list_themes = true,
            "--number" | "-n" => options.line_numbers = true,
            "--background" => options.background = true,
            "--plain" => options.plain = true,
            other if other.starts_with('-') => {
                return Err(SyntaxError::Message(format!("unknown option: {}", other)));
            }
            file => {
                if options.file.is_some() {
                    return Err(SyntaxError::Message("only one file may be given".to_string()));
                }
                options.file = Some(PathBuf::from(file));
            }
        }
    }

    Ok(Command::Run(options))
}

fn print_usage() {
    println!("hilite {} - syntax highlighting for the terminal", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hilite [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -s, --syntax TAG   Force a syntax (cpp, py, sh, txt, none, ...)");
    println!("  -t, --theme NAME   Use a theme for this run");
    println!("  -c, --config PATH  Read configuration from PATH");
    println!("  -d, --dict PATH    Underline words missing from a word list");
    println!("  -n, --number       Show line numbers");
    println!("      --background   Paint the theme's background color");
    println!("      --plain        Never emit color codes");
    println!("      --list-themes  List known themes and exit");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Logging: set HILITE_LOG (or RUST_LOG), e.g. HILITE_LOG=hilite=debug");
}

fn print_version() {
    println!("hilite {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let Command::Run(options) =
            parse_args(&args(&["-s", "cpp", "--theme", "COBALT", "-n", "main.c"])).unwrap()
        else {
            panic!("expected run");
        };
        assert_eq!(options.syntax.as_deref(), Some("cpp"));
        assert_eq!(options.theme.as_deref(), Some("COBALT"));
        assert!(options.line_numbers);
        assert_eq!(options.file, Some(PathBuf::from("main.c")));
    }

    #[test]
    fn test_help_and_version() {
        assert!(matches!(parse_args(&args(&["a.c", "--help"])).unwrap(), Command::Help));
        assert!(matches!(parse_args(&args(&["-V"])).unwrap(), Command::Version));
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["--syntax"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["a.c", "b.c"])).is_err());
    }
}
