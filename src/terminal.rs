//! ANSI output of highlighted blocks using crossterm

use std::io::Write;
use std::sync::Arc;

use crossterm::{
    queue,
    style::{
        Attribute, Color as TermColor, Print, SetAttribute, SetBackgroundColor,
        SetForegroundColor, SetUnderlineColor,
    },
};

use crate::error::Result;
use crate::syntax::{paint, Color, Decoration, HighlightResult, Span, TextAttributes, Theme};

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Writes blocks with the colors of a theme
pub struct Painter<W: Write> {
    out: W,
    theme: Arc<Theme>,
    /// Emit escape sequences at all
    color: bool,
    /// Fill with the theme's background color
    background: bool,
    /// Width of the line number gutter (0 = none)
    gutter: usize,
}

impl<W: Write> Painter<W> {
    pub fn new(out: W, theme: Arc<Theme>) -> Self {
        Self {
            out,
            theme,
            color: true,
            background: false,
            gutter: 0,
        }
    }

    /// Plain text output, no escape sequences
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn with_background(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    /// Show line numbers for a document of `block_count` blocks
    pub fn with_line_numbers(mut self, block_count: usize) -> Self {
        self.gutter = block_count.max(1).to_string().len();
        self
    }

    /// Write one block followed by a newline
    pub fn write_block(&mut self, index: usize, text: &str, result: &HighlightResult) -> Result<()> {
        if self.gutter > 0 {
            self.write_gutter(index)?;
        }

        if !self.color {
            queue!(self.out, Print(text), Print("\n"))?;
            return Ok(());
        }

        let runs = paint(&result.spans, text.len());
        let plain = TextAttributes::new(self.theme.text_color);

        for (start, end) in segments(text.len(), &runs, &result.decorations) {
            let format = runs
                .iter()
                .find(|run| run.contains(start))
                .map(|run| run.format)
                .unwrap_or(plain);
            let marked = result
                .decorations
                .iter()
                .find(|d| d.start <= start && start < d.end);
            self.write_segment(&text[start..end], format, marked)?;
        }

        queue!(self.out, SetAttribute(Attribute::Reset), Print("\n"))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_gutter(&mut self, index: usize) -> Result<()> {
        let number = format!("{:>width$} ", index + 1, width = self.gutter);
        if self.color {
            queue!(
                self.out,
                SetForegroundColor(term_color(self.theme.gutter_text_color)),
                SetBackgroundColor(term_color(self.theme.gutter_back_color)),
                Print(number),
                SetAttribute(Attribute::Reset)
            )?;
        } else {
            queue!(self.out, Print(number))?;
        }
        Ok(())
    }

    fn write_segment(&mut self, text: &str, format: TextAttributes, marked: Option<&Decoration>) -> Result<()> {
        if self.background {
            queue!(self.out, SetBackgroundColor(term_color(self.theme.back_color)))?;
        }
        queue!(
            self.out,
            SetForegroundColor(term_color(format.color)),
            SetAttribute(if format.is_bold() {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }),
            SetAttribute(if format.italic {
                Attribute::Italic
            } else {
                Attribute::NoItalic
            })
        )?;

        match marked {
            Some(decoration) => queue!(
                self.out,
                SetUnderlineColor(term_color(decoration.color)),
                SetAttribute(Attribute::Undercurled)
            )?,
            None => queue!(self.out, SetAttribute(Attribute::NoUnderline))?,
        }

        queue!(self.out, Print(text))?;
        Ok(())
    }
}

/// Byte ranges over which both the painted run and the decoration are constant
fn segments(len: usize, runs: &[Span], decorations: &[Decoration]) -> Vec<(usize, usize)> {
    let mut cuts = vec![0, len];
    for run in runs {
        cuts.extend([run.start, run.end]);
    }
    for decoration in decorations {
        cuts.extend([decoration.start.min(len), decoration.end.min(len)]);
    }
    cuts.sort_unstable();
    cuts.dedup();

    cuts.windows(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(start, end)| start < end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{BlockState, Category};

    fn render(painter: Painter<Vec<u8>>) -> String {
        String::from_utf8(painter.into_inner()).unwrap()
    }

    fn result(spans: Vec<Span>, decorations: Vec<Decoration>) -> HighlightResult {
        HighlightResult {
            spans,
            decorations,
            end_state: BlockState::Normal,
        }
    }

    #[test]
    fn test_segments() {
        let key = TextAttributes::new(Color::RED);
        let runs = vec![Span::new(0, 2, key, Category::Key)];
        let decorations = vec![Decoration::misspelled(4, 7)];
        assert_eq!(
            segments(9, &runs, &decorations),
            vec![(0, 2), (2, 4), (4, 7), (7, 9)]
        );
        assert!(segments(0, &[], &[]).is_empty());
    }

    #[test]
    fn test_plain_output() {
        let mut painter = Painter::new(Vec::new(), Arc::new(Theme::classic())).with_color(false);
        painter.write_block(0, "if x", &result(Vec::new(), Vec::new())).unwrap();
        assert_eq!(render(painter), "if x\n");
    }

    #[test]
    fn test_line_numbers() {
        let mut painter = Painter::new(Vec::new(), Arc::new(Theme::classic()))
            .with_color(false)
            .with_line_numbers(12);
        painter.write_block(0, "a", &HighlightResult::default()).unwrap();
        painter.write_block(9, "b", &HighlightResult::default()).unwrap();
        assert_eq!(render(painter), " 1 a\n10 b\n");
    }

    #[test]
    fn test_colored_output() {
        let key = TextAttributes::new(Color::rgb(1, 2, 3)).with_bold();
        let spans = vec![Span::new(0, 2, key, Category::Key)];
        let mut painter = Painter::new(Vec::new(), Arc::new(Theme::classic()));
        painter.write_block(0, "if teh", &result(spans, vec![Decoration::misspelled(3, 6)])).unwrap();

        let out = render(painter);
        assert!(out.contains("\x1b[38;2;1;2;3m"));
        assert!(out.contains("if"));
        assert!(out.contains("teh"));
        assert!(out.ends_with("\n"));
        // keyword comes before the misspelled word
        assert!(out.find("if").unwrap() < out.find("teh").unwrap());
    }
}
