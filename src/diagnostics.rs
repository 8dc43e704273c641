//! Diagnostic payloads and the caret renderer.
//!
//! The engine carries at most one diagnostic per parse: a byte offset and a
//! message. Rendering resolves the offset to a line and column against the
//! source buffer and prints the offending line with a caret underneath.
//! The core never writes to stderr on its own; callers pick a writer.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

use crate::source::Source;

/// A committed parse or evaluation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Byte offset into the source.
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Render `diagnostic` against `source`:
///
/// ```text
/// error: expected an expression
///  --> demo.moeb:2:5
/// 1 + // nothing here
///     ^
/// ```
///
/// Tabs in the offending line are reproduced in the caret prefix so the
/// caret stays aligned under any fixed tab stop.
pub fn render(
    diagnostic: &Diagnostic,
    source: &Source,
    out: &mut dyn WriteColor,
) -> io::Result<()> {
    let (line, column) = source.line_col(diagnostic.offset);

    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "error")?;
    out.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(out, ": {}", diagnostic.message)?;
    out.reset()?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(out, " --> ")?;
    out.reset()?;
    writeln!(out, "{}:{}:{}", source.display_name(), line, column)?;

    let text = source.line_at(diagnostic.offset);
    writeln!(out, "{}", String::from_utf8_lossy(text))?;

    let mut prefix = String::with_capacity(column - 1);
    for &byte in &text[..column - 1] {
        prefix.push(if byte == b'\t' { '\t' } else { ' ' });
    }
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(out, "{prefix}^")?;
    out.reset()
}

/// Render without color into a string, for tests and non-terminal output.
pub fn render_plain(diagnostic: &Diagnostic, source: &Source) -> String {
    let mut out = NoColor::new(Vec::new());
    // Writing into a Vec cannot fail.
    let _ = render(diagnostic, source, &mut out);
    String::from_utf8_lossy(&out.into_inner()).into_owned()
}

/// Render to stderr, colored when stderr is a terminal.
pub fn render_stderr(diagnostic: &Diagnostic, source: &Source) -> io::Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    render(diagnostic, source, &mut stderr)
}
