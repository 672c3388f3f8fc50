//! Screen deltas: what an edit does to the visible terminal.
//!
//! Editing actions never write to the terminal themselves. They mutate
//! buffer and cursor state and describe the matching screen change as a
//! list of [`Op`]s: relative cursor moves, text, erasures. A separate step
//! ([`Delta::write_to`]) encodes the ops as escape sequences. State
//! transitions can therefore be tested without a terminal, and the exact
//! bytes are still available when a test wants them.
//!
//! # Control characters
//!
//! A control byte (`0x01..=0x1F`) is shown as a two-column `^X` glyph in
//! the dim control color. Every cursor computation over buffer content must
//! use [`glyph_width`] so the physical cursor stays in step with the
//! logical one.

use std::io::{self, Write};

use n_term::ansi;
use n_term::color::Color;

/// Whether `byte` is displayed as a `^X` glyph.
#[inline]
#[must_use]
pub const fn is_control(byte: u8) -> bool {
    byte != 0 && byte < b' '
}

/// Terminal columns occupied by `byte` when displayed.
#[inline]
#[must_use]
pub const fn glyph_width(byte: u8) -> usize {
    if is_control(byte) { 2 } else { 1 }
}

/// Terminal columns occupied by a run of bytes.
#[must_use]
pub fn display_width(bytes: &[u8]) -> usize {
    bytes.iter().map(|&b| glyph_width(b)).sum()
}

/// One primitive screen change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Cursor left `n` columns.
    Left(usize),
    /// Cursor right `n` columns.
    Right(usize),
    /// Cursor up `n` rows.
    Up(usize),
    /// Cursor down `n` rows (no scrolling).
    Down(usize),
    /// Literal bytes.
    Text(Vec<u8>),
    /// Bytes in a foreground color, followed by a color reset.
    Colored(Color, Vec<u8>),
    /// Erase the whole current line.
    EraseLine,
    /// Erase from the cursor to the end of the line.
    EraseToEnd,
    /// Cursor to column 0.
    CarriageReturn,
    /// Cursor down one row, scrolling the screen at the bottom edge.
    LineFeed,
}

/// An ordered batch of [`Op`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// The ops collected so far.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Forget every collected op.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn left(&mut self, n: usize) {
        if n > 0 {
            self.ops.push(Op::Left(n));
        }
    }

    pub fn right(&mut self, n: usize) {
        if n > 0 {
            self.ops.push(Op::Right(n));
        }
    }

    pub fn up(&mut self, n: usize) {
        if n > 0 {
            self.ops.push(Op::Up(n));
        }
    }

    pub fn down(&mut self, n: usize) {
        if n > 0 {
            self.ops.push(Op::Down(n));
        }
    }

    pub fn text(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.ops.push(Op::Text(bytes.to_vec()));
        }
    }

    pub fn colored(&mut self, color: Color, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.ops.push(Op::Colored(color, bytes.to_vec()));
        }
    }

    pub fn erase_line(&mut self) {
        self.ops.push(Op::EraseLine);
    }

    pub fn erase_to_end(&mut self) {
        self.ops.push(Op::EraseToEnd);
    }

    pub fn carriage_return(&mut self) {
        self.ops.push(Op::CarriageReturn);
    }

    pub fn line_feed(&mut self) {
        self.ops.push(Op::LineFeed);
    }

    /// Show buffer content: printable runs as-is, control bytes as `^X`
    /// in `control`. Returns the number of columns drawn.
    pub fn glyphs(&mut self, bytes: &[u8], control: Color) -> usize {
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if is_control(b) {
                self.text(&bytes[start..i]);
                self.colored(control, &[b'^', b + b'@']);
                start = i + 1;
            }
        }
        self.text(&bytes[start..]);
        display_width(bytes)
    }

    /// Encode every op as terminal output.
    ///
    /// # Errors
    ///
    /// Returns the writer's error if a write fails.
    pub fn write_to(&self, mut w: &mut dyn Write) -> io::Result<()> {
        let w = &mut w;
        for op in &self.ops {
            match op {
                Op::Left(n) => ansi::cursor_back(w, *n)?,
                Op::Right(n) => ansi::cursor_forward(w, *n)?,
                Op::Up(n) => ansi::cursor_up(w, *n)?,
                Op::Down(n) => ansi::cursor_down(w, *n)?,
                Op::Text(bytes) => w.write_all(bytes)?,
                Op::Colored(color, bytes) => {
                    ansi::fg(w, *color)?;
                    w.write_all(bytes)?;
                    ansi::fg(w, Color::Default)?;
                }
                Op::EraseLine => ansi::erase_line(w)?,
                Op::EraseToEnd => ansi::erase_to_eol(w)?,
                Op::CarriageReturn => w.write_all(b"\r")?,
                Op::LineFeed => w.write_all(b"\n")?,
            }
        }
        Ok(())
    }

    /// The encoded bytes, for inspection.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}
