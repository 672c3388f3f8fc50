// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the editor's delta model owns that. This
// module just knows the byte-level encoding of every terminal command an
// inline line editor needs: relative cursor moves, line erasure, and
// foreground color.
//
// Relative moves with a count of zero emit nothing. Terminals treat
// `CSI 0 C` as `CSI 1 C`, so a zero-width move must never reach the wire.
//
// All functions return `io::Result` propagated from the underlying writer.

use std::io::{self, Write};

use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor `n` columns right (CUF).
#[inline]
pub fn cursor_forward(w: &mut impl Write, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{n}C")
}

/// Move the cursor `n` columns left (CUB).
#[inline]
pub fn cursor_back(w: &mut impl Write, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{n}D")
}

/// Move the cursor `n` rows up (CUU). Stops at the top edge of the screen.
#[inline]
pub fn cursor_up(w: &mut impl Write, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{n}A")
}

/// Move the cursor `n` rows down (CUD). Stops at the bottom edge of the
/// screen; use a line feed when the screen must scroll.
#[inline]
pub fn cursor_down(w: &mut impl Write, n: usize) -> io::Result<()> {
    if n == 0 {
        return Ok(());
    }
    write!(w, "\x1b[{n}B")
}

// ─── Erasure ─────────────────────────────────────────────────────────────────

/// Erase the entire current line (EL 2). The cursor does not move.
#[inline]
pub fn erase_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2K")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn erase_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0K")
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// Set the foreground (text) color.
///
/// Standard colors use SGR 30–37, bright colors SGR 90–97, and
/// [`Color::Default`] resets to the terminal's own foreground (SGR 39).
#[inline]
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    write!(w, "\x1b[{}m", color.fg_code())
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
