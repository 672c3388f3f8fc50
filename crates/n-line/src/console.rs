//! The terminal the editors talk to.
//!
//! Editors never touch stdin/stdout directly. They go through [`Console`],
//! which bundles the four things an editing session needs from a
//! terminal: raw mode, keys, size, and an output stream. [`TtyConsole`] is
//! the real thing; [`MemoryConsole`] replays scripted keys and captures
//! output so whole sessions can run in tests.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};

use n_term::input::KeyEvent;
use n_term::reader::{KeyReader, StdinSource};
use n_term::terminal::{Size, Terminal};

use crate::config::Config;
use crate::delta::Delta;

/// Terminal services required by the editors.
pub trait Console {
    /// Acquire raw input mode. Must be idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal mode can't be changed.
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Restore the mode saved by [`enter_raw_mode`](Self::enter_raw_mode).
    /// Must be idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal mode can't be restored.
    fn leave_raw_mode(&mut self) -> io::Result<()>;

    /// Block until one key arrives. `Ok(None)` means input has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>>;

    /// Terminal dimensions, or `None` if they can't be determined.
    fn size(&self) -> Option<Size>;

    /// Where rendered output goes.
    fn writer(&mut self) -> &mut dyn Write;

    /// Encode `delta` to the output stream and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn apply(&mut self, delta: &Delta) -> io::Result<()> {
        let out = self.writer();
        delta.write_to(out)?;
        out.flush()
    }
}

// ---------------------------------------------------------------------------
// Real terminal
// ---------------------------------------------------------------------------

/// The process's controlling terminal: stdin for keys, stdout for output.
pub struct TtyConsole {
    terminal: Terminal,
    keys: KeyReader<StdinSource>,
    out: Stdout,
}

impl TtyConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            keys: KeyReader::new(StdinSource::new()),
            out: io::stdout(),
        }
    }
}

impl Default for TtyConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TtyConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyConsole")
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

impl Console for TtyConsole {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.terminal.enter_raw_mode()
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.terminal.leave_raw_mode()
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.keys.read_key()
    }

    fn size(&self) -> Option<Size> {
        self.terminal.size()
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.out
    }
}

// ---------------------------------------------------------------------------
// In-memory terminal
// ---------------------------------------------------------------------------

/// A scripted console: keys come from a queue, output lands in a buffer.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    keys: VecDeque<KeyEvent>,
    output: Vec<u8>,
    size: Option<Size>,
    raw: bool,
    /// Times raw mode was entered.
    raw_entries: usize,
}

impl MemoryConsole {
    /// A console that will deliver `keys` and then report end of input.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Report `size` from [`Console::size`]. Without this the size is
    /// unknown.
    #[must_use]
    pub const fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Queue more keys.
    pub fn push_keys(&mut self, keys: impl IntoIterator<Item = KeyEvent>) {
        self.keys.extend(keys);
    }

    /// Keys not yet read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.keys.len()
    }

    /// Everything written so far.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Drain the captured output.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    #[must_use]
    pub const fn raw_entries(&self) -> usize {
        self.raw_entries
    }
}

impl Console for MemoryConsole {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        if !self.raw {
            self.raw = true;
            self.raw_entries += 1;
        }
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> io::Result<()> {
        self.raw = false;
        Ok(())
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        Ok(self.keys.pop_front())
    }

    fn size(&self) -> Option<Size> {
        self.size
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.output
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The usable terminal area, in cells. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cols: usize,
    pub rows: usize,
}

impl Viewport {
    /// A viewport of `cols` × `rows`, each clamped to at least 1.
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Resolve a queried size, falling back to the configured size when
    /// the query failed or reported zero.
    #[must_use]
    pub fn detect(size: Option<Size>, config: &Config) -> Self {
        let size = match size {
            Some(size) if size.cols > 0 && size.rows > 0 => size,
            other => {
                tracing::warn!(
                    queried = ?other,
                    fallback = ?config.fallback_size,
                    "terminal size unavailable, using fallback"
                );
                config.fallback_size
            }
        };
        Self::new(usize::from(size.cols), usize::from(size.rows))
    }
}
