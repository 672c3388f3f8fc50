//! Multi-line block editor.
//!
//! A [`BlockEditor`] holds an ordered list of lines and a 2D cursor. It is
//! drawn inline, below wherever the terminal cursor was when editing
//! started, as a region of up to `max_view_rows` rows:
//!
//! ```text
//! block > let x = 1;
//!   ... > let y = 2;
//!   ... > x + y█
//! ```
//!
//! # Coordinates
//!
//! `cursor.y` is the logical row (an index into [`lines`](BlockEditor::lines)).
//! `cursor.x` is the column inside the *visible* part of that line; the
//! byte offset it stands for is `offset.x + cursor.x`. `offset.x` is the
//! horizontal scroll shared by every line, `offset.y` the first row shown.
//!
//! # Rendering
//!
//! [`update`](BlockEditor::update) applies one key and emits only relative
//! cursor moves that keep the physical terminal cursor at
//! `(prompt_width + cursor.x, cursor.y - offset.y)` relative to the region's
//! top-left corner. [`render`](BlockEditor::render) then repaints the whole
//! region from that position. The two must be used in pairs.
//!
//! Lines are edited as bytes; only printable ASCII is ever inserted.

use std::io::Write as _;

use n_term::input::KeyEvent;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::console::{Console, Viewport};
use crate::delta::Delta;
use crate::error::{EditError, Result};
use crate::keymap::{BlockCommand, block_command};
use crate::line::LineBuffer;

/// Leftmost visible column the cursor may sit at while scrolled.
const MIN_VIEW_X: usize = 2;

/// Columns taken by the `" > "` after a prompt or continuation marker.
const PROMPT_SEPARATOR_WIDTH: usize = 3;

/// A column/row pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coords {
    pub x: usize,
    pub y: usize,
}

impl Coords {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Whether editing goes on after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A multi-line text editor drawn inline in the terminal.
#[derive(Debug, Clone)]
pub struct BlockEditor {
    prompt: String,
    /// Display width of the prompt plus its separator.
    prompt_width: usize,
    lines: Vec<LineBuffer>,
    cursor: Coords,
    offset: Coords,
    config: Config,
}

impl BlockEditor {
    /// An editor holding one empty line.
    #[must_use]
    pub fn new(prompt: impl Into<String>, config: &Config) -> Self {
        let prompt = prompt.into();
        let prompt_width = prompt.width() + PROMPT_SEPARATOR_WIDTH;
        Self {
            prompt,
            prompt_width,
            lines: vec![LineBuffer::new()],
            cursor: Coords::default(),
            offset: Coords::default(),
            config: config.clone(),
        }
    }

    /// Drop all content and return to a single empty line.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.lines.push(LineBuffer::new());
        self.cursor = Coords::default();
        self.offset = Coords::default();
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Columns before the first content column on every row.
    #[must_use]
    pub const fn prompt_width(&self) -> usize {
        self.prompt_width
    }

    #[must_use]
    pub fn lines(&self) -> &[LineBuffer] {
        &self.lines
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Cursor: `x` relative to the horizontal scroll, `y` a line index.
    #[must_use]
    pub const fn cursor(&self) -> Coords {
        self.cursor
    }

    /// Horizontal scroll (`x`) and first visible row (`y`).
    #[must_use]
    pub const fn offset(&self) -> Coords {
        self.offset
    }

    /// Byte offset of the cursor in its line.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.offset.x + self.cursor.x
    }

    /// All lines, each terminated by `\n`. The editor is left as is.
    #[must_use]
    pub fn flush(&self) -> String {
        let size = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(size);
        for line in &self.lines {
            out.push_str(&line.to_text());
            out.push('\n');
        }
        out
    }

    // ── Update ──────────────────────────────────────────────────────

    /// Apply one key.
    ///
    /// Returns [`Flow::Stop`] on `Ctrl-D`. Every other key keeps the cursor
    /// inside the visible window afterwards, scrolling when needed.
    ///
    /// # Errors
    ///
    /// - [`EditError::MaxLinesExceeded`] if a newline would go past the line
    ///   limit. Nothing changes.
    /// - [`EditError::OutOfMemory`] if a line can't grow.
    pub fn update(&mut self, key: KeyEvent, viewport: Viewport, delta: &mut Delta) -> Result<Flow> {
        match block_command(key) {
            BlockCommand::Finish => return Ok(Flow::Stop),
            BlockCommand::Insert(byte) => self.insert(byte, delta)?,
            BlockCommand::Backspace => self.backspace(delta)?,
            BlockCommand::Newline => self.newline(viewport, delta)?,
            BlockCommand::Left => {
                if self.cursor.x > 0 {
                    self.cursor.x -= 1;
                    delta.left(1);
                }
            }
            BlockCommand::Right => {
                if self.column() < self.current_line().len() {
                    self.cursor.x += 1;
                    delta.right(1);
                }
            }
            BlockCommand::Up => {
                if self.cursor.y > 0 {
                    self.row_up(delta);
                    self.clamp_column(delta);
                }
            }
            BlockCommand::Down => {
                if self.cursor.y + 1 < self.lines.len() {
                    self.row_down(viewport, delta, false);
                    self.clamp_column(delta);
                }
            }
            BlockCommand::Ignore => {}
        }
        self.keep_in_view_x(viewport, delta);
        Ok(Flow::Continue)
    }

    fn current_line(&self) -> &LineBuffer {
        &self.lines[self.cursor.y]
    }

    fn insert(&mut self, byte: u8, delta: &mut Delta) -> Result<()> {
        let column = self.column();
        self.lines[self.cursor.y].insert_at(column, byte)?;
        self.cursor.x += 1;
        delta.right(1);
        Ok(())
    }

    fn backspace(&mut self, delta: &mut Delta) -> Result<()> {
        let column = self.column();
        let row = self.cursor.y;

        if column > 0 {
            self.lines[row].erase_at(column - 1, 1);
            if self.cursor.x > 0 {
                self.cursor.x -= 1;
                delta.left(1);
            } else {
                self.offset.x -= 1;
            }
            return Ok(());
        }

        if row == 0 {
            return Ok(());
        }

        // Join with the line above: its old end becomes the cursor column.
        let (head, tail) = self.lines.split_at_mut(row);
        let above = &mut head[row - 1];
        let join_at = above.len();
        above.extend(tail[0].as_bytes())?;
        self.lines.remove(row);

        self.row_up(delta);
        self.set_cursor_x(join_at, delta);
        tracing::debug!(row, join_at, lines = self.lines.len(), "lines joined");
        Ok(())
    }

    fn newline(&mut self, viewport: Viewport, delta: &mut Delta) -> Result<()> {
        let max = self.config.max_lines;
        if self.lines.len() >= max {
            return Err(EditError::MaxLinesExceeded { max });
        }

        let row = self.cursor.y;
        let column = self.column();
        let tail = self.lines[row].split_off(column)?;
        self.lines.insert(row + 1, tail);

        delta.left(self.cursor.x);
        self.cursor.x = 0;
        self.offset.x = 0;
        self.row_down(viewport, delta, true);
        tracing::debug!(row, column, lines = self.lines.len(), "line split");
        Ok(())
    }

    // ── Cursor bookkeeping ──────────────────────────────────────────

    /// Move the cursor to visible column `x`, emitting the matching move.
    fn set_cursor_x(&mut self, x: usize, delta: &mut Delta) {
        if x > self.cursor.x {
            delta.right(x - self.cursor.x);
        } else {
            delta.left(self.cursor.x - x);
        }
        self.cursor.x = x;
    }

    /// Pull the cursor back to the end of a shorter line after a vertical
    /// move.
    fn clamp_column(&mut self, delta: &mut Delta) {
        let len = self.current_line().len();
        if self.column() <= len {
            return;
        }
        if len >= self.offset.x {
            self.set_cursor_x(len - self.offset.x, delta);
        } else {
            // The line ends left of the scrolled window.
            self.offset.x = 0;
            self.set_cursor_x(len, delta);
        }
    }

    fn row_up(&mut self, delta: &mut Delta) {
        self.cursor.y -= 1;
        if self.cursor.y < self.offset.y {
            self.offset.y = self.cursor.y;
            tracing::debug!(top = self.offset.y, "scrolled up");
        } else {
            delta.up(1);
        }
    }

    /// Move one row down. Past the last visible row the region scrolls and
    /// the physical cursor stays put. `feed` moves with a line feed instead
    /// of a cursor-down so the terminal scrolls if the row doesn't exist yet.
    fn row_down(&mut self, viewport: Viewport, delta: &mut Delta, feed: bool) {
        self.cursor.y += 1;
        if self.cursor.y - self.offset.y >= self.view_rows(viewport) {
            self.offset.y += 1;
            tracing::debug!(top = self.offset.y, "scrolled down");
        } else if feed {
            delta.line_feed();
        } else {
            delta.down(1);
        }
    }

    fn view_rows(&self, viewport: Viewport) -> usize {
        viewport.rows.min(usize::from(self.config.max_view_rows)).max(1)
    }

    /// Bring `offset.y` back around the cursor row. Used when the viewport
    /// changed between keys; no cursor move is emitted.
    fn keep_in_view_y(&mut self, viewport: Viewport) {
        let rows = self.view_rows(viewport);
        if self.cursor.y < self.offset.y {
            self.offset.y = self.cursor.y;
        } else if self.cursor.y >= self.offset.y + rows {
            self.offset.y = self.cursor.y + 1 - rows;
        }
    }

    /// Scroll horizontally so the cursor stays within the visible window
    /// `[MIN_VIEW_X, cols - prompt_width - 2]`.
    fn keep_in_view_x(&mut self, viewport: Viewport, delta: &mut Delta) {
        let max_x = viewport
            .cols
            .saturating_sub(self.prompt_width + 2)
            .max(MIN_VIEW_X);
        let step = self.config.scroll_step.min(max_x - MIN_VIEW_X).max(1);

        if self.cursor.x > max_x {
            let dist = round_up(self.cursor.x - max_x, step).min(self.cursor.x);
            self.offset.x += dist;
            self.cursor.x -= dist;
            delta.left(dist);
            tracing::debug!(offset = self.offset.x, "scrolled right");
        } else if self.offset.x > 0 && self.cursor.x < MIN_VIEW_X {
            let dist = round_up(MIN_VIEW_X - self.cursor.x, step).min(self.offset.x);
            self.offset.x -= dist;
            self.cursor.x += dist;
            delta.right(dist);
            tracing::debug!(offset = self.offset.x, "scrolled left");
        }
    }

    // ── Render ──────────────────────────────────────────────────────

    /// Cursor position relative to the region's top-left corner.
    const fn screen_position(&self) -> Coords {
        Coords::new(
            self.prompt_width + self.cursor.x,
            self.cursor.y.saturating_sub(self.offset.y),
        )
    }

    /// Repaint the whole region and put the cursor back where it was.
    pub fn render(&mut self, viewport: Viewport, delta: &mut Delta) {
        let before = self.screen_position();
        delta.left(before.x);
        delta.up(before.y);

        self.keep_in_view_y(viewport);
        let rows = self.view_rows(viewport);
        let below = self.lines.len() - self.offset.y;

        // Blank one row more than is drawn so the row under the last line
        // exists for a later newline.
        let blank = (below + 1).min(rows);
        for _ in 0..blank {
            delta.erase_line();
            delta.carriage_return();
            delta.line_feed();
        }
        delta.up(blank);

        let shown = below.min(rows);
        let width = viewport.cols.saturating_sub(self.prompt_width);
        let color = self.config.prompt_color;
        for row in self.offset.y..self.offset.y + shown {
            let label = if row == 0 {
                format!("{} > ", self.prompt)
            } else {
                format!("{} > ", self.continuation_marker())
            };
            delta.colored(color, label.as_bytes());

            let bytes = self.lines[row].as_bytes();
            let start = self.offset.x.min(bytes.len());
            let end = bytes.len().min(self.offset.x + width);
            delta.text(&bytes[start..end]);
            delta.carriage_return();
            delta.line_feed();
        }
        delta.up(shown);

        let after = self.screen_position();
        delta.right(after.x);
        delta.down(after.y);
    }

    /// `...` right-aligned to the prompt's width.
    fn continuation_marker(&self) -> String {
        let width = self.prompt_width - PROMPT_SEPARATOR_WIDTH;
        let dots = &"..."[..width.min(3)];
        format!("{dots:>width$}")
    }

    /// Move the cursor to the start of the row under the region, so later
    /// output doesn't overwrite it.
    pub fn leave(&self, viewport: Viewport, delta: &mut Delta) {
        let screen = self.screen_position();
        let shown = (self.lines.len() - self.offset.y).min(self.view_rows(viewport));
        delta.carriage_return();
        delta.down(shown.saturating_sub(screen.y));
    }
}

/// Smallest multiple of `step` that is at least `n`.
const fn round_up(n: usize, step: usize) -> usize {
    n.div_ceil(step) * step
}

/// Run a whole block editing session on `console`.
///
/// Draws the editor, applies keys until `Ctrl-D` or end of input, and
/// returns the flushed text. A newline past the line limit is refused and
/// editing goes on. Raw mode is left on every path out.
///
/// # Errors
///
/// Returns [`EditError::Io`] if the terminal fails and
/// [`EditError::OutOfMemory`] if a line can't grow.
pub fn edit_block(console: &mut impl Console, editor: &mut BlockEditor) -> Result<String> {
    console.enter_raw_mode()?;
    let result = run(console, editor);
    let left = console.leave_raw_mode();
    let flushed = console.writer().flush();

    let text = result?;
    left?;
    flushed?;
    Ok(text)
}

fn run(console: &mut impl Console, editor: &mut BlockEditor) -> Result<String> {
    let mut viewport = Viewport::detect(console.size(), &editor.config);
    let mut delta = Delta::new();
    editor.render(viewport, &mut delta);
    console.apply(&delta)?;

    loop {
        delta.clear();
        let Some(key) = console.read_key()? else {
            tracing::debug!("input closed");
            break;
        };
        if let Some(size) = console.size().filter(|s| s.cols > 0 && s.rows > 0) {
            viewport = Viewport::new(usize::from(size.cols), usize::from(size.rows));
        }

        match editor.update(key, viewport, &mut delta) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(EditError::MaxLinesExceeded { max }) => {
                tracing::warn!(max, "line limit reached, newline refused");
            }
            Err(e) => return Err(e),
        }
        editor.render(viewport, &mut delta);
        console.apply(&delta)?;
    }

    delta.clear();
    editor.leave(viewport, &mut delta);
    console.apply(&delta)?;
    Ok(editor.flush())
}
