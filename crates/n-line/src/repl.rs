//! Single-line editor: the read half of a read-eval-print loop.
//!
//! A [`Session`] owns one line, a cursor into it, and the position of any
//! history entry being browsed. [`Session::step`] feeds it one key: the key
//! is looked up in the dispatch table, the action mutates the session, and
//! the screen change is appended to a [`Delta`]. Nothing is written to the
//! terminal here except by [`read_line`], which runs the loop.
//!
//! Rendering is incremental. Each action emits only the moves and erasures
//! its own change needs; the full line is redrawn only when a history entry
//! replaces it. Control bytes occupy two columns (`^X`), and every cursor
//! move over buffer content accounts for that.
//!
//! The line is never recorded into history automatically. The caller sees
//! the submitted text first and decides whether to keep it.

use std::io::Write as _;

use n_term::color::Color;
use n_term::input::KeyEvent;

use crate::config::Config;
use crate::console::Console;
use crate::delta::{Delta, glyph_width};
use crate::error::Result;
use crate::history::History;
use crate::keymap::{ReplCommand, repl_command};
use crate::line::LineBuffer;

/// `^C`, echoed when a line is cancelled.
const CANCEL_GLYPH: u8 = 0x03;
/// `^D`, echoed at end of input.
const END_GLYPH: u8 = 0x04;

/// What the input loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Keep reading keys.
    DoNothing,
    /// The line (with its trailing `\n`) is the result.
    Submit,
    /// End of input: the call returns no line.
    Done,
    /// Reset to an empty line and show the prompt again.
    Clear,
}

/// State of one single-line editing session.
#[derive(Debug, Clone)]
pub struct Session {
    prompt: String,
    prompt_color: Color,
    control_color: Color,
    cursor: usize,
    line: LineBuffer,
    /// Entry currently shown, `None` when not browsing.
    history_index: Option<usize>,
}

impl Session {
    #[must_use]
    pub fn new(prompt: impl Into<String>, config: &Config) -> Self {
        Self {
            prompt: prompt.into(),
            prompt_color: config.prompt_color,
            control_color: config.control_color,
            cursor: 0,
            line: LineBuffer::new(),
            history_index: None,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Change the prompt shown by the next [`begin`](Self::begin).
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// The line being edited.
    #[must_use]
    pub const fn line(&self) -> &LineBuffer {
        &self.line
    }

    /// Cursor offset into [`line`](Self::line).
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// History entry on display, if browsing.
    #[must_use]
    pub const fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    /// Start a fresh call: empty line, cursor home, not browsing, prompt
    /// shown.
    pub fn begin(&mut self, delta: &mut Delta) {
        self.history_index = None;
        self.apply_clear(delta);
    }

    /// Handle [`Signal::Clear`]: empty the line and show the prompt.
    pub fn apply_clear(&mut self, delta: &mut Delta) {
        self.cursor = 0;
        self.line.clear();
        self.show_prompt(delta);
    }

    /// Hand out the line and leave the session empty.
    pub fn take_line(&mut self) -> String {
        self.cursor = 0;
        self.line.take()
    }

    /// Feed one key to the session.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::OutOfMemory`](crate::EditError::OutOfMemory) if
    /// the line can't grow. The session is unchanged in that case.
    pub fn step(&mut self, key: KeyEvent, history: &History, delta: &mut Delta) -> Result<Signal> {
        let signal = match repl_command(key) {
            ReplCommand::End => {
                delta.glyphs(&[END_GLYPH], self.control_color);
                delta.line_feed();
                delta.carriage_return();
                tracing::debug!("end of input");
                Signal::Done
            }
            ReplCommand::Flush => Self::flush(delta),
            ReplCommand::Cancel => {
                delta.glyphs(&[CANCEL_GLYPH], self.control_color);
                delta.line_feed();
                delta.carriage_return();
                tracing::debug!(len = self.line.len(), "line cancelled");
                Signal::Clear
            }
            ReplCommand::Backspace => {
                if self.cursor > 0 {
                    self.move_left(delta);
                    self.line.erase_at(self.cursor, 1);
                    self.redraw_tail(delta);
                }
                Signal::DoNothing
            }
            ReplCommand::Delete => {
                if self.cursor < self.line.len() {
                    self.line.erase_at(self.cursor, 1);
                    self.redraw_tail(delta);
                }
                Signal::DoNothing
            }
            ReplCommand::Submit => {
                self.line.push(b'\n')?;
                delta.line_feed();
                delta.carriage_return();
                tracing::debug!(len = self.line.len(), "line submitted");
                Signal::Submit
            }
            ReplCommand::Left => {
                self.move_left(delta);
                Signal::DoNothing
            }
            ReplCommand::Right => {
                if let Some(byte) = self.line.get(self.cursor) {
                    delta.right(glyph_width(byte));
                    self.cursor += 1;
                }
                Signal::DoNothing
            }
            ReplCommand::HistoryPrev => self.history_prev(history, delta)?,
            ReplCommand::HistoryNext => self.history_next(history, delta)?,
            ReplCommand::Insert(byte) => {
                self.insert(byte, delta)?;
                Signal::DoNothing
            }
            ReplCommand::Ignore => Signal::DoNothing,
        };
        Ok(signal)
    }

    // ── Actions ─────────────────────────────────────────────────────

    fn show_prompt(&self, delta: &mut Delta) {
        delta.colored(self.prompt_color, self.prompt.as_bytes());
        delta.text(b"> ");
    }

    fn move_left(&mut self, delta: &mut Delta) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte = self.line.get(self.cursor).unwrap_or(b' ');
        delta.left(glyph_width(byte));
    }

    fn insert(&mut self, byte: u8, delta: &mut Delta) -> Result<()> {
        self.line.insert_at(self.cursor, byte)?;
        delta.glyphs(&[byte], self.control_color);
        self.cursor += 1;
        if self.cursor < self.line.len() {
            let width = delta.glyphs(&self.line.as_bytes()[self.cursor..], self.control_color);
            delta.left(width);
        }
        Ok(())
    }

    /// Reprint everything right of the cursor, erase what the line used to
    /// occupy past its new end, and return the cursor.
    fn redraw_tail(&self, delta: &mut Delta) {
        let width = delta.glyphs(&self.line.as_bytes()[self.cursor..], self.control_color);
        delta.erase_to_end();
        delta.left(width);
    }

    fn flush(delta: &mut Delta) -> Signal {
        delta.carriage_return();
        delta.erase_line();
        Signal::Clear
    }

    /// Show `entry` in place of the current line.
    fn replace(&mut self, entry: &str, delta: &mut Delta) -> Result<()> {
        self.line.set(entry.as_bytes())?;
        self.cursor = self.line.len();
        delta.carriage_return();
        delta.erase_line();
        self.show_prompt(delta);
        delta.glyphs(self.line.as_bytes(), self.control_color);
        Ok(())
    }

    fn history_prev(&mut self, history: &History, delta: &mut Delta) -> Result<Signal> {
        let index = self.history_index.map_or(0, |i| i + 1);
        let Some(entry) = history.get(index) else {
            return Ok(Signal::DoNothing);
        };
        self.replace(entry, delta)?;
        self.history_index = Some(index);
        tracing::debug!(index, "history back");
        Ok(Signal::DoNothing)
    }

    fn history_next(&mut self, history: &History, delta: &mut Delta) -> Result<Signal> {
        let index = match self.history_index {
            None | Some(0) => {
                self.history_index = None;
                return Ok(Self::flush(delta));
            }
            Some(i) => i - 1,
        };
        let Some(entry) = history.get(index) else {
            self.history_index = None;
            return Ok(Self::flush(delta));
        };
        self.replace(entry, delta)?;
        self.history_index = Some(index);
        tracing::debug!(index, "history forward");
        Ok(Signal::DoNothing)
    }
}

/// Read one line from `console`.
///
/// Shows the session's prompt, runs the key loop in raw mode, and returns
/// the submitted line including its trailing `\n`. Returns `Ok(None)` on
/// `Ctrl-D` or when input ends. Raw mode is left and output flushed on
/// every path out, errors included.
///
/// # Errors
///
/// Returns [`EditError::Io`](crate::EditError::Io) if the terminal fails and
/// [`EditError::OutOfMemory`](crate::EditError::OutOfMemory) if the line
/// can't grow.
pub fn read_line(
    console: &mut impl Console,
    session: &mut Session,
    history: &History,
) -> Result<Option<String>> {
    console.enter_raw_mode()?;
    let result = run(console, session, history);
    let left = console.leave_raw_mode();
    let flushed = console.writer().flush();

    let line = result?;
    left?;
    flushed?;
    Ok(line)
}

fn run(console: &mut impl Console, session: &mut Session, history: &History) -> Result<Option<String>> {
    let mut delta = Delta::new();
    session.begin(&mut delta);
    console.apply(&delta)?;

    loop {
        delta.clear();
        let Some(key) = console.read_key()? else {
            delta.line_feed();
            delta.carriage_return();
            console.apply(&delta)?;
            tracing::debug!("input closed");
            return Ok(None);
        };

        let signal = session.step(key, history, &mut delta)?;
        if signal == Signal::Clear {
            session.apply_clear(&mut delta);
        }
        console.apply(&delta)?;

        match signal {
            Signal::Submit => return Ok(Some(session.take_line())),
            Signal::Done => return Ok(None),
            Signal::Clear | Signal::DoNothing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryConsole;
    use crate::delta::Op;
    use n_term::input::KeyCode;
    use pretty_assertions::assert_eq;

    fn ch(c: char) -> KeyEvent {
        KeyEvent::plain(KeyCode::Char(c))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    fn session() -> Session {
        let mut s = Session::new("repl", &Config::default());
        s.begin(&mut Delta::new());
        s
    }

    /// Feed keys, returning the last signal and the delta of the last key.
    fn feed(s: &mut Session, history: &History, keys: &[KeyEvent]) -> (Signal, Delta) {
        let mut signal = Signal::DoNothing;
        let mut delta = Delta::new();
        for &k in keys {
            delta.clear();
            signal = s.step(k, history, &mut delta).unwrap();
            if signal == Signal::Clear {
                s.apply_clear(&mut delta);
            }
        }
        (signal, delta)
    }

    fn typed(text: &str) -> Vec<KeyEvent> {
        text.chars().map(ch).collect()
    }

    fn history(entries: &[&str]) -> History {
        let mut h = History::new(8);
        for e in entries.iter().rev() {
            h.record(e);
        }
        h
    }

    fn text(s: &Session) -> String {
        s.line().to_text()
    }

    #[test]
    fn begin_shows_colored_prompt() {
        let mut s = Session::new("repl", &Config::default());
        let mut delta = Delta::new();
        s.begin(&mut delta);
        assert_eq!(
            delta.ops(),
            &[
                Op::Colored(Color::Blue, b"repl".to_vec()),
                Op::Text(b"> ".to_vec()),
            ]
        );
    }

    #[test]
    fn typing_appends_and_echoes() {
        let mut s = session();
        let (_, delta) = feed(&mut s, &History::default(), &typed("ab"));
        assert_eq!(text(&s), "ab");
        assert_eq!(s.cursor(), 2);
        assert_eq!(delta.ops(), &[Op::Text(b"b".to_vec())]);
    }

    #[test]
    fn insert_mid_line_redraws_tail() {
        let mut s = session();
        let h = History::default();
        feed(&mut s, &h, &[ch('a'), ch('c'), key(KeyCode::Left)]);
        let (_, delta) = feed(&mut s, &h, &[ch('b')]);
        assert_eq!(text(&s), "abc");
        assert_eq!(s.cursor(), 2);
        assert_eq!(
            delta.ops(),
            &[Op::Text(b"b".to_vec()), Op::Text(b"c".to_vec()), Op::Left(1)]
        );
    }

    #[test]
    fn control_bytes_are_two_columns_wide() {
        let mut s = session();
        let h = History::default();
        let (_, delta) = feed(&mut s, &h, &[KeyEvent::ctrl('a')]);
        assert_eq!(s.line().as_bytes(), b"\x01");
        assert_eq!(delta.ops(), &[Op::Colored(Color::BrightBlack, b"^A".to_vec())]);

        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Left)]);
        assert_eq!(delta.ops(), &[Op::Left(2)]);
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Right)]);
        assert_eq!(delta.ops(), &[Op::Right(2)]);
    }

    #[test]
    fn tab_is_inserted_as_a_glyph() {
        let mut s = session();
        feed(&mut s, &History::default(), &[key(KeyCode::Tab)]);
        assert_eq!(s.line().as_bytes(), b"\t");
    }

    #[test]
    fn moves_stop_at_line_ends() {
        let mut s = session();
        let h = History::default();
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Left)]);
        assert!(delta.is_empty());
        feed(&mut s, &h, &typed("x"));
        let (_, delta) = feed(&mut s, &h, &[KeyEvent::ctrl('f')]);
        assert!(delta.is_empty());
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn backspace_erases_left_and_caps_line() {
        let mut s = session();
        let h = History::default();
        feed(&mut s, &h, &[ch('a'), ch('b'), ch('c'), key(KeyCode::Left)]);
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Backspace)]);
        assert_eq!(text(&s), "ac");
        assert_eq!(s.cursor(), 1);
        assert_eq!(
            delta.ops(),
            &[Op::Left(1), Op::Text(b"c".to_vec()), Op::EraseToEnd, Op::Left(1)]
        );
    }

    #[test]
    fn backspace_at_start_does_nothing() {
        let mut s = session();
        let (signal, delta) = feed(&mut s, &History::default(), &[KeyEvent::ctrl('h')]);
        assert_eq!(signal, Signal::DoNothing);
        assert!(delta.is_empty());
    }

    #[test]
    fn delete_erases_under_cursor() {
        let mut s = session();
        let h = History::default();
        feed(&mut s, &h, &[ch('a'), ch('b'), key(KeyCode::Left), key(KeyCode::Left)]);
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Delete)]);
        assert_eq!(text(&s), "b");
        assert_eq!(s.cursor(), 0);
        assert_eq!(
            delta.ops(),
            &[Op::Text(b"b".to_vec()), Op::EraseToEnd, Op::Left(1)]
        );

        feed(&mut s, &h, &[key(KeyCode::Right)]);
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Delete)]);
        assert!(delta.is_empty());
        assert_eq!(text(&s), "b");
    }

    #[test]
    fn submit_appends_newline() {
        let mut s = session();
        let (signal, delta) = feed(&mut s, &History::default(), &[ch('x'), key(KeyCode::Enter)]);
        assert_eq!(signal, Signal::Submit);
        assert_eq!(text(&s), "x\n");
        assert_eq!(delta.ops(), &[Op::LineFeed, Op::CarriageReturn]);
    }

    #[test]
    fn cancel_echoes_and_clears() {
        let mut s = session();
        let (signal, delta) = feed(&mut s, &History::default(), &[ch('x'), KeyEvent::ctrl('c')]);
        assert_eq!(signal, Signal::Clear);
        assert_eq!(text(&s), "");
        assert_eq!(s.cursor(), 0);
        assert_eq!(
            delta.ops(),
            &[
                Op::Colored(Color::BrightBlack, b"^C".to_vec()),
                Op::LineFeed,
                Op::CarriageReturn,
                Op::Colored(Color::Blue, b"repl".to_vec()),
                Op::Text(b"> ".to_vec()),
            ]
        );
    }

    #[test]
    fn ctrl_l_redraws_empty_line() {
        let mut s = session();
        let (signal, delta) = feed(&mut s, &History::default(), &[ch('x'), KeyEvent::ctrl('l')]);
        assert_eq!(signal, Signal::Clear);
        assert_eq!(text(&s), "");
        assert_eq!(&delta.ops()[..2], &[Op::CarriageReturn, Op::EraseLine]);
    }

    #[test]
    fn ctrl_d_ends_input() {
        let mut s = session();
        let (signal, delta) = feed(&mut s, &History::default(), &[KeyEvent::ctrl('d')]);
        assert_eq!(signal, Signal::Done);
        assert_eq!(delta.ops()[0], Op::Colored(Color::BrightBlack, b"^D".to_vec()));
    }

    #[test]
    fn ignored_keys_change_nothing() {
        let mut s = session();
        let h = History::default();
        let (signal, delta) = feed(&mut s, &h, &[key(KeyCode::F(1)), key(KeyCode::Escape), ch('é')]);
        assert_eq!(signal, Signal::DoNothing);
        assert!(delta.is_empty());
        assert!(s.line().is_empty());
    }

    #[test]
    fn history_prev_replaces_line() {
        let h = history(&["newest", "older"]);
        let mut s = session();
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Up)]);
        assert_eq!(text(&s), "newest");
        assert_eq!(s.cursor(), 6);
        assert_eq!(s.history_index(), Some(0));
        assert_eq!(
            delta.ops(),
            &[
                Op::CarriageReturn,
                Op::EraseLine,
                Op::Colored(Color::Blue, b"repl".to_vec()),
                Op::Text(b"> ".to_vec()),
                Op::Text(b"newest".to_vec()),
            ]
        );

        feed(&mut s, &h, &[KeyEvent::ctrl('p')]);
        assert_eq!(text(&s), "older");
        assert_eq!(s.history_index(), Some(1));
    }

    #[test]
    fn history_prev_stops_at_oldest() {
        let h = history(&["only"]);
        let mut s = session();
        feed(&mut s, &h, &[key(KeyCode::Up)]);
        let (_, delta) = feed(&mut s, &h, &[key(KeyCode::Up)]);
        assert!(delta.is_empty());
        assert_eq!(s.history_index(), Some(0));
        assert_eq!(text(&s), "only");
    }

    #[test]
    fn history_prev_on_empty_history_does_nothing() {
        let mut s = session();
        let (_, delta) = feed(&mut s, &History::default(), &[key(KeyCode::Up)]);
        assert!(delta.is_empty());
        assert_eq!(s.history_index(), None);
    }

    #[test]
    fn history_next_walks_back_to_empty() {
        let h = history(&["a", "b", "c"]);
        let mut s = session();
        feed(&mut s, &h, &[key(KeyCode::Up), key(KeyCode::Up), key(KeyCode::Up)]);
        assert_eq!(text(&s), "c");

        feed(&mut s, &h, &[key(KeyCode::Down)]);
        assert_eq!(text(&s), "b");
        feed(&mut s, &h, &[KeyEvent::ctrl('n')]);
        assert_eq!(text(&s), "a");

        let (signal, _) = feed(&mut s, &h, &[key(KeyCode::Down)]);
        assert_eq!(signal, Signal::Clear);
        assert_eq!(text(&s), "");
        assert_eq!(s.history_index(), None);
    }

    #[test]
    fn history_next_without_browsing_clears() {
        let h = history(&["a"]);
        let mut s = session();
        let (signal, _) = feed(&mut s, &h, &[ch('x'), key(KeyCode::Down)]);
        assert_eq!(signal, Signal::Clear);
        assert_eq!(text(&s), "");
    }

    #[test]
    fn read_line_returns_submitted_text() {
        let mut keys = typed("hi");
        keys.push(key(KeyCode::Enter));
        let mut console = MemoryConsole::new(keys);
        let mut s = Session::new("repl", &Config::default());

        let line = read_line(&mut console, &mut s, &History::default()).unwrap();
        assert_eq!(line.as_deref(), Some("hi\n"));
        assert!(!console.is_raw());
        assert_eq!(console.raw_entries(), 1);
        assert_eq!(
            String::from_utf8(console.take_output()).unwrap(),
            "\x1b[34mrepl\x1b[39m> hi\n\r"
        );
    }

    #[test]
    fn read_line_none_on_ctrl_d() {
        let mut console = MemoryConsole::new([ch('x'), KeyEvent::ctrl('d'), ch('y')]);
        let mut s = Session::new("p", &Config::default());
        let line = read_line(&mut console, &mut s, &History::default()).unwrap();
        assert_eq!(line, None);
        assert_eq!(console.pending(), 1);
        assert!(!console.is_raw());
    }

    #[test]
    fn read_line_none_when_input_closes() {
        let mut console = MemoryConsole::new(typed("abc"));
        let mut s = Session::new("p", &Config::default());
        let line = read_line(&mut console, &mut s, &History::default()).unwrap();
        assert_eq!(line, None);
        assert!(!console.is_raw());
    }

    #[test]
    fn sessions_are_reset_between_calls() {
        let h = history(&["old"]);
        let mut console = MemoryConsole::new([key(KeyCode::Up), key(KeyCode::Enter)]);
        let mut s = Session::new("p", &Config::default());
        let first = read_line(&mut console, &mut s, &h).unwrap();
        assert_eq!(first.as_deref(), Some("old\n"));

        console.push_keys([ch('n'), key(KeyCode::Enter)]);
        let second = read_line(&mut console, &mut s, &h).unwrap();
        assert_eq!(second.as_deref(), Some("n\n"));
        assert_eq!(s.history_index(), None);
    }
}
