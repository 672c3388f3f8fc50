//! Key dispatch: the fixed tables mapping keys to editing commands.
//!
//! Each engine has a closed command enum and a pure lookup from
//! [`KeyEvent`] to command. Keys without a table entry fall through to
//! the default action (insert) when they stand for a byte the engine can
//! store, and to [`Ignore`](ReplCommand::Ignore) otherwise.
//!
//! # Single-line (REPL) table
//!
//! | Key                 | Command        |
//! |---------------------|----------------|
//! | `Ctrl-D`            | `End`          |
//! | `Ctrl-L`            | `Flush`        |
//! | `Ctrl-C`            | `Cancel`       |
//! | `Ctrl-H`, Backspace | `Backspace`    |
//! | `Ctrl-M`, Enter     | `Submit`       |
//! | Delete              | `Delete`       |
//! | `Ctrl-B`, Left      | `Left`         |
//! | `Ctrl-F`, Right     | `Right`        |
//! | `Ctrl-P`, Up        | `HistoryPrev`  |
//! | `Ctrl-N`, Down      | `HistoryNext`  |
//!
//! Any other printable ASCII character or Ctrl chord is inserted as its
//! byte; control bytes then display as `^X`. Tab inserts `0x09`.
//!
//! # Block editor table
//!
//! | Key        | Command     |
//! |------------|-------------|
//! | Enter      | `Newline`   |
//! | Backspace  | `Backspace` |
//! | `Ctrl-D`   | `Finish`    |
//! | Arrows     | `Left`/`Right`/`Up`/`Down` |
//!
//! Only printable ASCII is inserted; everything else is ignored.

use n_term::input::{KeyCode, KeyEvent};

// ---------------------------------------------------------------------------
// Single-line editor
// ---------------------------------------------------------------------------

/// An editing action of the single-line engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    /// End of input: the call returns no line.
    End,
    /// Clear the line and start over.
    Flush,
    /// Abandon the line, echo `^C`, and start over on a fresh line.
    Cancel,
    Backspace,
    Delete,
    Submit,
    Left,
    Right,
    HistoryPrev,
    HistoryNext,
    /// Default action: insert this byte at the cursor.
    Insert(u8),
    /// Key has no meaning here.
    Ignore,
}

/// Look up the single-line command for `key`.
#[must_use]
pub fn repl_command(key: KeyEvent) -> ReplCommand {
    if key.is_alt() {
        return ReplCommand::Ignore;
    }

    match key.code {
        KeyCode::Enter => ReplCommand::Submit,
        KeyCode::Backspace => ReplCommand::Backspace,
        KeyCode::Delete => ReplCommand::Delete,
        KeyCode::Left => ReplCommand::Left,
        KeyCode::Right => ReplCommand::Right,
        KeyCode::Up => ReplCommand::HistoryPrev,
        KeyCode::Down => ReplCommand::HistoryNext,
        KeyCode::Tab => ReplCommand::Insert(b'\t'),
        KeyCode::Char(c) if key.is_ctrl() => match c.to_ascii_lowercase() {
            'd' => ReplCommand::End,
            'l' => ReplCommand::Flush,
            'c' => ReplCommand::Cancel,
            'h' => ReplCommand::Backspace,
            'm' => ReplCommand::Submit,
            'b' => ReplCommand::Left,
            'f' => ReplCommand::Right,
            'p' => ReplCommand::HistoryPrev,
            'n' => ReplCommand::HistoryNext,
            _ => control_byte(key).map_or(ReplCommand::Ignore, ReplCommand::Insert),
        },
        KeyCode::Char(c) => printable_byte(c).map_or(ReplCommand::Ignore, ReplCommand::Insert),
        _ => ReplCommand::Ignore,
    }
}

// ---------------------------------------------------------------------------
// Block editor
// ---------------------------------------------------------------------------

/// An editing action of the block editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCommand {
    /// Split the line at the cursor.
    Newline,
    /// Erase left of the cursor, joining with the line above at column 0.
    Backspace,
    /// Stop editing.
    Finish,
    Left,
    Right,
    Up,
    Down,
    Insert(u8),
    Ignore,
}

/// Look up the block editor command for `key`.
#[must_use]
pub fn block_command(key: KeyEvent) -> BlockCommand {
    if key.is_alt() {
        return BlockCommand::Ignore;
    }

    match key.code {
        KeyCode::Enter => BlockCommand::Newline,
        KeyCode::Backspace => BlockCommand::Backspace,
        KeyCode::Left => BlockCommand::Left,
        KeyCode::Right => BlockCommand::Right,
        KeyCode::Up => BlockCommand::Up,
        KeyCode::Down => BlockCommand::Down,
        KeyCode::Char(c) if key.is_ctrl() => {
            if c.eq_ignore_ascii_case(&'d') {
                BlockCommand::Finish
            } else {
                BlockCommand::Ignore
            }
        }
        KeyCode::Char(c) => printable_byte(c).map_or(BlockCommand::Ignore, BlockCommand::Insert),
        _ => BlockCommand::Ignore,
    }
}

// ---------------------------------------------------------------------------
// Byte mapping
// ---------------------------------------------------------------------------

/// The control byte a Ctrl chord produces (`Ctrl-A` → `0x01`,
/// `Ctrl-\` → `0x1C`). `None` for chords with no byte, and for `Ctrl-@`
/// whose NUL byte is never stored.
#[must_use]
pub fn control_byte(key: KeyEvent) -> Option<u8> {
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    if !key.is_ctrl() {
        return None;
    }
    let c = c.to_ascii_lowercase();
    if !matches!(c, '@'..='_' | 'a'..='z') {
        return None;
    }
    let byte = (c as u8) & 0x1F;
    (byte != 0).then_some(byte)
}

/// The byte for a printable ASCII character (`' '..='~'`).
const fn printable_byte(c: char) -> Option<u8> {
    if c.is_ascii_graphic() || c == ' ' {
        Some(c as u8)
    } else {
        None
    }
}
