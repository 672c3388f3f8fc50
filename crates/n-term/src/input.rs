// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events. A line editor running inline in
// a plain terminal only ever sees the legacy encodings:
//
// - Control bytes (Ctrl+letter, Backspace, Tab, Enter)
// - CSI sequences (arrows, Home/End, editing keys, function keys, with
//   the xterm `1;<mod>` modifier parameter)
// - SS3 sequences (arrows and F1-F4 in application cursor mode)
// - Alt+key (ESC followed by a printable or control byte)
// - UTF-8 multi-byte characters
//
// # Design
//
// The parser keeps a small internal byte buffer because an escape sequence
// can be split across `read()` calls. Feed bytes with [`Parser::advance`]
// and collect the returned keys. After a timeout with no new bytes, call
// [`Parser::flush`] to emit a pending lone ESC as a real Escape keypress.
//
// Sequences we do not recognize are consumed whole and produce nothing:
// a stray mouse report or an unknown `CSI ... x` never turns into typed
// garbage in the line being edited.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded keypress: key identity plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl).
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Ctrl + `ch` (e.g. `KeyEvent::ctrl('d')` for Ctrl-D).
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Whether Ctrl was held.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Whether Alt was held.
    #[inline]
    #[must_use]
    pub const fn is_alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters use
/// [`Char`](KeyCode::Char). Function keys use [`F`](KeyCode::F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character. With [`Modifiers::CTRL`] this is a control chord.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Matches the xterm CSI modifier encoding where `param = 1 + bitmask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance) and collect
/// [`KeyEvent`]s. The parser buffers incomplete sequences internally and
/// resumes parsing when more bytes arrive.
///
/// # Escape vs escape-sequence ambiguity
///
/// A bare `ESC` byte (0x1B) could be either a standalone Escape keypress
/// or the start of a multi-byte escape sequence. The parser holds a lone
/// ESC back. The caller should wait a short timeout and then call
/// [`flush`](Parser::flush) to emit it as a real Escape key event.
#[derive(Debug)]
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes from stdin and return every key that can be parsed.
    ///
    /// Bytes that form an incomplete sequence stay in the internal buffer
    /// and are combined with future calls.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        // Compact: remove consumed bytes, keep the unconsumed remainder.
        if pos > 0 {
            self.buf.drain(..pos);
        }

        keys
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Flush pending bytes as literal key events.
    ///
    /// Resolves the ESC ambiguity: a lone ESC becomes an Escape key and
    /// any printable leftovers become `Char` keys. Partial UTF-8 is dropped.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        for &byte in &self.buf {
            match byte {
                0x1B => keys.push(KeyEvent::plain(KeyCode::Escape)),
                b'[' | b'O' if keys.last().is_some_and(|k| k.code == KeyCode::Escape) => {
                    // `ESC [` with nothing after it: the user typed Alt+[.
                    keys.pop();
                    keys.push(KeyEvent {
                        code: KeyCode::Char(byte as char),
                        modifiers: Modifiers::ALT,
                    });
                }
                b @ 0x20..=0x7E => keys.push(KeyEvent::plain(KeyCode::Char(b as char))),
                _ => {}
            }
        }
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions are pure. They read from the front of the slice and
// return what they found plus how many bytes to consume.

/// Result of trying to parse one key from the buffer.
enum Parsed {
    /// Successfully parsed a key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Sequence is incomplete, need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

/// Try to parse a single key from the front of `buf`.
fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Incomplete;
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Key(KeyEvent::ctrl('@'), 1),
        0x08 | 0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1F => Parsed::Key(ctrl_chord(b), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        // Bare continuation bytes (0x80..=0xBF) are an invalid lead; skip.
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(
            KeyEvent {
                code: KeyCode::Escape,
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(b as char),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        b @ 0x01..=0x1A => {
            let mut key = ctrl_chord(b);
            key.modifiers |= Modifiers::ALT;
            Parsed::Key(key, 2)
        }
        // Unknown byte after ESC: emit standalone Escape.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte in CSI sequence: drop what we have.
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    // ── Tilde-terminated sequences (editing keys, function keys) ─────
    if final_byte == b'~' {
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            11 => KeyCode::F(1),
            12 => KeyCode::F(2),
            13 => KeyCode::F(3),
            14 => KeyCode::F(4),
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Key(KeyEvent { code, modifiers }, consumed);
    }

    // ── Letter-terminated sequences ─────────────────────────────────
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => {
            return Parsed::Key(
                KeyEvent {
                    code: KeyCode::Tab,
                    modifiers: Modifiers::SHIFT,
                },
                consumed,
            );
        }
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(KeyEvent { code, modifiers }, consumed)
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let code = match buf[2] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(KeyEvent::plain(code), 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    // Validate continuation bytes (must start with 0b10xxxxxx).
    if buf[1..expected].iter().any(|&b| b & 0xC0 != 0x80) {
        return Parsed::Skip(1);
    }

    std::str::from_utf8(&buf[..expected]).map_or(Parsed::Skip(1), |s| {
        s.chars().next().map_or(Parsed::Skip(expected), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Map a control byte (0x01–0x1F) to its Ctrl chord.
///
/// 0x01–0x1A become Ctrl+`a`..`z`; 0x1C–0x1F become Ctrl+`\` `]` `^` `_`.
const fn ctrl_chord(b: u8) -> KeyEvent {
    let ch = if b <= 0x1A { b + b'a' - 1 } else { b + 0x40 };
    KeyEvent::ctrl(ch as char)
}

/// Parse semicolon-separated CSI parameters. Colon sub-parameters are
/// skipped. Examples: `1;5` → `[1, 5]`, (empty) → `[]`.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }

    raw.split(|&b| b == b';')
        .map(|field| {
            let main = field.split(|&b| b == b':').next().unwrap_or(&[]);
            parse_u16(main)
        })
        .collect()
}

/// Parse a u16 from leading ASCII digits, saturating on overflow.
fn parse_u16(buf: &[u8]) -> u16 {
    buf.iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |val, &b| {
            val.saturating_mul(10).saturating_add(u16::from(b - b'0'))
        })
}

/// Decode a CSI modifier parameter into `Modifiers` bitflags.
///
/// The encoding is `1 + bitmask`. A parameter of 0 or 1 means no modifiers.
/// Only the low bits carry modifier flags, so truncation is intentional.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8+).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: parse bytes and return all keys.
    fn parse(bytes: &[u8]) -> Vec<KeyEvent> {
        Parser::new().advance(bytes)
    }

    /// Helper: parse bytes that must yield exactly one key.
    fn parse_one(bytes: &[u8]) -> KeyEvent {
        let keys = parse(bytes);
        assert_eq!(keys.len(), 1, "expected one key from {bytes:?}, got {keys:?}");
        keys[0]
    }

    fn with(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent { code, modifiers }
    }

    // ── Plain bytes ─────────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(
            parse(b"aZ~"),
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Char('Z')),
                KeyEvent::plain(KeyCode::Char('~')),
            ]
        );
    }

    #[test]
    fn space_is_char() {
        assert_eq!(parse_one(b" "), KeyEvent::plain(KeyCode::Char(' ')));
    }

    #[test]
    fn enter_from_cr_and_lf() {
        assert_eq!(parse_one(b"\r"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), KeyEvent::plain(KeyCode::Enter));
    }

    #[test]
    fn backspace_from_del_and_bs() {
        assert_eq!(parse_one(b"\x7f"), KeyEvent::plain(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x08"), KeyEvent::plain(KeyCode::Backspace));
    }

    #[test]
    fn tab() {
        assert_eq!(parse_one(b"\t"), KeyEvent::plain(KeyCode::Tab));
    }

    // ── Control chords ──────────────────────────────────────────────

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse_one(b"\x01"), KeyEvent::ctrl('a'));
        assert_eq!(parse_one(b"\x03"), KeyEvent::ctrl('c'));
        assert_eq!(parse_one(b"\x04"), KeyEvent::ctrl('d'));
        assert_eq!(parse_one(b"\x0c"), KeyEvent::ctrl('l'));
        assert_eq!(parse_one(b"\x1a"), KeyEvent::ctrl('z'));
    }

    #[test]
    fn ctrl_at_and_punctuation() {
        assert_eq!(parse_one(b"\x00"), KeyEvent::ctrl('@'));
        assert_eq!(parse_one(b"\x1c"), KeyEvent::ctrl('\\'));
        assert_eq!(parse_one(b"\x1d"), KeyEvent::ctrl(']'));
        assert_eq!(parse_one(b"\x1e"), KeyEvent::ctrl('^'));
        assert_eq!(parse_one(b"\x1f"), KeyEvent::ctrl('_'));
    }

    #[test]
    fn ctrl_helpers() {
        let k = KeyEvent::ctrl('d');
        assert!(k.is_ctrl());
        assert!(!k.is_alt());
    }

    // ── CSI ─────────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), KeyEvent::plain(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), KeyEvent::plain(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), KeyEvent::plain(KeyCode::Left));
    }

    #[test]
    fn arrows_with_modifiers() {
        assert_eq!(parse_one(b"\x1b[1;5C"), with(KeyCode::Right, Modifiers::CTRL));
        assert_eq!(parse_one(b"\x1b[1;2D"), with(KeyCode::Left, Modifiers::SHIFT));
        assert_eq!(
            parse_one(b"\x1b[1;7A"),
            with(KeyCode::Up, Modifiers::ALT | Modifiers::CTRL)
        );
    }

    #[test]
    fn home_end_letter_forms() {
        assert_eq!(parse_one(b"\x1b[H"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), KeyEvent::plain(KeyCode::End));
    }

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(parse_one(b"\x1b[1~"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[2~"), KeyEvent::plain(KeyCode::Insert));
        assert_eq!(parse_one(b"\x1b[3~"), KeyEvent::plain(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[4~"), KeyEvent::plain(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[5~"), KeyEvent::plain(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), KeyEvent::plain(KeyCode::PageDown));
        assert_eq!(parse_one(b"\x1b[7~"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[8~"), KeyEvent::plain(KeyCode::End));
    }

    #[test]
    fn delete_with_modifier() {
        assert_eq!(parse_one(b"\x1b[3;5~"), with(KeyCode::Delete, Modifiers::CTRL));
    }

    #[test]
    fn function_keys() {
        assert_eq!(parse_one(b"\x1b[15~"), KeyEvent::plain(KeyCode::F(5)));
        assert_eq!(parse_one(b"\x1b[24~"), KeyEvent::plain(KeyCode::F(12)));
        assert_eq!(parse_one(b"\x1b[P"), KeyEvent::plain(KeyCode::F(1)));
    }

    #[test]
    fn back_tab() {
        assert_eq!(parse_one(b"\x1b[Z"), with(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn unknown_csi_is_swallowed() {
        assert_eq!(parse(b"\x1b[99~"), vec![]);
        assert_eq!(parse(b"\x1b[5x"), vec![]);
        assert_eq!(parse(b"\x1b[<0;10;5M"), vec![]);
    }

    #[test]
    fn unknown_csi_does_not_eat_following_keys() {
        assert_eq!(parse(b"\x1b[12zq"), vec![KeyEvent::plain(KeyCode::Char('q'))]);
    }

    #[test]
    fn invalid_byte_inside_csi_aborts_sequence() {
        // 0x07 can't appear inside a CSI; the sequence is dropped with it.
        assert_eq!(parse(b"\x1b[1\x07b"), vec![KeyEvent::plain(KeyCode::Char('b'))]);
    }

    // ── SS3 ─────────────────────────────────────────────────────────

    #[test]
    fn ss3_arrows() {
        assert_eq!(parse_one(b"\x1bOA"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(parse_one(b"\x1bOD"), KeyEvent::plain(KeyCode::Left));
    }

    #[test]
    fn ss3_function_keys() {
        assert_eq!(parse_one(b"\x1bOP"), KeyEvent::plain(KeyCode::F(1)));
        assert_eq!(parse_one(b"\x1bOS"), KeyEvent::plain(KeyCode::F(4)));
    }

    #[test]
    fn ss3_unknown_is_swallowed() {
        assert_eq!(parse(b"\x1bOx"), vec![]);
    }

    // ── Alt ─────────────────────────────────────────────────────────

    #[test]
    fn alt_char() {
        assert_eq!(
            parse_one(b"\x1bx"),
            with(KeyCode::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn alt_ctrl_char() {
        assert_eq!(
            parse_one(b"\x1b\x01"),
            with(KeyCode::Char('a'), Modifiers::ALT | Modifiers::CTRL)
        );
    }

    #[test]
    fn alt_escape() {
        assert_eq!(parse_one(b"\x1b\x1b"), with(KeyCode::Escape, Modifiers::ALT));
    }

    // ── UTF-8 ───────────────────────────────────────────────────────

    #[test]
    fn utf8_two_byte() {
        assert_eq!(parse_one("é".as_bytes()), KeyEvent::plain(KeyCode::Char('é')));
    }

    #[test]
    fn utf8_four_byte() {
        assert_eq!(parse_one("🦀".as_bytes()), KeyEvent::plain(KeyCode::Char('🦀')));
    }

    #[test]
    fn utf8_incomplete_waits() {
        let bytes = "€".as_bytes();
        let mut p = Parser::new();
        assert_eq!(p.advance(&bytes[..2]), vec![]);
        assert!(p.has_pending());
        assert_eq!(p.advance(&bytes[2..]), vec![KeyEvent::plain(KeyCode::Char('€'))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn utf8_bad_continuation_skips_lead() {
        assert_eq!(parse(b"\xc3a"), vec![KeyEvent::plain(KeyCode::Char('a'))]);
    }

    #[test]
    fn bare_continuation_byte_skipped() {
        assert_eq!(parse(b"\x80z"), vec![KeyEvent::plain(KeyCode::Char('z'))]);
    }

    // ── Buffering ───────────────────────────────────────────────────

    #[test]
    fn lone_escape_pending() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b"), vec![]);
        assert!(p.has_pending());
    }

    #[test]
    fn lone_escape_flushed() {
        let mut p = Parser::new();
        p.advance(b"\x1b");
        assert_eq!(p.flush(), vec![KeyEvent::plain(KeyCode::Escape)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn flush_escape_bracket_is_alt_bracket() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b["), vec![]);
        assert_eq!(p.flush(), vec![with(KeyCode::Char('['), Modifiers::ALT)]);
    }

    #[test]
    fn split_escape_sequence() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b["), vec![]);
        assert_eq!(p.advance(b"1;5"), vec![]);
        assert_eq!(p.advance(b"D"), vec![with(KeyCode::Left, Modifiers::CTRL)]);
    }

    #[test]
    fn rapid_arrow_keys() {
        assert_eq!(
            parse(b"\x1b[A\x1b[A\x1b[B"),
            vec![
                KeyEvent::plain(KeyCode::Up),
                KeyEvent::plain(KeyCode::Up),
                KeyEvent::plain(KeyCode::Down),
            ]
        );
    }

    #[test]
    fn typed_line_with_arrows() {
        assert_eq!(
            parse(b"ab\x1b[Dc\r"),
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Char('b')),
                KeyEvent::plain(KeyCode::Left),
                KeyEvent::plain(KeyCode::Char('c')),
                KeyEvent::plain(KeyCode::Enter),
            ]
        );
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn decode_modifier_values() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(9), Modifiers::SUPER);
    }

    #[test]
    fn csi_params() {
        assert_eq!(parse_csi_params(b""), Vec::<u16>::new());
        assert_eq!(parse_csi_params(b"3"), vec![3]);
        assert_eq!(parse_csi_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_csi_params(b"1;5:2"), vec![1, 5]);
        assert_eq!(parse_csi_params(b";5"), vec![0, 5]);
    }

    #[test]
    fn parse_u16_saturates() {
        assert_eq!(parse_u16(b"99999999"), u16::MAX);
        assert_eq!(parse_u16(b"12x"), 12);
        assert_eq!(parse_u16(b""), 0);
    }

    #[test]
    fn utf8_lengths() {
        assert_eq!(utf8_char_len(b'a'), 1);
        assert_eq!(utf8_char_len(0xC3), 2);
        assert_eq!(utf8_char_len(0xE2), 3);
        assert_eq!(utf8_char_len(0xF0), 4);
        assert_eq!(utf8_char_len(0x80), 0);
        assert_eq!(utf8_char_len(0xFF), 0);
    }
}
