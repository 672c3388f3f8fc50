// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Blocking key reader: one decoded keypress per call.
//
// A line editor is a plain read-eval loop: pull one key, mutate, paint,
// repeat. So unlike a full-screen event loop there is no background
// thread here. `KeyReader::read_key` blocks the calling thread until the
// parser can hand back a complete key.
//
// The only subtlety is the lone ESC. When the parser is holding a partial
// escape sequence we stop blocking indefinitely and wait at most
// `ESC_TIMEOUT_MS` for the rest of it; if nothing arrives, the pending
// bytes are flushed as literal keys.
//
// Bytes come from a `ByteSource`. On unix, `StdinSource` polls fd 0 so the
// timeout is real. `Replay` wraps any `io::Read` (a file, a pipe, a byte
// slice in tests) and treats a zero-length read as end of input.

use std::collections::VecDeque;
use std::io::{self, Read};

use crate::input::{KeyEvent, Parser};

/// Byte chunk read per `fill` call.
///
/// A single keypress is 1-6 bytes, a paste can be kilobytes. 4 KB handles
/// both without waste.
const READ_BUF_SIZE: usize = 4096;

/// How long to wait for the rest of an escape sequence (milliseconds).
///
/// Terminals send a whole sequence in one write, so the tail of a real
/// sequence arrives within a millisecond or two. 25ms is long enough for
/// slow links and short enough that a deliberate Escape feels instant.
pub const ESC_TIMEOUT_MS: i32 = 25;

// ─── Byte Sources ───────────────────────────────────────────────────────────

/// How long [`ByteSource::fill`] may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Block until at least one byte is available or input ends.
    Block,
    /// Give up after this many milliseconds without input.
    Timeout(i32),
}

/// Outcome of one [`ByteSource::fill`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// `n > 0` bytes were written to the front of the buffer.
    Bytes(usize),
    /// The timeout elapsed with no input.
    Timeout,
    /// Input is closed; no more bytes will ever arrive.
    Eof,
}

/// Somewhere raw terminal bytes come from.
pub trait ByteSource {
    /// Read available bytes into `buf`, blocking as allowed by `wait`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the read fails.
    fn fill(&mut self, buf: &mut [u8], wait: Wait) -> io::Result<Fill>;
}

/// Standard input, read with `poll()` so escape timeouts work.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    /// Create a source reading from fd 0.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn fill(&mut self, buf: &mut [u8], wait: Wait) -> io::Result<Fill> {
        let timeout = match wait {
            Wait::Block => -1,
            Wait::Timeout(ms) => ms.max(0),
        };

        loop {
            // Poll stdin for readability.
            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: libc::STDIN_FILENO,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, timeout)
            };

            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if ready == 0 {
                return Ok(Fill::Timeout);
            }

            let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };

            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
            let n = n as usize;
            return Ok(if n == 0 { Fill::Eof } else { Fill::Bytes(n) });
        }
    }
}

/// Non-unix fallback: plain blocking reads, no escape timeout.
#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn fill(&mut self, buf: &mut [u8], _wait: Wait) -> io::Result<Fill> {
        match io::stdin().lock().read(buf)? {
            0 => Ok(Fill::Eof),
            n => Ok(Fill::Bytes(n)),
        }
    }
}

/// Adapter turning any [`Read`] into a [`ByteSource`].
///
/// Reads never time out; a zero-length read means end of input.
#[derive(Debug)]
pub struct Replay<R>(pub R);

impl<R: Read> ByteSource for Replay<R> {
    fn fill(&mut self, buf: &mut [u8], _wait: Wait) -> io::Result<Fill> {
        loop {
            match self.0.read(buf) {
                Ok(0) => return Ok(Fill::Eof),
                Ok(n) => return Ok(Fill::Bytes(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}

// ─── KeyReader ──────────────────────────────────────────────────────────────

/// Blocking reader of decoded keys.
///
/// # Example
///
/// ```
/// use n_term::input::{KeyCode, KeyEvent};
/// use n_term::reader::{KeyReader, Replay};
///
/// let mut keys = KeyReader::new(Replay(&b"hi\x1b[D"[..]));
/// assert_eq!(keys.read_key()?, Some(KeyEvent::plain(KeyCode::Char('h'))));
/// assert_eq!(keys.read_key()?, Some(KeyEvent::plain(KeyCode::Char('i'))));
/// assert_eq!(keys.read_key()?, Some(KeyEvent::plain(KeyCode::Left)));
/// assert_eq!(keys.read_key()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct KeyReader<S> {
    source: S,
    parser: Parser,
    /// Keys decoded but not yet handed out (one read can carry several).
    queue: VecDeque<KeyEvent>,
    /// Set once the source reports end of input.
    eof: bool,
}

impl<S: ByteSource> KeyReader<S> {
    /// Wrap a byte source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: Parser::new(),
            queue: VecDeque::new(),
            eof: false,
        }
    }

    /// Block until one key is available.
    ///
    /// Returns `Ok(None)` once input has ended and every buffered key has
    /// been delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source fails.
    pub fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if let Some(key) = self.queue.pop_front() {
                return Ok(Some(key));
            }
            if self.eof {
                return Ok(None);
            }

            let wait = if self.parser.has_pending() {
                Wait::Timeout(ESC_TIMEOUT_MS)
            } else {
                Wait::Block
            };

            match self.source.fill(&mut buf, wait)? {
                Fill::Bytes(n) => self.queue.extend(self.parser.advance(&buf[..n])),
                Fill::Timeout => self.queue.extend(self.parser.flush()),
                Fill::Eof => {
                    self.queue.extend(self.parser.flush());
                    self.eof = true;
                }
            }
        }
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
