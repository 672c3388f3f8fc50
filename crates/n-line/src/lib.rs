//! # n-line: line editing core for n-repl
//!
//! Two inline editors that draw on the shell's own lines with relative
//! cursor moves, plus the pieces they are built from:
//!
//! - **[`line`]**: `LineBuffer`, a growable byte line with fallible growth
//! - **[`history`]**: bounded, most-recent-first store of submitted lines
//! - **[`keymap`]**: the fixed key tables of both editors
//! - **[`delta`]**: screen changes as data, encoded separately
//! - **[`console`]**: the terminal services an editor needs, real or scripted
//! - **[`repl`]**: single-line editor with history browsing ([`read_line`])
//! - **[`block`]**: multi-line editor with scrolling ([`edit_block`])
//!
//! ```no_run
//! use n_line::{Config, History, Session, TtyConsole, read_line};
//!
//! let config = Config::default();
//! let mut console = TtyConsole::new();
//! let mut history = History::new(config.history_capacity);
//! let mut session = Session::new("calc", &config);
//!
//! while let Some(line) = read_line(&mut console, &mut session, &history)? {
//!     if !line.trim().is_empty() {
//!         history.record(&line);
//!     }
//! }
//! # Ok::<(), n_line::EditError>(())
//! ```

pub mod block;
pub mod config;
pub mod console;
pub mod delta;
pub mod error;
pub mod history;
pub mod keymap;
pub mod line;
pub mod repl;

pub use block::{BlockEditor, Flow, edit_block};
pub use config::Config;
pub use console::{Console, MemoryConsole, TtyConsole, Viewport};
pub use error::{EditError, Result};
pub use history::History;
pub use line::LineBuffer;
pub use repl::{Session, Signal, read_line};
