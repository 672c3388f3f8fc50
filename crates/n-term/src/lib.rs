// SPDX-License-Identifier: MIT
//
// n-term: terminal I/O layer for n-repl.
//
// The collaborator underneath the line editor: it puts the terminal into
// raw mode and guarantees it comes back out, answers size queries, turns
// raw stdin bytes into key events, and knows the byte-level encoding of the
// handful of cursor-relative escape sequences an inline editor needs.
//
// Nothing here decides *what* to draw. The editor core describes screen
// deltas; this crate only knows how to put them on the wire. No alternate
// screen, no absolute positioning: the editor lives on the shell's own
// lines, so every move is relative to where the cursor already is.

pub mod ansi;
pub mod color;
pub mod input;
pub mod reader;
pub mod terminal;
