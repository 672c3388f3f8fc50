// SPDX-License-Identifier: MIT
//
// n-repl: interactive front end for the n-line editors.
//
// Two modes share one terminal:
//
//   repl   → read lines one at a time, echo each back, keep a history
//            (Up/Down or Ctrl-P/Ctrl-N recall it). Ctrl-D ends the loop.
//   block  → edit a multi-line block inline, Ctrl-D prints the result.
//
// Logging is off unless --log-file is given; the terminal being edited is
// never a log target. The level comes from N_REPL_LOG (default `info`).

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use n_line::config::DEFAULT_HISTORY_CAPACITY;
use n_line::{BlockEditor, Config, History, Session, TtyConsole, edit_block, read_line};
use n_term::color::Color;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "N_REPL_LOG";

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "n-repl", version, about = "Inline line editing in the terminal")]
struct Args {
    /// Prompt text (defaults to the mode name).
    #[arg(long, short)]
    prompt: Option<String>,

    /// Number of history entries to keep.
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history: usize,

    /// Prompt color, e.g. `blue`, `bright-green`, `gray`.
    #[arg(long, default_value_t = Color::Blue)]
    color: Color,

    /// Write logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    /// Read single lines with history (default).
    #[default]
    Repl,
    /// Edit one multi-line block.
    Block,
}

impl Mode {
    const fn name(self) -> &'static str {
        match self {
            Self::Repl => "repl",
            Self::Block => "block",
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

// ─── Modes ──────────────────────────────────────────────────────────────────

fn run_repl(config: &Config, prompt: String) -> n_line::Result<()> {
    let mut console = TtyConsole::new();
    let mut history = History::new(config.history_capacity);
    let mut session = Session::new(prompt, config);
    let mut out = io::stdout();

    while let Some(line) = read_line(&mut console, &mut session, &history)? {
        if line.trim().is_empty() {
            continue;
        }
        history.record(&line);
        tracing::info!(entries = history.len(), "line read");
        out.write_all(line.as_bytes())?;
        out.flush()?;
    }
    tracing::info!("end of input");
    Ok(())
}

fn run_block(config: &Config, prompt: String) -> n_line::Result<()> {
    let mut console = TtyConsole::new();
    let mut editor = BlockEditor::new(prompt, config);
    let text = edit_block(&mut console, &mut editor)?;
    tracing::info!(lines = editor.line_count(), "block finished");

    let mut out = io::stdout();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("n-repl: {}: {e}", path.display());
            process::exit(1);
        }
    }

    let mode = args.mode.unwrap_or_default();
    let prompt = args.prompt.unwrap_or_else(|| mode.name().to_string());
    let config = Config::default()
        .with_history_capacity(args.history)
        .with_prompt_color(args.color);
    tracing::info!(?mode, history = config.history_capacity, "starting");

    let result = match mode {
        Mode::Repl => run_repl(&config, prompt),
        Mode::Block => run_block(&config, prompt),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "aborted");
        eprintln!("n-repl: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
