// =============================================================================
// Terminal Front End — stdin in, rendered screens out
// =============================================================================
//
// Interactive mode runs two loops under `tokio::select!`:
//   1. **Render loop**: every `render_interval`, compare the state version
//      with the last one drawn and print a fresh screen if it moved.
//   2. **Input loop**: each stdin line becomes the new symbol text and is
//      submitted. `:q`, `:quit`, EOF and Ctrl+C end the session.
// =============================================================================

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::input::{InputController, Submission};
use crate::presenter::present;
use crate::runtime_config::RuntimeConfig;

/// Presentation knobs taken from the runtime config.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_stale_rows_on_error: bool,
    pub color: bool,
    pub render_interval: Duration,
}

impl From<&RuntimeConfig> for RenderOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            show_stale_rows_on_error: config.show_stale_rows_on_error,
            color: config.color,
            render_interval: Duration::from_millis(config.render_interval_ms.max(10)),
        }
    }
}

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// New symbol text, to be submitted.
    Submit(String),
}

pub fn parse_line(line: &str) -> Command {
    match line {
        ":q" | ":quit" => Command::Quit,
        other => Command::Submit(other.to_string()),
    }
}

fn print_screen(state: &AppState, opts: &RenderOptions, prompt: bool) {
    let screen = present(&state.snapshot(), opts.show_stale_rows_on_error);
    let mut out = std::io::stdout().lock();
    let mut text = screen.render_text(opts.color);
    if prompt {
        text.push_str("\n> ");
    }
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        warn!(error = %e, "failed to write screen to stdout");
    }
}

/// Fetch `symbol` once, print the resulting screen and report whether it
/// ended in an error.
pub async fn run_once(
    state: Arc<AppState>,
    input: InputController,
    opts: RenderOptions,
    symbol: String,
) -> Result<bool> {
    input.on_change(symbol);
    if let Submission::Dispatched(handle) = input.on_submit() {
        handle.await.context("fetch task did not complete")?;
    }
    print_screen(&state, &opts, false);
    Ok(state.snapshot().status.error_message().is_some())
}

/// Run the interactive session until the user quits.
pub async fn run_interactive(
    state: Arc<AppState>,
    input: InputController,
    opts: RenderOptions,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut render_tick = interval(opts.render_interval);

    print_screen(&state, &opts, true);
    let mut last_drawn = state.current_state_version();

    loop {
        tokio::select! {
            // ── Render loop: redraw when the version moved ──────────────
            _ = render_tick.tick() => {
                let current = state.current_state_version();
                if current != last_drawn {
                    print_screen(&state, &opts, true);
                    last_drawn = current;
                }
            }

            // ── Input loop ──────────────────────────────────────────────
            line = lines.next_line() => {
                match line.context("failed to read stdin")? {
                    Some(line) => match parse_line(&line) {
                        Command::Quit => break,
                        Command::Submit(text) => {
                            input.on_change(text);
                            // Completion shows up as a version bump.
                            let _ = input.on_submit();
                        }
                    },
                    None => {
                        debug!("stdin closed");
                        break;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                warn!("interrupt received, leaving");
                break;
            }
        }
    }

    info!("session ended");
    Ok(())
}
