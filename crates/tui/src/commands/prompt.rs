use std::io::{BufRead, IsTerminal, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use engine::{EngineError, filters::non_empty};

use crate::error::{AppError, Result};

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(buf: &mut String, key: KeyEvent) -> Step {
    if key.kind == KeyEventKind::Release {
        return Step::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Step::Done,
        KeyCode::Esc => Step::Cancelled,
        KeyCode::Char('c' | 'd') if ctrl => Step::Cancelled,
        KeyCode::Char('u') if ctrl => {
            buf.clear();
            Step::Continue
        }
        KeyCode::Backspace => {
            buf.pop();
            Step::Continue
        }
        KeyCode::Char(ch) if !ctrl => {
            buf.push(ch);
            Step::Continue
        }
        _ => Step::Continue,
    }
}

/// Leaves raw mode however reading ends.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a secret without echo. Piped input is taken as a single line so
/// scripts can feed passwords through stdin.
pub fn password(prompt: &str) -> Result<String> {
    let mut err = std::io::stderr();
    write!(err, "{prompt}")?;
    err.flush()?;

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        writeln!(err)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let mut buf = String::new();
    let step = {
        let _raw = RawMode::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut buf, key) {
                    Step::Continue => {}
                    step => break step,
                }
            }
        }
    };
    writeln!(err)?;

    match step {
        Step::Cancelled => Err(AppError::Usage("cancelled".to_string())),
        _ => Ok(buf),
    }
}

/// Prompts for a new password and its confirmation.
pub fn new_password() -> Result<String> {
    let first = password("New password: ")?;
    if non_empty(Some(first.as_str())).is_none() {
        return Err(EngineError::Validation("Password is required".to_string()).into());
    }
    if password("Repeat password: ")? != first {
        return Err(AppError::Usage("passwords do not match".to_string()));
    }
    Ok(first)
}
