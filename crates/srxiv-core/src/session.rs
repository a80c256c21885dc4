//! Interactive selection session, modeled as a pure state machine.
//!
//! [`step`] maps `(state, input)` to `(state, effect)`. Effects describe
//! the I/O the caller must perform (reveal entries, download a paper),
//! which keeps the decision logic testable without network or terminal
//! access.

use std::ops::Range;

use crate::SearchResult;

/// How many additional entries the `m` command reveals.
pub const REVEAL_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    Downloading,
    Ended,
}

/// Session state, owned exclusively by the session driver.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub results: Vec<SearchResult>,
    pub revealed: usize,
    pub phase: Phase,
}

impl SessionState {
    /// Start a session with the first `initial_reveal` entries visible.
    pub fn new(results: Vec<SearchResult>, initial_reveal: usize) -> Self {
        let revealed = initial_reveal.min(results.len());
        Self {
            results,
            revealed,
            phase: Phase::Browsing,
        }
    }

    /// Mark the download as complete; the session is over.
    pub fn finish(mut self) -> Self {
        self.phase = Phase::Ended;
        self
    }
}

/// A parsed user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    More,
    /// 1-based index into the revealed entries.
    Select(usize),
    Quit,
    Other(String),
}

impl SessionInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "m" => Self::More,
            "q" => Self::Quit,
            _ => match line.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Select(n),
                _ => Self::Other(line),
            },
        }
    }
}

/// I/O the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Display the newly revealed slice of results.
    Reveal(Range<usize>),
    /// Fetch and open the selected paper.
    Download(Box<SearchResult>),
    /// Show a message and re-prompt.
    Notice(String),
    /// End the session with no side effect.
    Terminate,
}

/// Advance the session by one user input.
pub fn step(state: SessionState, input: SessionInput) -> (SessionState, Effect) {
    if state.phase != Phase::Browsing {
        return (state, Effect::Terminate);
    }

    match input {
        SessionInput::More => {
            if state.revealed >= state.results.len() {
                return (state, Effect::Notice("No more entries.".to_string()));
            }
            let from = state.revealed;
            let to = (from + REVEAL_STEP).min(state.results.len());
            let next = SessionState {
                revealed: to,
                ..state
            };
            (next, Effect::Reveal(from..to))
        }
        SessionInput::Select(k) => {
            if k > state.revealed {
                let msg = format!("Invalid input: {k}");
                return (state, Effect::Notice(msg));
            }
            let entry = state.results[k - 1].clone();
            let next = SessionState {
                phase: Phase::Downloading,
                ..state
            };
            (next, Effect::Download(Box::new(entry)))
        }
        SessionInput::Quit => {
            let next = SessionState {
                phase: Phase::Ended,
                ..state
            };
            (next, Effect::Terminate)
        }
        SessionInput::Other(raw) => {
            let msg = format!("Invalid input: {raw}");
            (state, Effect::Notice(msg))
        }
    }
}
