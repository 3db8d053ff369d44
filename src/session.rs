use crate::client::{GenerateRequest, SaveRequest};
use crate::poem::{Poem, PoemStats};
use crate::suggestions;
use crate::theme::Theme;
use rand::Rng;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const FIRST_LINE_SEED: &str = "beginning";
pub const NOTICE_TTL: Duration = Duration::from_secs(5);
pub const PLACEHOLDER: &str =
    "Press Ctrl+F to generate a first line and start your poetic journey!";

/// Input problems caught before anything is sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please enter a word or phrase to inspire the next line")]
    MissingInspiration,
    #[error("Please generate a first line first")]
    NoFirstLine,
    #[error("No poem to save! Generate some lines first.")]
    NothingToSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    shown_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_TTL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    First,
    Next,
}

pub struct PoemSession {
    poem: Poem,
    theme: Theme,
    started: bool,
    input: String,
    suggestions: Vec<String>,
    notice: Option<Notice>,
}

impl PoemSession {
    pub fn new(theme: Theme) -> Self {
        Self {
            poem: Poem::new(),
            theme,
            started: false,
            input: String::new(),
            suggestions: Vec::new(),
            notice: None,
        }
    }

    pub fn poem(&self) -> &Poem {
        &self.poem
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn stats(&self) -> PoemStats {
        self.poem.stats()
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.poem.clear();
        self.started = false;
        self.input.clear();
        self.refresh_suggestions(rng);
    }

    pub fn set_theme<R: Rng + ?Sized>(&mut self, theme: Theme, rng: &mut R) {
        self.theme = theme;
        self.refresh_suggestions(rng);
    }

    pub fn refresh_suggestions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.suggestions = suggestions::pick(self.theme, rng);
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Replaces the input with the suggestion at `index`, if there is one.
    pub fn use_suggestion(&mut self, index: usize) -> bool {
        match self.suggestions.get(index) {
            Some(word) => {
                self.input = word.clone();
                true
            }
            None => false,
        }
    }

    pub fn first_line_request(&self) -> GenerateRequest {
        GenerateRequest {
            theme: self.theme,
            user_input: FIRST_LINE_SEED.to_string(),
            previous_lines: Vec::new(),
        }
    }

    pub fn next_line_request(&self) -> Result<GenerateRequest, SessionError> {
        let user_input = self.input.trim();

        if user_input.is_empty() && !self.poem.is_empty() {
            return Err(SessionError::MissingInspiration);
        }
        if self.poem.is_empty() {
            return Err(SessionError::NoFirstLine);
        }

        Ok(GenerateRequest {
            theme: self.theme,
            user_input: user_input.to_string(),
            previous_lines: self.poem.lines().to_vec(),
        })
    }

    pub fn accept_line<R: Rng + ?Sized>(&mut self, kind: LineKind, line: String, rng: &mut R) {
        match kind {
            LineKind::First => {
                self.poem.begin(line);
                self.started = true;
            }
            LineKind::Next => self.poem.push(line),
        }
        self.input.clear();
        self.refresh_suggestions(rng);
    }

    pub fn save_request(&self) -> Result<SaveRequest, SessionError> {
        if self.poem.is_empty() {
            return Err(SessionError::NothingToSave);
        }
        Ok(SaveRequest {
            poem: self.poem.lines().to_vec(),
            theme: self.theme,
        })
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notify_at(kind, message, Instant::now());
    }

    pub fn notify_at(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
            shown_at: now,
        });
    }

    /// Drops the notice once it has been visible long enough. Returns true
    /// when something changed on screen.
    pub fn expire_notice(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            return true;
        }
        false
    }
}
