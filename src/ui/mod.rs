// UI module - rendering and key handling live here, poem logic lives in the app

use crate::poem::PoemStats;
use crate::session::NoticeKind;
use crate::status::ServerStatus;
use crate::theme::Theme;
use anyhow::Result;

pub mod scroll;
pub mod terminal;

#[derive(Debug, Clone)]
pub struct ComposeView {
    pub theme: Theme,
    pub started: bool,
    pub lines: Vec<String>,
    pub stats: PoemStats,
    pub suggestions: Vec<String>,
    pub input: String,
    pub server: ServerStatus,
    pub notice: Option<(NoticeKind, String)>,
}

#[derive(Debug, Clone)]
pub enum PoetState {
    Compose(ComposeView),
    Loading {
        theme: Theme,
        progress: u16,
        stage: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Quit,
    GenerateFirstLine,
    GenerateNextLine,
    NewPoem,
    SavePoem,
    NextTheme,
    PrevTheme,
    UseSuggestion(usize),
    CheckServer,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    InputChar(char),
    Backspace,
    /// No key arrived before the poll timeout
    Tick,
}

/// Seam between the poem controller and whatever draws it.
pub trait UIInterface {
    fn new() -> Result<Self>
    where
        Self: Sized;

    fn cleanup(&mut self) -> Result<()>;
    fn render(&mut self, state: &PoetState) -> Result<()>;
    fn get_user_input(&mut self, state: &PoetState) -> Result<UserAction>;

    /// Throws away keys pressed while a request was in flight.
    fn discard_pending_input(&mut self) -> Result<()>;

    fn scroll_up(&mut self, lines: u16);
    fn scroll_down(&mut self, lines: u16);
    fn reset_scroll(&mut self);
}
