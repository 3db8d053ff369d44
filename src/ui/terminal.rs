use super::{scroll, ComposeView, PoetState, UIInterface, UserAction};
use crate::session::{NoticeKind, PLACEHOLDER};
use crate::status::ServerStatus;
use crate::theme::Theme;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Gauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Tabs, Wrap,
    },
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct TerminalUI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    scroll_position: u16,
    max_scroll: u16,
}

impl UIInterface for TerminalUI {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            scroll_position: 0,
            max_scroll: 0,
        })
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn render(&mut self, state: &PoetState) -> Result<()> {
        match state {
            PoetState::Loading {
                theme,
                progress,
                stage,
            } => {
                let (theme, progress, stage) = (*theme, *progress, stage.clone());
                self.terminal
                    .draw(|f| Self::render_loading(f, theme, progress, &stage))?;
            }
            PoetState::Compose(view) => {
                let scroll_pos = self.scroll_position;
                let mut max_scroll = 0;
                self.terminal.draw(|f| {
                    max_scroll = Self::render_compose(f, view, scroll_pos);
                })?;
                self.max_scroll = max_scroll;
                self.scroll_position = self.scroll_position.min(max_scroll);
            }
        }
        Ok(())
    }

    fn get_user_input(&mut self, _state: &PoetState) -> Result<UserAction> {
        loop {
            if !event::poll(POLL_INTERVAL)? {
                return Ok(UserAction::Tick);
            }
            if let Event::Key(key) = event::read()? {
                if let Some(action) = action_for_key(key) {
                    return Ok(action);
                }
            }
        }
    }

    fn discard_pending_input(&mut self) -> Result<()> {
        while event::poll(Duration::ZERO)? {
            event::read()?;
        }
        Ok(())
    }

    fn scroll_up(&mut self, lines: u16) {
        self.scroll_position = self.scroll_position.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_position = self
            .scroll_position
            .saturating_add(lines)
            .min(self.max_scroll);
    }

    fn reset_scroll(&mut self) {
        self.scroll_position = 0;
    }
}

/// Map a key press on the compose screen to an action. Returns `None` for
/// keys it ignores.
pub fn action_for_key(key: KeyEvent) -> Option<UserAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => Some(UserAction::Quit),
        KeyCode::Char('c') if ctrl => Some(UserAction::Quit),
        KeyCode::Char('f') if ctrl => Some(UserAction::GenerateFirstLine),
        KeyCode::Char('n') if ctrl => Some(UserAction::NewPoem),
        KeyCode::Char('s') if ctrl => Some(UserAction::SavePoem),
        KeyCode::Char('r') if ctrl => Some(UserAction::CheckServer),
        KeyCode::Char(c @ '1'..='4') if alt => c
            .to_digit(10)
            .map(|d| UserAction::UseSuggestion(d as usize - 1)),
        KeyCode::F(n @ 1..=4) => Some(UserAction::UseSuggestion(n as usize - 1)),
        KeyCode::Enter => Some(UserAction::GenerateNextLine),
        KeyCode::Tab => Some(UserAction::NextTheme),
        KeyCode::BackTab => Some(UserAction::PrevTheme),
        KeyCode::Up => Some(UserAction::ScrollUp),
        KeyCode::Down => Some(UserAction::ScrollDown),
        KeyCode::PageUp => Some(UserAction::PageUp),
        KeyCode::PageDown => Some(UserAction::PageDown),
        KeyCode::Backspace => Some(UserAction::Backspace),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(UserAction::InputChar(c)),
        _ => None,
    }
}

fn server_color(status: &ServerStatus) -> Color {
    match status {
        ServerStatus::Unknown => Color::Yellow,
        ServerStatus::Connected { .. } => Color::Green,
        ServerStatus::Unreachable => Color::Red,
    }
}

impl TerminalUI {
    fn render_loading(f: &mut Frame, theme: Theme, progress: u16, stage: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.size());

        f.render_widget(
            Paragraph::new(format!("✒️  Composing a {} line...", theme))
                .style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL).title("Quill")),
            chunks[0],
        );

        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Progress"))
                .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
                .percent(progress)
                .label(format!("{}%", progress))
                .use_unicode(true),
            chunks[1],
        );

        f.render_widget(
            Paragraph::new(stage.to_string())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title("Status")),
            chunks[2],
        );
    }

    /// Draws the composing screen and returns the largest valid poem scroll offset.
    fn render_compose(f: &mut Frame, view: &ComposeView, scroll_pos: u16) -> u16 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.size());

        Self::render_themes(f, chunks[0], view.theme);

        f.render_widget(
            Paragraph::new(view.server.to_string()).style(Style::default().fg(
                server_color(&view.server),
            )),
            chunks[1],
        );

        let max_scroll = Self::render_poem(f, chunks[2], &view.lines, scroll_pos);
        if let Some((kind, message)) = &view.notice {
            Self::render_notice(f, chunks[2], *kind, message);
        }

        f.render_widget(
            Paragraph::new(view.stats.to_string())
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Right),
            chunks[3],
        );

        Self::render_suggestions(f, chunks[4], &view.suggestions);
        Self::render_input(f, chunks[5], &view.input);
        Self::render_help(f, chunks[6], view.started);

        max_scroll
    }

    fn render_themes(f: &mut Frame, area: Rect, selected: Theme) {
        let titles: Vec<String> = Theme::all().iter().map(|t| t.to_string()).collect();
        let index = Theme::all().iter().position(|t| *t == selected).unwrap_or(0);

        f.render_widget(
            Tabs::new(titles)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("✒️ Quill - AI Poetry Generator"),
                )
                .select(index)
                .style(Style::default().fg(Color::White))
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
            area,
        );
    }

    fn render_poem(f: &mut Frame, area: Rect, lines: &[String], scroll_pos: u16) -> u16 {
        let block = Block::default().borders(Borders::ALL).title("📜 Poem");

        if lines.is_empty() {
            f.render_widget(
                Paragraph::new(PLACEHOLDER)
                    .style(Style::default().fg(Color::Gray))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
            return 0;
        }

        let width = area.width.saturating_sub(4) as usize;
        let rows = scroll::wrap_poem(lines, width);
        let visible_height = area.height.saturating_sub(2) as usize;
        let (start, end, max_scroll) = scroll::visible_window(rows.len(), visible_height, scroll_pos);
        let gutter = format!("{}", lines.len()).len();

        let visible: Vec<Line> = rows[start..end]
            .iter()
            .map(|(number, text)| {
                let label = match number {
                    Some(n) => format!("{:>width$}  ", n, width = gutter),
                    None => " ".repeat(gutter + 2),
                };
                Line::from(vec![
                    Span::styled(label, Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        text.clone(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::ITALIC),
                    ),
                ])
            })
            .collect();

        f.render_widget(Paragraph::new(visible).block(block), area);

        if max_scroll > 0 {
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None);
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(rows.len())
                .position(start);
            f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }

        max_scroll
    }

    fn render_notice(f: &mut Frame, poem_area: Rect, kind: NoticeKind, message: &str) {
        let height = 3u16.min(poem_area.height);
        let area = Rect {
            x: poem_area.x + 1,
            y: poem_area.y + poem_area.height.saturating_sub(height + 1),
            width: poem_area.width.saturating_sub(2),
            height,
        };
        let (title, color) = match kind {
            NoticeKind::Error => ("❌ Error", Color::Red),
            NoticeKind::Info => ("✅ Done", Color::Green),
        };

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(message.to_string())
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
    }

    fn render_suggestions(f: &mut Frame, area: Rect, suggestions: &[String]) {
        let mut spans = Vec::new();
        for (i, word) in suggestions.iter().enumerate() {
            spans.push(Span::styled(
                format!("F{}", i + 1),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!(" {}   ", word)));
        }

        f.render_widget(
            Paragraph::new(Line::from(spans))
                .block(Block::default().borders(Borders::ALL).title("💡 Suggestions")),
            area,
        );
    }

    fn render_input(f: &mut Frame, area: Rect, input: &str) {
        f.render_widget(
            Paragraph::new(input.to_string())
                .style(Style::default().fg(Color::White))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("✍️ Inspire the next line"),
                ),
            area,
        );

        let cursor_x = area.x + 1 + input.chars().count() as u16;
        f.set_cursor(
            cursor_x.min(area.x + area.width.saturating_sub(2)),
            area.y + 1,
        );
    }

    fn render_help(f: &mut Frame, area: Rect, started: bool) {
        let key = |k: &'static str| {
            Span::styled(
                k,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        };

        let help = Line::from(vec![
            key("^F"),
            Span::raw(if started { " Restart  " } else { " First line  " }),
            key("Enter"),
            Span::raw(" Next line  "),
            key("^N"),
            Span::raw(" New  "),
            key("^S"),
            Span::raw(" Save  "),
            key("Tab"),
            Span::raw(" Theme  "),
            key("^R"),
            Span::raw(" Server  "),
            key("Esc"),
            Span::raw(" Quit"),
        ]);

        f.render_widget(
            Paragraph::new(help)
                .block(Block::default().borders(Borders::ALL).title("⌨️ Controls")),
            area,
        );
    }
}
