use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::{
    client::{GenerateRequest, PoetryClient, SaveRequest},
    config::Config,
    session::{LineKind, NoticeKind, PoemSession},
    status::ServerStatus,
    theme::Theme,
    ui::{ComposeView, PoetState, UIInterface, UserAction},
};

pub const CANNOT_CONNECT: &str =
    "Cannot connect to server. Please make sure the poetry server is running.";
const PAGE: u16 = 5;

pub struct Poet<U: UIInterface> {
    client: PoetryClient,
    ui: U,
    session: PoemSession,
    server: ServerStatus,
    save_dir: PathBuf,
    rng: StdRng,
}

impl<U: UIInterface> Poet<U> {
    pub fn new(config: &Config, ui: U, rng: StdRng) -> Result<Self> {
        Ok(Self {
            client: PoetryClient::new(config.server_url.clone())?,
            ui,
            session: PoemSession::new(config.theme),
            server: ServerStatus::Unknown,
            save_dir: config.save_dir.clone(),
            rng,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let result = self.main_loop().await;
        self.ui.cleanup()?;
        result
    }

    async fn main_loop(&mut self) -> Result<()> {
        self.start().await?;

        loop {
            self.expire_notice()?;
            let state = self.compose_state();
            match self.ui.get_user_input(&state)? {
                UserAction::Quit => break,
                UserAction::Tick => {}
                UserAction::GenerateFirstLine => self.generate_first_line().await?,
                UserAction::GenerateNextLine => self.generate_next_line().await?,
                UserAction::NewPoem => self.new_poem()?,
                UserAction::SavePoem => self.save_poem().await?,
                UserAction::NextTheme => self.change_theme(self.session.theme().next())?,
                UserAction::PrevTheme => self.change_theme(self.session.theme().prev())?,
                UserAction::UseSuggestion(index) => self.use_suggestion(index).await?,
                UserAction::CheckServer => {
                    self.check_server().await;
                    self.render()?;
                }
                UserAction::ScrollUp => self.scroll_up(1)?,
                UserAction::ScrollDown => self.scroll_down(1)?,
                UserAction::PageUp => self.scroll_up(PAGE)?,
                UserAction::PageDown => self.scroll_down(PAGE)?,
                UserAction::InputChar(c) => {
                    self.session.push_char(c);
                    self.render()?;
                }
                UserAction::Backspace => {
                    self.session.pop_char();
                    self.render()?;
                }
            }
        }

        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        self.check_server().await;
        tracing::info!(server = %self.client.base_url(), status = %self.server, "poet started");
        self.new_poem()
    }

    pub fn new_poem(&mut self) -> Result<()> {
        self.session.reset(&mut self.rng);
        self.ui.reset_scroll();
        self.render()
    }

    pub async fn generate_first_line(&mut self) -> Result<()> {
        let request = self.session.first_line_request();
        self.generate(LineKind::First, request).await
    }

    pub async fn generate_next_line(&mut self) -> Result<()> {
        match self.session.next_line_request() {
            Ok(request) => self.generate(LineKind::Next, request).await,
            Err(e) => {
                self.session.notify(NoticeKind::Error, e.to_string());
                self.render()
            }
        }
    }

    async fn use_suggestion(&mut self, index: usize) -> Result<()> {
        if self.session.use_suggestion(index) {
            self.generate_next_line().await?;
        }
        Ok(())
    }

    fn change_theme(&mut self, theme: Theme) -> Result<()> {
        tracing::debug!(%theme, "theme selected");
        self.session.set_theme(theme, &mut self.rng);
        self.render()
    }

    async fn generate(&mut self, kind: LineKind, request: GenerateRequest) -> Result<()> {
        self.show_loading(25, "Checking server...")?;
        if !self.check_server().await {
            self.session.notify(NoticeKind::Error, CANNOT_CONNECT);
            return self.finish_request();
        }

        self.show_loading(60, "Asking the muse...")?;
        match self.client.generate_line(&request).await {
            Ok(generated) => {
                tracing::info!(
                    theme = %request.theme,
                    line = %generated.line,
                    prompt_tokens = generated.usage.map(|u| u.prompt_tokens),
                    completion_tokens = generated.usage.map(|u| u.completion_tokens),
                    total_tokens = generated.usage.map(|u| u.total_tokens),
                    "poem line generated"
                );
                self.session.accept_line(kind, generated.line, &mut self.rng);
                self.render()?;
                self.ui.scroll_down(u16::MAX);
            }
            Err(e) => {
                tracing::warn!(error = %e, status = ?e.status(), "poem line generation failed");
                self.session
                    .notify(NoticeKind::Error, format!("Error: {}", e));
            }
        }

        self.finish_request()
    }

    pub async fn save_poem(&mut self) -> Result<()> {
        let request = match self.session.save_request() {
            Ok(request) => request,
            Err(e) => {
                self.session.notify(NoticeKind::Error, e.to_string());
                return self.render();
            }
        };

        match self.save_and_download(&request).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), lines = request.poem.len(), "poem saved");
                self.session
                    .notify(NoticeKind::Info, format!("Saved poem to {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving poem failed");
                self.session
                    .notify(NoticeKind::Error, format!("Error saving poem: {}", e));
            }
        }

        self.finish_request()
    }

    async fn save_and_download(&self, request: &SaveRequest) -> Result<PathBuf> {
        let filename = self.client.save_poem(request).await?;
        let bytes = self.client.download(&filename).await?;
        let path = self.local_path(&filename)?;

        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .map_err(|e| anyhow!("Failed to create {}: {}", self.save_dir.display(), e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;

        Ok(path)
    }

    /// Only the last component of the server's filename is trusted.
    fn local_path(&self, filename: &str) -> Result<PathBuf> {
        Path::new(filename)
            .file_name()
            .map(|name| self.save_dir.join(name))
            .ok_or_else(|| anyhow!("Server returned an invalid filename: {}", filename))
    }

    async fn check_server(&mut self) -> bool {
        match self.client.health().await {
            Ok(health) => {
                self.server = ServerStatus::from(&health);
                if !health.is_configured() {
                    tracing::warn!(provider = %health.ai_provider, "server has no provider key configured");
                }
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "server health check failed");
                self.server = ServerStatus::Unreachable;
                false
            }
        }
    }

    fn finish_request(&mut self) -> Result<()> {
        self.ui.discard_pending_input()?;
        self.render()
    }

    fn expire_notice(&mut self) -> Result<()> {
        if self.session.expire_notice(Instant::now()) {
            self.render()?;
        }
        Ok(())
    }

    fn scroll_up(&mut self, lines: u16) -> Result<()> {
        self.ui.scroll_up(lines);
        self.render()
    }

    fn scroll_down(&mut self, lines: u16) -> Result<()> {
        self.ui.scroll_down(lines);
        self.render()
    }

    fn show_loading(&mut self, progress: u16, stage: &str) -> Result<()> {
        let state = PoetState::Loading {
            theme: self.session.theme(),
            progress,
            stage: stage.to_string(),
        };
        self.ui.render(&state)
    }

    fn render(&mut self) -> Result<()> {
        let state = self.compose_state();
        self.ui.render(&state)
    }

    fn compose_state(&self) -> PoetState {
        PoetState::Compose(ComposeView {
            theme: self.session.theme(),
            started: self.session.has_started(),
            lines: self.session.poem().lines().to_vec(),
            stats: self.session.stats(),
            suggestions: self.session.suggestions().to_vec(),
            input: self.session.input().to_string(),
            server: self.server.clone(),
            notice: self
                .session
                .notice()
                .map(|n| (n.kind, n.message.clone())),
        })
    }
}
