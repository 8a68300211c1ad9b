use crate::api::{ChatBackend, ChatClient};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::events::{AppEvent, ConnectionStatus};
use crate::ui::conversation::{
    ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand, get_help_text,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use tokio::sync::mpsc;

const INPUT_PLACEHOLDER: &str = "Ask me anything about the Dead's cosmic journey...";

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Manages the conversation flow and UI components.
///
/// The controller holds the state; network calls run in detached tasks
/// and report back over the event channel, drained between frames.
pub struct ConversationManager {
    controller: ConversationController,
    client: ChatClient,
    history: ConversationHistory,
    composer: ConversationComposer,
    notice: Option<String>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl ConversationManager {
    pub fn new(config: &Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut composer = ConversationComposer::new(INPUT_PLACEHOLDER.to_string());
        composer.set_focus(true);

        let manager = Self {
            controller: ConversationController::new(),
            client: ChatClient::new(config),
            history: ConversationHistory::new(config.ui.show_quick_questions),
            composer,
            notice: None,
            events_tx,
            events_rx,
        };

        // Kick off the initial health probe; the outcome lands in the
        // status indicator, never in the thread
        manager.dispatch_probe();
        manager
    }

    /// Drain finished network tasks into the controller (called from the
    /// main loop between frames).
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::ProbeFinished(outcome) => self.controller.apply_probe(outcome),
                AppEvent::ExchangeFinished(outcome) => self.controller.resolve_exchange(outcome),
                AppEvent::ClearFinished(Err(err)) => {
                    // The local reset already happened when the command ran
                    log::warn!("conversation clear request failed: {err}");
                }
                AppEvent::ClearFinished(Ok(())) => {}
            }
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> ConversationAction {
        match self.composer.handle_key(key) {
            crate::ui::conversation::composer::ConversationResult::Submitted(input) => {
                self.notice = None;
                self.dispatch_message(input);
                ConversationAction::None
            }
            crate::ui::conversation::composer::ConversationResult::Command(command) => {
                self.handle_slash_command(command)
            }
            crate::ui::conversation::composer::ConversationResult::None => {
                ConversationAction::None
            }
        }
    }

    /// Render the conversation UI: status header, thread, composer.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.composer.set_enabled(!self.controller.is_loading());

        let notice_height = if self.notice.is_some() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),             // Status header
                Constraint::Min(10),               // Thread
                Constraint::Length(notice_height), // Help notice
                Constraint::Length(4),             // Composer
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.history.render_view(
            chunks[1],
            buf,
            self.controller.messages(),
            self.controller.is_loading(),
        );
        if let Some(ref notice) = self.notice {
            let line = Line::from(vec![Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Cyan),
            )]);
            buf.set_line(chunks[2].x, chunks[2].y, &line, chunks[2].width);
        }
        (&self.composer).render(chunks[3], buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(vec![
            Span::styled(
                "Ripple",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " — your AI guide through the Grateful Dead universe",
                Style::default().fg(Color::Gray),
            ),
        ]);
        buf.set_line(area.x, area.y, &title, area.width);

        let status = self.controller.status();
        let color = match status {
            ConnectionStatus::Connected => Color::Green,
            ConnectionStatus::Disconnected => Color::Red,
            ConnectionStatus::Checking => Color::Yellow,
        };
        let label = format!("● {}", status.display_name());
        let width = label.chars().count() as u16;
        let status_line = Line::from(vec![Span::styled(label, Style::default().fg(color))]);
        buf.set_line(
            area.x + area.width.saturating_sub(width),
            area.y,
            &status_line,
            width,
        );
    }

    /// Accept a user message and dispatch the exchange.
    fn dispatch_message(&mut self, text: String) {
        let Some(pending) = self.controller.submit(&text) else {
            return;
        };

        let api = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = api
                .send_chat(&pending.message, Some(&pending.session_id))
                .await;
            let _ = tx.send(AppEvent::ExchangeFinished(outcome));
        });
    }

    /// Reset the thread locally and tell the service to drop its context.
    /// The reset never waits on the request.
    fn dispatch_clear(&mut self) {
        let api = self.client.clone();
        let tx = self.events_tx.clone();
        let session_id = self.controller.session_id().to_string();
        tokio::spawn(async move {
            let outcome = api.clear_conversation(Some(&session_id)).await;
            let _ = tx.send(AppEvent::ClearFinished(outcome));
        });

        self.controller.reset();
    }

    fn dispatch_probe(&self) {
        let api = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::ProbeFinished(api.probe_health().await));
        });
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        self.notice = None;
        match command.command {
            SlashCommand::Clear => {
                self.dispatch_clear();
                ConversationAction::None
            }
            SlashCommand::Status => {
                self.dispatch_probe();
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Bye => ConversationAction::Exit,
        }
    }
}
