use crate::ui::conversation::commands::{self, CommandEntry, ParsedCommand, command_entries};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use std::cell::{Cell, RefCell};

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset into `content`, always on a char boundary
    pub cursor_position: usize,
}

/// Conversation composer for user input.
///
/// Enter submits, Shift+Enter inserts a newline for multi-line
/// composition. While an exchange is in flight the composer is disabled:
/// editing still works but plain-text submission is held back (slash
/// commands stay available).
#[derive(Clone)]
pub struct ConversationComposer {
    state: RefCell<TextAreaState>,
    placeholder: String,
    has_focus: bool,
    enabled: bool,
    command_entries: Vec<CommandEntry>,
    filtered_commands: RefCell<Vec<CommandEntry>>,
    show_command_palette: Cell<bool>,
    selected_command: Cell<Option<usize>>,
}

impl ConversationComposer {
    pub fn new(placeholder: String) -> Self {
        Self {
            state: RefCell::new(TextAreaState::default()),
            placeholder,
            has_focus: false,
            enabled: true,
            command_entries: command_entries(),
            filtered_commands: RefCell::new(Vec::new()),
            show_command_palette: Cell::new(false),
            selected_command: Cell::new(None),
        }
    }

    /// Handle key input
    pub fn handle_key(&self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        let mut state = self.state.borrow_mut();

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.insert_char(&mut state, '\n');
                } else if self.show_command_palette.get() {
                    if self.apply_selected_command(&mut state) {
                        return ConversationResult::None;
                    }
                } else if !state.content.trim().is_empty() {
                    if let Some(command) = commands::parse_slash_command(state.content.trim()) {
                        state.content.clear();
                        state.cursor_position = 0;
                        self.close_command_palette();
                        return ConversationResult::Command(command);
                    }

                    // Sends are held back while a reply is pending; the
                    // draft stays in the buffer
                    if !self.enabled {
                        return ConversationResult::None;
                    }

                    let content = state.content.clone();
                    state.content.clear();
                    state.cursor_position = 0;
                    self.close_command_palette();
                    return ConversationResult::Submitted(content);
                }
            }
            KeyCode::Up => {
                if self.show_command_palette.get() {
                    self.move_command_selection(-1);
                    return ConversationResult::None;
                }
            }
            KeyCode::Down => {
                if self.show_command_palette.get() {
                    self.move_command_selection(1);
                    return ConversationResult::None;
                }
            }
            KeyCode::Esc => {
                if self.show_command_palette.get() {
                    self.close_command_palette();
                    return ConversationResult::None;
                }
            }
            KeyCode::Tab => {
                if self.show_command_palette.get() {
                    if self.apply_selected_command(&mut state) {
                        return ConversationResult::None;
                    }
                }
            }
            KeyCode::Char(c) => {
                if c == '/' && state.content.is_empty() {
                    self.insert_char(&mut state, c);
                    self.open_command_palette(&state);
                    return ConversationResult::None;
                }

                self.insert_char(&mut state, c);

                if self.show_command_palette.get() {
                    if state.content.starts_with('/') {
                        if c.is_whitespace() {
                            self.close_command_palette();
                        } else {
                            self.refresh_command_palette(&state);
                        }
                    } else {
                        self.close_command_palette();
                    }
                }
            }
            KeyCode::Backspace => {
                if self.backspace(&mut state) {
                    if self.show_command_palette.get() {
                        if state.content.starts_with('/') {
                            self.refresh_command_palette(&state);
                        } else {
                            self.close_command_palette();
                        }
                    }
                }
            }
            KeyCode::Delete => {
                if self.delete(&mut state) {
                    if self.show_command_palette.get() {
                        if state.content.starts_with('/') {
                            self.refresh_command_palette(&state);
                        } else {
                            self.close_command_palette();
                        }
                    }
                }
            }
            KeyCode::Left => {
                if let Some(prev) = state.content[..state.cursor_position].chars().next_back() {
                    state.cursor_position -= prev.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(next) = state.content[state.cursor_position..].chars().next() {
                    state.cursor_position += next.len_utf8();
                }
            }
            KeyCode::Home => {
                state.cursor_position = 0;
            }
            KeyCode::End => {
                state.cursor_position = state.content.len();
            }
            _ => {}
        }

        ConversationResult::None
    }

    /// Insert a character at the cursor position
    fn insert_char(&self, state: &mut TextAreaState, c: char) {
        state.content.insert(state.cursor_position, c);
        state.cursor_position += c.len_utf8();
    }

    /// Delete character before cursor
    fn backspace(&self, state: &mut TextAreaState) -> bool {
        let Some(prev) = state.content[..state.cursor_position].chars().next_back() else {
            return false;
        };
        state.cursor_position -= prev.len_utf8();
        state.content.remove(state.cursor_position);
        true
    }

    /// Delete character at cursor
    fn delete(&self, state: &mut TextAreaState) -> bool {
        if state.cursor_position < state.content.len() {
            state.content.remove(state.cursor_position);
            true
        } else {
            false
        }
    }

    fn open_command_palette(&self, state: &TextAreaState) {
        self.show_command_palette.set(true);
        self.refresh_command_palette(state);
        self.selected_command.set(Some(0));
    }

    fn close_command_palette(&self) {
        self.show_command_palette.set(false);
        self.filtered_commands.borrow_mut().clear();
        self.selected_command.set(None);
    }

    fn refresh_command_palette(&self, state: &TextAreaState) {
        let query = state.content.trim_start_matches('/').to_lowercase();
        let mut filtered = self.filtered_commands.borrow_mut();
        filtered.clear();

        for entry in &self.command_entries {
            if query.is_empty() || entry.keyword.starts_with(&query) {
                filtered.push(*entry);
            }
        }

        if filtered.is_empty() {
            self.selected_command.set(None);
        } else {
            let index = self.selected_command.get().unwrap_or(0);
            let clamped = index.min(filtered.len() - 1);
            self.selected_command.set(Some(clamped));
        }
    }

    fn move_command_selection(&self, delta: isize) {
        let filtered = self.filtered_commands.borrow();
        if filtered.is_empty() {
            self.selected_command.set(None);
            return;
        }

        let current = self.selected_command.get().unwrap_or(0) as isize;
        let len = filtered.len() as isize;
        let mut next = current + delta;

        if next < 0 {
            next = len - 1;
        } else if next >= len {
            next = 0;
        }

        self.selected_command.set(Some(next as usize));
    }

    fn apply_selected_command(&self, state: &mut TextAreaState) -> bool {
        let filtered = self.filtered_commands.borrow();
        let Some(index) = self.selected_command.get() else {
            return false;
        };

        if index >= filtered.len() {
            return false;
        }

        let entry = filtered[index];
        state.content = format!("/{} ", entry.keyword);
        state.cursor_position = state.content.len();
        drop(filtered);
        self.close_command_palette();
        true
    }

    /// Set focus state
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Enable or disable plain-text submission
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Get current content
    pub fn get_content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// Clear content
    #[allow(dead_code)]
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.content.clear();
        state.cursor_position = 0;
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state.borrow();

        let (title, border_style) = if !self.enabled {
            (
                "⏳ Dead Bot is thinking...".to_string(),
                Style::default().fg(Color::DarkGray),
            )
        } else if self.has_focus {
            (
                "💬 Message — Enter to send, Shift+Enter for a new line".to_string(),
                Style::default().fg(Color::Green),
            )
        } else {
            ("💬 Message".to_string(), Style::default().fg(Color::Gray))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = state.content.clone();
            if self.has_focus && self.enabled {
                content.insert(state.cursor_position.min(content.len()), '▌');
            }

            for (i, line_text) in content.split('\n').enumerate() {
                if i < inner_area.height as usize {
                    let line = Line::from(vec![Span::raw(line_text)]);
                    buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
                }
            }
        }

        // Render command palette if active
        if self.show_command_palette.get() {
            let filtered = self.filtered_commands.borrow();
            let palette_height = (filtered.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: inner_area.x,
                y: inner_area.y.saturating_sub(palette_height),
                width: inner_area.width,
                height: palette_height,
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            let selected = self.selected_command.get();
            for (index, entry) in filtered.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let is_selected = selected == Some(index);
                let style = if is_selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" — ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn composer() -> ConversationComposer {
        ConversationComposer::new("placeholder".to_string())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_submits_the_buffer() {
        let composer = composer();
        type_text(&composer, "hi there");

        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ConversationResult::Submitted("hi there".to_string()));
        assert!(composer.get_content().is_empty());
    }

    #[test]
    fn shift_enter_inserts_a_newline_instead_of_sending() {
        let composer = composer();
        type_text(&composer, "a");

        let result = composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        assert_eq!(result, ConversationResult::None);

        type_text(&composer, "b");
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ConversationResult::Submitted("a\nb".to_string()));
    }

    #[test]
    fn enter_on_a_blank_buffer_does_nothing() {
        let composer = composer();
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);

        type_text(&composer, "   ");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);
    }

    #[test]
    fn disabled_composer_keeps_the_draft_instead_of_sending() {
        let mut composer = composer();
        composer.set_enabled(false);
        type_text(&composer, "hi");

        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);
        assert_eq!(composer.get_content(), "hi");
    }

    #[test]
    fn slash_input_resolves_to_a_command() {
        let composer = composer();
        type_text(&composer, "/clear");

        // First Enter completes the palette selection, second one runs it
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);
        let result = composer.handle_key(press(KeyCode::Enter));

        match result {
            ConversationResult::Command(parsed) => {
                assert_eq!(parsed.command, SlashCommand::Clear)
            }
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn commands_stay_available_while_disabled() {
        let mut composer = composer();
        composer.set_enabled(false);
        type_text(&composer, "/bye");

        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ConversationResult::None);
        let result = composer.handle_key(press(KeyCode::Enter));
        match result {
            ConversationResult::Command(parsed) => {
                assert_eq!(parsed.command, SlashCommand::Bye)
            }
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn backspace_handles_multibyte_input() {
        let composer = composer();
        type_text(&composer, "a⚡");

        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.get_content(), "a");
    }
}
