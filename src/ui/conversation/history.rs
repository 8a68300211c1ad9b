//! Conversation thread display component

use crate::events::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Suggested prompts shown while the thread holds only the greeting.
const QUICK_QUESTIONS: &[&str] = &[
    "Tell me about Jerry's magic ✨",
    "What makes Dark Star so cosmic? 🌟",
    "Why is American Beauty perfect? 🌹",
    "What's the Deadhead experience like? 💫",
    "Recommend me a mind-blowing show 🎸",
];

/// Renders the message log. The thread itself lives in the controller;
/// this component only owns presentation choices.
#[derive(Clone)]
pub struct ConversationHistory {
    show_quick_questions: bool,
}

impl ConversationHistory {
    pub fn new(show_quick_questions: bool) -> Self {
        Self {
            show_quick_questions,
        }
    }

    /// Render the thread, bottom-anchored, with the loading indicator
    /// appended while a reply is pending.
    pub fn render_view(&self, area: Rect, buf: &mut Buffer, messages: &[Message], is_loading: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let mut all_lines: Vec<Line> = Vec::new();
        for message in messages {
            let mut lines = self.render_message(message, inner_area.width);
            all_lines.append(&mut lines);
            // spacing between messages
            all_lines.push(Line::from(vec![Span::raw("")]));
        }

        if is_loading {
            all_lines.append(&mut self.render_loading_indicator());
        } else if messages.len() == 1 && self.show_quick_questions {
            all_lines.append(&mut self.render_quick_questions());
        }

        // Show the most recent lines that fit
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let start = total.saturating_sub(height);
        let visible = &all_lines[start..];

        for (i, line) in visible.iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }

    /// Render a single message into lines
    fn render_message(&self, message: &Message, width: u16) -> Vec<Line> {
        let mut lines = Vec::new();

        let sender_icon = match message.sender {
            Sender::User => "👤",
            Sender::Bot => "🤖",
        };

        let header = format!("{} {} {}", sender_icon, message.timestamp, "─".repeat(20));
        lines.push(Line::from(vec![Span::styled(
            header,
            Style::default().fg(Color::DarkGray),
        )]));

        let content_lines = wrap_text(&message.text, width.saturating_sub(2) as usize);
        for content_line in content_lines {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, self.content_style(message.sender)),
            ]));
        }

        lines
    }

    fn content_style(&self, sender: Sender) -> Style {
        match sender {
            Sender::User => Style::default().fg(Color::Blue),
            Sender::Bot => Style::default().fg(Color::Green),
        }
    }

    fn render_loading_indicator(&self) -> Vec<Line> {
        vec![Line::from(vec![
            Span::raw("  "),
            Span::styled("🤖 Dead Bot is thinking", Style::default().fg(Color::Yellow)),
            Span::styled("...", Style::default().fg(Color::Yellow)),
            Span::styled(" ▋", Style::default().fg(Color::DarkGray)),
        ])]
    }

    fn render_quick_questions(&self) -> Vec<Line> {
        let mut lines = vec![
            Line::from(vec![Span::styled(
                "🌈 Start your journey with these cosmic questions:",
                Style::default().fg(Color::Magenta),
            )]),
        ];
        for question in QUICK_QUESTIONS {
            lines.push(Line::from(vec![
                Span::raw("  • "),
                Span::styled(*question, Style::default().fg(Color::Gray)),
            ]));
        }
        lines
    }
}

/// Wrap text to fit within the given width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.chars().count() + word.chars().count() + 1 <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !current_line.is_empty() {
                lines.push(current_line);
                current_line = String::new();
            }
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
