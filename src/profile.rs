use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::Stylize,
    symbols::border,
    text::{Line, ToSpan},
    widgets::{Block, Paragraph},
};

use crate::config::Config;

/// Read-only summary behind the settings action.
pub struct ProfileScreen {
    lines: Vec<(&'static str, String)>,
}

impl ProfileScreen {
    pub fn new(config: &Config, note_count: usize) -> Self {
        Self {
            lines: vec![
                ("Notes", note_count.to_string()),
                ("Database", config.db_path.display().to_string()),
                ("Log file", config.log_file.display().to_string()),
                (
                    "Long press",
                    format!("{} ms", config.long_press_timeout.as_millis()),
                ),
            ],
        }
    }

    /// Returns `true` when the user leaves the screen.
    pub fn handle_event(&self, event: &Event) -> bool {
        matches!(
            event,
            Event::Key(key)
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
        )
    }

    pub fn draw(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|(label, value)| {
                Line::from_iter([format!("{label:<12}").bold(), value.to_span()])
            })
            .collect();

        let block = Block::bordered()
            .title("Profile")
            .border_set(border::THICK);
        let help_message = Line::from_iter(["Esc/q".bold().yellow(), " back".to_span()]).centered();

        frame.render_widget(Paragraph::new(lines).block(block), layout[0]);
        frame.render_widget(help_message, layout[1]);
    }
}
