use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, ToSpan},
    widgets::{Block, Paragraph},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::models::{Note, NoteType};
use crate::view_model::HomeViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusedInput {
    Title,
    Content,
    Thumbnail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    Continue,
    Close,
}

/// Form behind the "add note" and "open note" actions.
pub struct EditorScreen {
    note: Option<Note>,
    title_input: Input,
    content_input: Input,
    thumbnail_input: Input,
    focused_input: FocusedInput,
    status: Option<String>,
}

impl EditorScreen {
    pub fn new_note() -> Self {
        Self {
            note: None,
            title_input: Input::default(),
            content_input: Input::default(),
            thumbnail_input: Input::default().with_value(NoteType::Text.as_str().to_string()),
            focused_input: FocusedInput::Title,
            status: None,
        }
    }

    pub fn edit(note: Note) -> Self {
        Self {
            title_input: Input::default().with_value(note.title.clone()),
            content_input: Input::default().with_value(note.content.clone()),
            thumbnail_input: Input::default().with_value(note.thumbnail.clone()),
            note: Some(note),
            focused_input: FocusedInput::Title,
            status: None,
        }
    }

    pub fn handle_event(&mut self, event: &Event, view_model: &mut HomeViewModel) -> EditorOutcome {
        let Event::Key(key) = event else {
            return EditorOutcome::Continue;
        };
        if key.kind != KeyEventKind::Press {
            return EditorOutcome::Continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => self.save_note(view_model),
            (_, KeyCode::Tab) => self.toggle_input(),
            (_, KeyCode::Esc) => return EditorOutcome::Close,
            _ => {
                let input = match self.focused_input {
                    FocusedInput::Title => &mut self.title_input,
                    FocusedInput::Content => &mut self.content_input,
                    FocusedInput::Thumbnail => &mut self.thumbnail_input,
                };
                input.handle_event(event);
            }
        }
        EditorOutcome::Continue
    }

    fn toggle_input(&mut self) {
        self.focused_input = match self.focused_input {
            FocusedInput::Title => FocusedInput::Content,
            FocusedInput::Content => FocusedInput::Thumbnail,
            FocusedInput::Thumbnail => FocusedInput::Title,
        };
    }

    fn save_note(&mut self, view_model: &mut HomeViewModel) {
        let title = self.title_input.value().trim();
        if title.is_empty() {
            self.status = Some("Title is required".to_string());
            return;
        }
        let thumbnail = match self.thumbnail_input.value().trim() {
            "" => NoteType::Text.as_str(),
            value => value,
        };

        let saved = match &self.note {
            Some(existing) => {
                let note = Note {
                    title: title.to_string(),
                    content: self.content_input.value().to_string(),
                    thumbnail: thumbnail.to_string(),
                    ..existing.clone()
                };
                view_model.update_note(&note).map(|()| note)
            }
            None => {
                let note = Note::new(title, self.content_input.value(), thumbnail);
                view_model.add_note(&note).map(|()| note)
            }
        };

        match saved {
            Ok(note) => {
                self.note = Some(note);
                self.status = Some("Saved".to_string());
            }
            Err(error) => {
                tracing::error!("Failed to save note: {error}");
                self.status = Some("Could not save the note".to_string());
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Max(3),
                Constraint::Max(3),
                Constraint::Min(1),
                Constraint::Max(1),
            ])
            .split(frame.area());

        let help_message = match &self.status {
            Some(status) => Line::from(status.as_str()).bold().yellow(),
            None => Line::from_iter([
                "Esc".bold().yellow(),
                " back, ".to_span(),
                "Ctrl+S".bold().yellow(),
                " save, ".to_span(),
                "Tab".bold().yellow(),
                " switch input focus.".to_span(),
            ]),
        };

        self.render_input(frame, layout[0], FocusedInput::Title);
        self.render_input(frame, layout[1], FocusedInput::Thumbnail);
        self.render_input(frame, layout[2], FocusedInput::Content);
        frame.render_widget(help_message.centered(), layout[3]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, field: FocusedInput) {
        let (input, title) = match field {
            FocusedInput::Title => (&self.title_input, "Title"),
            FocusedInput::Content => (&self.content_input, "Content"),
            FocusedInput::Thumbnail => {
                (&self.thumbnail_input, "Thumbnail (AUDIO, TEXT or image path)")
            }
        };

        let mut paragraph = Paragraph::new(input.value());
        if field == FocusedInput::Title {
            paragraph = paragraph.style(Style::default().bold());
        }
        let mut block = Block::bordered().title(title);

        if self.focused_input == field {
            block = block.border_style(Style::new().yellow());
            let width = area.width.max(3) - 3;
            let scroll = input.visual_scroll(width as usize);
            paragraph = paragraph.scroll((0, scroll as u16));

            let x = input.visual_cursor().max(scroll) - scroll + 1;
            frame.set_cursor_position((area.x + x as u16, area.y + 1));
        }

        frame.render_widget(paragraph.block(block), area);
    }
}
