//! The home screen: every note as a card, a button to add one, and a
//! confirmation dialog before anything is deleted.

mod item_note;

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Position, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, ToSpan},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::gesture::{Gesture, GestureDetector};
use crate::image_loader::{ImageLoader, ImageState};
use crate::models::{NoteId, UiState};
use crate::state::{StateFlow, Watcher};
use crate::view_model::HomeViewModel;

use item_note::{ITEM_HEIGHT, ItemNote, Thumbnail, resolve_thumbnail};

pub const APP_NAME: &str = "Anota";

const WATERMARK: [&str; 5] = [
    " ▄▄▄▄▄▄▄▄ ",
    " █ ▄▄▄▄ █ ",
    " █ ▄▄▄▄ █ ",
    " █ ▄▄   █ ",
    " ▀▀▀▀▀▀▀▀ ",
];

const LIST_PADDING: u16 = 1;
const ROW_SPACING: u16 = 1;
const FAB_WIDTH: u16 = 7;
const FAB_HEIGHT: u16 = 3;
const DIALOG_WIDTH: u16 = 44;
const DIALOG_HEIGHT: u16 = 7;
const CONFIRM_LABEL: &str = "[ Yes ]";
const DISMISS_LABEL: &str = "[ No ]";

/// Where the home screen sends the user. Every hook defaults to doing nothing.
pub trait HomeNavigator {
    fn on_add_new_note(&mut self) {}

    fn on_open_note(&mut self, _id: &NoteId) {}

    fn on_open_profile(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Button {
    Menu,
    Settings,
    Fab,
    Confirm,
    Dismiss,
}

#[derive(Debug, Clone, Copy)]
struct DialogHits {
    area: Rect,
    confirm: Rect,
    dismiss: Rect,
}

/// Clickable regions of the last frame.
#[derive(Debug, Default)]
struct HitMap {
    menu: Rect,
    settings: Rect,
    fab: Rect,
    rows: Vec<(Rect, usize)>,
    dialog: Option<DialogHits>,
}

impl HitMap {
    fn button_at(&self, position: Position, modal: bool) -> Option<Button> {
        if modal {
            let dialog = self.dialog?;
            return if dialog.confirm.contains(position) {
                Some(Button::Confirm)
            } else if dialog.dismiss.contains(position) {
                Some(Button::Dismiss)
            } else {
                None
            };
        }

        [
            (self.fab, Button::Fab),
            (self.menu, Button::Menu),
            (self.settings, Button::Settings),
        ]
        .into_iter()
        .find_map(|(rect, button)| rect.contains(position).then_some(button))
    }

    fn row_at(&self, position: Position) -> Option<usize> {
        self.rows
            .iter()
            .find_map(|(rect, index)| rect.contains(position).then_some(*index))
    }
}

pub struct HomeScreen {
    watcher: Watcher<UiState>,
    state: UiState,
    selected: usize,
    offset: usize,
    gestures: GestureDetector<usize>,
    pressed_button: Option<Button>,
    hits: HitMap,
}

impl HomeScreen {
    pub fn new(ui_state: &StateFlow<UiState>, long_press_timeout: Duration) -> Self {
        let mut watcher = ui_state.watch();
        let state = watcher.changed().unwrap_or_default();

        Self {
            watcher,
            state,
            selected: 0,
            offset: 0,
            gestures: GestureDetector::new(long_press_timeout),
            pressed_button: None,
            hits: HitMap::default(),
        }
    }

    /// Takes the latest emitted state, if there is a new one.
    pub fn sync(&mut self) -> bool {
        let Some(state) = self.watcher.changed() else {
            return false;
        };
        self.state = state;
        self.selected = self
            .selected
            .min(self.state.notes.len().saturating_sub(1));
        if self.is_dialog_open() {
            self.gestures.cancel();
        }
        true
    }

    pub fn is_dialog_open(&self) -> bool {
        self.state.item_to_delete.is_some()
    }

    /// When the screen needs a tick even without input.
    pub fn deadline(&self) -> Option<Instant> {
        self.gestures.deadline()
    }

    /// Returns whether the event was used by the screen.
    pub fn handle_event(
        &mut self,
        event: &Event,
        now: Instant,
        view_model: &mut HomeViewModel,
        navigator: &mut dyn HomeNavigator,
    ) -> bool {
        let consumed = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(key, view_model, navigator)
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, now, view_model, navigator),
            _ => false,
        };
        self.sync();
        consumed
    }

    /// Fires a pending long-press once its timeout has passed.
    pub fn tick(&mut self, now: Instant, view_model: &mut HomeViewModel) {
        if let Some(Gesture::LongPress(index)) = self.gestures.tick(now) {
            self.long_press(index, view_model);
            self.sync();
        }
    }

    fn handle_key(
        &mut self,
        key: &KeyEvent,
        view_model: &mut HomeViewModel,
        navigator: &mut dyn HomeNavigator,
    ) -> bool {
        if self.is_dialog_open() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(view_model),
                KeyCode::Char('n') | KeyCode::Esc => self.dismiss_delete(view_model),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Enter => self.tap(self.selected, navigator),
            KeyCode::Char('d') | KeyCode::Delete => self.long_press(self.selected, view_model),
            KeyCode::Char('a') => navigator.on_add_new_note(),
            KeyCode::Char('p') => navigator.on_open_profile(),
            _ => return false,
        }
        true
    }

    fn handle_mouse(
        &mut self,
        mouse: &MouseEvent,
        now: Instant,
        view_model: &mut HomeViewModel,
        navigator: &mut dyn HomeNavigator,
    ) -> bool {
        let position = Position::new(mouse.column, mouse.row);
        let modal = self.is_dialog_open();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(dialog) = self.hits.dialog.filter(|_| modal) {
                    if !dialog.area.contains(position) {
                        self.dismiss_delete(view_model);
                        return true;
                    }
                }
                if let Some(button) = self.hits.button_at(position, modal) {
                    self.pressed_button = Some(button);
                } else if !modal {
                    let Some(index) = self.hits.row_at(position) else {
                        return false;
                    };
                    self.selected = index;
                    self.gestures.press(index, now);
                }
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(button) = self.pressed_button.take() {
                    if self.hits.button_at(position, modal) == Some(button) {
                        self.click(button, view_model, navigator);
                    }
                    return true;
                }
                let under_pointer = self.hits.row_at(position);
                match self.gestures.release(under_pointer, now) {
                    Some(Gesture::Tap(index)) => self.tap(index, navigator),
                    Some(Gesture::LongPress(index)) => self.long_press(index, view_model),
                    None => {}
                }
                true
            }
            MouseEventKind::ScrollDown if !modal => {
                if self.selected + 1 < self.state.notes.len() {
                    self.selected += 1;
                }
                true
            }
            MouseEventKind::ScrollUp if !modal => {
                self.selected = self.selected.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    fn click(
        &mut self,
        button: Button,
        view_model: &mut HomeViewModel,
        navigator: &mut dyn HomeNavigator,
    ) {
        match button {
            // The menu action is a placeholder.
            Button::Menu => {}
            Button::Settings => navigator.on_open_profile(),
            Button::Fab => navigator.on_add_new_note(),
            Button::Confirm => self.confirm_delete(view_model),
            Button::Dismiss => self.dismiss_delete(view_model),
        }
    }

    fn tap(&mut self, index: usize, navigator: &mut dyn HomeNavigator) {
        if let Some(note) = self.state.notes.get(index) {
            self.selected = index;
            navigator.on_open_note(&note.id);
        }
    }

    fn long_press(&mut self, index: usize, view_model: &mut HomeViewModel) {
        if let Some(note) = self.state.notes.get(index) {
            self.selected = index;
            view_model.set_item_to_delete(Some(note.clone()));
        }
    }

    fn confirm_delete(&mut self, view_model: &mut HomeViewModel) {
        if let Some(note) = self.state.item_to_delete.take() {
            tracing::debug!("Deletion of note {} confirmed", note.id);
            view_model.set_item_to_delete(None);
            view_model.remove_note(note.id);
        }
        self.pressed_button = None;
    }

    fn dismiss_delete(&mut self, view_model: &mut HomeViewModel) {
        view_model.set_item_to_delete(None);
        self.pressed_button = None;
    }

    fn select_next(&mut self) {
        if self.state.notes.is_empty() {
            return;
        }
        if self.selected + 1 >= self.state.notes.len() {
            self.selected = 0;
        } else {
            self.selected += 1;
        }
    }

    fn select_previous(&mut self) {
        if self.state.notes.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.state.notes.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn draw(&mut self, frame: &mut Frame, images: &mut ImageLoader) {
        let area = frame.area();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.hits = HitMap::default();
        self.render_app_bar(frame, layout[0]);
        frame.render_widget(Block::default().borders(Borders::TOP), layout[1]);
        self.render_body(frame, layout[2], images);
        self.render_help(frame, layout[3]);

        if self.is_dialog_open() {
            self.render_dialog(frame, area);
        }
    }

    fn render_app_bar(&mut self, frame: &mut Frame, area: Rect) {
        self.hits.menu = Rect::new(area.x, area.y, 3, 1).intersection(area);
        self.hits.settings =
            Rect::new(area.right().saturating_sub(3), area.y, 3, 1).intersection(area);
        let title =
            Rect::new(area.x + 4, area.y, area.width.saturating_sub(8), 1).intersection(area);

        frame.render_widget(Paragraph::new("[≡]"), self.hits.menu);
        frame.render_widget(Paragraph::new(Line::from(APP_NAME).bold()), title);
        frame.render_widget(Paragraph::new("[⚙]"), self.hits.settings);
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, images: &mut ImageLoader) {
        if self.state.notes.is_empty() {
            let hint = Line::from("No notes yet").dark_gray().centered();
            let middle =
                Rect::new(area.x, area.y + area.height / 2, area.width, 1).intersection(area);
            frame.render_widget(hint, middle);
        }

        images.retain(
            self.state
                .notes
                .iter()
                .filter_map(|note| match resolve_thumbnail(&note.thumbnail) {
                    Thumbnail::Image(reference) => Some(reference),
                    Thumbnail::Icon(_) => None,
                }),
        );

        let list = area.inner(Margin::new(LIST_PADDING, LIST_PADDING));
        let stride = ITEM_HEIGHT + ROW_SPACING;
        let visible = usize::from(((list.height + ROW_SPACING) / stride).max(1));
        self.scroll_to_selected(visible);

        for (slot, index) in (self.offset..self.state.notes.len()).take(visible).enumerate() {
            let y = list.y + slot as u16 * stride;
            if y + ITEM_HEIGHT > list.bottom() {
                break;
            }
            let rect = Rect::new(list.x, y, list.width, ITEM_HEIGHT);
            let note = &self.state.notes[index];
            let image = match resolve_thumbnail(&note.thumbnail) {
                Thumbnail::Image(reference) => match images.request(reference) {
                    ImageState::Ready(pixels) => Some(pixels),
                    ImageState::Loading | ImageState::Failed => None,
                },
                Thumbnail::Icon(_) => None,
            };

            frame.render_widget(
                ItemNote::new(note)
                    .selected(index == self.selected)
                    .image(image),
                rect,
            );
            self.hits.rows.push((rect, index));
        }

        if !self.state.notes.is_empty() {
            render_watermark(frame.buffer_mut(), area);
        }

        self.hits.fab = Rect::new(
            area.right().saturating_sub(FAB_WIDTH + 1),
            area.bottom().saturating_sub(FAB_HEIGHT + 1),
            FAB_WIDTH,
            FAB_HEIGHT,
        )
        .intersection(area);
        frame.render_widget(Clear, self.hits.fab);
        frame.render_widget(
            Paragraph::new("+")
                .bold()
                .alignment(Alignment::Center)
                .block(Block::bordered().border_set(border::ROUNDED).yellow()),
            self.hits.fab,
        );
    }

    fn scroll_to_selected(&mut self, visible: usize) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
        self.offset = self
            .offset
            .min(self.state.notes.len().saturating_sub(visible));
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_message = if self.is_dialog_open() {
            Line::from_iter([
                "y".bold().red(),
                " confirm, ".to_span(),
                "n/Esc".bold().yellow(),
                " cancel".to_span(),
            ])
        } else {
            Line::from_iter([
                "q".bold().yellow(),
                " exit, ".to_span(),
                "a".bold().yellow(),
                " add, ".to_span(),
                "Enter".bold().yellow(),
                " open, ".to_span(),
                "d".bold().red(),
                " delete, ".to_span(),
                "p".bold().yellow(),
                " profile".to_span(),
            ])
        };
        frame.render_widget(help_message.centered(), area);
    }

    fn render_dialog(&mut self, frame: &mut Frame, area: Rect) {
        let title = self
            .state
            .item_to_delete
            .as_ref()
            .map(|note| note.title.as_str())
            .unwrap_or_default();
        let popup = centered(area, DIALOG_WIDTH, DIALOG_HEIGHT);
        let block = Block::bordered()
            .title("Delete note")
            .border_set(border::THICK);
        let inner = block.inner(popup);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Do you want to delete this note?"),
                Line::from(format!("\"{title}\"")).bold(),
            ])
            .block(block),
            popup,
        );

        let buttons_y = inner.y + inner.height.saturating_sub(2);
        let confirm_width = CONFIRM_LABEL.chars().count() as u16;
        let dismiss_width = DISMISS_LABEL.chars().count() as u16;
        let confirm = Rect::new(
            inner.right().saturating_sub(confirm_width + 1),
            buttons_y,
            confirm_width,
            1,
        )
        .intersection(inner);
        let dismiss = Rect::new(
            confirm.x.saturating_sub(dismiss_width + 2),
            buttons_y,
            dismiss_width,
            1,
        )
        .intersection(inner);

        frame.render_widget(Paragraph::new(CONFIRM_LABEL).bold().red(), confirm);
        frame.render_widget(Paragraph::new(DISMISS_LABEL).bold(), dismiss);
        self.hits.dialog = Some(DialogHits {
            area: popup,
            confirm,
            dismiss,
        });
    }
}

/// Paints the logo over the bottom-left corner of `area`. Only blank cells
/// take a glyph.
fn render_watermark(buf: &mut Buffer, area: Rect) {
    let top = area.bottom().saturating_sub(WATERMARK.len() as u16);
    for (dy, line) in WATERMARK.iter().enumerate() {
        for (dx, glyph) in line.chars().enumerate() {
            let position = Position::new(area.x + dx as u16, top + dy as u16);
            if glyph == ' ' || !area.contains(position) {
                continue;
            }
            if let Some(cell) = buf.cell_mut(position) {
                if cell.symbol() == " " {
                    cell.set_char(glyph)
                        .set_style(Style::new().dark_gray().dim());
                }
            }
        }
    }
}

pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
