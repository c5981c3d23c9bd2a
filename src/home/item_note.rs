use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph, Widget},
};

use super::centered;
use crate::image_loader::{Pixels, THUMBNAIL_COLS, THUMBNAIL_ROWS};
use crate::models::{Note, NoteType};

/// Card height including its border.
pub const ITEM_HEIGHT: u16 = THUMBNAIL_ROWS + 2;

const MICROPHONE: [&str; 3] = ["  ▐▌  ", " ╰▐▌╯ ", "  ╶┴╴ "];
const TITLE: [&str; 3] = [" ▀██▀ ", "  ██  ", "  ▀▀  "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Microphone,
    Title,
}

impl Icon {
    fn glyph(self) -> [&'static str; 3] {
        match self {
            Self::Microphone => MICROPHONE,
            Self::Title => TITLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumbnail<'a> {
    Icon(Icon),
    /// Passed to the image loader as is.
    Image(&'a str),
}

pub fn resolve_thumbnail(tag: &str) -> Thumbnail<'_> {
    if tag == NoteType::Audio.as_str() {
        Thumbnail::Icon(Icon::Microphone)
    } else if tag == NoteType::Text.as_str() {
        Thumbnail::Icon(Icon::Title)
    } else {
        Thumbnail::Image(tag)
    }
}

/// One row of the home list.
pub struct ItemNote<'a> {
    note: &'a Note,
    image: Option<&'a Pixels>,
    selected: bool,
}

impl<'a> ItemNote<'a> {
    pub fn new(note: &'a Note) -> Self {
        Self {
            note,
            image: None,
            selected: false,
        }
    }

    /// Decoded thumbnail, when the note references an image that has loaded.
    pub fn image(mut self, image: Option<&'a Pixels>) -> Self {
        self.image = image;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for ItemNote<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut block = Block::bordered();
        if self.selected {
            block = block.border_style(Style::new().yellow());
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(80), Constraint::Percentage(20)])
            .split(inner);

        let text = Paragraph::new(vec![
            Line::from(self.note.title.as_str()).bold(),
            Line::default(),
            Line::from(self.note.display_date()).dark_gray(),
        ]);
        text.render(columns[0].inner(Margin::new(1, 0)), buf);

        let square = centered(columns[1], THUMBNAIL_COLS, THUMBNAIL_ROWS);
        match resolve_thumbnail(&self.note.thumbnail) {
            Thumbnail::Icon(icon) => {
                Paragraph::new(icon.glyph().map(Line::from).to_vec())
                    .alignment(Alignment::Center)
                    .render(square, buf);
            }
            Thumbnail::Image(_) => {
                if let Some(pixels) = self.image {
                    render_pixels(pixels, square, buf);
                }
            }
        }
    }
}

/// Two pixels per cell: the upper half block takes the top pixel as its
/// foreground and the bottom pixel as its background.
fn render_pixels(pixels: &Pixels, area: Rect, buf: &mut Buffer) {
    let rows = area.height.min(u16::try_from(pixels.height() / 2).unwrap_or(u16::MAX));
    let cols = area.width.min(u16::try_from(pixels.width()).unwrap_or(u16::MAX));
    for row in 0..rows {
        for col in 0..cols {
            let (x, y) = (u32::from(col), u32::from(row) * 2);
            let (Some(top), Some(bottom)) = (pixels.get(x, y), pixels.get(x, y + 1)) else {
                continue;
            };
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol("▀")
                    .set_fg(Color::Rgb(top[0], top[1], top[2]))
                    .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn thumbnail_tags_pick_icons_first() {
        assert_eq!(resolve_thumbnail("AUDIO"), Thumbnail::Icon(Icon::Microphone));
        assert_eq!(resolve_thumbnail("TEXT"), Thumbnail::Icon(Icon::Title));
    }

    #[test]
    fn other_tags_are_image_references_unmodified() {
        for tag in ["/home/me/cover.png", "file:///tmp/a.jpg", "text", " TEXT", ""] {
            assert_eq!(resolve_thumbnail(tag), Thumbnail::Image(tag));
        }
    }

    fn render(note: &Note, width: u16) -> Buffer {
        let area = Rect::new(0, 0, width, ITEM_HEIGHT);
        let mut buf = Buffer::empty(area);
        ItemNote::new(note).render(area, &mut buf);
        buf
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn shows_title_date_and_icon() {
        let note = Note::new("Groceries", "", "TEXT");
        let buf = render(&note, 50);

        assert!(line(&buf, 1).contains("Groceries"));
        assert!(line(&buf, 3).contains(&note.display_date()));
        assert!(line(&buf, 1).contains("▀██▀"));
    }

    #[test]
    fn audio_notes_show_the_microphone() {
        let buf = render(&Note::new("Memo", "", "AUDIO"), 50);

        assert!(line(&buf, 2).contains("╰▐▌╯"));
    }

    #[test]
    fn unloaded_images_leave_the_thumbnail_blank() {
        let buf = render(&Note::new("Photo", "", "/tmp/none.png"), 50);

        assert!(!line(&buf, 1).contains('▀'));
    }

    #[test]
    fn loaded_images_render_as_half_blocks() {
        let rgb = (0..6)
            .flat_map(|y| {
                let color = if y % 2 == 0 { [255, 0, 0] } else { [0, 0, 255] };
                [color; 6]
            })
            .collect();
        let pixels = Pixels::from_rgb(6, 6, rgb);
        let note = Note::new("Photo", "", "/tmp/x.png");
        let area = Rect::new(0, 0, 50, ITEM_HEIGHT);
        let mut buf = Buffer::empty(area);

        ItemNote::new(&note).image(Some(&pixels)).render(area, &mut buf);

        let halves: Vec<_> = buf
            .content()
            .iter()
            .filter(|cell| cell.symbol() == "▀")
            .collect();
        assert_eq!(halves.len(), 18);
        for cell in halves {
            assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
            assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
        }
    }
}
