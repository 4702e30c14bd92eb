use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Clear, Paragraph, Widget},
};
use tracing::trace;

use crate::columns::CellContent;
use crate::domain::TableConfig;
use crate::layout::{TableLayout, checkbox_label};
use crate::model::Model;
use crate::view::{TableViewData, sort_glyph};

pub const HANDLE_SYMBOL: &str = "│";
pub const HANDLE_SYMBOL_ACTIVE: &str = "┃";
pub const IMAGE_SYMBOL: &str = "▣";

const POPUP_WIDTH: u16 = 72;
const POPUP_HEIGHT: u16 = 18;

/// Renders the model. Keeps the projection of the last seen revision and the
/// layout of the last frame, which the controller uses for hit testing.
pub struct TableUI {
    cell_px: u16,
    cached: Option<(u64, TableViewData)>,
    layout: TableLayout,
}

struct ProductTable<'a> {
    model: &'a Model,
    view: &'a TableViewData,
    layout: &'a TableLayout,
}

impl TableUI {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            cell_px: config.cell_px,
            cached: None,
            layout: TableLayout::default(),
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Re-derives the projection when the model changed since the last draw.
    fn refresh(&mut self, model: &Model) {
        let stale = !matches!(&self.cached, Some((revision, _)) if *revision == model.revision());
        if stale {
            trace!("Rebuilding view data for revision {}", model.revision());
            self.cached = Some((model.revision(), model.view_data()));
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let area = frame.area();
        let title = Line::from(format!(" {} ", model.name()).bold());
        let instructions = Line::from(vec![
            " Sort ".into(),
            "<S>".blue().bold(),
            " Show/Hide ".into(),
            "<Space>".blue().bold(),
            " Help ".into(),
            "<?>".blue().bold(),
            " Quit ".into(),
            "<Q> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.refresh(model);
        let Some((_, view)) = &self.cached else {
            return;
        };
        let layout = TableLayout::compute(inner, view, model.scroll_x(), self.cell_px);
        frame.render_widget(
            ProductTable {
                model,
                view,
                layout: &layout,
            },
            inner,
        );
        self.layout = layout;

        if model.show_popup() {
            let popup = popup_area(area, POPUP_WIDTH, POPUP_HEIGHT);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(model.popup_message())
                    .block(Block::bordered().title(Line::from(" Help ").centered())),
                popup,
            );
        }
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

impl ProductTable<'_> {
    /// Draws text into a span of the unscrolled table, clipping it to the visible area.
    fn draw_span(&self, buf: &mut Buffer, start: u16, width: u16, y: u16, text: &str, style: Style) {
        let area = self.layout.area;
        if y < area.y || y >= area.bottom() {
            return;
        }
        let left = self.layout.screen_x(start);
        let right = (left + i32::from(width)).min(i32::from(area.right()));
        let skip = (i32::from(area.x) - left).max(0) as usize;
        let x = left.max(i32::from(area.x));
        if right <= x {
            return;
        }
        let visible: String = text.chars().skip(skip).collect();
        buf.set_stringn(x as u16, y, visible, (right - x) as usize, style);
    }

    fn render_checkboxes(&self, buf: &mut Buffer) {
        for (checkbox, (_, rect)) in self.view.checkboxes.iter().zip(self.layout.checkboxes.iter()) {
            let style = if checkbox.enabled {
                Style::new()
            } else {
                Style::new().fg(Color::DarkGray)
            };
            let label = checkbox_label(checkbox.key, checkbox.checked);
            buf.set_stringn(rect.x, rect.y, label, usize::from(rect.width), style);
        }
    }

    fn render_headers(&self, buf: &mut Buffer) {
        let Some(y) = self.layout.header_y else {
            return;
        };
        let selected = self.model.selected_key();
        for (header, column) in self.view.headers.iter().zip(self.layout.columns.iter()) {
            let text = match header.sort {
                Some(direction) => format!("{} {}", header.label, sort_glyph(direction)),
                None => header.label.to_string(),
            };
            let mut style = Style::new().bold();
            if selected == Some(header.key) {
                style = style.reversed();
            }
            if let Some(rect) = column.header {
                buf.set_style(rect, Style::new().bg(Color::Gray).fg(Color::Black));
            }
            self.draw_span(buf, column.start, column.width, y, &text, style);

            if let Some(handle) = column.handle {
                let (symbol, style) = if header.resizing {
                    (HANDLE_SYMBOL_ACTIVE, Style::new().fg(Color::Yellow).bold())
                } else {
                    (HANDLE_SYMBOL, Style::new().fg(Color::DarkGray))
                };
                buf.set_string(handle.x, handle.y, symbol, style);
            }
        }
    }

    fn render_rows(&self, buf: &mut Buffer) {
        let body = self.layout.body;
        let offset = self.model.offset_row();
        let curser = self.model.curser_row();
        for line in 0..body.height {
            let Some(row) = self.view.rows.get(offset + usize::from(line)) else {
                break;
            };
            let y = body.y + line;
            let row_style = if usize::from(line) == curser {
                Style::new().bg(Color::DarkGray)
            } else if (offset + usize::from(line)) % 2 == 0 {
                Style::new()
            } else {
                Style::new().bg(Color::Black)
            };
            buf.set_style(Rect::new(body.x, y, body.width, 1), row_style);

            for (cell, column) in row.cells.iter().zip(self.layout.columns.iter()) {
                match cell {
                    CellContent::Text(text) => {
                        self.draw_span(buf, column.start, column.width, y, text, Style::new())
                    }
                    CellContent::Image { src } => {
                        let text = format!("{IMAGE_SYMBOL} {src}");
                        let style = Style::new().fg(Color::Cyan).italic();
                        self.draw_span(buf, column.start, column.width, y, &text, style)
                    }
                }
                let separator = Style::new().fg(Color::DarkGray);
                self.draw_span(
                    buf,
                    column.start.saturating_add(column.width),
                    1,
                    y,
                    HANDLE_SYMBOL,
                    separator,
                );
            }
        }
    }

    fn render_status(&self, buf: &mut Buffer) {
        let status = self.layout.status;
        if status.height == 0 || status.y < self.layout.area.y {
            return;
        }
        Paragraph::new(self.model.status_line())
            .style(Style::new().fg(Color::Yellow))
            .render(status, buf);
    }
}

impl Widget for ProductTable<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        self.render_checkboxes(buf);
        self.render_headers(buf);
        self.render_rows(buf);
        self.render_status(buf);
    }
}
