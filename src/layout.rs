use ratatui::layout::{Position, Rect};

use crate::columns::ColumnKey;
use crate::view::TableViewData;

pub const CHECKBOX_GAP: u16 = 2;
/// Blank line between the checkbox bar and the header line.
pub const HEADER_GAP: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const HANDLE_WIDTH: u16 = 1;

/// Converts a pixel width into terminal cells. Any positive width gets at least one cell.
pub fn px_to_cells(px: u32, cell_px: u16) -> u16 {
    if px == 0 {
        return 0;
    }
    let cell_px = u32::from(cell_px.max(1));
    ((px + cell_px / 2) / cell_px).clamp(1, u32::from(u16::MAX)) as u16
}

pub fn checkbox_label(key: ColumnKey, checked: bool) -> String {
    format!("[{}] {}", if checked { 'x' } else { ' ' }, key)
}

/// Places one checkbox per key left to right, wrapping onto the next line
/// when a label does not fit. Rects are relative to the top left of the bar.
fn place_checkboxes(
    keys: impl IntoIterator<Item = ColumnKey>,
    width: u16,
) -> Vec<(ColumnKey, Rect)> {
    let mut placed = Vec::new();
    if width == 0 {
        return placed;
    }
    let (mut x, mut line) = (0u16, 0u16);
    for key in keys {
        let label = (checkbox_label(key, true).chars().count() as u16).min(width);
        if x > 0 && x.saturating_add(label) > width {
            x = 0;
            line = line.saturating_add(1);
        }
        placed.push((key, Rect::new(x, line, label, 1)));
        x = x.saturating_add(label).saturating_add(CHECKBOX_GAP);
    }
    placed
}

/// Lines the checkbox bar needs for these columns at the given width.
pub fn checkbox_lines(keys: impl IntoIterator<Item = ColumnKey>, width: u16) -> u16 {
    place_checkboxes(keys, width)
        .last()
        .map_or(0, |(_, rect)| rect.y.saturating_add(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Checkbox(ColumnKey),
    Header(ColumnKey),
    Handle(ColumnKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub key: ColumnKey,
    /// Offset of the column from the left edge of the unscrolled table, in cells.
    pub start: u16,
    pub width: u16,
    /// Screen area of the header cell, None when scrolled out of view.
    pub header: Option<Rect>,
    pub handle: Option<Rect>,
}

/// Screen geometry of one frame of the table, used for drawing and hit testing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableLayout {
    pub area: Rect,
    pub checkboxes: Vec<(ColumnKey, Rect)>,
    pub columns: Vec<ColumnLayout>,
    /// None when the area is too low to show the header line.
    pub header_y: Option<u16>,
    pub body: Rect,
    pub status: Rect,
    pub scroll_x: u16,
    pub content_width: u16,
}

impl TableLayout {
    pub fn compute(area: Rect, view: &TableViewData, scroll_x: u16, cell_px: u16) -> Self {
        let status_y = area
            .bottom()
            .saturating_sub(STATUSLINE_HEIGHT)
            .max(area.y);
        let status = Rect::new(area.x, status_y, area.width, STATUSLINE_HEIGHT.min(area.height));

        let placed = place_checkboxes(view.checkboxes.iter().map(|c| c.key), area.width);
        let lines = placed
            .last()
            .map_or(0, |(_, rect)| rect.y.saturating_add(1));
        let checkboxes = placed
            .into_iter()
            .map(|(key, rect)| {
                let rect = Rect::new(
                    area.x.saturating_add(rect.x),
                    area.y.saturating_add(rect.y),
                    rect.width,
                    1,
                );
                (key, rect)
            })
            .filter(|(_, rect)| rect.y < status_y)
            .collect();

        let first_free = area.y.saturating_add(lines).saturating_add(HEADER_GAP);
        let header_y = (first_free < status_y).then_some(first_free);

        let mut columns = Vec::with_capacity(view.headers.len());
        let mut start: u16 = 0;
        for header in view.headers.iter() {
            let width = px_to_cells(header.width, cell_px);
            let header_rect =
                header_y.and_then(|y| Self::clip(area, start, width, scroll_x, y));
            let handle_rect = header_y
                .filter(|_| header.resizable)
                .and_then(|y| {
                    Self::clip(area, start.saturating_add(width), HANDLE_WIDTH, scroll_x, y)
                });
            columns.push(ColumnLayout {
                key: header.key,
                start,
                width,
                header: header_rect,
                handle: handle_rect,
            });
            start = start.saturating_add(width).saturating_add(HANDLE_WIDTH);
        }

        let body_y = first_free.saturating_add(1).min(status_y);
        let body = Rect::new(area.x, body_y, area.width, status_y.saturating_sub(body_y));

        TableLayout {
            area,
            checkboxes,
            columns,
            header_y,
            body,
            status,
            scroll_x,
            content_width: start,
        }
    }

    /// Screen rect of a span of the unscrolled table, clipped to the area.
    fn clip(area: Rect, start: u16, width: u16, scroll_x: u16, y: u16) -> Option<Rect> {
        let left = i32::from(area.x) + i32::from(start) - i32::from(scroll_x);
        let right = left + i32::from(width);
        let left = left.max(i32::from(area.x));
        let right = right.min(i32::from(area.right()));
        (right > left).then(|| Rect::new(left as u16, y, (right - left) as u16, 1))
    }

    /// Screen x of a column offset, may lie outside the area.
    pub fn screen_x(&self, start: u16) -> i32 {
        i32::from(self.area.x) + i32::from(start) - i32::from(self.scroll_x)
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_width.saturating_sub(self.area.width)
    }

    /// Resize handles win over the header they belong to.
    pub fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let position = Position::new(x, y);
        if let Some(column) = self
            .columns
            .iter()
            .find(|c| c.handle.is_some_and(|r| r.contains(position)))
        {
            return Some(Hit::Handle(column.key));
        }
        if let Some(column) = self
            .columns
            .iter()
            .find(|c| c.header.is_some_and(|r| r.contains(position)))
        {
            return Some(Hit::Header(column.key));
        }
        self.checkboxes
            .iter()
            .find(|(_, r)| r.contains(position))
            .map(|(key, _)| Hit::Checkbox(*key))
    }
}
