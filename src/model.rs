use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::columns::ColumnKey;
use crate::domain::{HELP_TEXT, Message, TableConfig};
use crate::layout::{HANDLE_WIDTH, HEADER_GAP, STATUSLINE_HEIGHT, checkbox_lines, px_to_cells};
use crate::product::Product;
use crate::state::{SortDescriptor, SortDirection, TableState};
use crate::view::{TableViewData, sort_glyph};

/// Border around the table plus spacer, header line and status line.
/// The checkbox bar comes on top and depends on the width.
const TABLE_CHROME_HEIGHT: usize = 2 + HEADER_GAP as usize + 1 + STATUSLINE_HEIGHT as usize;
const TABLE_CHROME_WIDTH: usize = 2;
const SCROLL_STEP: u16 = 4;

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Popup,
}

/// The single mutable store of the application.
///
/// Every change goes through [`Model::update`] and bumps the revision, which is
/// what the UI watches to decide when the derived projection is stale.
pub struct Model {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    name: String,
    products: Vec<Product>,
    state: TableState,
    rows: Arc<Vec<usize>>, // Display position -> index into products
    curser_row: usize,
    offset_row: usize,
    selected_column: usize, // Index into the visible columns
    scroll_x: u16,
    table_width: usize,
    table_height: usize,
    revision: u64,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &TableConfig,
        name: impl Into<String>,
        products: Vec<Product>,
        state: TableState,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let rows = Arc::new(state.sorted_indices(&products));
        let mut model = Self {
            config: config.clone(),
            status: Status::Ready,
            modus: Modus::Table,
            name: name.into(),
            products,
            state,
            rows,
            curser_row: 0,
            offset_row: 0,
            selected_column: 0,
            scroll_x: 0,
            table_width: 0,
            table_height: 0,
            revision: 0,
            status_message: String::new(),
        };
        model.ui_resize(ui_width, ui_height);
        model.set_status_message(format!("Loaded {} products", model.products.len()));
        model
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::Table => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::MoveUp => self.move_selection_up(1),
                Message::MoveDown => self.move_selection_down(1),
                Message::MovePageUp => self.move_selection_up(self.table_height.max(1)),
                Message::MovePageDown => self.move_selection_down(self.table_height.max(1)),
                Message::MoveBeginning => self.select_row(0),
                Message::MoveEnd => self.select_row(self.rows.len().saturating_sub(1)),
                Message::MoveLeft => self.move_column_selection(-1),
                Message::MoveRight => self.move_column_selection(1),
                Message::ScrollLeft => self.scroll_by(-i32::from(SCROLL_STEP)),
                Message::ScrollRight => self.scroll_by(i32::from(SCROLL_STEP)),
                Message::ToggleSort(key) => self.toggle_sort(key),
                Message::ToggleSortSelected => {
                    if let Some(key) = self.selected_key() {
                        self.toggle_sort(key)
                    }
                }
                Message::ToggleVisibility(key) => self.toggle_visibility(key),
                Message::ToggleVisibilitySelected => {
                    if let Some(key) = self.selected_key() {
                        self.toggle_visibility(key)
                    }
                }
                Message::ToggleVisibilityNth(nth) => {
                    if let Some(key) = self.state.columns().get(nth).map(|c| c.key) {
                        self.toggle_visibility(key)
                    }
                }
                Message::BeginResize(key, px) => self.state.begin_resize(key, px),
                Message::UpdateResize(px) => {
                    if let Some(key) = self.state.resizing() {
                        self.state.update_resize(key, px);
                    }
                }
                Message::EndResize => self.state.end_resize(),
                Message::NarrowSelected => self.resize_selected(-i32::from(self.config.cell_px)),
                Message::WidenSelected => self.resize_selected(i32::from(self.config.cell_px)),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit => {}
            },
            Modus::Popup => match msg {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::Help => self.exit_popup(),
                // A release can arrive while the popup is open and must still end the gesture
                Message::EndResize => self.state.end_resize(),
                _ => (),
            },
        }
        self.revision += 1;
    }

    // -------------------- Accessors used by the UI ---------------------- //

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Products in display order.
    pub fn sorted_rows(&self) -> Vec<&Product> {
        self.rows.iter().map(|&idx| &self.products[idx]).collect()
    }

    pub fn view_data(&self) -> TableViewData {
        TableViewData::build(&self.state, &self.products, &self.rows)
    }

    pub fn offset_row(&self) -> usize {
        self.offset_row
    }

    pub fn curser_row(&self) -> usize {
        self.curser_row
    }

    pub fn scroll_x(&self) -> u16 {
        self.scroll_x
    }

    pub fn selected_key(&self) -> Option<ColumnKey> {
        self.state
            .visible_columns()
            .get(self.selected_column)
            .map(|c| c.key)
    }

    pub fn show_popup(&self) -> bool {
        self.modus == Modus::Popup
    }

    pub fn popup_message(&self) -> &str {
        HELP_TEXT
    }

    pub fn status_line(&self) -> String {
        let sort = match self.state.sort() {
            Some(SortDescriptor { key, direction }) => format!("{key} {}", sort_glyph(direction)),
            None => "none".to_string(),
        };
        let position = if self.rows.is_empty() {
            0
        } else {
            self.offset_row + self.curser_row + 1
        };
        format!(
            " {}/{} | sort: {} | {}",
            position,
            self.rows.len(),
            sort,
            self.status_message
        )
    }

    // -------------------- Control handling functions ---------------------- //

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    fn show_help(&mut self) {
        self.modus = Modus::Popup;
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = Modus::Table;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.table_width, width, self.table_height, height
        );
        self.table_width = width.saturating_sub(TABLE_CHROME_WIDTH);
        let bar_width = u16::try_from(self.table_width).unwrap_or(u16::MAX);
        let bar_lines = checkbox_lines(self.state.columns().iter().map(|c| c.key), bar_width);
        self.table_height = height.saturating_sub(TABLE_CHROME_HEIGHT + usize::from(bar_lines));
        self.scroll_x = self.scroll_x.min(self.max_scroll());
        self.select_row(self.offset_row + self.curser_row);
    }

    fn toggle_sort(&mut self, key: ColumnKey) {
        let start_time = Instant::now();
        let selected = self.rows.get(self.offset_row + self.curser_row).copied();

        self.state.toggle_sort(key);
        self.rows = Arc::new(self.state.sorted_indices(&self.products));
        debug!(
            "Sorted {} rows in {}ms",
            self.rows.len(),
            start_time.elapsed().as_millis()
        );

        // Keep the cursor on the record it was on
        if let Some(position) = selected.and_then(|s| self.rows.iter().position(|&r| r == s)) {
            self.select_row(position);
        }
        let message = match self.state.sort() {
            Some(SortDescriptor {
                key,
                direction: SortDirection::Ascending,
            }) => format!("Sorted by {key} ascending"),
            Some(SortDescriptor {
                key,
                direction: SortDirection::Descending,
            }) => format!("Sorted by {key} descending"),
            None => "Original order".to_string(),
        };
        self.set_status_message(message);
    }

    fn toggle_visibility(&mut self, key: ColumnKey) {
        if !self.state.column(key).is_some_and(|c| c.hideable) {
            self.set_status_message(format!("Column {key} can not be hidden"));
            return;
        }
        let selected = self.selected_key();
        self.state.toggle_visibility(key);

        let visible = self.state.visible_columns();
        self.selected_column = selected
            .and_then(|s| visible.iter().position(|c| c.key == s))
            .unwrap_or(self.selected_column)
            .min(visible.len().saturating_sub(1));
        self.scroll_x = self.scroll_x.min(self.max_scroll());

        let status = if self.state.is_visible(key) {
            "shown"
        } else {
            "hidden"
        };
        info!("Column {key} {status}");
        self.set_status_message(format!("Column {key} {status}"));
    }

    fn resize_selected(&mut self, delta: i32) {
        if let Some(key) = self.selected_key() {
            self.state.resize_by(key, delta);
            if let Some(width) = self.state.width(key) {
                self.set_status_message(format!("Column {key} width {width}px"));
            }
        }
    }

    fn content_width(&self) -> usize {
        self.state
            .visible_columns()
            .iter()
            .map(|c| {
                let width = self.state.width(c.key).unwrap_or(c.width);
                usize::from(px_to_cells(width, self.config.cell_px)) + usize::from(HANDLE_WIDTH)
            })
            .sum()
    }

    fn max_scroll(&self) -> u16 {
        self.content_width()
            .saturating_sub(self.table_width)
            .min(usize::from(u16::MAX)) as u16
    }

    fn scroll_by(&mut self, delta: i32) {
        let scroll = (i32::from(self.scroll_x) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll_x = scroll as u16;
    }

    fn move_column_selection(&mut self, step: i32) {
        let count = self.state.visible_columns().len();
        if count == 0 {
            return;
        }
        let next = (self.selected_column as i64 + i64::from(step)).clamp(0, count as i64 - 1);
        self.selected_column = next as usize;
    }

    /// Moves the cursor to an absolute display row, shifting the window when needed.
    fn select_row(&mut self, row: usize) {
        if self.rows.is_empty() {
            self.curser_row = 0;
            self.offset_row = 0;
            return;
        }
        let row = row.min(self.rows.len() - 1);
        let height = self.table_height.max(1);
        if row < self.offset_row {
            self.offset_row = row;
        } else if row >= self.offset_row + height {
            self.offset_row = row + 1 - height;
        }
        self.curser_row = row - self.offset_row;
    }

    fn move_selection_up(&mut self, size: usize) {
        let current = self.offset_row + self.curser_row;
        self.select_row(current.saturating_sub(size));
    }

    fn move_selection_down(&mut self, size: usize) {
        let current = self.offset_row + self.curser_row;
        self.select_row(current.saturating_add(size));
    }
}
