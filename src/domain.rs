use derive_setters::Setters;
use polars::error::PolarsError;
use std::io::Error;
use thiserror::Error;

use crate::columns::ColumnKey;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("failed reading data: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type (expected csv, parquet or arrow)")]
    UnknownFileType,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to set up logging: {0}")]
    LoggingFailed(String),
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    /// Milliseconds to wait for a terminal event before redrawing.
    pub event_poll_time: u64,
    /// Pixels represented by one terminal cell.
    pub cell_px: u16,
    /// Lower bound for a column width while resizing, in pixels.
    pub min_column_width: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            cell_px: 6,
            min_column_width: 6,
        }
    }
}

/// Everything that can change the model. Produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    ScrollLeft,
    ScrollRight,
    ToggleSort(ColumnKey),
    ToggleSortSelected,
    ToggleVisibility(ColumnKey),
    ToggleVisibilitySelected,
    ToggleVisibilityNth(usize),
    BeginResize(ColumnKey, i32),
    UpdateResize(i32),
    EndResize,
    NarrowSelected,
    WidenSelected,
    Resize(usize, usize),
}

pub const HELP_TEXT: &str = "\
q          quit
←/→        select column
↑/↓        move row cursor
PgUp/PgDn  move a page
Home/End   first / last row
s, Enter   toggle sort of the selected column
space      show / hide the selected column
1-6        show / hide column by number
< / >      narrow / widen the selected column
h / l      scroll left / right
?          this help, Esc to close

Mouse: click a checkbox to show / hide, click a header to sort,
drag the │ handle at a header's right edge to resize.";
