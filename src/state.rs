use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::trace;

use crate::columns::{CellValue, ColumnDescriptor, ColumnKey, product_columns};
use crate::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDescriptor {
    pub key: ColumnKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeGesture {
    key: ColumnKey,
    pointer_start: i32,
    width_start: u32,
}

/// Sort, visibility and width state of one table view.
///
/// The column schema is captured once on construction and never re-derived.
#[derive(Debug, Clone)]
pub struct TableState {
    columns: Vec<ColumnDescriptor>,
    sort: Option<SortDescriptor>,
    visibility: HashMap<ColumnKey, bool>,
    widths: HashMap<ColumnKey, u32>,
    resizing: Option<ResizeGesture>,
    min_width: u32,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(product_columns())
    }
}

impl TableState {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let visibility = columns.iter().map(|c| (c.key, true)).collect();
        let widths = columns.iter().map(|c| (c.key, c.width)).collect();
        let sort = columns
            .iter()
            .find(|c| c.key == ColumnKey::Name && c.sortable)
            .map(|c| SortDescriptor {
                key: c.key,
                direction: SortDirection::Ascending,
            });
        Self {
            columns,
            sort,
            visibility,
            widths,
            resizing: None,
            min_width: 0,
        }
    }

    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortDescriptor>) -> Self {
        self.sort = sort.filter(|s| self.column(s.key).is_some_and(|c| c.sortable));
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, key: ColumnKey) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn sort(&self) -> Option<SortDescriptor> {
        self.sort
    }

    pub fn is_visible(&self, key: ColumnKey) -> bool {
        self.visibility.get(&key).copied().unwrap_or(false)
    }

    pub fn width(&self, key: ColumnKey) -> Option<u32> {
        self.widths.get(&key).copied()
    }

    pub fn resizing(&self) -> Option<ColumnKey> {
        self.resizing.map(|g| g.key)
    }

    /// Cycles the sort of a column: none -> ascending -> descending -> none.
    /// Switching to another column always starts ascending.
    pub fn toggle_sort(&mut self, key: ColumnKey) {
        if !self.column(key).is_some_and(|c| c.sortable) {
            return;
        }
        self.sort = match self.sort {
            Some(SortDescriptor {
                key: current,
                direction: SortDirection::Ascending,
            }) if current == key => Some(SortDescriptor {
                key,
                direction: SortDirection::Descending,
            }),
            Some(SortDescriptor {
                key: current,
                direction: SortDirection::Descending,
            }) if current == key => None,
            _ => Some(SortDescriptor {
                key,
                direction: SortDirection::Ascending,
            }),
        };
        trace!("Sort of {key} toggled to {:?}", self.sort);
    }

    pub fn toggle_visibility(&mut self, key: ColumnKey) {
        if key == ColumnKey::Name {
            return;
        }
        if let Some(visible) = self.visibility.get_mut(&key) {
            *visible = !*visible;
            trace!("Column {key} visible: {visible}");
        }
    }

    /// Starts a resize gesture, replacing any gesture still in progress.
    pub fn begin_resize(&mut self, key: ColumnKey, pointer_start: i32) {
        if !self.column(key).is_some_and(|c| c.resizable) {
            return;
        }
        let Some(width_start) = self.width(key) else {
            return;
        };
        if let Some(previous) = self.resizing {
            trace!("Resize of {} cancelled by {key}", previous.key);
        }
        self.resizing = Some(ResizeGesture {
            key,
            pointer_start,
            width_start,
        });
    }

    pub fn update_resize(&mut self, key: ColumnKey, pointer_current: i32) {
        let Some(gesture) = self.resizing.filter(|g| g.key == key) else {
            return;
        };
        let delta = i64::from(pointer_current) - i64::from(gesture.pointer_start);
        let width = self.clamp_width(i64::from(gesture.width_start) + delta);
        self.widths.insert(key, width);
    }

    pub fn end_resize(&mut self) {
        if let Some(gesture) = self.resizing.take() {
            trace!(
                "Resize of {} finished at {:?}",
                gesture.key,
                self.width(gesture.key)
            );
        }
    }

    /// A whole begin/update/end step in one call.
    pub fn resize_by(&mut self, key: ColumnKey, delta: i32) {
        self.begin_resize(key, 0);
        self.update_resize(key, delta);
        self.end_resize();
    }

    fn clamp_width(&self, width: i64) -> u32 {
        width.clamp(i64::from(self.min_width), i64::from(u32::MAX)) as u32
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| self.is_visible(c.key))
            .collect()
    }

    /// Row indices in display order.
    pub fn sorted_indices(&self, rows: &[Product]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        let Some(sort) = self.sort else {
            return indices;
        };
        let Some(column) = self.column(sort.key) else {
            return indices;
        };
        // par_sort_by is stable, rows with equal keys keep their input order
        indices.par_sort_by(|&a, &b| {
            let ordering = compare_values(column.value(&rows[a]), column.value(&rows[b]));
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        indices
    }

    pub fn sorted_rows<'a>(&self, rows: &'a [Product]) -> Vec<&'a Product> {
        if self.sort.is_none() {
            return rows.iter().collect();
        }
        self.sorted_indices(rows)
            .into_iter()
            .map(|idx| &rows[idx])
            .collect()
    }
}

/// Parses `key`, `key:asc`, `key:desc` or `none`.
pub fn parse_sort(s: &str) -> Result<Option<SortDescriptor>, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let (key, direction) = s.split_once(':').unwrap_or((s, "asc"));
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => SortDirection::Ascending,
        "desc" | "descending" => SortDirection::Descending,
        other => return Err(format!("unknown sort direction \"{other}\"")),
    };
    Ok(Some(SortDescriptor {
        key: key.parse()?,
        direction,
    }))
}

fn compare_values(a: CellValue<'_>, b: CellValue<'_>) -> Ordering {
    match (a, b) {
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(&b),
        (CellValue::Text(a), CellValue::Text(b)) => compare_natural(a, b),
        (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
        (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
    }
}

/// Case insensitive comparison where runs of digits compare by their numeric value.
pub fn compare_natural(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut a_chunks = Chunks::new(&a);
    let mut b_chunks = Chunks::new(&b);
    loop {
        match (a_chunks.next(), b_chunks.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (is_digits(x), is_digits(y)) {
                    (true, true) => compare_digits(x, y),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Splits a string into alternating digit and non digit runs.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}
