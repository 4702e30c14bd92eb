use crate::columns::{CellContent, ColumnKey};
use crate::product::Product;
use crate::state::{SortDirection, TableState};

#[derive(Debug, Clone, PartialEq)]
pub struct Checkbox {
    pub key: ColumnKey,
    pub checked: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: ColumnKey,
    pub label: &'static str,
    pub sort: Option<SortDirection>,
    /// Width in pixels.
    pub width: u32,
    pub resizable: bool,
    pub resizing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    /// Identifier of the product, stable across re-sorts.
    pub key: String,
    pub cells: Vec<CellContent>,
}

/// Everything the renderer needs, derived from the state and the rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableViewData {
    pub checkboxes: Vec<Checkbox>,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView>,
}

impl TableViewData {
    pub fn build(state: &TableState, rows: &[Product], order: &[usize]) -> Self {
        let checkboxes = state
            .columns()
            .iter()
            .map(|c| Checkbox {
                key: c.key,
                checked: state.is_visible(c.key),
                enabled: c.hideable && c.key != ColumnKey::Name,
            })
            .collect();

        let visible = state.visible_columns();
        let sort = state.sort();
        let headers = visible
            .iter()
            .map(|c| HeaderCell {
                key: c.key,
                label: c.header,
                sort: sort.filter(|s| s.key == c.key).map(|s| s.direction),
                width: state.width(c.key).unwrap_or(c.width),
                resizable: c.resizable,
                resizing: state.resizing() == Some(c.key),
            })
            .collect();

        let rows = order
            .iter()
            .filter_map(|&idx| rows.get(idx))
            .map(|product| RowView {
                key: product.id.clone(),
                cells: visible.iter().map(|c| c.render(product)).collect(),
            })
            .collect();

        Self {
            checkboxes,
            headers,
            rows,
        }
    }

    pub fn header(&self, key: ColumnKey) -> Option<&HeaderCell> {
        self.headers.iter().find(|h| h.key == key)
    }
}

pub fn sort_glyph(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        ["Banana", "Apple", "Cherry"]
            .iter()
            .enumerate()
            .map(|(idx, name)| Product {
                id: format!("p{idx}"),
                name: name.to_string(),
                price: format!("${}.00", idx + 1),
                quality: idx as f64,
                description: format!("A {name}"),
                image_url: format!("https://img.example/{idx}.png"),
            })
            .collect()
    }

    fn build(state: &TableState, rows: &[Product]) -> TableViewData {
        TableViewData::build(state, rows, &state.sorted_indices(rows))
    }

    #[test]
    fn default_projection_sorts_by_name() {
        let rows = products();
        let state = TableState::default();
        let view = build(&state, &rows);

        let keys: Vec<&str> = view.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["p1", "p0", "p2"]);
        assert_eq!(view.rows[0].cells[1], CellContent::Text("Apple".into()));
        assert_eq!(
            view.header(ColumnKey::Name).and_then(|h| h.sort),
            Some(SortDirection::Ascending)
        );
        assert_eq!(view.header(ColumnKey::Price).and_then(|h| h.sort), None);
    }

    #[test]
    fn name_checkbox_is_disabled() {
        let view = build(&TableState::default(), &products());
        assert_eq!(view.checkboxes.len(), 6);
        for checkbox in view.checkboxes.iter() {
            assert!(checkbox.checked);
            assert_eq!(checkbox.enabled, checkbox.key != ColumnKey::Name);
        }
    }

    #[test]
    fn image_cells_bind_the_url() {
        let view = build(&TableState::default(), &products());
        assert_eq!(
            view.rows[0].cells[5],
            CellContent::Image {
                src: "https://img.example/1.png".into()
            }
        );
    }

    #[test]
    fn hidden_column_drops_header_and_cells() {
        let rows = products();
        let mut state = TableState::default();
        state.toggle_visibility(ColumnKey::Price);
        let view = build(&state, &rows);
        assert!(view.header(ColumnKey::Price).is_none());
        assert_eq!(view.headers.len(), 5);
        assert!(view.rows.iter().all(|r| r.cells.len() == 5));
        assert!(!view.checkboxes[2].checked);
    }

    #[test]
    fn row_keys_follow_records() {
        let rows = products();
        let mut state = TableState::default();
        let before = build(&state, &rows);
        state.toggle_sort(ColumnKey::Name);
        let after = build(&state, &rows);
        for row in after.rows.iter() {
            let same = before.rows.iter().find(|r| r.key == row.key);
            assert_eq!(same.map(|r| &r.cells), Some(&row.cells));
        }
        assert_eq!(after.rows[0].key, "p2");
    }

    #[test]
    fn same_state_same_projection() {
        let rows = products();
        let state = TableState::default();
        assert_eq!(build(&state, &rows), build(&state, &rows));
    }

    #[test]
    fn resizing_flag_follows_gesture() {
        let rows = products();
        let mut state = TableState::default();
        state.begin_resize(ColumnKey::Description, 0);
        let view = build(&state, &rows);
        assert!(view.header(ColumnKey::Description).is_some_and(|h| h.resizing));
        assert!(!view.header(ColumnKey::Name).is_some_and(|h| h.resizing));
    }
}
