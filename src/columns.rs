use std::fmt;
use std::str::FromStr;

use crate::product::Product;

/// Identifies one field of a [`Product`] and with it one column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    Id,
    Name,
    Price,
    Quality,
    Description,
    Image,
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 6] = [
        ColumnKey::Id,
        ColumnKey::Name,
        ColumnKey::Price,
        ColumnKey::Quality,
        ColumnKey::Description,
        ColumnKey::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::Id => "id",
            ColumnKey::Name => "name",
            ColumnKey::Price => "price",
            ColumnKey::Quality => "quality",
            ColumnKey::Description => "description",
            ColumnKey::Image => "image",
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(ColumnKey::Id),
            "name" => Ok(ColumnKey::Name),
            "price" => Ok(ColumnKey::Price),
            "quality" => Ok(ColumnKey::Quality),
            "description" => Ok(ColumnKey::Description),
            "image" | "imageurl" | "image_url" => Ok(ColumnKey::Image),
            other => Err(format!("unknown column \"{other}\"")),
        }
    }
}

/// A raw field value borrowed from a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// What a column's cells turn into once rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Image { src: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    Image,
}

impl ColumnKind {
    pub fn render(&self, value: CellValue<'_>) -> CellContent {
        match (self, value) {
            (ColumnKind::Image, CellValue::Text(src)) => CellContent::Image {
                src: src.to_string(),
            },
            (_, CellValue::Text(s)) => CellContent::Text(s.to_string()),
            (_, CellValue::Number(n)) => CellContent::Text(format_number(n)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub key: ColumnKey,
    pub header: &'static str,
    pub sortable: bool,
    pub hideable: bool,
    pub resizable: bool,
    /// Initial width in pixels.
    pub width: u32,
    pub kind: ColumnKind,
    /// Layout hint only, nothing is kept in place by it.
    pub pinned: bool,
}

impl ColumnDescriptor {
    fn new(key: ColumnKey, header: &'static str, width: u32, kind: ColumnKind) -> Self {
        Self {
            key,
            header,
            sortable: true,
            hideable: true,
            resizable: true,
            width,
            kind,
            pinned: false,
        }
    }

    pub fn value<'a>(&self, product: &'a Product) -> CellValue<'a> {
        product.value(self.key)
    }

    pub fn render(&self, product: &Product) -> CellContent {
        self.kind.render(self.value(product))
    }
}

/// The fixed, ordered column set of the product table.
pub fn product_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(ColumnKey::Id, "ID", 30, ColumnKind::Text),
        ColumnDescriptor {
            hideable: false,
            pinned: true,
            ..ColumnDescriptor::new(ColumnKey::Name, "Name", 150, ColumnKind::Text)
        },
        ColumnDescriptor::new(ColumnKey::Price, "Price", 30, ColumnKind::Text),
        ColumnDescriptor::new(ColumnKey::Quality, "Quality", 30, ColumnKind::Numeric),
        ColumnDescriptor::new(ColumnKey::Description, "Description", 200, ColumnKind::Text),
        ColumnDescriptor::new(ColumnKey::Image, "Image", 50, ColumnKind::Image),
    ]
}
