use polars::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

use crate::columns::{CellValue, ColumnKey};
use crate::domain::ViewError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Kept as text, never parsed as a currency.
    pub price: String,
    pub quality: f64,
    pub description: String,
    pub image_url: String,
}

impl Product {
    pub fn value(&self, key: ColumnKey) -> CellValue<'_> {
        match key {
            ColumnKey::Id => CellValue::Text(&self.id),
            ColumnKey::Name => CellValue::Text(&self.name),
            ColumnKey::Price => CellValue::Text(&self.price),
            ColumnKey::Quality => CellValue::Number(self.quality),
            ColumnKey::Description => CellValue::Text(&self.description),
            ColumnKey::Image => CellValue::Text(&self.image_url),
        }
    }
}

#[derive(Debug, PartialEq)]
enum FileType {
    Csv,
    Parquet,
    Arrow,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    file_type: FileType,
}

impl FileInfo {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }
}

const IMAGE_COLUMN_NAMES: [&str; 3] = ["imageUrl", "image_url", "image"];

/// Reads the products stored in a csv, parquet or arrow file.
#[instrument(skip_all, fields(path = ?path))]
pub fn load_products(path: PathBuf) -> Result<(FileInfo, Vec<Product>), ViewError> {
    let file_info = get_file_info(path)?;
    let start_time = Instant::now();

    let frame = match file_info.file_type {
        FileType::Csv => load_csv(&file_info.path)?,
        FileType::Parquet => load_parquet(&file_info.path)?,
        FileType::Arrow => load_arrow(&file_info.path)?,
    };
    let df = frame.collect()?;
    let products = products_from_frame(&df)?;

    info!(
        "Loaded {} products from {:?} ({} bytes) in {}ms",
        products.len(),
        file_info.path,
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok((file_info, products))
}

pub fn products_from_frame(df: &DataFrame) -> Result<Vec<Product>, ViewError> {
    let image_column = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .find(|name| IMAGE_COLUMN_NAMES.contains(name))
        .ok_or_else(|| ViewError::LoadingFailed("missing column \"imageUrl\"".into()))?
        .to_string();

    let ids = load_text_column(df, "id")?;
    let names = load_text_column(df, "name")?;
    let prices = load_text_column(df, "price")?;
    let qualities = load_text_column(df, "quality")?;
    let descriptions = load_text_column(df, "description")?;
    let images = load_text_column(df, &image_column)?;

    let mut products = Vec::with_capacity(df.height());
    for (row, id) in ids.into_iter().enumerate() {
        let quality = parse_quality(&qualities[row], row)?;
        products.push(Product {
            id,
            name: names[row].clone(),
            price: prices[row].clone(),
            quality,
            description: descriptions[row].clone(),
            image_url: images[row].clone(),
        });
    }
    debug!("Built {} products", products.len());
    Ok(products)
}

fn parse_quality(raw: &str, row: usize) -> Result<f64, ViewError> {
    raw.trim().parse::<f64>().map_err(|_| {
        ViewError::LoadingFailed(format!("row {}: quality \"{raw}\" is not a number", row + 1))
    })
}

fn load_text_column(df: &DataFrame, col_name: &str) -> Result<Vec<String>, ViewError> {
    let col = df
        .column(col_name)
        .map_err(|_| ViewError::LoadingFailed(format!("missing column \"{col_name}\"")))?
        .cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| value.map(|s| s.replace("\r\n", " ↵ ").replace('\n', " ↵ ")))
        .map(|value| value.unwrap_or_default())
        .collect::<Vec<String>>();
    trace!("Column \"{col_name}\": {} values", data.len());
    Ok(data)
}

fn detect_file_type(path: &Path) -> Result<FileType, ViewError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(ViewError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, ViewError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ViewError::FileNotFound,
        ErrorKind::PermissionDenied => ViewError::PermissionDenied,
        _ => ViewError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(ViewError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}
