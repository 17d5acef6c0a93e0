//! CSV export of list data.
//!
//! Headers are written as plain labels. Each record cell carries its own
//! quoting: text is double-quoted with embedded quotes doubled, bare cells
//! (numbers, booleans, empty) are written as they are.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Bare(String),
}

impl Cell {
    /// Quoting follows the JSON type: strings are text, scalars are bare,
    /// missing and null are an empty field
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Cell::Bare(String::new()),
            Some(Value::String(s)) => Cell::Text(s.clone()),
            Some(Value::Number(n)) => Cell::Bare(n.to_string()),
            Some(Value::Bool(b)) => Cell::Bare(b.to_string()),
            Some(other) => Cell::Text(other.to_string()),
        }
    }

    fn encode(&self) -> String {
        match self {
            Cell::Text(text) => format!("\"{}\"", text.replace('"', "\"\"")),
            Cell::Bare(text) => text.clone(),
        }
    }
}

pub fn to_csv<H, R>(headers: &[H], rows: R) -> Result<String>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<Cell>>,
{
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(headers.iter().map(|h| AsRef::<str>::as_ref(h)))?;
    let buffer = header.into_inner().map_err(|e| e.into_error())?;

    // Cells arrive already encoded
    let mut body = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);
    for row in rows {
        body.write_record(row.iter().map(Cell::encode))?;
    }
    let bytes = body.into_inner().map_err(|e| e.into_error())?;

    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Quote-aware parse, header row included
pub fn parse(content: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Write `content` as `dir/file_name`, creating `dir` when needed
pub fn write_file(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "csv written");
    Ok(path)
}
