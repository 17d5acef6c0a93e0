//! Column sorting over JSON rows.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use super::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn marker(&self) -> char {
        match self {
            SortDirection::Asc => '↑',
            SortDirection::Desc => '↓',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Same column flips asc/desc, any other column starts at asc
    pub fn next(current: Option<&SortConfig>, key: &str) -> SortConfig {
        match current {
            Some(c) if c.key == key && c.direction == SortDirection::Asc => SortConfig {
                key: key.to_string(),
                direction: SortDirection::Desc,
            },
            _ => SortConfig::asc(key),
        }
    }
}

/// Row indices in display order. The sort is stable, so equal keys keep
/// their input order whichever the direction.
pub fn sorted_indices(rows: &[Row], config: Option<&SortConfig>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    if let Some(config) = config {
        indices.sort_by(|&a, &b| {
            let ord = compare_values(rows[a].get(&config.key), rows[b].get(&config.key));
            match config.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }
    indices
}

/// Ascending order of two cells. Absent and null are the minimum.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => compare_text(x, y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => compare_text(&display_value(Some(x)), &display_value(Some(y))),
    }
}

/// Collation close to a pt-BR locale compare: letters first without case or
/// accents, then unaccented before accented, then lowercase before uppercase.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(base_letter).cmp(b.chars().map(base_letter));
    if primary != Ordering::Equal {
        return primary;
    }
    let accents = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if accents != Ordering::Equal {
        return accents;
    }
    a.chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase))
}

fn base_letter(c: char) -> char {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Text shown in a cell (and written to CSV) for a raw value
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| display_value(Some(v)))
            .collect::<Vec<_>>()
            .join(","),
        Some(obj @ Value::Object(_)) => obj.to_string(),
    }
}
