use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Placeholder shown for text attributes a record does not carry.
pub const NOT_AVAILABLE: &str = "No disponible";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the statistics table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the column types found in the sources.
/// Used as a filter key, so `CellValue` must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

/// `-0.0` folds into `0.0` so equality, ordering and hashing see one zero.
fn float_key(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl CellValue {
    /// Sort rank of the variant: nulls first, then booleans, numbers, text.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Text(_) => 4,
            CellValue::Date(_) => 5,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => float_key(*a).total_cmp(&float_key(*b)),
            (CellValue::Text(a), CellValue::Text(b)) | (CellValue::Date(a), CellValue::Date(b)) => {
                a.cmp(b)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(v) => float_key(*v).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats come from integer columns that held a NaN somewhere.
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "{NOT_AVAILABLE}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Interpret the value as a number for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the statistics table (a player, or a team line)
// ---------------------------------------------------------------------------

/// An immutable row: normalized column name → value.
///
/// Attributes are optional. The accessors apply the defaults the dashboard
/// relies on: numbers fall back to `0.0`, text to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Self { cells }
    }

    /// Raw cell, `None` when the record lacks the column.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Numeric value of a column; absent, null or non-numeric cells count as zero.
    pub fn number(&self, column: &str) -> f64 {
        self.cells
            .get(column)
            .and_then(CellValue::as_f64)
            .unwrap_or(0.0)
    }

    /// Text of a column; absent or null cells yield [`NOT_AVAILABLE`].
    pub fn text(&self, column: &str) -> String {
        match self.cells.get(column) {
            Some(v) if !v.is_null() => v.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    /// Text of a column, `None` when absent or null.
    pub fn opt_text(&self, column: &str) -> Option<String> {
        self.cells
            .get(column)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded table
// ---------------------------------------------------------------------------

/// Read-only table loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    /// All rows.
    pub records: Vec<Record>,
    /// Normalized column names in source order, without duplicates.
    pub columns: Vec<String>,
}

impl RecordStore {
    /// Build a store from a header row and positional rows.
    ///
    /// Headers are normalized with [`normalize_column`]; when two headers
    /// normalize to the same name only the first column is kept.
    pub fn from_table(headers: &[String], rows: Vec<Vec<CellValue>>) -> Self {
        let mut seen = HashSet::new();
        let kept: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (i, normalize_column(h)))
            .filter(|(_, name)| !name.is_empty() && seen.insert(name.clone()))
            .collect();

        let records = rows
            .into_iter()
            .map(|mut row| {
                let cells = kept
                    .iter()
                    .map(|(i, name)| {
                        let value = row
                            .get_mut(*i)
                            .map(|v| std::mem::replace(v, CellValue::Null))
                            .unwrap_or(CellValue::Null);
                        (name.clone(), value)
                    })
                    .collect();
                Record::new(cells)
            })
            .collect();

        RecordStore {
            records,
            columns: kept.into_iter().map(|(_, name)| name).collect(),
        }
    }

    /// Build a store from already-keyed records. Column names are normalized
    /// and the column list follows first appearance.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .map(|rec| {
                let mut cells = BTreeMap::new();
                for (col, val) in rec.cells {
                    let name = normalize_column(&col);
                    if name.is_empty() || cells.contains_key(&name) {
                        continue;
                    }
                    if seen.insert(name.clone()) {
                        columns.push(name.clone());
                    }
                    cells.insert(name, val);
                }
                Record::new(cells)
            })
            .collect();
        RecordStore { records, columns }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Column naming convention: trimmed, lowercase, whitespace runs → `_`.
pub fn normalize_column(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
