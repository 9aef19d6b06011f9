use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column catalog
// ---------------------------------------------------------------------------

/// Columns used as grouping / filter keys. Free text, trimmed at load time
/// (trim-only: case is preserved, so "Rural" and "rural" stay distinct).
pub const KEY_COLUMNS: &[&str] = &[
    "state",
    "district",
    "rural_urban",
    "school_type",
    "highclass",
    "lowclass",
];

/// Columns declared numeric. Cells in these columns are coerced to `Float`
/// at load time; a cell that does not parse becomes `Null`.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "total_tch",
    "male",
    "female",
    "transgender",
    "gen_tch",
    "sc_tch",
    "st_tch",
    "obc_tch",
    "trained_comp",
    "post_graduate_and_above",
    "graduate",
    "below_graduate",
    "total_class_rooms",
    "classrooms_in_good_condition",
    "classrooms_needs_minor_repair",
    "classrooms_needs_major_repair",
    "total_boys_func_toilet",
    "total_girls_func_toilet",
    "func_boys_cwsn_friendly",
    "func_girls_cwsn_friendly",
    "library_availability",
    "electricity_availability",
    "playground_available",
    "pucca_building_blocks",
    "no_building_blocks",
    "year",
    "teacher_quality_index",
];

/// Whether `column` is one of the declared numeric columns.
pub fn is_numeric_column(column: &str) -> bool {
    NUMERIC_COLUMNS.contains(&column)
}

// ---------------------------------------------------------------------------
// Value – a single cell of the school table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Grouping and filtering put values in `BTreeMap` / `BTreeSet`, so `Value`
/// must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can use Value as a BTree key --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for reductions. `Null` and text
    /// values yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as text for key matching.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// SchoolRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single school / administrative unit (one row of the source table).
#[derive(Debug, Clone, Default)]
pub struct SchoolRecord {
    /// Dynamic columns: column_name → cell value. A column absent from the
    /// source is absent from the map; a cell that was empty or failed
    /// coercion is present as `Value::Null`.
    pub cells: BTreeMap<String, Value>,
}

impl SchoolRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Numeric view of a cell: `None` when the column is absent, the cell
    /// is null, or the cell holds text.
    pub fn num(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(Value::as_f64)
    }

    /// Text view of a cell.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(Value::as_text)
    }

    /// Whether the column exists on this record at all (even as null).
    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.cells.insert(column.to_string(), value);
    }
}

// ---------------------------------------------------------------------------
// SchoolDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full cleaned table with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct SchoolDataset {
    /// All records (rows). Immutable once loaded; filtering and
    /// aggregation only ever read from it.
    pub records: Vec<SchoolRecord>,
    /// Sorted list of column names seen anywhere in the table.
    pub column_names: Vec<String>,
    /// For each key column the sorted set of unique non-null values,
    /// used to seed filter choices.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
}

impl SchoolDataset {
    /// Build column indices from the cleaned records.
    pub fn from_records(records: Vec<SchoolRecord>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();

        for rec in &records {
            for (col, val) in &rec.cells {
                column_names_set.insert(col.clone());
                if KEY_COLUMNS.contains(&col.as_str()) && !val.is_null() {
                    unique_values
                        .entry(col.clone())
                        .or_default()
                        .insert(val.clone());
                }
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        SchoolDataset {
            records,
            column_names,
            unique_values,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
