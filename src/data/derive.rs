use std::collections::BTreeSet;

use super::model::{SchoolDataset, SchoolRecord, Value, NUMERIC_COLUMNS};

// ---------------------------------------------------------------------------
// Derived indicator columns
// ---------------------------------------------------------------------------

pub const TOTAL_GENDER: &str = "total_gender";
pub const TOTAL_FUNC_TOILET: &str = "total_func_toilet";
pub const CWSN_TOILET: &str = "cwsn_toilet";
pub const FACILITY_INDEX: &str = "facility_index";

const GENDER_COLUMNS: &[&str] = &["male", "female", "transgender"];
const FUNC_TOILET_COLUMNS: &[&str] = &["total_boys_func_toilet", "total_girls_func_toilet"];
const CWSN_COLUMNS: &[&str] = &["func_boys_cwsn_friendly", "func_girls_cwsn_friendly"];
// Mixes a raw count with 0/1 availability flags, so the index is not
// bounded to [0, 1]. Flagged for product review.
const FACILITY_COLUMNS: &[&str] = &[
    "total_class_rooms",
    "library_availability",
    "electricity_availability",
    "playground_available",
];

/// Composite indicators computed per record.
///
/// `None` means the indicator is unavailable for this record: either none
/// of the source columns exist (sums), or every constituent is null
/// (facility index).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Indicators {
    pub total_gender: Option<f64>,
    pub total_func_toilet: Option<f64>,
    pub cwsn_toilet: Option<f64>,
    pub facility_index: Option<f64>,
}

/// Sum of the named columns with nulls counted as zero. `None` only when
/// no source column exists on the record at all.
fn zero_filled_sum(record: &SchoolRecord, columns: &[&str]) -> Option<f64> {
    if !columns.iter().any(|c| record.has_column(c)) {
        return None;
    }
    Some(columns.iter().filter_map(|c| record.num(c)).sum())
}

/// Mean over the present (non-null) members of the named columns.
/// `None` when every member is null or absent.
fn present_mean(record: &SchoolRecord, columns: &[&str]) -> Option<f64> {
    let present: Vec<f64> = columns.iter().filter_map(|c| record.num(c)).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Compute composite indicators from a record's base columns.
///
/// Reads base columns only, never previously derived ones, so deriving an
/// already-derived record reproduces identical values.
pub fn derive(record: &SchoolRecord) -> Indicators {
    Indicators {
        total_gender: zero_filled_sum(record, GENDER_COLUMNS),
        total_func_toilet: zero_filled_sum(record, FUNC_TOILET_COLUMNS),
        cwsn_toilet: zero_filled_sum(record, CWSN_COLUMNS),
        facility_index: present_mean(record, FACILITY_COLUMNS),
    }
}

/// Append the derived indicator columns to every record and rebuild the
/// dataset index.
///
/// Sum indicators are written wherever at least one source column exists.
/// The facility index is written as `Null` for a record whose constituents
/// are all null, so the column stays addressable for aggregation.
pub fn append_indicators(dataset: SchoolDataset) -> SchoolDataset {
    let any_facility_source = FACILITY_COLUMNS.iter().any(|c| dataset.has_column(c));

    let records: Vec<SchoolRecord> = dataset
        .records
        .into_iter()
        .map(|mut rec| {
            let ind = derive(&rec);
            if let Some(v) = ind.total_gender {
                rec.set(TOTAL_GENDER, Value::Float(v));
            }
            if let Some(v) = ind.total_func_toilet {
                rec.set(TOTAL_FUNC_TOILET, Value::Float(v));
            }
            if let Some(v) = ind.cwsn_toilet {
                rec.set(CWSN_TOILET, Value::Float(v));
            }
            if any_facility_source {
                let cell = match ind.facility_index {
                    Some(v) => Value::Float(v),
                    None => Value::Null,
                };
                rec.set(FACILITY_INDEX, cell);
            }
            rec
        })
        .collect();

    SchoolDataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Schema negotiation
// ---------------------------------------------------------------------------

/// Report of which declared numeric columns a source actually carried and
/// which derived indicators are therefore computable. Produced at load
/// time so consumers branch on an explicit contract instead of probing
/// columns ad hoc.
#[derive(Debug, Clone, Default)]
pub struct SchemaReport {
    pub present: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub computable: BTreeSet<&'static str>,
}

impl SchemaReport {
    pub fn for_dataset(dataset: &SchoolDataset) -> Self {
        let mut present = BTreeSet::new();
        let mut missing = BTreeSet::new();
        for &col in NUMERIC_COLUMNS {
            if dataset.has_column(col) {
                present.insert(col.to_string());
            } else {
                missing.insert(col.to_string());
            }
        }

        let mut computable = BTreeSet::new();
        let pairs: &[(&'static str, &[&str])] = &[
            (TOTAL_GENDER, GENDER_COLUMNS),
            (TOTAL_FUNC_TOILET, FUNC_TOILET_COLUMNS),
            (CWSN_TOILET, CWSN_COLUMNS),
            (FACILITY_INDEX, FACILITY_COLUMNS),
        ];
        for (indicator, sources) in pairs {
            if sources.iter().any(|c| dataset.has_column(c)) {
                computable.insert(*indicator);
            }
        }

        SchemaReport {
            present,
            missing,
            computable,
        }
    }

    pub fn is_computable(&self, indicator: &str) -> bool {
        self.computable.contains(indicator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[(&str, Value)]) -> SchoolRecord {
        let mut rec = SchoolRecord::new();
        for (col, val) in cells {
            rec.set(col, val.clone());
        }
        rec
    }

    #[test]
    fn total_gender_treats_nulls_as_zero() {
        let rec = record(&[
            ("male", Value::Float(4.0)),
            ("female", Value::Null),
            ("transgender", Value::Float(1.0)),
        ]);
        assert_eq!(derive(&rec).total_gender, Some(5.0));
    }

    #[test]
    fn total_gender_unavailable_without_source_columns() {
        let rec = record(&[("state", Value::Text("Bihar".into()))]);
        assert_eq!(derive(&rec).total_gender, None);
    }

    #[test]
    fn toilet_sum_zero_fills_missing_side() {
        let rec = record(&[
            ("total_boys_func_toilet", Value::Float(2.0)),
            ("total_girls_func_toilet", Value::Null),
        ]);
        assert_eq!(derive(&rec).total_func_toilet, Some(2.0));
    }

    #[test]
    fn facility_index_means_present_fields_only() {
        let rec = record(&[
            ("total_class_rooms", Value::Float(8.0)),
            ("library_availability", Value::Float(1.0)),
            ("electricity_availability", Value::Null),
            ("playground_available", Value::Float(0.0)),
        ]);
        assert_eq!(derive(&rec).facility_index, Some(3.0));
    }

    #[test]
    fn facility_index_null_iff_all_constituents_null() {
        let rec = record(&[
            ("total_class_rooms", Value::Null),
            ("library_availability", Value::Null),
        ]);
        assert_eq!(derive(&rec).facility_index, None);
    }

    #[test]
    fn derivation_is_idempotent() {
        let rec = record(&[
            ("male", Value::Float(3.0)),
            ("female", Value::Float(2.0)),
            ("total_class_rooms", Value::Float(6.0)),
            ("library_availability", Value::Float(1.0)),
        ]);
        let ds = SchoolDataset::from_records(vec![rec]);
        let once = append_indicators(ds);
        let twice = append_indicators(once.clone());
        assert_eq!(
            once.records[0].num(TOTAL_GENDER),
            twice.records[0].num(TOTAL_GENDER)
        );
        assert_eq!(
            once.records[0].num(FACILITY_INDEX),
            twice.records[0].num(FACILITY_INDEX)
        );
    }

    #[test]
    fn schema_report_flags_computable_indicators() {
        let rec = record(&[
            ("male", Value::Float(1.0)),
            ("state", Value::Text("Goa".into())),
        ]);
        let ds = SchoolDataset::from_records(vec![rec]);
        let report = SchemaReport::for_dataset(&ds);
        assert!(report.is_computable(TOTAL_GENDER));
        assert!(!report.is_computable(FACILITY_INDEX));
        assert!(report.present.contains("male"));
        assert!(report.missing.contains("total_tch"));
    }
}
