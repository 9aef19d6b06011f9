use std::collections::BTreeMap;

use super::model::{SchoolDataset, Value};

// ---------------------------------------------------------------------------
// Group-and-reduce
// ---------------------------------------------------------------------------

/// Per-column reduction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    /// Sum of non-null values; an all-null group sums to zero.
    Sum,
    /// Mean of non-null values; an all-null group yields null.
    Mean,
}

/// One output row: a group key tuple and the reduced values, positionally
/// matching the requested reductions.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: Vec<Value>,
    pub values: Vec<Option<f64>>,
}

/// A summary table keyed by one or more categorical dimensions.
/// Rows are ordered by ascending key tuple, so output is deterministic
/// and reproducible for a given input.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    pub group_keys: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

#[derive(Clone, Copy, Default)]
struct Acc {
    sum: f64,
    count: usize,
}

impl Acc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn finish(self, reduce: Reduce) -> Option<f64> {
        match reduce {
            Reduce::Sum => Some(self.sum),
            Reduce::Mean => (self.count > 0).then(|| self.sum / self.count as f64),
        }
    }
}

/// Group the records selected by `indices` by the given key columns and
/// reduce the named numeric columns.
///
/// Records with a null or missing value in any group key column are
/// dropped, so every output group comes from present data. The source
/// dataset is never mutated; an empty selection yields an empty table.
pub fn group_reduce(
    dataset: &SchoolDataset,
    indices: &[usize],
    group_keys: &[&str],
    reductions: &[(&str, Reduce)],
) -> AggregateTable {
    let mut groups: BTreeMap<Vec<Value>, Vec<Acc>> = BTreeMap::new();

    for &idx in indices {
        let rec = &dataset.records[idx];
        let mut key = Vec::with_capacity(group_keys.len());
        let mut complete = true;
        for &col in group_keys {
            match rec.get(col) {
                Some(v) if !v.is_null() => key.push(v.clone()),
                _ => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            continue;
        }

        let accs = groups
            .entry(key)
            .or_insert_with(|| vec![Acc::default(); reductions.len()]);
        for (slot, (col, _)) in accs.iter_mut().zip(reductions) {
            if let Some(v) = rec.num(col) {
                slot.push(v);
            }
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, accs)| AggregateRow {
            key,
            values: accs
                .into_iter()
                .zip(reductions)
                .map(|(acc, (_, reduce))| acc.finish(*reduce))
                .collect(),
        })
        .collect();

    AggregateTable {
        group_keys: group_keys.iter().map(|k| k.to_string()).collect(),
        columns: reductions.iter().map(|(c, _)| c.to_string()).collect(),
        rows,
    }
}

/// Mean of a column over the selected records (KPI strips use this).
pub fn column_mean(dataset: &SchoolDataset, indices: &[usize], column: &str) -> Option<f64> {
    let mut acc = Acc::default();
    for &idx in indices {
        if let Some(v) = dataset.records[idx].num(column) {
            acc.push(v);
        }
    }
    acc.finish(Reduce::Mean)
}

/// Sum of a column over the selected records, nulls skipped.
pub fn column_sum(dataset: &SchoolDataset, indices: &[usize], column: &str) -> f64 {
    indices
        .iter()
        .filter_map(|&idx| dataset.records[idx].num(column))
        .sum()
}

// ---------------------------------------------------------------------------
// Trend: first differences along time within an entity
// ---------------------------------------------------------------------------

/// One `(entity, time)` observation with per-metric means and their
/// first differences against the entity's previous time point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendRow {
    pub entity: Value,
    pub time: Value,
    pub values: Vec<Option<f64>>,
    /// `values - previous values` within the same entity; null at the
    /// entity's first observed time point.
    pub changes: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct TrendSeries {
    pub entity_key: String,
    pub time_key: String,
    pub metrics: Vec<String>,
    pub rows: Vec<TrendRow>,
}

/// Group by `(entity, time)`, mean each metric, then difference along
/// ascending time within each entity partition.
pub fn trend(
    dataset: &SchoolDataset,
    indices: &[usize],
    entity_key: &str,
    time_key: &str,
    metrics: &[&str],
) -> TrendSeries {
    let reductions: Vec<(&str, Reduce)> = metrics.iter().map(|m| (*m, Reduce::Mean)).collect();
    let table = group_reduce(dataset, indices, &[entity_key, time_key], &reductions);

    let mut rows: Vec<TrendRow> = Vec::with_capacity(table.rows.len());
    let mut prev: Option<(Value, Vec<Option<f64>>)> = None;

    // Rows arrive sorted by (entity, time) ascending, so each entity's
    // partition is contiguous and time-ordered.
    for agg in table.rows {
        let entity = agg.key[0].clone();
        let time = agg.key[1].clone();
        let changes = match &prev {
            Some((prev_entity, prev_values)) if *prev_entity == entity => agg
                .values
                .iter()
                .zip(prev_values)
                .map(|(cur, before)| match (cur, before) {
                    (Some(c), Some(b)) => Some(c - b),
                    _ => None,
                })
                .collect(),
            _ => vec![None; metrics.len()],
        };
        prev = Some((entity.clone(), agg.values.clone()));
        rows.push(TrendRow {
            entity,
            time,
            values: agg.values,
            changes,
        });
    }

    TrendSeries {
        entity_key: entity_key.to_string(),
        time_key: time_key.to_string(),
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Average improvement rollup
// ---------------------------------------------------------------------------

/// Per-entity mean of the non-null changes for each metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementRow {
    pub entity: Value,
    pub avg_change: Vec<Option<f64>>,
}

/// Reduce each entity's change columns to their mean, preserving the
/// series' entity order.
pub fn average_improvement(series: &TrendSeries) -> Vec<ImprovementRow> {
    let n_metrics = series.metrics.len();
    let mut rollup: Vec<(Value, Vec<Acc>)> = Vec::new();

    for row in &series.rows {
        match rollup.last_mut() {
            Some((entity, accs)) if *entity == row.entity => {
                for (slot, change) in accs.iter_mut().zip(&row.changes) {
                    if let Some(c) = change {
                        slot.push(*c);
                    }
                }
            }
            _ => {
                let mut accs = vec![Acc::default(); n_metrics];
                for (slot, change) in accs.iter_mut().zip(&row.changes) {
                    if let Some(c) = change {
                        slot.push(*c);
                    }
                }
                rollup.push((row.entity.clone(), accs));
            }
        }
    }

    rollup
        .into_iter()
        .map(|(entity, accs)| ImprovementRow {
            entity,
            avg_change: accs.into_iter().map(|a| a.finish(Reduce::Mean)).collect(),
        })
        .collect()
}

/// Top `n` entities by descending average change of the chosen metric.
/// Entities with no computed change rank last; ties keep input order
/// (the sort is stable).
pub fn top_improvers(rollup: &[ImprovementRow], metric: usize, n: usize) -> Vec<ImprovementRow> {
    let mut ranked: Vec<ImprovementRow> = rollup.to_vec();
    ranked.sort_by(|a, b| {
        match (a.avg_change.get(metric).copied().flatten(), b.avg_change.get(metric).copied().flatten()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SchoolRecord;

    fn school(area: &str, gender: Option<f64>) -> SchoolRecord {
        let mut rec = SchoolRecord::new();
        rec.set("rural_urban", Value::Text(area.into()));
        let cell = match gender {
            Some(v) => Value::Float(v),
            None => Value::Null,
        };
        rec.set("total_gender", cell);
        rec
    }

    fn observation(state: &str, year: i64, facility: f64) -> SchoolRecord {
        let mut rec = SchoolRecord::new();
        rec.set("state", Value::Text(state.into()));
        rec.set("year", Value::Integer(year));
        rec.set("facility_index", Value::Float(facility));
        rec
    }

    fn all_indices(ds: &SchoolDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn sums_match_independent_partitions() {
        let ds = SchoolDataset::from_records(vec![
            school("Rural", Some(10.0)),
            school("Urban", Some(4.0)),
            school("Rural", Some(6.0)),
        ]);
        let table = group_reduce(
            &ds,
            &all_indices(&ds),
            &["rural_urban"],
            &[("total_gender", Reduce::Sum)],
        );
        assert_eq!(table.rows.len(), 2);
        // ascending key order: Rural before Urban
        assert_eq!(table.rows[0].key, vec![Value::Text("Rural".into())]);
        assert_eq!(table.rows[0].values, vec![Some(16.0)]);
        assert_eq!(table.rows[1].values, vec![Some(4.0)]);

        // partition computed independently agrees
        let rural_only: Vec<usize> = vec![0, 2];
        assert_eq!(column_sum(&ds, &rural_only, "total_gender"), 16.0);
    }

    #[test]
    fn mean_of_all_null_group_is_null() {
        let ds = SchoolDataset::from_records(vec![school("Rural", None), school("Rural", None)]);
        let table = group_reduce(
            &ds,
            &all_indices(&ds),
            &["rural_urban"],
            &[("total_gender", Reduce::Mean)],
        );
        assert_eq!(table.rows[0].values, vec![None]);
    }

    #[test]
    fn null_group_keys_are_dropped() {
        let mut keyless = SchoolRecord::new();
        keyless.set("total_gender", Value::Float(99.0));
        let ds = SchoolDataset::from_records(vec![school("Urban", Some(1.0)), keyless]);
        let table = group_reduce(
            &ds,
            &all_indices(&ds),
            &["rural_urban"],
            &[("total_gender", Reduce::Sum)],
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, vec![Some(1.0)]);
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let ds = SchoolDataset::from_records(vec![school("Rural", Some(1.0))]);
        let table = group_reduce(&ds, &[], &["rural_urban"], &[("total_gender", Reduce::Sum)]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn trend_first_differences_within_entity() {
        let ds = SchoolDataset::from_records(vec![
            observation("Kerala", 2021, 60.0),
            observation("Kerala", 2019, 50.0),
            observation("Kerala", 2020, 55.0),
            observation("Assam", 2019, 30.0),
            observation("Assam", 2020, 33.0),
        ]);
        let series = trend(&ds, &all_indices(&ds), "state", "year", &["facility_index"]);

        let kerala: Vec<&TrendRow> = series
            .rows
            .iter()
            .filter(|r| r.entity == Value::Text("Kerala".into()))
            .collect();
        assert_eq!(kerala.len(), 3);
        assert_eq!(kerala[0].changes, vec![None]);
        assert_eq!(kerala[1].changes, vec![Some(5.0)]);
        assert_eq!(kerala[2].changes, vec![Some(5.0)]);

        // the first Assam row must not difference against Kerala's last
        let assam_first = series
            .rows
            .iter()
            .find(|r| r.entity == Value::Text("Assam".into()))
            .unwrap();
        assert_eq!(assam_first.changes, vec![None]);
    }

    #[test]
    fn improvement_rollup_means_non_null_changes() {
        let ds = SchoolDataset::from_records(vec![
            observation("Kerala", 2019, 50.0),
            observation("Kerala", 2020, 55.0),
            observation("Kerala", 2021, 60.0),
            observation("Assam", 2019, 30.0),
            observation("Assam", 2020, 31.0),
        ]);
        let series = trend(&ds, &all_indices(&ds), "state", "year", &["facility_index"]);
        let rollup = average_improvement(&series);

        assert_eq!(rollup.len(), 2);
        // entities in ascending order: Assam, Kerala
        assert_eq!(rollup[0].entity, Value::Text("Assam".into()));
        assert_eq!(rollup[0].avg_change, vec![Some(1.0)]);
        assert_eq!(rollup[1].avg_change, vec![Some(5.0)]);

        let top = top_improvers(&rollup, 0, 1);
        assert_eq!(top[0].entity, Value::Text("Kerala".into()));
    }

    #[test]
    fn top_improvers_breaks_ties_by_input_order() {
        let rollup = vec![
            ImprovementRow {
                entity: Value::Text("Assam".into()),
                avg_change: vec![Some(2.0)],
            },
            ImprovementRow {
                entity: Value::Text("Bihar".into()),
                avg_change: vec![Some(2.0)],
            },
            ImprovementRow {
                entity: Value::Text("Goa".into()),
                avg_change: vec![None],
            },
        ];
        let top = top_improvers(&rollup, 0, 3);
        assert_eq!(top[0].entity, Value::Text("Assam".into()));
        assert_eq!(top[1].entity, Value::Text("Bihar".into()));
        assert_eq!(top[2].entity, Value::Text("Goa".into()));
    }
}
