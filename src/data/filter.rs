use std::collections::BTreeSet;

use super::model::SchoolDataset;

// ---------------------------------------------------------------------------
// Hierarchical filter criteria: state → district → area type
// ---------------------------------------------------------------------------

pub const STATE: &str = "state";
pub const DISTRICT: &str = "district";
pub const AREA_TYPE: &str = "rural_urban";

/// An equality constraint on a key column. `All` is the passthrough
/// sentinel: no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    fn admits(&self, cell: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            // A null cell never equals a chosen value.
            Selection::Only(wanted) => cell == Some(wanted.as_str()),
        }
    }
}

/// Constraints evaluated conjunctively over a dataset.
///
/// `area_types` is set membership: a record passes when its trimmed
/// `rural_urban` value is in the set. An empty set therefore selects
/// nothing, mirroring an empty multi-select.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub state: Selection,
    pub district: Selection,
    pub area_types: BTreeSet<String>,
}

/// Criteria that pass every record: `All` for both equality constraints
/// and every observed area type selected.
pub fn init_criteria(dataset: &SchoolDataset) -> FilterCriteria {
    let area_types = dataset
        .unique_values
        .get(AREA_TYPE)
        .map(|vals| {
            vals.iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    FilterCriteria {
        state: Selection::All,
        district: Selection::All,
        area_types,
    }
}

/// Return indices of records that pass all constraints, in input order.
///
/// Filtering is a pure projection: the dataset is never mutated and the
/// result is always a subset of `0..dataset.len()`.
pub fn filtered_indices(dataset: &SchoolDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if !criteria.state.admits(rec.text(STATE)) {
                return false;
            }
            if !criteria.district.admits(rec.text(DISTRICT)) {
                return false;
            }
            // Membership test: records with a null or missing area type
            // fail, as does everything when nothing is selected.
            match rec.text(AREA_TYPE) {
                Some(area) => criteria.area_types.contains(area),
                None => false,
            }
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{SchoolRecord, Value};

    fn school(state: &str, district: &str, area: &str) -> SchoolRecord {
        let mut rec = SchoolRecord::new();
        rec.set(STATE, Value::Text(state.into()));
        rec.set(DISTRICT, Value::Text(district.into()));
        rec.set(AREA_TYPE, Value::Text(area.into()));
        rec
    }

    fn sample() -> SchoolDataset {
        SchoolDataset::from_records(vec![
            school("Kerala", "Wayanad", "Rural"),
            school("Kerala", "Ernakulam", "Urban"),
            school("Goa", "North Goa", "Rural"),
        ])
    }

    #[test]
    fn all_sentinel_is_a_passthrough() {
        let ds = sample();
        let criteria = init_criteria(&ds);
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 1, 2]);
    }

    #[test]
    fn constraints_combine_conjunctively() {
        let ds = sample();
        let mut criteria = init_criteria(&ds);
        criteria.state = Selection::only("Kerala");
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 1]);

        criteria.district = Selection::only("Wayanad");
        assert_eq!(filtered_indices(&ds, &criteria), vec![0]);
    }

    #[test]
    fn empty_area_selection_selects_nothing() {
        let ds = sample();
        let mut criteria = init_criteria(&ds);
        criteria.area_types.clear();
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }

    #[test]
    fn area_membership_restricts_to_chosen_set() {
        let ds = sample();
        let mut criteria = init_criteria(&ds);
        criteria.area_types = BTreeSet::from(["Urban".to_string()]);
        assert_eq!(filtered_indices(&ds, &criteria), vec![1]);
    }

    #[test]
    fn null_key_fails_specific_constraints() {
        let mut incomplete = SchoolRecord::new();
        incomplete.set(AREA_TYPE, Value::Text("Rural".into()));
        let ds = SchoolDataset::from_records(vec![school("Kerala", "Wayanad", "Rural"), incomplete]);

        let mut criteria = init_criteria(&ds);
        criteria.state = Selection::only("Kerala");
        assert_eq!(filtered_indices(&ds, &criteria), vec![0]);
    }

    #[test]
    fn filtering_preserves_input_order() {
        let ds = sample();
        let mut criteria = init_criteria(&ds);
        criteria.area_types = BTreeSet::from(["Rural".to_string()]);
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 2]);
    }
}
