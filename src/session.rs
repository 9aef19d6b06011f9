use std::path::Path;

use anyhow::Result;

use crate::data::cache::DatasetCache;
use crate::data::derive::SchemaReport;
use crate::data::filter::{filtered_indices, init_criteria, FilterCriteria, Selection};
use crate::data::loader::LoadedTable;
use crate::data::model::SchoolDataset;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The engine state behind one user session, independent of rendering.
/// Aggregates are recomputed from `visible` on demand and never stored
/// past a filter change.
#[derive(Default)]
pub struct Session {
    /// Loaded dataset (None until a source is loaded).
    pub dataset: Option<SchoolDataset>,

    /// Negotiated schema of the loaded source.
    pub schema: Option<SchemaReport>,

    /// Current hierarchical filter criteria.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria (cached).
    pub visible: Vec<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a source through the injected cache and make it current.
    pub fn load(&mut self, cache: &mut DatasetCache, path: &Path) -> Result<()> {
        let table = cache.load(path)?.clone();
        self.set_table(table);
        Ok(())
    }

    /// Ingest a loaded table, resetting criteria to pass everything.
    pub fn set_table(&mut self, table: LoadedTable) {
        self.criteria = init_criteria(&table.dataset);
        self.visible = (0..table.dataset.len()).collect();
        self.schema = Some(table.schema);
        self.dataset = Some(table.dataset);
    }

    pub fn set_state(&mut self, selection: Selection) {
        self.criteria.state = selection;
        self.refilter();
    }

    pub fn set_district(&mut self, selection: Selection) {
        self.criteria.district = selection;
        self.refilter();
    }

    /// Toggle a single area type in the membership set.
    pub fn toggle_area(&mut self, area: &str) {
        if !self.criteria.area_types.remove(area) {
            self.criteria.area_types.insert(area.to_string());
        }
        self.refilter();
    }

    /// Select every area type observed in the dataset.
    pub fn select_all_areas(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria.area_types = init_criteria(ds).area_types;
        }
        self.refilter();
    }

    /// Deselect every area type (matches nothing).
    pub fn select_no_areas(&mut self) {
        self.criteria.area_types.clear();
        self.refilter();
    }

    /// Recompute `visible` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible = filtered_indices(ds, &self.criteria);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;

    const SAMPLE: &str = "\
state,district,rural_urban,total_tch
Kerala,Wayanad,Rural,12
Kerala,Ernakulam,Urban,30
Goa,North Goa,Rural,9
";

    fn session() -> Session {
        let mut session = Session::new();
        session.set_table(load_csv_reader(SAMPLE.as_bytes()).unwrap());
        session
    }

    #[test]
    fn fresh_session_passes_every_record() {
        let s = session();
        assert_eq!(s.visible, vec![0, 1, 2]);
    }

    #[test]
    fn filter_changes_recompute_visible_indices() {
        let mut s = session();
        s.set_state(Selection::only("Kerala"));
        assert_eq!(s.visible, vec![0, 1]);

        s.toggle_area("Urban");
        assert_eq!(s.visible, vec![0]);

        s.select_no_areas();
        assert!(s.visible.is_empty());

        s.select_all_areas();
        s.set_state(Selection::All);
        assert_eq!(s.visible, vec![0, 1, 2]);
    }
}
