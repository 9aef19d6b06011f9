use std::fmt::Write;

use crate::data::aggregate::{
    average_improvement, column_mean, column_sum, group_reduce, top_improvers, trend,
    AggregateTable, Reduce, TrendSeries,
};
use crate::data::derive::{CWSN_TOILET, FACILITY_INDEX, TOTAL_FUNC_TOILET, TOTAL_GENDER};
use crate::data::filter::{FilterCriteria, Selection, AREA_TYPE};
use crate::data::model::SchoolDataset;

// ---------------------------------------------------------------------------
// Canned summaries shared by the dashboard views
// ---------------------------------------------------------------------------

/// Headline metrics over the filtered set (the KPI strip of every view).
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewMetrics {
    pub schools: usize,
    pub avg_teachers: Option<f64>,
    pub avg_func_toilets: Option<f64>,
    pub avg_trained: Option<f64>,
    pub avg_facility_index: Option<f64>,
    pub total_teachers: f64,
    pub total_female_teachers: f64,
    pub total_students_proxy: f64,
}

pub fn overview(dataset: &SchoolDataset, indices: &[usize]) -> OverviewMetrics {
    OverviewMetrics {
        schools: indices.len(),
        avg_teachers: column_mean(dataset, indices, "total_tch"),
        avg_func_toilets: column_mean(dataset, indices, TOTAL_FUNC_TOILET),
        avg_trained: column_mean(dataset, indices, "trained_comp"),
        avg_facility_index: column_mean(dataset, indices, FACILITY_INDEX),
        total_teachers: column_sum(dataset, indices, "total_tch"),
        total_female_teachers: column_sum(dataset, indices, "female"),
        total_students_proxy: column_sum(dataset, indices, TOTAL_GENDER),
    }
}

/// Staffing and infrastructure means per area type.
pub fn area_staffing_summary(dataset: &SchoolDataset, indices: &[usize]) -> AggregateTable {
    group_reduce(
        dataset,
        indices,
        &[AREA_TYPE],
        &[
            ("total_tch", Reduce::Mean),
            (TOTAL_FUNC_TOILET, Reduce::Mean),
            ("trained_comp", Reduce::Mean),
            (CWSN_TOILET, Reduce::Mean),
            (FACILITY_INDEX, Reduce::Mean),
        ],
    )
}

/// Gender, caste, and qualification totals per area type.
pub fn area_composition_summary(dataset: &SchoolDataset, indices: &[usize]) -> AggregateTable {
    group_reduce(
        dataset,
        indices,
        &[AREA_TYPE],
        &[
            ("male", Reduce::Sum),
            ("female", Reduce::Sum),
            ("transgender", Reduce::Sum),
            ("gen_tch", Reduce::Sum),
            ("sc_tch", Reduce::Sum),
            ("st_tch", Reduce::Sum),
            ("obc_tch", Reduce::Sum),
            ("below_graduate", Reduce::Sum),
            ("graduate", Reduce::Sum),
            ("post_graduate_and_above", Reduce::Sum),
            ("trained_comp", Reduce::Sum),
            (TOTAL_GENDER, Reduce::Sum),
        ],
    )
}

/// Classroom condition and building-type means per area type.
pub fn area_infrastructure_summary(dataset: &SchoolDataset, indices: &[usize]) -> AggregateTable {
    group_reduce(
        dataset,
        indices,
        &[AREA_TYPE],
        &[
            ("classrooms_in_good_condition", Reduce::Mean),
            ("classrooms_needs_minor_repair", Reduce::Mean),
            ("classrooms_needs_major_repair", Reduce::Mean),
            ("pucca_building_blocks", Reduce::Mean),
            ("no_building_blocks", Reduce::Mean),
        ],
    )
}

/// Student totals (gender-sum proxy) grouped by a chosen key column.
pub fn enrolment_by(dataset: &SchoolDataset, indices: &[usize], key: &str) -> AggregateTable {
    group_reduce(dataset, indices, &[key], &[(TOTAL_GENDER, Reduce::Sum)])
}

/// Teacher totals across class ranges, split by area type.
pub fn class_range_staffing(dataset: &SchoolDataset, indices: &[usize]) -> AggregateTable {
    group_reduce(
        dataset,
        indices,
        &[AREA_TYPE, "highclass"],
        &[("total_tch", Reduce::Sum)],
    )
}

// ---------------------------------------------------------------------------
// Markdown rendering
// ---------------------------------------------------------------------------

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn describe_criteria(criteria: &FilterCriteria) -> String {
    let state = match &criteria.state {
        Selection::All => "all states".to_string(),
        Selection::Only(s) => s.clone(),
    };
    let district = match &criteria.district {
        Selection::All => "all districts".to_string(),
        Selection::Only(d) => d.clone(),
    };
    let areas: Vec<&str> = criteria.area_types.iter().map(String::as_str).collect();
    format!("{state} / {district} / [{}]", areas.join(", "))
}

/// Render an aggregate table as markdown bullet lines.
pub fn render_table(output: &mut String, table: &AggregateTable) {
    if table.rows.is_empty() {
        let _ = writeln!(output, "No groups for the current selection.");
        return;
    }
    for row in &table.rows {
        let key: Vec<String> = row.key.iter().map(|v| v.to_string()).collect();
        let cells: Vec<String> = table
            .columns
            .iter()
            .zip(&row.values)
            .map(|(col, v)| format!("{col} {}", fmt_opt(*v)))
            .collect();
        let _ = writeln!(output, "- {}: {}", key.join(" / "), cells.join(", "));
    }
}

/// Build the filtered-set summary report every dashboard page shares.
pub fn build_summary_report(
    dataset: &SchoolDataset,
    indices: &[usize],
    criteria: &FilterCriteria,
) -> String {
    let mut output = String::new();
    let metrics = overview(dataset, indices);

    let _ = writeln!(output, "# School Summary");
    let _ = writeln!(output, "Filters: {}", describe_criteria(criteria));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Schools: {}", metrics.schools);
    let _ = writeln!(output, "- Avg teachers: {}", fmt_opt(metrics.avg_teachers));
    let _ = writeln!(
        output,
        "- Avg functional toilets: {}",
        fmt_opt(metrics.avg_func_toilets)
    );
    let _ = writeln!(
        output,
        "- Avg computer-trained teachers: {}",
        fmt_opt(metrics.avg_trained)
    );
    let _ = writeln!(
        output,
        "- Avg facility index: {}",
        fmt_opt(metrics.avg_facility_index)
    );
    let _ = writeln!(
        output,
        "- Students (gender-total proxy): {:.0}",
        metrics.total_students_proxy
    );

    if indices.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No schools match the current filters.");
        return output;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Staffing & Facilities by Area Type");
    render_table(&mut output, &area_staffing_summary(dataset, indices));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Teacher Composition by Area Type");
    render_table(&mut output, &area_composition_summary(dataset, indices));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Classroom Condition by Area Type");
    render_table(&mut output, &area_infrastructure_summary(dataset, indices));

    if dataset.has_column("school_type") {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Enrolment by School Type");
        render_table(&mut output, &enrolment_by(dataset, indices, "school_type"));
    }

    if dataset.has_column("highclass") {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Enrolment by Class Range");
        render_table(&mut output, &enrolment_by(dataset, indices, "highclass"));

        let _ = writeln!(output);
        let _ = writeln!(output, "## Teachers Across Class Ranges");
        render_table(&mut output, &class_range_staffing(dataset, indices));
    }

    output
}

/// Build the multi-year improvement report.
pub fn build_trend_report(
    dataset: &SchoolDataset,
    indices: &[usize],
    metrics: &[&str],
    top_n: usize,
) -> String {
    let series: TrendSeries = trend(dataset, indices, "state", "year", metrics);
    let rollup = average_improvement(&series);

    let mut output = String::new();
    let _ = writeln!(output, "# State Improvement Report");
    let _ = writeln!(
        output,
        "Metrics: {} (year-over-year first differences)",
        series.metrics.join(", ")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Per-Year Observations");

    if series.rows.is_empty() {
        let _ = writeln!(output, "No observations for the current selection.");
        return output;
    }

    for row in &series.rows {
        let values: Vec<String> = series
            .metrics
            .iter()
            .zip(row.values.iter().zip(&row.changes))
            .map(|(metric, (value, change))| {
                format!(
                    "{metric} {} (change {})",
                    fmt_opt(*value),
                    fmt_opt(*change)
                )
            })
            .collect();
        let _ = writeln!(output, "- {} {}: {}", row.entity, row.time, values.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top {top_n} by Average Improvement");
    for row in top_improvers(&rollup, 0, top_n) {
        let changes: Vec<String> = series
            .metrics
            .iter()
            .zip(&row.avg_change)
            .map(|(metric, change)| format!("{metric} {}", fmt_opt(*change)))
            .collect();
        let _ = writeln!(output, "- {}: {}", row.entity, changes.join(", "));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::init_criteria;
    use crate::data::loader::load_csv_reader;

    const SAMPLE: &str = "\
state,district,rural_urban,total_tch,male,female,transgender,trained_comp
Kerala,Wayanad,Rural,12,7,5,0,3
Kerala,Ernakulam,Urban,30,12,18,0,20
";

    #[test]
    fn overview_mixes_means_and_sums() {
        let table = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let indices: Vec<usize> = (0..table.dataset.len()).collect();
        let metrics = overview(&table.dataset, &indices);
        assert_eq!(metrics.schools, 2);
        assert_eq!(metrics.avg_teachers, Some(21.0));
        assert_eq!(metrics.total_female_teachers, 23.0);
        assert_eq!(metrics.total_students_proxy, 42.0);
        // facility columns absent from this source
        assert_eq!(metrics.avg_facility_index, None);
    }

    #[test]
    fn summary_report_handles_empty_result_sets() {
        let table = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let criteria = init_criteria(&table.dataset);
        let report = build_summary_report(&table.dataset, &[], &criteria);
        assert!(report.contains("No schools match the current filters."));
        assert!(report.contains("- Schools: 0"));
    }

    #[test]
    fn summary_report_lists_area_groups() {
        let table = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let indices: Vec<usize> = (0..table.dataset.len()).collect();
        let criteria = init_criteria(&table.dataset);
        let report = build_summary_report(&table.dataset, &indices, &criteria);
        assert!(report.contains("- Rural: total_tch 12.00"));
        assert!(report.contains("Filters: all states / all districts / [Rural, Urban]"));
    }
}
