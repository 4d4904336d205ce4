use crate::types::{MapData, MapStats, PreviewRow};
use crate::util::{average, format_number, median};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};

/// A country that survived mapping and outlier filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub iso3: String,
    pub name: String,
    pub value: f64,
    /// Raw visitor count behind a derived score, when the metric has one.
    pub secondary: Option<f64>,
}

/// Sort descending by value. The sort is stable, so equal values keep their
/// incoming (reporter-name) order.
pub fn sort_descending(entries: &mut [MapEntry]) {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

/// Summary statistics over the final, filtered set. Expects `entries` to be
/// sorted descending already.
pub fn summarize(
    entries: &[MapEntry],
    unmapped_countries: usize,
    indicator_used: Option<String>,
    indicator_counts: BTreeMap<String, usize>,
) -> MapStats {
    let values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    MapStats {
        total_countries: entries.len(),
        total_value: values.iter().sum(),
        avg_value: average(&values),
        median_value: median(values.clone()),
        max_country: entries.first().map(|e| e.name.clone()),
        max_value: entries.first().map_or(0.0, |e| e.value),
        unmapped_countries,
        indicator_used,
        indicator_counts,
    }
}

/// Column-oriented shape consumed by the map front end.
pub fn to_map_data(entries: &[MapEntry], with_secondary: bool) -> MapData {
    MapData {
        countries: entries.iter().map(|e| e.iso3.clone()).collect(),
        country_names: entries.iter().map(|e| e.name.clone()).collect(),
        values: entries.iter().map(|e| e.value).collect(),
        tourist_counts: with_secondary
            .then(|| entries.iter().map(|e| e.secondary.unwrap_or(0.0)).collect()),
    }
}

pub fn preview_rows(entries: &[MapEntry], max_rows: usize, decimals: usize) -> Vec<PreviewRow> {
    entries
        .iter()
        .take(max_rows)
        .enumerate()
        .map(|(idx, e)| PreviewRow {
            rank: idx + 1,
            iso3: e.iso3.clone(),
            country: e.name.clone(),
            value: format_number(e.value, decimals),
        })
        .collect()
}

/// Markdown table of the first `max_rows` rows, or `(no rows)`.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

/// Log the top of a ranking at debug level.
pub fn log_preview(metric: &str, entries: &[MapEntry], decimals: usize) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let rows = preview_rows(entries, 10, decimals);
    tracing::debug!(metric, "top 10\n{}", render_table(&rows, 10));
}
