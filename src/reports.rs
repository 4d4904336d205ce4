//! Map metrics: visitor counts, expenditure, average spend per visitor and
//! crowd score, one value per ISO-3 country for a year.
//!
//! Each metric has a pure `*_from_records` core that works on loaded
//! records, and a thin wrapper that loads the CSVs for a request.

use crate::config::{DataPaths, AVG_SPEND_CEILING, WORLD_PARTNER};
use crate::countries::CountryRegistry;
use crate::error::{ReportError, Result};
use crate::loader::load_tourism;
use crate::output::{log_preview, sort_descending, summarize, to_map_data, MapEntry};
use crate::resolver::{
    available_indicators, available_years, indicator_counts, primary_indicator, resolve,
    resolve_max_any_partner, IndicatorPriority, EXPENDITURE_PRIORITY, VISITOR_PRIORITY,
};
use crate::types::{MapResponse, ResolvedEntityValue, TourismRecord};
use crate::units::{average_spend, to_canonical};
use std::collections::{BTreeMap, HashMap};

pub const METRIC_TOURIST_COUNT: &str = "tourist_count";
pub const METRIC_EXPENDITURE: &str = "expenditure";
pub const METRIC_AVG_SPENDING: &str = "avg_spending";
pub const METRIC_CROWD_SCORE: &str = "crowd_score";

/// Diagnose an empty resolution: either the year is absent altogether or
/// none of the metric's indicators were reported for it.
fn missing_data(records: &[TourismRecord], year: i32, priority: &IndicatorPriority) -> ReportError {
    if !records.iter().any(|r| r.year == year) {
        return ReportError::NoDataForYear {
            year,
            available_years: available_years(records),
        };
    }
    ReportError::NoIndicator {
        year,
        available_indicators: available_indicators(records, year),
        tried_indicators: priority.to_vec(),
    }
}

/// Attach ISO-3 codes. Unmapped reporters are dropped and counted, never
/// treated as a failure.
fn map_to_iso3<'a, I>(metric: &str, registry: &CountryRegistry, rows: I) -> (Vec<MapEntry>, usize)
where
    I: IntoIterator<Item = (&'a str, f64, Option<f64>)>,
{
    let mut unmapped: Vec<&str> = Vec::new();
    let mut entries = Vec::new();
    for (name, value, secondary) in rows {
        match registry.to_iso3(name) {
            Some(iso3) => entries.push(MapEntry {
                iso3: iso3.to_string(),
                name: name.to_string(),
                value,
                secondary,
            }),
            None => unmapped.push(name),
        }
    }
    if !unmapped.is_empty() {
        let sample: Vec<&str> = unmapped.iter().take(10).copied().collect();
        tracing::warn!(metric, count = unmapped.len(), ?sample, "unmapped reporters excluded");
    }
    (entries, unmapped.len())
}

fn log_resolution(metric: &str, year: i32, resolved: &[ResolvedEntityValue]) {
    tracing::info!(
        metric,
        year,
        countries = resolved.len(),
        indicators = ?indicator_counts(resolved),
        "indicators resolved"
    );
}

/// Per-metric output settings.
struct MapOptions {
    indicator_used: Option<String>,
    counts: BTreeMap<String, usize>,
    /// emit `tourist_counts` alongside the values
    with_secondary: bool,
    /// decimals in the debug preview
    decimals: usize,
}

impl MapOptions {
    fn resolved(resolved: &[ResolvedEntityValue], priority: &IndicatorPriority) -> Self {
        Self {
            indicator_used: primary_indicator(resolved, priority),
            counts: indicator_counts(resolved),
            with_secondary: false,
            decimals: 0,
        }
    }
}

fn finish(
    metric: &'static str,
    year: i32,
    mut entries: Vec<MapEntry>,
    unmapped: usize,
    opts: MapOptions,
) -> MapResponse {
    sort_descending(&mut entries);
    log_preview(metric, &entries, opts.decimals);
    tracing::info!(metric, year, countries = entries.len(), "map metric ready");
    MapResponse {
        year,
        metric,
        data: to_map_data(&entries, opts.with_secondary),
        stats: summarize(&entries, unmapped, opts.indicator_used, opts.counts),
    }
}

/// Total inbound visitors (people) per country.
///
/// Uses partner = "World" rows; when a year has no World row for any visitor
/// indicator, falls back to the largest value per reporter of the first
/// indicator present across all partners. World rows that exist but hold no
/// number do not trigger the fallback.
pub fn visitor_map_from_records(
    records: &[TourismRecord],
    registry: &CountryRegistry,
    year: i32,
) -> Result<MapResponse> {
    let has_world_rows = records.iter().any(|r| {
        r.year == year
            && r.partner == WORLD_PARTNER
            && VISITOR_PRIORITY.rank(&r.indicator_code).is_some()
    });
    let resolved = if has_world_rows {
        resolve(records, year, Some(WORLD_PARTNER), &VISITOR_PRIORITY)
    } else if records.iter().any(|r| r.year == year) {
        tracing::warn!(year, "no World rows for year, using per-partner maximum");
        resolve_max_any_partner(records, year, &VISITOR_PRIORITY)
    } else {
        Vec::new()
    };
    if resolved.is_empty() {
        return Err(missing_data(records, year, &VISITOR_PRIORITY));
    }
    log_resolution(METRIC_TOURIST_COUNT, year, &resolved);

    let (mut entries, unmapped) = map_to_iso3(
        METRIC_TOURIST_COUNT,
        registry,
        resolved
            .iter()
            .map(|r| (r.entity.as_str(), to_canonical(r.value, r.unit), None)),
    );
    entries.retain(|e| e.value > 0.0);

    Ok(finish(
        METRIC_TOURIST_COUNT,
        year,
        entries,
        unmapped,
        MapOptions::resolved(&resolved, &VISITOR_PRIORITY),
    ))
}

/// Inbound expenditure (million USD) per country.
pub fn expenditure_map_from_records(
    records: &[TourismRecord],
    registry: &CountryRegistry,
    year: i32,
) -> Result<MapResponse> {
    let resolved = resolve(records, year, Some(WORLD_PARTNER), &EXPENDITURE_PRIORITY);
    if resolved.is_empty() {
        return Err(missing_data(records, year, &EXPENDITURE_PRIORITY));
    }
    log_resolution(METRIC_EXPENDITURE, year, &resolved);

    let (mut entries, unmapped) = map_to_iso3(
        METRIC_EXPENDITURE,
        registry,
        resolved
            .iter()
            .map(|r| (r.entity.as_str(), to_canonical(r.value, r.unit), None)),
    );
    entries.retain(|e| e.value > 0.0);

    Ok(finish(
        METRIC_EXPENDITURE,
        year,
        entries,
        unmapped,
        MapOptions::resolved(&resolved, &EXPENDITURE_PRIORITY),
    ))
}

/// USD per trip for countries present in both datasets.
pub fn avg_spending_map_from_records(
    arrivals: &[TourismRecord],
    expenditure: &[TourismRecord],
    registry: &CountryRegistry,
    year: i32,
) -> Result<MapResponse> {
    let visitors = resolve(arrivals, year, Some(WORLD_PARTNER), &VISITOR_PRIORITY);
    if visitors.is_empty() {
        return Err(missing_data(arrivals, year, &VISITOR_PRIORITY));
    }
    let spend = resolve(expenditure, year, Some(WORLD_PARTNER), &EXPENDITURE_PRIORITY);
    if spend.is_empty() {
        return Err(missing_data(expenditure, year, &EXPENDITURE_PRIORITY));
    }
    log_resolution(METRIC_AVG_SPENDING, year, &visitors);
    log_resolution(METRIC_AVG_SPENDING, year, &spend);

    let spend_by_reporter: HashMap<&str, f64> = spend
        .iter()
        .map(|r| (r.entity.as_str(), to_canonical(r.value, r.unit)))
        .collect();
    let joined: Vec<(&str, Option<f64>)> = visitors
        .iter()
        .filter_map(|v| {
            spend_by_reporter.get(v.entity.as_str()).map(|e| {
                (
                    v.entity.as_str(),
                    average_spend(*e, to_canonical(v.value, v.unit)),
                )
            })
        })
        .collect();
    if joined.is_empty() {
        return Err(ReportError::NoOverlap { year });
    }

    let kept: Vec<(&str, f64)> = joined
        .iter()
        .filter_map(|(name, avg)| avg.map(|a| (*name, a)))
        .filter(|(_, avg)| *avg > 0.0 && *avg < AVG_SPEND_CEILING)
        .collect();
    let outliers = joined.len() - kept.len();
    if outliers > 0 {
        tracing::info!(year, outliers, "average spend outliers dropped");
    }

    let (entries, unmapped) = map_to_iso3(
        METRIC_AVG_SPENDING,
        registry,
        kept.into_iter().map(|(name, avg)| (name, avg, None)),
    );

    let mut counts = indicator_counts(&visitors);
    counts.extend(indicator_counts(&spend));
    let indicator_used = match (
        primary_indicator(&spend, &EXPENDITURE_PRIORITY),
        primary_indicator(&visitors, &VISITOR_PRIORITY),
    ) {
        (Some(e), Some(v)) => Some(format!("{} / {}", e, v)),
        _ => None,
    };

    Ok(finish(
        METRIC_AVG_SPENDING,
        year,
        entries,
        unmapped,
        MapOptions {
            indicator_used,
            counts,
            with_secondary: false,
            decimals: 2,
        },
    ))
}

/// Min-max normalize to 0..=100. A constant input has no spread, so every
/// score is 0.
pub fn crowd_scores(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| (((v - min) / range) * 100.0).clamp(0.0, 100.0))
        .collect()
}

/// Relative visitor volume. Extremes are taken over every resolved reporter,
/// mapped or not; the least visited reporter scores 0 and is dropped.
pub fn crowd_score_map_from_records(
    records: &[TourismRecord],
    registry: &CountryRegistry,
    year: i32,
) -> Result<MapResponse> {
    let resolved = resolve(records, year, Some(WORLD_PARTNER), &VISITOR_PRIORITY);
    if resolved.is_empty() {
        return Err(missing_data(records, year, &VISITOR_PRIORITY));
    }
    log_resolution(METRIC_CROWD_SCORE, year, &resolved);

    let tourists: Vec<f64> = resolved
        .iter()
        .map(|r| to_canonical(r.value, r.unit))
        .collect();
    let scores = crowd_scores(&tourists);

    let (entries, unmapped) = map_to_iso3(
        METRIC_CROWD_SCORE,
        registry,
        resolved
            .iter()
            .zip(tourists.iter().zip(scores.iter()))
            .filter(|(_, (_, score))| **score > 0.0)
            .map(|(r, (count, score))| (r.entity.as_str(), *score, Some(*count))),
    );

    Ok(finish(
        METRIC_CROWD_SCORE,
        year,
        entries,
        unmapped,
        MapOptions {
            with_secondary: true,
            decimals: 2,
            ..MapOptions::resolved(&resolved, &VISITOR_PRIORITY)
        },
    ))
}

pub fn world_visitor_map(paths: &DataPaths, registry: &CountryRegistry, year: i32) -> Result<MapResponse> {
    let records = load_tourism(&paths.arrivals)?;
    visitor_map_from_records(&records, registry, year)
}

pub fn world_expenditure_map(paths: &DataPaths, registry: &CountryRegistry, year: i32) -> Result<MapResponse> {
    let records = load_tourism(&paths.expenditure)?;
    expenditure_map_from_records(&records, registry, year)
}

pub fn world_avg_spending_map(paths: &DataPaths, registry: &CountryRegistry, year: i32) -> Result<MapResponse> {
    let arrivals = load_tourism(&paths.arrivals)?;
    let expenditure = load_tourism(&paths.expenditure)?;
    avg_spending_map_from_records(&arrivals, &expenditure, registry, year)
}

pub fn world_crowd_score_map(paths: &DataPaths, registry: &CountryRegistry, year: i32) -> Result<MapResponse> {
    let records = load_tourism(&paths.arrivals)?;
    crowd_score_map_from_records(&records, registry, year)
}
