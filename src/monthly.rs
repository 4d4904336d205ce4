//! Monthly visitor series for the two country detail pages.
//!
//! Japan publishes a spreadsheet-style export where the year is written only
//! on January rows (`1997 Jan.` then `Feb.`, `Mar.` ...). Korea publishes
//! `YYYY-M` dates with one row per nation and age band, which are summed
//! into one value per month.

use crate::config::DataPaths;
use crate::error::{ReportError, Result};
use crate::loader::{load_japan_rows, load_korea_rows};
use crate::types::{
    MonthEntry, MonthPoint, MonthlyData, MonthlyResponse, MonthlyStats, MonthlyVisitorSeries,
};
use crate::util::{format_int, round1};
use chrono::Month;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static YEAR_AND_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}).*?([A-Za-z]{3})").expect("valid regex"));
static MONTH_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z]{3})").expect("valid regex"));

/// One month of one year as read from a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyObservation {
    pub year: i32,
    pub month: u32,
    pub value: Option<f64>,
}

/// 1-based month number for `Jan`, `jan`, `January`...
pub fn month_index(token: &str) -> Option<u32> {
    token
        .trim()
        .parse::<Month>()
        .ok()
        .map(|m| m.number_from_month())
}

/// Canonical three-letter abbreviation (`Jan`..`Dec`).
pub fn month_abbrev(index: u32) -> Option<&'static str> {
    let month = Month::try_from(u8::try_from(index).ok()?).ok()?;
    Some(&month.name()[..3])
}

/// Split a Japan `Monthly` cell into `(year, month token)`.
pub fn parse_japan_label(label: &str) -> (Option<i32>, Option<&str>) {
    let label = label.trim();
    if let Some(caps) = YEAR_AND_MONTH.captures(label) {
        let year = caps.get(1).and_then(|m| m.as_str().parse().ok());
        return (year, caps.get(2).map(|m| m.as_str()));
    }
    match MONTH_ONLY.captures(label) {
        Some(caps) => (None, caps.get(1).map(|m| m.as_str())),
        None => (None, None),
    }
}

/// Format A. Rows without a year inherit the last year seen above them;
/// rows whose token is not a month are dropped. Duplicate months pass
/// through untouched.
pub fn extract_japan(rows: &[(String, Option<f64>)]) -> Vec<MonthlyObservation> {
    let mut last_year: Option<i32> = None;
    let mut out = Vec::new();
    for (label, value) in rows {
        let (year, token) = parse_japan_label(label);
        if year.is_some() {
            last_year = year;
        }
        let (Some(year), Some(month)) = (last_year, token.and_then(month_index)) else {
            continue;
        };
        out.push(MonthlyObservation {
            year,
            month,
            value: *value,
        });
    }
    out
}

/// `"2024-7"` -> `(2024, 7)`.
pub fn parse_korea_date(date: &str) -> Option<(i32, u32)> {
    let (year, month) = date.trim().split_once('-')?;
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Format B. Sums visitors over every nation/age row of a month.
pub fn extract_korea(rows: &[(String, String, Option<f64>)]) -> Vec<MonthlyObservation> {
    let mut sums: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (date, _nation, visitors) in rows {
        let (Some((year, month)), Some(v)) = (parse_korea_date(date), visitors) else {
            continue;
        };
        *sums.entry((year, month)).or_insert(0.0) += v;
    }
    sums.into_iter()
        .map(|((year, month), total)| MonthlyObservation {
            year,
            month,
            value: Some(total),
        })
        .collect()
}

pub fn available_years(observations: &[MonthlyObservation]) -> Vec<i32> {
    let mut years: Vec<i32> = observations.iter().map(|o| o.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Select a year (latest when `requested` is `None`), order by month and
/// attach year-over-year change against the previous year.
pub fn build_series(
    observations: &[MonthlyObservation],
    requested: Option<i32>,
) -> Result<MonthlyVisitorSeries> {
    let years = available_years(observations);
    let Some(&latest) = years.last() else {
        return Err(ReportError::NoValidMonthlyData { year: requested });
    };
    let year = requested.unwrap_or(latest);
    if !years.contains(&year) {
        return Err(ReportError::NoDataForYear {
            year,
            available_years: years,
        });
    }

    let valued = |y: i32| {
        observations
            .iter()
            .filter(move |o| o.year == y)
            .filter_map(|o| o.value.map(|v| (o.month, v)))
    };
    let mut current: Vec<(u32, f64)> = valued(year).collect();
    if current.is_empty() {
        return Err(ReportError::NoValidMonthlyData { year: Some(year) });
    }
    current.sort_by_key(|(month, _)| *month);

    let mut previous: BTreeMap<u32, f64> = BTreeMap::new();
    for (month, v) in valued(year - 1) {
        previous.entry(month).or_insert(v);
    }

    let months = current
        .into_iter()
        .map(|(month, v)| {
            let change_pct = match previous.get(&month) {
                Some(prev) if *prev > 0.0 => round1((v - prev) / prev * 100.0),
                _ => 0.0,
            };
            MonthEntry {
                name: month_abbrev(month).unwrap_or("").to_string(),
                index: month,
                value: v as i64,
                change_pct,
            }
        })
        .collect();

    Ok(MonthlyVisitorSeries { year, months })
}

fn point(entry: &MonthEntry) -> MonthPoint {
    MonthPoint {
        month: entry.name.clone(),
        month_number: entry.index,
        value: entry.value,
    }
}

// `series` is never empty here; `build_series` rejects empty years.
fn monthly_stats(series: &MonthlyVisitorSeries, available_years: Vec<i32>) -> MonthlyStats {
    let total: i64 = series.months.iter().map(|m| m.value).sum();
    let count = series.months.len().max(1) as i64;
    // First occurrence wins for ties in both directions.
    let mut max = &series.months[0];
    let mut min = &series.months[0];
    for m in &series.months[1..] {
        if m.value > max.value {
            max = m;
        }
        if m.value < min.value {
            min = m;
        }
    }
    MonthlyStats {
        year: series.year,
        total_visitors: total,
        avg_visitors: total / count,
        max_month: point(max),
        min_month: point(min),
        available_years,
    }
}

fn respond(
    country: &'static str,
    country_code: &'static str,
    observations: &[MonthlyObservation],
    requested: Option<i32>,
) -> Result<MonthlyResponse> {
    let series = build_series(observations, requested)?;
    let stats = monthly_stats(&series, available_years(observations));
    tracing::info!(
        country_code,
        year = series.year,
        months = series.months.len(),
        total = %format_int(stats.total_visitors),
        max_month = %stats.max_month.month,
        min_month = %stats.min_month.month,
        "monthly series ready"
    );
    let data = MonthlyData {
        months: series.months.iter().map(|m| m.name.clone()).collect(),
        month_numbers: series.months.iter().map(|m| m.index).collect(),
        values: series.months.iter().map(|m| m.value).collect(),
        changes: series.months.iter().map(|m| m.change_pct).collect(),
    };
    Ok(MonthlyResponse {
        country,
        country_code,
        year: series.year,
        data,
        stats,
    })
}

pub fn japan_from_rows(rows: &[(String, Option<f64>)], year: Option<i32>) -> Result<MonthlyResponse> {
    respond("Japan", "JPN", &extract_japan(rows), year)
}

pub fn korea_from_rows(rows: &[(String, String, Option<f64>)], year: Option<i32>) -> Result<MonthlyResponse> {
    respond("South Korea", "KOR", &extract_korea(rows), year)
}

pub fn japan_monthly(paths: &DataPaths, year: Option<i32>) -> Result<MonthlyResponse> {
    japan_from_rows(&load_japan_rows(&paths.japan_monthly)?, year)
}

pub fn korea_monthly(paths: &DataPaths, year: Option<i32>) -> Result<MonthlyResponse> {
    korea_from_rows(&load_korea_rows(&paths.korea_monthly)?, year)
}
