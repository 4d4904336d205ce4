use crate::units::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::Tabled;

/// One row of a UN Tourism export, as found on disk. Columns the pipeline
/// does not use (codes, notes, flags) are ignored by the deserializer.
#[derive(Debug, Deserialize)]
pub struct RawTourismRow {
    #[serde(rename = "reporter_area_label", default)]
    pub reporter: Option<String>,
    #[serde(rename = "partner_area_label", default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub indicator_code: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub indicator_label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A loaded dataset row. `value` is `None` when the cell was not numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct TourismRecord {
    pub reporter: String,
    pub partner: String,
    pub year: i32,
    pub indicator_code: String,
    pub value: Option<f64>,
    pub indicator_label: String,
    pub unit: String,
}

/// Japan (JNTO) monthly export: a free-text `Monthly` cell such as
/// `1997 Jan.` or just `Feb.` for continuation rows.
#[derive(Debug, Deserialize)]
pub struct RawJapanRow {
    #[serde(rename = "Monthly", default)]
    pub monthly: Option<String>,
    #[serde(rename = "Grand Total", default)]
    pub grand_total: Option<String>,
}

/// Korea arrivals export: one row per (month, nation, age band).
#[derive(Debug, Deserialize)]
pub struct RawKoreaRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub nation: Option<String>,
    #[serde(default)]
    pub visitor: Option<String>,
}

/// Output of indicator resolution: one value per reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntityValue {
    pub entity: String,
    /// Raw value, in `unit`.
    pub value: f64,
    pub unit: Unit,
    pub source_indicator: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct MapData {
    pub countries: Vec<String>,
    pub country_names: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourist_counts: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct MapStats {
    pub total_countries: usize,
    pub total_value: f64,
    pub avg_value: f64,
    pub median_value: f64,
    pub max_country: Option<String>,
    pub max_value: f64,
    pub unmapped_countries: usize,
    pub indicator_used: Option<String>,
    pub indicator_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapResponse {
    pub year: i32,
    pub metric: &'static str,
    pub data: MapData,
    pub stats: MapStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthEntry {
    pub name: String,
    pub index: u32,
    pub value: i64,
    pub change_pct: f64,
}

/// Months of one year, ascending by month index.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyVisitorSeries {
    pub year: i32,
    pub months: Vec<MonthEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyData {
    pub months: Vec<String>,
    pub month_numbers: Vec<u32>,
    pub values: Vec<i64>,
    pub changes: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthPoint {
    pub month: String,
    pub month_number: u32,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub total_visitors: i64,
    pub avg_visitors: i64,
    pub max_month: MonthPoint,
    pub min_month: MonthPoint,
    pub available_years: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyResponse {
    pub country: &'static str,
    pub country_code: &'static str,
    pub year: i32,
    pub data: MonthlyData,
    pub stats: MonthlyStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpenditureBreakdown {
    pub travel: f64,
    pub transport: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownCategory {
    pub name: &'static str,
    pub name_en: &'static str,
    pub value: f64,
    pub percentage: f64,
    pub color: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownData {
    pub categories: Vec<BreakdownCategory>,
    pub total: f64,
    pub currency: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownMetadata {
    pub calculation_method: &'static str,
    pub available_indicators: Vec<String>,
    pub data_quality: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownResponse {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub data: BreakdownData,
    pub metadata: BreakdownMetadata,
}

/// Row of the markdown preview written to the debug log.
#[derive(Debug, Tabled, Clone)]
pub struct PreviewRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "ISO3")]
    pub iso3: String,
    #[tabled(rename = "Country")]
    pub country: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
