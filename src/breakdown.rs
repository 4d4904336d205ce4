//! Expenditure breakdown for one country and year: travel (spending in the
//! destination), international passenger transport, and the remainder of
//! the balance-of-payments total.

use crate::config::{DataPaths, WORLD_PARTNER};
use crate::countries::CountryRegistry;
use crate::error::{ReportError, Result};
use crate::loader::load_tourism;
use crate::types::{
    BreakdownCategory, BreakdownData, BreakdownMetadata, BreakdownResponse, ExpenditureBreakdown,
    TourismRecord,
};
use crate::units::EXPENDITURE_UNIT;
use crate::util::format_number;

pub const TOTAL_CODE: &str = "INBD_EXPD_BPAY_TOTL_VSTR";
pub const TRAVEL_CODE: &str = "INBD_EXPD_BPAY_TRVL_VSTR";
pub const TRANSPORT_CODE: &str = "INBD_EXPD_BPAY_PSTR_VSTR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownMethod {
    /// total, travel and transport all reported
    TotalBreakdown,
    /// travel derived as total minus transport
    TotalMinusTransport,
    /// no total; travel and transport passed through
    TravelPlusTransport,
}

impl BreakdownMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakdownMethod::TotalBreakdown => "total_breakdown",
            BreakdownMethod::TotalMinusTransport => "total_minus_transport",
            BreakdownMethod::TravelPlusTransport => "travel_plus_transport",
        }
    }

    pub fn data_quality(self) -> &'static str {
        match self {
            BreakdownMethod::TotalBreakdown => "complete",
            _ => "estimated",
        }
    }
}

/// Pick a method from whichever indicators are present. `None` means the
/// combination cannot be broken down.
pub fn compute_breakdown(
    total: Option<f64>,
    travel: Option<f64>,
    transport: Option<f64>,
) -> Option<(BreakdownMethod, ExpenditureBreakdown)> {
    match (total, travel, transport) {
        (Some(total), Some(travel), Some(transport)) => Some((
            BreakdownMethod::TotalBreakdown,
            ExpenditureBreakdown {
                travel,
                transport,
                other: (total - travel - transport).max(0.0),
            },
        )),
        (Some(total), None, Some(transport)) => Some((
            BreakdownMethod::TotalMinusTransport,
            ExpenditureBreakdown {
                travel: (total - transport).max(0.0),
                transport,
                other: 0.0,
            },
        )),
        (None, Some(travel), Some(transport)) => Some((
            BreakdownMethod::TravelPlusTransport,
            ExpenditureBreakdown {
                travel,
                transport,
                other: 0.0,
            },
        )),
        _ => None,
    }
}

/// Indicator values reported for one country-year, first-seen order.
/// A later row for the same indicator replaces the earlier value.
fn collect_indicators<'a>(rows: impl Iterator<Item = &'a TourismRecord>) -> Vec<(String, f64)> {
    let mut values: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let Some(value) = row.value else { continue };
        match values.iter_mut().find(|(code, _)| *code == row.indicator_code) {
            Some(slot) => slot.1 = value,
            None => values.push((row.indicator_code.clone(), value)),
        }
    }
    values
}

fn categories(b: &ExpenditureBreakdown, total: f64) -> Vec<BreakdownCategory> {
    let pct = |v: f64| if total > 0.0 { v / total * 100.0 } else { 0.0 };
    let mut out = Vec::with_capacity(3);
    if b.travel > 0.0 {
        out.push(BreakdownCategory {
            name: "旅遊消費",
            name_en: "Travel Expenditure",
            value: b.travel,
            percentage: pct(b.travel),
            color: "#0ea5e9",
            description: "住宿、餐飲、購物、當地交通等",
        });
    }
    if b.transport > 0.0 {
        out.push(BreakdownCategory {
            name: "國際交通",
            name_en: "International Transport",
            value: b.transport,
            percentage: pct(b.transport),
            color: "#f59e0b",
            description: "國際機票、船票、跨國車票等",
        });
    }
    if b.other > 0.0 {
        out.push(BreakdownCategory {
            name: "其他消費",
            name_en: "Other Expenditure",
            value: b.other,
            percentage: pct(b.other),
            color: "#6b7280",
            description: "其他未分類消費",
        });
    }
    out
}

pub fn breakdown_from_records(
    records: &[TourismRecord],
    registry: &CountryRegistry,
    code: &str,
    year: i32,
) -> Result<BreakdownResponse> {
    let Some(country) = registry.to_name(code) else {
        return Err(ReportError::UnknownCountry {
            code: code.to_string(),
        });
    };
    let aliases = registry.names_for(code);
    let is_country = |r: &&TourismRecord| {
        r.partner == WORLD_PARTNER && aliases.iter().any(|a| *a == r.reporter)
    };

    let rows: Vec<&TourismRecord> = records
        .iter()
        .filter(is_country)
        .filter(|r| r.year == year)
        .collect();
    if rows.is_empty() {
        let mut years: Vec<i32> = records.iter().filter(is_country).map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        return Err(ReportError::NoCountryData {
            country: country.to_string(),
            code: code.to_string(),
            year,
            available_years: years,
        });
    }

    let indicators = collect_indicators(rows.into_iter());
    let lookup = |wanted: &str| {
        indicators
            .iter()
            .find(|(c, _)| c == wanted)
            .map(|(_, v)| *v)
    };
    let (total, travel, transport) = (lookup(TOTAL_CODE), lookup(TRAVEL_CODE), lookup(TRANSPORT_CODE));
    let available: Vec<String> = indicators.iter().map(|(c, _)| c.clone()).collect();
    tracing::info!(country, year, indicators = ?available, "expenditure indicators found");

    let insufficient = || ReportError::InsufficientBreakdown {
        country: country.to_string(),
        code: code.to_string(),
        year,
        available_indicators: available.clone(),
        has_total: total.is_some(),
        has_travel: travel.is_some(),
        has_transport: transport.is_some(),
    };

    let (method, breakdown) = compute_breakdown(total, travel, transport).ok_or_else(insufficient)?;
    let sum = breakdown.travel + breakdown.transport + breakdown.other;
    // All-zero components would render as an empty chart labelled success.
    if sum <= 0.0 {
        return Err(insufficient());
    }

    tracing::info!(
        country,
        year,
        method = method.as_str(),
        travel = %format_number(breakdown.travel, 0),
        transport = %format_number(breakdown.transport, 0),
        other = %format_number(breakdown.other, 0),
        "expenditure breakdown"
    );

    Ok(BreakdownResponse {
        country: country.to_string(),
        country_code: code.to_string(),
        year,
        data: BreakdownData {
            categories: categories(&breakdown, sum),
            total: sum,
            currency: EXPENDITURE_UNIT.label(),
        },
        metadata: BreakdownMetadata {
            calculation_method: method.as_str(),
            available_indicators: available,
            data_quality: method.data_quality(),
        },
    })
}

pub fn expenditure_breakdown(
    paths: &DataPaths,
    registry: &CountryRegistry,
    code: &str,
    year: i32,
) -> Result<BreakdownResponse> {
    // Unknown codes fail before touching the disk.
    if registry.to_name(code).is_none() {
        return Err(ReportError::UnknownCountry {
            code: code.to_string(),
        });
    }
    let records = load_tourism(&paths.expenditure)?;
    breakdown_from_records(&records, registry, code, year)
}
