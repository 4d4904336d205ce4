//! Indicator Resolver.
//!
//! Reporters publish overlapping indicators (total arrivals, arrivals by
//! region of origin, ...). For a given year the resolver keeps exactly one
//! value per reporter: the one whose indicator ranks highest in the metric's
//! priority list, with the first row in file order winning ties.

use crate::types::{ResolvedEntityValue, TourismRecord};
use crate::units::{Unit, EXPENDITURE_UNIT, VISITOR_UNIT};
use std::collections::{BTreeMap, HashSet};

/// Ordered indicator codes for a metric, most preferred first, and the
/// unit assumed for rows whose `unit` cell is blank or unrecognized.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorPriority {
    codes: &'static [&'static str],
    unit: Unit,
}

pub const VISITOR_PRIORITY: IndicatorPriority = IndicatorPriority::new(
    &[
        "INBD_TRIP_AREA_TOTL_TOUR",
        "INBD_TRIP_AREA_TOUR_ABRD",
        "INBD_TRIP_REGN_TOUR",
    ],
    VISITOR_UNIT,
);

pub const EXPENDITURE_PRIORITY: IndicatorPriority = IndicatorPriority::new(
    &[
        "INBD_EXPD_BPAY_TOTL_VSTR",
        "INBD_EXPD_BPAY_TRVL_VSTR",
        "INBD_EXPD_BPAY_PSTR_VSTR",
    ],
    EXPENDITURE_UNIT,
);

impl IndicatorPriority {
    pub const fn new(codes: &'static [&'static str], unit: Unit) -> Self {
        Self { codes, unit }
    }

    pub fn unit_of(&self, record: &TourismRecord) -> Unit {
        Unit::of_row(&record.unit, self.unit)
    }

    /// Zero-based rank, `None` for codes the metric never uses.
    pub fn rank(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| *c == code)
    }

    pub fn codes(&self) -> &'static [&'static str] {
        self.codes
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.codes.iter().map(|c| c.to_string()).collect()
    }
}

/// One value per reporter for `year`, optionally restricted to a partner
/// area. Output is ordered by reporter name.
pub fn resolve(
    records: &[TourismRecord],
    year: i32,
    partner: Option<&str>,
    priority: &IndicatorPriority,
) -> Vec<ResolvedEntityValue> {
    // reporter -> (rank, record); replaced only by a strictly better rank
    let mut best: BTreeMap<&str, (usize, &TourismRecord, f64)> = BTreeMap::new();
    let candidates = records
        .iter()
        .filter(|r| r.year == year)
        .filter(|r| partner.map_or(true, |p| r.partner == p))
        .filter_map(|r| priority.rank(&r.indicator_code).map(|rank| (rank, r)))
        .filter_map(|(rank, r)| r.value.map(|v| (rank, r, v)));

    for (rank, record, value) in candidates {
        match best.get(record.reporter.as_str()) {
            Some((held, _, _)) if *held <= rank => {}
            _ => {
                best.insert(record.reporter.as_str(), (rank, record, value));
            }
        }
    }

    best.into_values()
        .map(|(_, record, value)| ResolvedEntityValue {
            entity: record.reporter.clone(),
            value,
            unit: priority.unit_of(record),
            source_indicator: record.indicator_code.clone(),
        })
        .collect()
}

/// Fallback for years with no partner = "World" rows: take the first
/// indicator (in priority order) that has any numeric value, across all
/// partners, and keep the largest value per reporter. Only the visitor map
/// uses this.
pub fn resolve_max_any_partner(
    records: &[TourismRecord],
    year: i32,
    priority: &IndicatorPriority,
) -> Vec<ResolvedEntityValue> {
    for code in priority.codes() {
        let mut max_by_reporter: BTreeMap<&str, (f64, &TourismRecord)> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|r| r.year == year && r.indicator_code == *code)
        {
            let Some(value) = record.value else { continue };
            match max_by_reporter.get(record.reporter.as_str()) {
                Some((held, _)) if *held >= value => {}
                _ => {
                    max_by_reporter.insert(record.reporter.as_str(), (value, record));
                }
            }
        }
        if !max_by_reporter.is_empty() {
            return max_by_reporter
                .into_iter()
                .map(|(entity, (value, record))| ResolvedEntityValue {
                    entity: entity.to_string(),
                    value,
                    unit: priority.unit_of(record),
                    source_indicator: code.to_string(),
                })
                .collect();
        }
    }
    Vec::new()
}

/// How many reporters were resolved through each indicator.
pub fn indicator_counts(resolved: &[ResolvedEntityValue]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in resolved {
        *counts.entry(r.source_indicator.clone()).or_insert(0) += 1;
    }
    counts
}

/// Highest-priority indicator that supplied at least one value.
pub fn primary_indicator(
    resolved: &[ResolvedEntityValue],
    priority: &IndicatorPriority,
) -> Option<String> {
    priority
        .codes()
        .iter()
        .find(|code| resolved.iter().any(|r| r.source_indicator == **code))
        .map(|code| code.to_string())
}

/// Distinct years in the dataset, ascending.
pub fn available_years(records: &[TourismRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Distinct indicator codes present for `year`, in first-seen order.
pub fn available_indicators(records: &[TourismRecord], year: i32) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| r.year == year)
        .filter(|r| seen.insert(r.indicator_code.as_str()))
        .map(|r| r.indicator_code.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(reporter: &str, partner: &str, year: i32, code: &str, value: Option<f64>) -> TourismRecord {
        TourismRecord {
            reporter: reporter.into(),
            partner: partner.into(),
            year,
            indicator_code: code.into(),
            value,
            indicator_label: String::new(),
            unit: "Thousand trips".into(),
        }
    }

    const TOTL: &str = "INBD_TRIP_AREA_TOTL_TOUR";
    const ABRD: &str = "INBD_TRIP_AREA_TOUR_ABRD";
    const REGN: &str = "INBD_TRIP_REGN_TOUR";

    #[test]
    fn higher_priority_indicator_wins() {
        let records = vec![
            rec("France", "World", 2019, REGN, Some(10.0)),
            rec("France", "World", 2019, TOTL, Some(90.0)),
            rec("France", "World", 2019, ABRD, Some(50.0)),
            rec("Spain", "World", 2019, ABRD, Some(80.0)),
        ];
        let out = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].entity, "France");
        assert_eq!(out[0].value, 90.0);
        assert_eq!(out[0].source_indicator, TOTL);
        assert_eq!(out[1].source_indicator, ABRD);
    }

    #[test]
    fn first_row_wins_on_equal_rank() {
        let records = vec![
            rec("Italy", "World", 2019, TOTL, Some(1.0)),
            rec("Italy", "World", 2019, TOTL, Some(2.0)),
        ];
        let out = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 1.0);
    }

    #[test]
    fn filters_year_partner_unknown_codes_and_missing_values() {
        let records = vec![
            rec("Chile", "World", 2018, TOTL, Some(1.0)),
            rec("Chile", "Europe", 2019, TOTL, Some(2.0)),
            rec("Chile", "World", 2019, "SOMETHING_ELSE", Some(3.0)),
            rec("Chile", "World", 2019, TOTL, None),
            rec("Chile", "World", 2019, ABRD, Some(4.0)),
        ];
        let out = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, 4.0);

        let any_partner = resolve(&records, 2019, None, &VISITOR_PRIORITY);
        assert_eq!(any_partner[0].value, 2.0);
    }

    #[test]
    fn resolved_entities_are_unique() {
        let mut records = Vec::new();
        for i in 0..50 {
            let code = [TOTL, ABRD, REGN][i % 3];
            let reporter = format!("Country{}", i % 7);
            records.push(rec(&reporter, "World", 2019, code, Some(i as f64)));
        }
        let out = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        let unique: HashSet<&str> = out.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(unique.len(), out.len());
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(resolve(&[], 2019, Some("World"), &VISITOR_PRIORITY).is_empty());
    }

    #[test]
    fn fallback_takes_max_of_first_available_indicator() {
        let records = vec![
            rec("Peru", "Americas", 2020, ABRD, Some(3.0)),
            rec("Peru", "Europe", 2020, ABRD, Some(7.0)),
            rec("Peru", "Europe", 2020, REGN, Some(100.0)),
            rec("Chile", "Europe", 2020, REGN, Some(5.0)),
        ];
        let out = resolve_max_any_partner(&records, 2020, &VISITOR_PRIORITY);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entity, "Peru");
        assert_eq!(out[0].value, 7.0);
        assert_eq!(out[0].source_indicator, ABRD);
        assert_eq!(out[0].unit, Unit::Thousands);
    }

    #[test]
    fn unit_comes_from_the_row_with_metric_default() {
        let mut blank = rec("Peru", "World", 2019, TOTL, Some(4.0));
        blank.unit = String::new();
        let mut millions = rec("Chile", "World", 2019, "INBD_EXPD_BPAY_TOTL_VSTR", Some(9.0));
        millions.unit = "US$ Million".into();
        let records = vec![blank, millions];

        let visitors = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        assert_eq!(visitors[0].unit, Unit::Thousands);
        let spend = resolve(&records, 2019, Some("World"), &EXPENDITURE_PRIORITY);
        assert_eq!(spend[0].unit, Unit::MillionsUsd);
    }

    #[test]
    fn diagnostics_helpers() {
        let records = vec![
            rec("A", "World", 2019, REGN, Some(1.0)),
            rec("B", "World", 2017, TOTL, Some(1.0)),
            rec("C", "World", 2019, TOTL, Some(1.0)),
            rec("D", "World", 2019, REGN, Some(1.0)),
        ];
        assert_eq!(available_years(&records), vec![2017, 2019]);
        assert_eq!(available_indicators(&records, 2019), vec![REGN.to_string(), TOTL.to_string()]);

        let resolved = resolve(&records, 2019, Some("World"), &VISITOR_PRIORITY);
        assert_eq!(primary_indicator(&resolved, &VISITOR_PRIORITY).as_deref(), Some(TOTL));
        assert_eq!(indicator_counts(&resolved).get(REGN), Some(&2));
    }
}
