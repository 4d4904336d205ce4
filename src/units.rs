//! Unit Normalizer.
//!
//! The arrivals dataset counts trips in thousands and the expenditure
//! dataset reports million US dollars. Visitor counts are converted to
//! people; expenditure stays in millions, which is the unit the map and
//! breakdown endpoints publish.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Thousands of people/trips.
    Thousands,
    /// Millions of US dollars.
    MillionsUsd,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::Thousands => "thousands",
            Unit::MillionsUsd => "million US dollars",
        }
    }

    /// Read a row's `unit` cell (`Thousand trips`, `US$ Million`, ...).
    pub fn from_label(label: &str) -> Option<Unit> {
        let label = label.to_ascii_lowercase();
        if label.contains("thousand") {
            Some(Unit::Thousands)
        } else if label.contains("million") {
            Some(Unit::MillionsUsd)
        } else {
            None
        }
    }

    /// The row's own unit when recognized, otherwise the dataset convention.
    pub fn of_row(label: &str, default: Unit) -> Unit {
        Unit::from_label(label).unwrap_or(default)
    }
}

pub const VISITOR_UNIT: Unit = Unit::Thousands;
pub const EXPENDITURE_UNIT: Unit = Unit::MillionsUsd;

pub fn to_canonical(raw: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Thousands => raw * 1_000.0,
        Unit::MillionsUsd => raw,
    }
}

/// USD per trip from expenditure in million USD and visitors in people:
/// `(expenditure × 1_000_000) / (visitors_thousands × 1_000)`.
///
/// Returns `None` when there are no visitors to divide by.
pub fn average_spend(expenditure_millions: f64, visitors: f64) -> Option<f64> {
    if visitors == 0.0 {
        return None;
    }
    Some(expenditure_millions * 1_000_000.0 / visitors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_become_people() {
        assert_eq!(to_canonical(65_000.0, VISITOR_UNIT), 65_000_000.0);
        assert_eq!(to_canonical(300.0, EXPENDITURE_UNIT), 300.0);
    }

    #[test]
    fn row_labels_pick_the_unit() {
        assert_eq!(Unit::from_label("Thousand trips"), Some(Unit::Thousands));
        assert_eq!(Unit::from_label("US$ Million"), Some(Unit::MillionsUsd));
        assert_eq!(Unit::from_label(""), None);
        assert_eq!(Unit::of_row("", VISITOR_UNIT), Unit::Thousands);
        assert_eq!(Unit::of_row("million US dollars", VISITOR_UNIT), Unit::MillionsUsd);
    }

    #[test]
    fn average_spend_scaling() {
        // 1,000 million USD over 1,000 thousand trips = 1,000 USD per trip
        let visitors = to_canonical(1_000.0, Unit::Thousands);
        assert_eq!(average_spend(1_000.0, visitors), Some(1_000.0));
        assert_eq!(average_spend(50.0, 0.0), None);
    }

    #[test]
    fn average_spend_is_scale_invariant() {
        let base = average_spend(35_000.0, 65_000_000.0).unwrap();
        let doubled = average_spend(70_000.0, 130_000_000.0).unwrap();
        assert!((base - doubled).abs() < 1e-9);
        assert!((base - 35_000.0 / 65_000.0 * 1000.0).abs() < 1e-9);
    }
}
