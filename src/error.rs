//! Error taxonomy for the report endpoints.
//!
//! Every variant knows the HTTP status it maps to and the JSON body that
//! tells the caller what was missing, so a client can correct its request
//! (pick another year, another country) without reading server logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Source CSV missing, unreadable or structurally broken.
    #[error("Failed to read data file {path}: {message}")]
    Read { path: String, message: String },

    #[error("No data for year {year}")]
    NoDataForYear { year: i32, available_years: Vec<i32> },

    #[error("No suitable indicator found for year {year}")]
    NoIndicator {
        year: i32,
        available_indicators: Vec<String>,
        tried_indicators: Vec<String>,
    },

    #[error("No countries with both tourist and expenditure data in {year}")]
    NoOverlap { year: i32 },

    #[error("Country code {code} not found")]
    UnknownCountry { code: String },

    #[error("No data for {country} in {year}")]
    NoCountryData {
        country: String,
        code: String,
        year: i32,
        available_years: Vec<i32>,
    },

    #[error("Insufficient data for breakdown analysis")]
    InsufficientBreakdown {
        country: String,
        code: String,
        year: i32,
        available_indicators: Vec<String>,
        has_total: bool,
        has_travel: bool,
        has_transport: bool,
    },

    #[error("No valid data for year {year:?}")]
    NoValidMonthlyData { year: Option<i32> },

    /// Worker task failed before producing a result.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    pub fn read(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        ReportError::Read {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::Read { .. } | ReportError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::NOT_FOUND,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }

    /// Diagnostic body. Always carries `error`; the remaining fields depend
    /// on what the caller needs to self-correct.
    pub fn body(&self) -> Value {
        let error = self.to_string();
        match self {
            ReportError::Read { .. } | ReportError::Internal(_) => json!({ "error": error }),
            ReportError::NoOverlap { year } => json!({ "error": error, "year": year }),
            ReportError::NoDataForYear {
                year,
                available_years,
            } => json!({
                "error": error,
                "year": year,
                "available_years": available_years,
            }),
            ReportError::NoIndicator {
                year,
                available_indicators,
                tried_indicators,
            } => json!({
                "error": error,
                "year": year,
                "available_indicators": available_indicators,
                "tried_indicators": tried_indicators,
            }),
            ReportError::UnknownCountry { code } => json!({
                "error": error,
                "country_code": code,
            }),
            ReportError::NoCountryData {
                country,
                code,
                year,
                available_years,
            } => json!({
                "error": error,
                "country": country,
                "country_code": code,
                "year": year,
                "available_years": available_years,
            }),
            ReportError::InsufficientBreakdown {
                country,
                code,
                year,
                available_indicators,
                has_total,
                has_travel,
                has_transport,
            } => json!({
                "error": error,
                "country": country,
                "country_code": code,
                "year": year,
                "available_indicators": available_indicators,
                "debug": {
                    "has_total": has_total,
                    "has_travel": has_travel,
                    "has_transport": has_transport,
                },
            }),
            ReportError::NoValidMonthlyData { year } => json!({
                "error": error,
                "year": year,
            }),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!(error = %self, "request failed"),
            _ => tracing::info!(error = %self, "no data for request"),
        }
        (self.status(), Json(self.body())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
