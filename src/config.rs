//! Process configuration and the fixed constants of the report pipeline.

use clap::Parser;
use std::path::{Path, PathBuf};

pub const ARRIVALS_FILE: &str = "UN_Tourism_inbound_arrivals_by_region_10_2025.csv";
pub const EXPENDITURE_FILE: &str = "UN_Tourism_inbound_expenditure_10_2025.csv";
pub const JAPAN_MONTHLY_FILE: &str = "country_data/JTM_inbound_20251106eng(JAPAN).csv";
pub const KOREA_MONTHLY_FILE: &str = "country_data/Enter_korea_by_age(KOREA).csv";

/// Partner area whose rows hold the aggregate totals for a reporter.
pub const WORLD_PARTNER: &str = "World";

/// Average spend at or above this (USD per trip) is treated as a data error.
pub const AVG_SPEND_CEILING: f64 = 100_000.0;

pub const DEFAULT_VISITOR_MAP_YEAR: i32 = 2023;
pub const DEFAULT_YEAR: i32 = 2019;

#[derive(Parser, Debug, Clone)]
#[command(name = "tourism-report")]
#[command(about = "Tourism statistics API for the world map front end", long_about = None)]
pub struct Config {
    /// Directory holding the UN Tourism CSVs and `country_data/`
    #[arg(long, env = "TOURISM_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, env = "TOURISM_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// tracing filter directive
    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "tourism_report=debug,tower_http=info,info"
    )]
    pub log: String,
}

impl Config {
    pub fn data_paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
    }
}

/// Absolute locations of every source file. Built once at startup and
/// shared read-only by all requests.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub arrivals: PathBuf,
    pub expenditure: PathBuf,
    pub japan_monthly: PathBuf,
    pub korea_monthly: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            arrivals: data_dir.join(ARRIVALS_FILE),
            expenditure: data_dir.join(EXPENDITURE_FILE),
            japan_monthly: data_dir.join(JAPAN_MONTHLY_FILE),
            korea_monthly: data_dir.join(KOREA_MONTHLY_FILE),
        }
    }
}
