//! Portfolio domain — historical value series for the chart view.

pub mod history;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use history::PortfolioHistoryReconstructor;

/// Total USD value of the wallet on one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    pub value: f64,
}
