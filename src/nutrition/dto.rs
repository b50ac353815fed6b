use serde::{Deserialize, Serialize};
use time::Date;

use super::services::{Summary, TodayStatus};
use crate::supplements::dto::SlotStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryRange {
    #[default]
    Today,
    Week,
    Month,
    Custom,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub range: SummaryRange,
    pub start: Option<Date>,
    pub end: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: Summary,
    pub today: TodayStatus,
}

#[derive(Debug, Serialize)]
pub struct TodayDashboard {
    #[serde(flatten)]
    pub status: TodayStatus,
    pub slots: Vec<SlotStatus>,
}
