use serde::Serialize;
use sqlx::PgPool;
use time::{Date, Duration};
use uuid::Uuid;

use super::dto::SummaryRange;
use super::targets::{Nutrient, Nutrients};
use crate::error::{AppError, AppResult};
use crate::food_logs::repo as food_repo;
use crate::supplements::{dto::supplement_totals, repo as supplement_repo};

/// Below this fraction of the daily target a nutrient counts as low.
pub const LOW_THRESHOLD: f64 = 0.8;
/// Above this fraction of the daily target a nutrient counts as high.
pub const HIGH_THRESHOLD: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Low,
    Good,
    High,
}

pub fn classify(amount: f64, target: f64) -> Status {
    if target <= 0.0 {
        return Status::Good;
    }
    let ratio = amount / target;
    if ratio < LOW_THRESHOLD {
        Status::Low
    } else if ratio > HIGH_THRESHOLD {
        Status::High
    } else {
        Status::Good
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NutrientSummary {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: &'static str,
    pub total: f64,
    pub average: f64,
    pub target: f64,
    pub percent: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub start: Date,
    pub end: Date,
    pub days: i64,
    pub log_count: usize,
    pub nutrients: Vec<NutrientSummary>,
    pub deficient: Vec<Nutrient>,
}

/// Food plus supplement intake for a single day.
#[derive(Debug, Clone, Serialize)]
pub struct TodayStatus {
    pub date: Date,
    pub totals: Nutrients,
    pub lows: Vec<Nutrient>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTotals {
    pub date: Date,
    pub totals: Nutrients,
}

/// Inclusive number of calendar days, never less than one.
pub fn day_count(start: Date, end: Date) -> i64 {
    ((end - start).whole_days() + 1).max(1)
}

/// Turns a named range into inclusive bounds relative to `today`.
pub fn resolve_range(
    range: SummaryRange,
    start: Option<Date>,
    end: Option<Date>,
    today: Date,
) -> AppResult<(Date, Date)> {
    match range {
        SummaryRange::Today => Ok((today, today)),
        SummaryRange::Week => Ok((today - Duration::days(6), today)),
        SummaryRange::Month => Ok((today - Duration::days(29), today)),
        SummaryRange::Custom => {
            let (Some(start), Some(end)) = (start, end) else {
                return Err(AppError::BadRequest(
                    "custom range requires start and end".into(),
                ));
            };
            if start > end {
                return Err(AppError::BadRequest("start must not be after end".into()));
            }
            Ok((start, end))
        }
    }
}

pub fn total<'a, I>(logs: I) -> Nutrients
where
    I: IntoIterator<Item = &'a Nutrients>,
{
    let mut sum = Nutrients::default();
    for n in logs {
        sum += n;
    }
    sum
}

/// Intake-goal nutrients whose amount sits below the low threshold of their
/// daily target. Limit nutrients are never deficient.
pub fn deficient_nutrients(daily: &Nutrients) -> Vec<Nutrient> {
    Nutrient::ALL
        .into_iter()
        .filter(|n| !n.is_limit())
        .filter(|n| classify(daily.get(*n), n.daily_target()) == Status::Low)
        .collect()
}

/// `supplements` is the boost of every dose taken within the range.
pub fn summarize(logs: &[Nutrients], supplements: &Nutrients, start: Date, end: Date) -> Summary {
    let days = day_count(start, end);
    let mut totals = total(logs);
    totals += supplements;
    let averages = totals.divided(days as f64);

    let nutrients = Nutrient::ALL
        .into_iter()
        .map(|n| {
            let target = n.daily_target();
            let average = averages.get(n);
            NutrientSummary {
                nutrient: n,
                label: n.label(),
                unit: n.unit(),
                total: totals.get(n),
                average,
                target,
                percent: if target > 0.0 { average / target * 100.0 } else { 0.0 },
                status: classify(average, target),
            }
        })
        .collect();

    Summary {
        start,
        end,
        days,
        log_count: logs.len(),
        nutrients,
        deficient: deficient_nutrients(&averages),
    }
}

pub fn today_status(date: Date, logs: &[Nutrients], supplements: &Nutrients) -> TodayStatus {
    let mut totals = total(logs);
    totals += supplements;
    TodayStatus {
        date,
        lows: deficient_nutrients(&totals),
        totals,
    }
}

/// Loads the food logs and the user's supplement doses for `date`.
pub async fn load_today(db: &PgPool, user_id: Uuid, date: Date) -> anyhow::Result<TodayStatus> {
    let rows = food_repo::nutrients_in_range(db, date, date).await?;
    let logs: Vec<_> = rows.into_iter().map(|r| r.nutrients).collect();
    let taken = supplement_repo::taken_between(db, user_id, date, date).await?;
    Ok(today_status(date, &logs, &supplement_totals(&taken)))
}

/// One entry per day in `start..=end`, including days without logs.
pub fn daily_totals(logs: &[(Date, Nutrients)], start: Date, end: Date) -> Vec<DailyTotals> {
    let mut out = Vec::with_capacity(day_count(start, end) as usize);
    let mut day = start;
    while day <= end {
        let totals = total(logs.iter().filter(|(d, _)| *d == day).map(|(_, n)| n));
        out.push(DailyTotals { date: day, totals });
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn log(calories: f64, protein: f64) -> Nutrients {
        Nutrients {
            calories,
            protein,
            ..Default::default()
        }
    }

    #[test]
    fn classify_uses_80_and_120_percent() {
        assert_eq!(classify(79.9, 100.0), Status::Low);
        assert_eq!(classify(80.0, 100.0), Status::Good);
        assert_eq!(classify(120.0, 100.0), Status::Good);
        assert_eq!(classify(120.1, 100.0), Status::High);
    }

    #[test]
    fn today_summary_sums_logs() {
        let today = date!(2024 - 03 - 10);
        let logs = vec![log(500.0, 20.0), log(700.0, 25.0)];
        let s = summarize(&logs, &Nutrients::default(), today, today);

        assert_eq!(s.days, 1);
        assert_eq!(s.log_count, 2);
        let cal = &s.nutrients[0];
        assert_eq!(cal.nutrient, Nutrient::Calories);
        assert_eq!(cal.total, 1200.0);
        assert_eq!(cal.average, 1200.0);
        assert_eq!(cal.status, Status::Low);
        let protein = &s.nutrients[1];
        assert_eq!(protein.total, 45.0);
        assert_eq!(protein.status, Status::Good);
        assert!(s.deficient.contains(&Nutrient::Calories));
        assert!(!s.deficient.contains(&Nutrient::Protein));
    }

    #[test]
    fn custom_range_averages_by_day_count() {
        let start = date!(2024 - 03 - 01);
        let end = date!(2024 - 03 - 03);
        let logs = vec![log(2000.0, 60.0), log(2000.0, 60.0), log(2000.0, 60.0)];
        let s = summarize(&logs, &Nutrients::default(), start, end);

        assert_eq!(s.days, 3);
        let cal = &s.nutrients[0];
        assert_eq!(cal.total, 6000.0);
        assert_eq!(cal.average, 2000.0);
        assert_eq!(cal.percent, 100.0);
        assert_eq!(cal.status, Status::Good);
        assert_eq!(s.nutrients[1].status, Status::Good);
    }

    #[test]
    fn limit_nutrients_are_never_deficient() {
        let day = date!(2024 - 03 - 10);
        let s = summarize(&[], &Nutrients::default(), day, day);
        assert!(!s.deficient.contains(&Nutrient::Sodium));
        assert!(!s.deficient.contains(&Nutrient::Sugar));
        assert!(!s.deficient.contains(&Nutrient::Cholesterol));
        assert!(s.deficient.contains(&Nutrient::Protein));
        assert_eq!(s.deficient.len(), 15);
    }

    #[test]
    fn supplement_boosts_count_toward_totals() {
        let day = date!(2024 - 03 - 10);
        let boosts = Nutrients {
            vitamin_d: 30.0,
            calcium: 1200.0,
            ..Default::default()
        };
        let s = summarize(&[log(500.0, 10.0)], &boosts, day, day);
        let vitamin_d = s
            .nutrients
            .iter()
            .find(|n| n.nutrient == Nutrient::VitaminD)
            .unwrap();
        assert_eq!(vitamin_d.total, 30.0);
        assert_eq!(vitamin_d.status, Status::High);
        assert!(!s.deficient.contains(&Nutrient::Calcium));
        assert_eq!(s.log_count, 1);
    }

    #[test]
    fn today_status_lists_lows_after_supplements() {
        let day = date!(2024 - 03 - 10);
        let boosts = Nutrients {
            iron: 25.0,
            vitamin_c: 120.0,
            ..Default::default()
        };
        let status = today_status(day, &[log(2000.0, 50.0)], &boosts);
        assert_eq!(status.totals.calories, 2000.0);
        assert_eq!(status.totals.iron, 25.0);
        assert!(!status.lows.contains(&Nutrient::Iron));
        assert!(!status.lows.contains(&Nutrient::VitaminC));
        assert!(!status.lows.contains(&Nutrient::Calories));
        assert!(status.lows.contains(&Nutrient::Fiber));
    }

    #[test]
    fn resolve_named_ranges() {
        let today = date!(2024 - 03 - 10);
        assert_eq!(
            resolve_range(SummaryRange::Week, None, None, today).unwrap(),
            (date!(2024 - 03 - 04), today)
        );
        assert_eq!(
            resolve_range(SummaryRange::Month, None, None, today).unwrap(),
            (date!(2024 - 02 - 10), today)
        );
        assert!(resolve_range(SummaryRange::Custom, Some(today), None, today).is_err());
        assert!(resolve_range(
            SummaryRange::Custom,
            Some(today),
            Some(date!(2024 - 03 - 01)),
            today
        )
        .is_err());
    }

    #[test]
    fn daily_totals_fill_empty_days() {
        let start = date!(2024 - 03 - 01);
        let end = date!(2024 - 03 - 03);
        let logs = vec![
            (start, log(100.0, 1.0)),
            (start, log(50.0, 1.0)),
            (end, log(10.0, 0.0)),
        ];
        let days = daily_totals(&logs, start, end);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].totals.calories, 150.0);
        assert_eq!(days[1].totals.calories, 0.0);
        assert_eq!(days[2].totals.calories, 10.0);
    }
}
