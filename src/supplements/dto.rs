use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::nutrition::Nutrients;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Morning,
    Afternoon,
    Evening,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Morning, Slot::Afternoon, Slot::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Morning => "morning",
            Slot::Afternoon => "afternoon",
            Slot::Evening => "evening",
        }
    }

    /// Nutrients supplied by the dose taken in this slot.
    pub fn boosts(self) -> Nutrients {
        match self {
            Slot::Morning => Nutrients {
                vitamin_d: 30.0,
                vitamin_b12: 3.0,
                calcium: 1200.0,
                ..Default::default()
            },
            Slot::Afternoon => Nutrients {
                iron: 25.0,
                vitamin_c: 120.0,
                ..Default::default()
            },
            Slot::Evening => Nutrients {
                fiber: 35.0,
                magnesium: 500.0,
                zinc: 15.0,
                ..Default::default()
            },
        }
    }
}

/// Sum of the boosts of every taken dose.
pub fn supplement_totals(taken: &[(Date, Slot)]) -> Nutrients {
    let mut sum = Nutrients::default();
    for (_, slot) in taken {
        sum += &slot.boosts();
    }
    sum
}

impl FromStr for Slot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown supplement slot {s:?}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: Option<Date>,
    pub slot: Slot,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub date: Date,
    pub slot: Slot,
    pub taken: bool,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub end: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotStatus {
    pub slot: Slot,
    pub taken: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatus {
    pub date: Date,
    pub slots: Vec<SlotStatus>,
}

#[derive(Debug, Serialize)]
pub struct WeekStatus {
    pub days: Vec<DayStatus>,
    pub taken: usize,
    pub possible: usize,
}

/// One entry per day in `start..=end`, each with all three slots.
pub fn build_days(start: Date, end: Date, taken: &[(Date, Slot)]) -> Vec<DayStatus> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        let slots = Slot::ALL
            .into_iter()
            .map(|slot| SlotStatus {
                slot,
                taken: taken.contains(&(day, slot)),
            })
            .collect();
        days.push(DayStatus { date: day, slots });
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

pub fn week_status(days: Vec<DayStatus>) -> WeekStatus {
    let taken = days
        .iter()
        .flat_map(|d| d.slots.iter())
        .filter(|s| s.taken)
        .count();
    let possible = days.len() * Slot::ALL.len();
    WeekStatus {
        days,
        taken,
        possible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn slot_parsing() {
        assert_eq!("evening".parse::<Slot>().unwrap(), Slot::Evening);
        assert!("midnight".parse::<Slot>().is_err());
        let req: ToggleRequest = serde_json::from_str(r#"{"slot": "morning"}"#).unwrap();
        assert_eq!(req.slot, Slot::Morning);
        assert!(req.date.is_none());
    }

    #[test]
    fn taken_doses_add_their_boosts() {
        let day = date!(2024 - 06 - 01);
        let totals = supplement_totals(&[
            (day, Slot::Morning),
            (day, Slot::Evening),
            (day.next_day().unwrap(), Slot::Morning),
        ]);
        assert_eq!(totals.vitamin_d, 60.0);
        assert_eq!(totals.calcium, 2400.0);
        assert_eq!(totals.magnesium, 500.0);
        assert_eq!(totals.iron, 0.0);
        assert_eq!(supplement_totals(&[]), Nutrients::default());
    }

    #[test]
    fn week_grid_marks_taken_slots() {
        let start = date!(2024 - 06 - 01);
        let end = date!(2024 - 06 - 07);
        let taken = vec![
            (start, Slot::Morning),
            (start, Slot::Evening),
            (end, Slot::Afternoon),
        ];
        let week = week_status(build_days(start, end, &taken));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.taken, 3);
        assert_eq!(week.possible, 21);
        assert!(week.days[0].slots[0].taken);
        assert!(!week.days[0].slots[1].taken);
        assert!(week.days[6].slots[1].taken);
    }
}
