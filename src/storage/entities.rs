use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::percentage::Percentage;

/// All habits known to the application, keyed by [Habit::id].
pub type Habits = BTreeMap<String, Habit>;

/// Cadence of a habit. Stored on disk as `"daily"` or `"weekly"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Frequency::Daily, Frequency::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                let valid = Frequency::ALL.map(|v| v.as_str()).join(", ");
                anyhow!("Invalid frequency. Please enter one of: {valid}.")
            })
    }
}

/// A tracked recurring activity. `history` holds a single entry per calendar day, a repeated
/// check-in replaces the previous value.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Number of completions expected per [Frequency] period. Informational only.
    pub target: i64,
    #[serde(default)]
    pub history: BTreeMap<NaiveDate, bool>,
}

impl Habit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, frequency: Frequency, target: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            frequency,
            target,
            history: BTreeMap::new(),
        }
    }

    pub fn check_in(&mut self, date: NaiveDate, completed: bool) {
        self.history.insert(date, completed);
    }

    /// Fraction of recorded days that were marked as completed. Doesn't take `target` or days
    /// without a record into account.
    pub fn completion_rate(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let completed = self.history.values().filter(|v| **v).count();
        completed as f64 / self.history.len() as f64
    }

    pub fn completion_percentage(&self) -> Percentage {
        Percentage::from_ratio(self.completion_rate())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Frequency, Habit};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_completion_rate_empty() {
        let habit = Habit::new("run", "Morning run", Frequency::Weekly, 3);
        assert_eq!(habit.completion_rate(), 0.0);
    }

    #[test]
    fn test_completion_rate_partial() {
        let mut habit = Habit::new("water", "Drink water", Frequency::Daily, 8);
        habit.check_in(day(1), true);
        habit.check_in(day(2), true);
        habit.check_in(day(3), false);

        assert!((habit.completion_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(habit.completion_percentage().to_string(), "66.67%");
    }

    #[test]
    fn test_check_in_overwrites_same_day() {
        let mut habit = Habit::new("read", "Read", Frequency::Daily, 1);
        habit.check_in(day(5), true);
        habit.check_in(day(5), false);

        assert_eq!(habit.history.len(), 1);
        assert_eq!(habit.history.get(&day(5)), Some(&false));
        assert_eq!(habit.completion_rate(), 0.0);
    }

    #[test]
    fn test_check_in_accepts_any_date() {
        let mut habit = Habit::new("read", "Read", Frequency::Daily, 1);
        habit.check_in(NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(), true);
        habit.check_in(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(), true);
        assert_eq!(habit.history.len(), 2);
        assert_eq!(habit.completion_rate(), 1.0);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(" Daily ".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("WEEKLY".parse::<Frequency>().unwrap(), Frequency::Weekly);
        let error = "monthly".parse::<Frequency>().unwrap_err();
        assert!(error.to_string().contains("daily, weekly"));
    }

    #[test]
    fn test_habit_json_shape() {
        let mut habit = Habit::new("water", "Drink water", Frequency::Daily, 8);
        habit.check_in(day(1), true);

        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "water",
                "name": "Drink water",
                "frequency": "daily",
                "target": 8,
                "history": { "2024-01-01": true },
            })
        );
    }
}
