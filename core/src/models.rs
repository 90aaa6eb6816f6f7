use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Goal written by the first migration.
pub const DEFAULT_GOAL_PROTEIN_G: f64 = 120.0;

/// Width of the history view in days, today included.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Storage format of the `day` column.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub day: NaiveDate,
    pub name: String,
    pub protein_g: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calories: Option<f64>,
    pub created_at: String,
}

/// Validated fields for a new entry. Build it with [`NewEntry::new`].
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub day: NaiveDate,
    pub name: String,
    pub protein_g: f64,
    pub calories: Option<f64>,
}

impl NewEntry {
    pub fn new(day: NaiveDate, name: &str, protein_g: f64, calories: Option<f64>) -> Result<Self> {
        let fields = EntryFields::new(name, protein_g, calories)?;
        Ok(Self {
            day,
            name: fields.name,
            protein_g: fields.protein_g,
            calories: fields.calories,
        })
    }
}

/// The editable part of an entry. `day` and `created_at` are not in here on purpose.
#[derive(Debug, Clone)]
pub struct EntryFields {
    pub name: String,
    pub protein_g: f64,
    pub calories: Option<f64>,
}

impl EntryFields {
    pub fn new(name: &str, protein_g: f64, calories: Option<f64>) -> Result<Self> {
        let name = validate_name(name)?;
        validate_protein(protein_g)?;
        validate_calories(calories)?;
        Ok(Self {
            name,
            protein_g,
            calories,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub protein_g: f64,
    pub calories: f64,
}

impl DailyTotals {
    /// Sum a day's entries; missing calories count as zero.
    #[must_use]
    pub fn from_entries(entries: &[Entry]) -> Self {
        Self {
            protein_g: entries.iter().map(|e| e.protein_g).sum(),
            calories: entries.iter().filter_map(|e| e.calories).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryDay {
    pub day: NaiveDate,
    pub protein_g: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub goal_protein_g: f64,
    pub entries: Vec<Entry>,
    pub totals: DailyTotals,
    pub remaining_protein_g: f64,
    pub progress: f64,
}

impl DaySummary {
    #[must_use]
    pub fn new(day: NaiveDate, goal_protein_g: f64, entries: Vec<Entry>) -> Self {
        let totals = DailyTotals::from_entries(&entries);
        Self {
            day,
            goal_protein_g,
            remaining_protein_g: (goal_protein_g - totals.protein_g).max(0.0),
            progress: goal_progress(totals.protein_g, goal_protein_g),
            entries,
            totals,
        }
    }

    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.goal_protein_g > 0.0 && self.totals.protein_g >= self.goal_protein_g
    }
}

/// Fraction of the goal eaten, clamped to `[0, 1]`.
#[must_use]
pub fn goal_progress(protein_g: f64, goal_protein_g: f64) -> f64 {
    if goal_protein_g > 0.0 {
        (protein_g / goal_protein_g).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| Error::invalid(format!("Invalid day '{s}'. Use YYYY-MM-DD")))
}

pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(
            "Name must not be empty. Add a short label like 'Chicken breast'",
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_protein(protein_g: f64) -> Result<()> {
    if !protein_g.is_finite() || protein_g <= 0.0 {
        return Err(Error::invalid(
            "Protein must be a positive number of grams (e.g. 32)",
        ));
    }
    Ok(())
}

pub fn validate_calories(calories: Option<f64>) -> Result<()> {
    match calories {
        Some(c) if !c.is_finite() || c < 0.0 => Err(Error::invalid(
            "Calories must be zero or a positive number (e.g. 165)",
        )),
        _ => Ok(()),
    }
}

pub fn validate_goal(goal_protein_g: f64) -> Result<()> {
    if !goal_protein_g.is_finite() || goal_protein_g <= 0.0 {
        return Err(Error::invalid(
            "Goal must be a positive number of grams (e.g. 120)",
        ));
    }
    Ok(())
}
