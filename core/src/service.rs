use std::path::Path;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    DailyTotals, DaySummary, Entry, EntryFields, HistoryDay, NewEntry, validate_goal,
};

/// Entry point for a presentation layer.
///
/// Every call validates its input before touching storage and returns fresh
/// data; nothing is cached between calls.
pub struct Tracker {
    db: Database,
    clock: Box<dyn Clock>,
}

impl Tracker {
    /// Open the database at `path` and make sure the schema exists.
    pub fn open(path: &Path, clock: Box<dyn Clock>) -> Result<Self> {
        let tracker = Self {
            db: Database::open(path)?,
            clock,
        };
        tracker.ensure_schema()?;
        Ok(tracker)
    }

    pub fn open_system(path: &Path) -> Result<Self> {
        Self::open(path, Box::new(SystemClock))
    }

    pub fn new_in_memory(clock: Box<dyn Clock>) -> Result<Self> {
        let tracker = Self {
            db: Database::open_in_memory()?,
            clock,
        };
        tracker.ensure_schema()?;
        Ok(tracker)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.db.ensure_schema()
    }

    /// Calendar day according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- Settings ---

    pub fn get_goal(&self) -> Result<f64> {
        self.db.get_goal()
    }

    pub fn set_goal(&self, goal_protein_g: f64) -> Result<()> {
        validate_goal(goal_protein_g)?;
        self.db.set_goal(goal_protein_g)
    }

    // --- Entries ---

    pub fn create_entry(
        &self,
        day: NaiveDate,
        name: &str,
        protein_g: f64,
        calories: Option<f64>,
    ) -> Result<Entry> {
        let entry = NewEntry::new(day, name, protein_g, calories)?;
        let created_at = format_timestamp(self.clock.now());
        self.db.insert_entry(&entry, &created_at)
    }

    pub fn update_entry(
        &self,
        id: i64,
        name: &str,
        protein_g: f64,
        calories: Option<f64>,
    ) -> Result<Entry> {
        let fields = EntryFields::new(name, protein_g, calories)?;
        self.db.update_entry(id, &fields)
    }

    /// Deleting a missing id is not an error; the return value says whether
    /// anything was removed.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        self.db.delete_entry(id)
    }

    pub fn get_entry(&self, id: i64) -> Result<Entry> {
        self.db.get_entry(id)
    }

    pub fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        self.db.get_entries_for_day(day)
    }

    pub fn daily_totals(&self, day: NaiveDate) -> Result<DailyTotals> {
        let entries = self.list_for_day(day)?;
        Ok(DailyTotals::from_entries(&entries))
    }

    /// Per-day sums for the last `range_days` days, today included, newest first.
    pub fn history(&self, range_days: u32) -> Result<Vec<HistoryDay>> {
        if range_days == 0 {
            return Err(Error::invalid("History range must be at least 1 day"));
        }
        let end = self.clock.today();
        // A window reaching past the calendar covers everything up to today.
        let start = end
            .checked_sub_days(Days::new(u64::from(range_days) - 1))
            .unwrap_or(NaiveDate::MIN);
        debug!(%start, %end, "history window");
        self.db.get_history(start, end)
    }

    pub fn day_summary(&self, day: NaiveDate) -> Result<DaySummary> {
        let goal = self.get_goal()?;
        let entries = self.list_for_day(day)?;
        Ok(DaySummary::new(day, goal, entries))
    }

    /// Remove every logged entry. The goal is kept.
    pub fn clear_entries(&self) -> Result<usize> {
        self.db.delete_all_entries()
    }
}
