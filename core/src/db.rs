use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{
    DAY_FORMAT, DEFAULT_GOAL_PROTEIN_G, Entry, EntryFields, HistoryDay, NewEntry, format_day,
};

const SCHEMA_VERSION: i64 = 1;

const ENTRY_COLUMNS: &str = "id, day, name, protein_g, calories, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file. The schema is not touched; call
    /// [`Database::ensure_schema`] before use.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Ok(Database { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database { conn })
    }

    /// Create missing tables and seed the settings row. Safe to call any
    /// number of times; an existing goal is never overwritten.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY NOT NULL,
                goal_protein_g REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                day TEXT NOT NULL,
                name TEXT NOT NULL,
                protein_g REAL NOT NULL,
                calories REAL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_day ON entries(day);",
        )?;

        let seeded = self.conn.execute(
            "INSERT INTO settings (id, goal_protein_g)
             SELECT 1, ?1
             WHERE NOT EXISTS (SELECT 1 FROM settings WHERE id = 1)",
            params![DEFAULT_GOAL_PROTEIN_G],
        )?;
        if seeded > 0 {
            debug!(goal = DEFAULT_GOAL_PROTEIN_G, "seeded default settings row");
        }

        let version = self.schema_version()?;
        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
            debug!(from = version, to = SCHEMA_VERSION, "schema version updated");
        }

        Ok(())
    }

    fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    // --- Row mapping helpers ---

    // Expects columns in ENTRY_COLUMNS order.
    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        Ok(Entry {
            id: row.get(0)?,
            day: day_from_sql(1, &row.get::<_, String>(1)?)?,
            name: row.get(2)?,
            protein_g: row.get(3)?,
            calories: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    // --- Settings ---

    pub fn get_goal(&self) -> Result<f64> {
        let goal: Option<f64> = self
            .conn
            .query_row(
                "SELECT goal_protein_g FROM settings WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        goal.ok_or_else(|| {
            warn!("settings row missing");
            Error::NotInitialized
        })
    }

    /// Overwrite the goal. The caller validates the value.
    pub fn set_goal(&self, goal_protein_g: f64) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE settings SET goal_protein_g = ?1 WHERE id = 1",
            params![goal_protein_g],
        )?;
        if rows == 0 {
            warn!("settings row missing on goal update");
            return Err(Error::NotInitialized);
        }
        debug!(goal = goal_protein_g, "goal updated");
        Ok(())
    }

    // --- Entries ---

    pub fn insert_entry(&self, entry: &NewEntry, created_at: &str) -> Result<Entry> {
        self.conn.execute(
            "INSERT INTO entries (day, name, protein_g, calories, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format_day(entry.day),
                entry.name,
                entry.protein_g,
                entry.calories,
                created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, day = %entry.day, "entry created");
        self.get_entry(id)
    }

    pub fn get_entry(&self, id: i64) -> Result<Entry> {
        self.conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"),
                params![id],
                Self::entry_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound { id })
    }

    /// Rewrite name, protein and calories. `day` and `created_at` stay as created.
    pub fn update_entry(&self, id: i64, fields: &EntryFields) -> Result<Entry> {
        let rows = self.conn.execute(
            "UPDATE entries SET name = ?1, protein_g = ?2, calories = ?3 WHERE id = ?4",
            params![fields.name, fields.protein_g, fields.calories, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound { id });
        }
        debug!(id, "entry updated");
        self.get_entry(id)
    }

    /// Returns false when there was nothing to delete.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        debug!(id, removed = rows > 0, "entry delete");
        Ok(rows > 0)
    }

    pub fn delete_all_entries(&self) -> Result<usize> {
        let rows = self.conn.execute("DELETE FROM entries", [])?;
        debug!(removed = rows, "all entries deleted");
        Ok(rows)
    }

    /// Most recent first.
    pub fn get_entries_for_day(&self, day: NaiveDate) -> Result<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE day = ?1
             ORDER BY created_at DESC, id DESC"
        ))?;
        let entries = stmt
            .query_map(params![format_day(day)], Self::entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Per-day sums for `start..=end`, newest first. Days without entries are absent.
    pub fn get_history(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<HistoryDay>> {
        let mut stmt = self.conn.prepare(
            "SELECT day,
                    COALESCE(SUM(protein_g), 0),
                    COALESCE(SUM(calories), 0)
             FROM entries
             WHERE day >= ?1 AND day <= ?2
             GROUP BY day
             ORDER BY day DESC",
        )?;
        let rows = stmt
            .query_map(params![format_day(start), format_day(end)], |row| {
                Ok(HistoryDay {
                    day: day_from_sql(0, &row.get::<_, String>(0)?)?,
                    protein_g: row.get(1)?,
                    calories: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn day_from_sql(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_schema().unwrap();
        db
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn new_entry(d: u32, name: &str, protein_g: f64, calories: Option<f64>) -> NewEntry {
        NewEntry::new(day(d), name, protein_g, calories).unwrap()
    }

    #[test]
    fn test_ensure_schema_seeds_default_goal() {
        let db = db();
        assert!((db.get_goal().unwrap() - 120.0).abs() < f64::EPSILON);
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_ensure_schema_idempotent() {
        let db = db();
        db.set_goal(150.0).unwrap();
        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert!((db.get_goal().unwrap() - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_settings_row_is_not_initialized() {
        let db = db();
        db.conn.execute("DELETE FROM settings", []).unwrap();
        assert!(matches!(db.get_goal(), Err(Error::NotInitialized)));
        assert!(matches!(db.set_goal(100.0), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_unmigrated_database_is_storage_error() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_goal().unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_insert_and_get_entry() {
        let db = db();
        let entry = db
            .insert_entry(
                &new_entry(10, "Chicken breast", 32.0, Some(165.0)),
                "2024-01-10T08:00:00.000Z",
            )
            .unwrap();

        assert_eq!(entry.day, day(10));
        assert_eq!(entry.name, "Chicken breast");
        assert!((entry.protein_g - 32.0).abs() < f64::EPSILON);
        assert_eq!(entry.calories, Some(165.0));
        assert_eq!(entry.created_at, "2024-01-10T08:00:00.000Z");

        let fetched = db.get_entry(entry.id).unwrap();
        assert_eq!(fetched, entry);
    }

    #[test]
    fn test_get_entry_not_found() {
        let db = db();
        assert!(matches!(db.get_entry(99), Err(Error::NotFound { id: 99 })));
    }

    #[test]
    fn test_update_entry_keeps_day_and_created_at() {
        let db = db();
        let entry = db
            .insert_entry(&new_entry(10, "Eggs", 12.0, Some(140.0)), "2024-01-10T07:00:00.000Z")
            .unwrap();

        let fields = EntryFields::new("Three eggs", 18.0, None).unwrap();
        let updated = db.update_entry(entry.id, &fields).unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.day, entry.day);
        assert_eq!(updated.created_at, entry.created_at);
        assert_eq!(updated.name, "Three eggs");
        assert!((updated.protein_g - 18.0).abs() < f64::EPSILON);
        assert!(updated.calories.is_none());
    }

    #[test]
    fn test_update_entry_not_found() {
        let db = db();
        let fields = EntryFields::new("Ghost", 1.0, None).unwrap();
        assert!(matches!(
            db.update_entry(7, &fields),
            Err(Error::NotFound { id: 7 })
        ));
        // No implicit create
        assert!(db.get_entries_for_day(day(10)).unwrap().is_empty());
    }

    #[test]
    fn test_delete_entry_idempotent() {
        let db = db();
        let entry = db
            .insert_entry(&new_entry(10, "Tofu", 20.0, None), "2024-01-10T08:00:00.000Z")
            .unwrap();

        assert!(db.delete_entry(entry.id).unwrap());
        // Deleting again is a no-op
        assert!(!db.delete_entry(entry.id).unwrap());
        assert!(db.get_entries_for_day(day(10)).unwrap().is_empty());
    }

    #[test]
    fn test_entries_for_day_most_recent_first() {
        let db = db();
        db.insert_entry(&new_entry(10, "Breakfast", 20.0, None), "2024-01-10T07:00:00.000Z")
            .unwrap();
        db.insert_entry(&new_entry(10, "Dinner", 40.0, None), "2024-01-10T19:00:00.000Z")
            .unwrap();
        db.insert_entry(&new_entry(10, "Lunch", 30.0, None), "2024-01-10T12:00:00.000Z")
            .unwrap();
        db.insert_entry(&new_entry(11, "Other day", 5.0, None), "2024-01-10T13:00:00.000Z")
            .unwrap();

        let names: Vec<String> = db
            .get_entries_for_day(day(10))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Dinner", "Lunch", "Breakfast"]);
    }

    #[test]
    fn test_entries_same_timestamp_newest_id_first() {
        let db = db();
        let first = db
            .insert_entry(&new_entry(10, "First", 1.0, None), "2024-01-10T07:00:00.000Z")
            .unwrap();
        let second = db
            .insert_entry(&new_entry(10, "Second", 1.0, None), "2024-01-10T07:00:00.000Z")
            .unwrap();

        let ids: Vec<i64> = db
            .get_entries_for_day(day(10))
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_history_groups_and_bounds() {
        let db = db();
        let ts = "2024-01-01T00:00:00.000Z";
        db.insert_entry(&new_entry(1, "Too old", 99.0, Some(999.0)), ts).unwrap();
        db.insert_entry(&new_entry(5, "A", 30.0, Some(200.0)), ts).unwrap();
        db.insert_entry(&new_entry(5, "B", 20.0, None), ts).unwrap();
        db.insert_entry(&new_entry(9, "C", 10.0, None), ts).unwrap();
        db.insert_entry(&new_entry(12, "Future", 50.0, None), ts).unwrap();

        let history = db.get_history(day(2), day(10)).unwrap();
        assert_eq!(history.len(), 2);

        assert_eq!(history[0].day, day(9));
        assert!((history[0].protein_g - 10.0).abs() < f64::EPSILON);
        assert!(history[0].calories.abs() < f64::EPSILON);

        assert_eq!(history[1].day, day(5));
        assert!((history[1].protein_g - 50.0).abs() < f64::EPSILON);
        assert!((history[1].calories - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_history_from_earliest_date() {
        let db = db();
        let ts = "2024-01-01T00:00:00.000Z";
        db.insert_entry(&new_entry(1, "A", 30.0, None), ts).unwrap();
        db.insert_entry(&new_entry(9, "B", 20.0, None), ts).unwrap();

        let history = db.get_history(NaiveDate::MIN, day(9)).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_malformed_stored_day_is_storage_error() {
        let db = db();
        db.insert_entry(&new_entry(3, "A", 30.0, None), "2024-01-03T08:00:00.000Z")
            .unwrap();
        db.conn
            .execute("UPDATE entries SET day = '2024-01-3x'", [])
            .unwrap();

        assert!(db.get_entry(1).unwrap_err().is_storage());
        assert!(db.get_history(day(1), day(9)).unwrap_err().is_storage());
    }

    #[test]
    fn test_delete_all_entries_keeps_goal() {
        let db = db();
        db.set_goal(140.0).unwrap();
        let ts = "2024-01-10T08:00:00.000Z";
        db.insert_entry(&new_entry(10, "A", 1.0, None), ts).unwrap();
        db.insert_entry(&new_entry(11, "B", 2.0, None), ts).unwrap();

        assert_eq!(db.delete_all_entries().unwrap(), 2);
        assert_eq!(db.delete_all_entries().unwrap(), 0);
        assert!((db.get_goal().unwrap() - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_database_persists_goal() {
        let tmp_dir = tempfile::TempDir::new().unwrap();
        let path = tmp_dir.path().join("protein.db");

        {
            let db = Database::open(&path).unwrap();
            db.ensure_schema().unwrap();
            db.set_goal(95.5).unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.ensure_schema().unwrap();
        assert!((db.get_goal().unwrap() - 95.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_open_unwritable_path_fails_with_storage_error() {
        let tmp_dir = tempfile::TempDir::new().unwrap();
        let path = tmp_dir.path().join("missing-dir").join("protein.db");
        let err = Database::open(&path).err().unwrap();
        assert!(err.is_storage());
    }
}
