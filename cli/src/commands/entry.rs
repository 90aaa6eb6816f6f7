use anyhow::{Result, bail};
use std::process;

use protrack_core::models::Entry;
use protrack_core::{Error, Tracker};

use super::helpers::{json_error, parse_calories, parse_protein, prompt_confirm};
use super::log::format_entry_line;

pub(crate) struct EntryEdit<'a> {
    pub name: Option<&'a str>,
    pub protein: Option<&'a str>,
    pub calories: Option<&'a str>,
    pub clear_calories: bool,
}

impl EntryEdit<'_> {
    fn parse(&self) -> Result<EntryPatch> {
        if self.name.is_none()
            && self.protein.is_none()
            && self.calories.is_none()
            && !self.clear_calories
        {
            bail!(
                "Nothing to update. Provide at least one of --name, --protein, --calories, or --clear-calories"
            );
        }

        let calories = match (self.clear_calories, self.calories) {
            (true, _) => CaloriesEdit::Clear,
            (false, Some(c)) => CaloriesEdit::Set(parse_calories(c)?),
            (false, None) => CaloriesEdit::Keep,
        };

        Ok(EntryPatch {
            name: self.name.map(str::to_string),
            protein_g: self.protein.map(parse_protein).transpose()?,
            calories,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CaloriesEdit {
    Keep,
    Set(f64),
    Clear,
}

/// Parsed edit flags. `None` keeps the stored value.
#[derive(Debug, PartialEq)]
struct EntryPatch {
    name: Option<String>,
    protein_g: Option<f64>,
    calories: CaloriesEdit,
}

impl EntryPatch {
    fn apply(self, current: &Entry) -> (String, f64, Option<f64>) {
        (
            self.name.unwrap_or_else(|| current.name.clone()),
            self.protein_g.unwrap_or(current.protein_g),
            match self.calories {
                CaloriesEdit::Keep => current.calories,
                CaloriesEdit::Set(c) => Some(c),
                CaloriesEdit::Clear => None,
            },
        )
    }
}

pub(crate) fn cmd_update(
    tracker: &Tracker,
    entry_id: i64,
    edit: &EntryEdit<'_>,
    json: bool,
) -> Result<()> {
    let patch = edit.parse()?;

    let current = match tracker.get_entry(entry_id) {
        Ok(entry) => entry,
        Err(Error::NotFound { .. }) => not_found(entry_id, json),
        Err(e) => return Err(e.into()),
    };

    let (name, protein_g, calories) = patch.apply(&current);
    let entry = match tracker.update_entry(entry_id, &name, protein_g, calories) {
        Ok(entry) => entry,
        Err(Error::NotFound { .. }) => not_found(entry_id, json),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Updated {}", format_entry_line(&entry));
    }
    Ok(())
}

pub(crate) fn cmd_delete(tracker: &Tracker, entry_id: i64, json: bool) -> Result<()> {
    let removed = tracker.delete_entry(entry_id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": entry_id, "removed": removed }));
    } else if removed {
        println!("Deleted entry {entry_id}");
    } else {
        println!("Entry {entry_id} was already gone");
    }
    Ok(())
}

pub(crate) fn cmd_clear(tracker: &Tracker, yes: bool, json: bool) -> Result<()> {
    if !yes && !prompt_confirm("This will remove ALL logged entries. This cannot be undone.")? {
        if json {
            println!("{}", json_error("Cancelled"));
        } else {
            eprintln!("Cancelled");
        }
        process::exit(2);
    }

    let removed = tracker.clear_entries()?;

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("Deleted {removed} entries");
    }
    Ok(())
}

fn not_found(entry_id: i64, json: bool) -> ! {
    if json {
        println!("{}", json_error(&format!("Entry {entry_id} not found")));
    } else {
        eprintln!("Entry {entry_id} not found");
    }
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stored() -> Entry {
        Entry {
            id: 7,
            day: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            name: "Greek yogurt".to_string(),
            protein_g: 17.0,
            calories: Some(100.0),
            created_at: "2024-01-10T08:15:00.000Z".to_string(),
        }
    }

    fn edit<'a>(
        name: Option<&'a str>,
        protein: Option<&'a str>,
        calories: Option<&'a str>,
        clear_calories: bool,
    ) -> EntryEdit<'a> {
        EntryEdit {
            name,
            protein,
            calories,
            clear_calories,
        }
    }

    #[test]
    fn test_unspecified_fields_keep_stored_values() {
        let patch = edit(None, Some("20g"), None, false).parse().unwrap();
        let (name, protein_g, calories) = patch.apply(&stored());
        assert_eq!(name, "Greek yogurt");
        assert!((protein_g - 20.0).abs() < f64::EPSILON);
        assert_eq!(calories, Some(100.0));
    }

    #[test]
    fn test_calories_override_and_clear() {
        let patch = edit(None, None, Some("120kcal"), false).parse().unwrap();
        assert_eq!(patch.apply(&stored()).2, Some(120.0));

        let patch = edit(None, None, None, true).parse().unwrap();
        assert_eq!(patch.calories, CaloriesEdit::Clear);
        let (name, protein_g, calories) = patch.apply(&stored());
        assert_eq!(name, "Greek yogurt");
        assert!((protein_g - 17.0).abs() < f64::EPSILON);
        assert_eq!(calories, None);
    }

    #[test]
    fn test_rename_only() {
        let patch = edit(Some("Skyr"), None, None, false).parse().unwrap();
        assert_eq!(
            patch,
            EntryPatch {
                name: Some("Skyr".to_string()),
                protein_g: None,
                calories: CaloriesEdit::Keep,
            }
        );
        assert_eq!(patch.apply(&stored()).0, "Skyr");
    }

    #[test]
    fn test_empty_or_invalid_edit_is_rejected() {
        assert!(edit(None, None, None, false).parse().is_err());
        assert!(edit(None, Some("lots"), None, false).parse().is_err());
        assert!(edit(None, None, Some("-5"), false).parse().is_err());
    }
}
