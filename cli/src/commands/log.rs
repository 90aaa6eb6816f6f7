use anyhow::Result;

use protrack_core::Tracker;
use protrack_core::models::{Entry, format_day};

use super::helpers::{display_time, parse_calories, parse_date, parse_protein, truncate};

const NAME_WIDTH: usize = 40;

pub(crate) fn format_entry_line(entry: &Entry) -> String {
    let id = entry.id;
    let name = truncate(&entry.name, NAME_WIDTH);
    let protein = entry.protein_g;
    let time = display_time(&entry.created_at);
    match entry.calories {
        Some(cal) => format!("[{id}] {time} {name} - {protein:.0} g | {cal:.0} kcal"),
        None => format!("[{id}] {time} {name} - {protein:.0} g"),
    }
}

pub(crate) fn cmd_log(
    tracker: &Tracker,
    name: &str,
    protein: &str,
    calories: Option<&str>,
    date: Option<&str>,
    json: bool,
) -> Result<()> {
    let protein_g = parse_protein(protein)?;
    let calories = calories.map(parse_calories).transpose()?;
    let day = parse_date(date, tracker.today())?;

    let entry = tracker.create_entry(day, name, protein_g, calories)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let totals = tracker.daily_totals(day)?;
        let goal = tracker.get_goal()?;
        let day_str = format_day(day);
        println!("Logged {} for {day_str}", format_entry_line(&entry));
        println!(
            "  {day_str}: {:.0} / {goal:.0} g protein",
            totals.protein_g
        );
    }

    Ok(())
}
