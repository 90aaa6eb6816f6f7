use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use protrack_core::Tracker;
use protrack_core::models::format_day;

use super::helpers::{no_neg_zero, parse_date, progress_bar};
use super::log::format_entry_line;

const BAR_WIDTH: usize = 24;

pub(crate) fn cmd_today(tracker: &Tracker, date: Option<&str>, json: bool) -> Result<()> {
    let day = parse_date(date, tracker.today())?;
    let summary = tracker.day_summary(day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let day_str = format_day(summary.day);
    println!("=== {day_str} ===\n");

    let protein = no_neg_zero(summary.totals.protein_g);
    let calories = no_neg_zero(summary.totals.calories);
    let goal = summary.goal_protein_g;
    let pct = summary.progress * 100.0;
    println!("  Protein:  {protein:.0} / {goal:.0} g");
    println!("  Calories: {calories:.0} kcal");
    println!("  {} {pct:.0}%", progress_bar(summary.progress, BAR_WIDTH));
    if summary.goal_reached() {
        println!("  Goal reached");
    } else {
        let remaining = summary.remaining_protein_g;
        println!("  Remaining: {remaining:.0} g");
    }
    println!();

    if summary.entries.is_empty() {
        println!("  Nothing logged yet.");
    } else {
        println!("  Logged items");
        for e in &summary.entries {
            println!("    {}", format_entry_line(e));
        }
    }

    Ok(())
}

pub(crate) fn cmd_history(tracker: &Tracker, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Goal")]
        goal: String,
    }

    let history = tracker.history(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let goal = tracker.get_goal()?;
    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|h| {
            let p = no_neg_zero(h.protein_g);
            let c = no_neg_zero(h.calories);
            HistoryRow {
                date: format_day(h.day),
                protein: format!("{p:.0}g"),
                calories: if c > 0.0 {
                    format!("{c:.0}")
                } else {
                    "-".to_string()
                },
                goal: progress_bar(p / goal, 10),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}
