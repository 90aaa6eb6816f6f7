use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::io::{self, BufRead, Write};

/// Parse a protein amount like "32" or "32g". Must be a positive number.
pub(crate) fn parse_protein(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed.parse().with_context(|| {
        format!("Invalid protein amount: '{s}'. Enter grams of protein (e.g. 32 or 32g)")
    })?;
    if !value.is_finite() || value <= 0.0 {
        bail!("Protein must be a positive number of grams (e.g. 32)");
    }
    Ok(value)
}

/// Parse a calorie amount like "165" or "165kcal". Zero is allowed.
pub(crate) fn parse_calories(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches("kcal").trim();
    let value: f64 = trimmed.parse().with_context(|| {
        format!("Invalid calories: '{s}'. Enter a number like 165 or 165kcal")
    })?;
    if !value.is_finite() || value < 0.0 {
        bail!("Calories must be zero or a positive number");
    }
    Ok(value)
}

pub(crate) fn parse_goal(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid goal: '{s}'. Enter a positive number of grams"))?;
    if !value.is_finite() || value <= 0.0 {
        bail!("Goal must be a positive number of grams");
    }
    Ok(value)
}

/// Resolve a date argument against `today`.
pub(crate) fn parse_date(date_str: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match date_str {
        None | Some("today") => Ok(today),
        Some("yesterday") => Ok(today - Duration::days(1)),
        Some("tomorrow") => Ok(today + Duration::days(1)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
            format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
        }),
    }
}

pub(crate) fn prompt_confirm(question: &str) -> Result<bool> {
    eprint!("{question} Type 'yes' to confirm: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

/// Text progress bar, `progress` in `[0, 1]`.
#[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub(crate) fn progress_bar(progress: f64, width: usize) -> String {
    let filled = (progress.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Local wall-clock time for a stored UTC `created_at`, falling back to the raw text.
pub(crate) fn display_time(created_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(created_at).map_or_else(
        |_| created_at.to_string(),
        |ts| ts.with_timezone(&chrono::Local).format("%H:%M").to_string(),
    )
}
