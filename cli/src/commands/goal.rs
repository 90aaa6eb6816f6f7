use anyhow::Result;

use protrack_core::Tracker;

use super::helpers::parse_goal;

pub(crate) fn cmd_goal_show(tracker: &Tracker, json: bool) -> Result<()> {
    let goal = tracker.get_goal()?;

    if json {
        println!("{}", serde_json::json!({ "goal_protein_g": goal }));
    } else {
        println!("Daily protein goal: {goal:.0} g");
    }
    Ok(())
}

pub(crate) fn cmd_goal_set(tracker: &Tracker, grams: &str, json: bool) -> Result<()> {
    let goal = parse_goal(grams)?;
    tracker.set_goal(goal)?;

    if json {
        println!("{}", serde_json::json!({ "goal_protein_g": goal }));
    } else {
        println!("Daily protein goal set to {goal:.0} g");
    }
    Ok(())
}
