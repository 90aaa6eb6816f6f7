mod entry;
mod goal;
mod helpers;
mod log;
mod summary;

pub(crate) use entry::{EntryEdit, cmd_clear, cmd_delete, cmd_update};
pub(crate) use goal::{cmd_goal_set, cmd_goal_show};
pub(crate) use log::cmd_log;
pub(crate) use summary::{cmd_history, cmd_today};
