//! Text rendering for CLI output.

use crate::app::{Snapshot, ViewMode};
use crate::models::TaskRecord;
use crate::priority::Priority;
use crate::store::SETUP_SQL;
use std::fmt::Write;

/// Check box for a task's completion state
pub fn get_status_badge(is_completed: bool) -> &'static str {
    if is_completed {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn priority_label(priority: Priority) -> String {
    priority.as_str().to_uppercase()
}

/// "3 Steps", or nothing when there are no sub-tasks
pub fn steps_label(sub_tasks: &[String]) -> Option<String> {
    match sub_tasks.len() {
        0 => None,
        1 => Some("1 Step".to_string()),
        n => Some(format!("{} Steps", n)),
    }
}

/// One task, optionally followed by its sub-tasks
pub fn render_record(record: &TaskRecord, with_sub_tasks: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{} {}  {}  {}",
        get_status_badge(record.is_completed),
        record.title,
        priority_label(record.priority),
        record.created_at.format("%Y-%m-%d"),
    );
    if let Some(steps) = steps_label(&record.sub_tasks) {
        let _ = write!(out, "  {}", steps);
    }
    let _ = writeln!(out, "  ({})", record.id);

    if with_sub_tasks {
        for step in &record.sub_tasks {
            let _ = writeln!(out, "      - {}", step);
        }
    }
    out
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total {}  Pending {}  Completed {}",
        snapshot.stats.total, snapshot.stats.pending, snapshot.stats.completed
    );
    let _ = writeln!(out);

    if let ViewMode::FetchFailed { message } = &snapshot.mode {
        let _ = writeln!(out, "Error: {}", message);
        return out;
    }

    if snapshot.tasks.is_empty() {
        let _ = writeln!(out, "No tasks yet. Add one with: stodo add \"<title>\"");
        return out;
    }

    for task in &snapshot.tasks {
        out.push_str(&render_record(task, true));
    }
    out
}

pub fn render_setup_instructions(qualified_table: &str) -> String {
    format!(
        "Database setup required: the table {} does not exist.\n\n\
         1. Open your Supabase dashboard.\n\
         2. Go to the SQL Editor.\n\
         3. Create a new query, paste the SQL below and run it.\n\
         4. Run the command again.\n\n{}\n",
        qualified_table, SETUP_SQL
    )
}
