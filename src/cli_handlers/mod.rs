//! Handlers behind each `stodo` subcommand.

pub mod utils;

use crate::analysis::{GeminiAnalyzer, TaskAnalyzer};
use crate::app::TodoApp;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::error::{Result, TodoError};
use crate::store::{RestTaskStore, TaskStore, SETUP_SQL};
use utils::{render_record, render_setup_instructions, render_snapshot};

/// The app wired to the hosted services
pub type RemoteApp = TodoApp<RestTaskStore, GeminiAnalyzer>;

pub fn build_app(config: AppConfig) -> Result<RemoteApp> {
    if !config.analyzer.is_configured() {
        tracing::warn!("No Gemini API key configured; tasks will get default analysis");
    }
    let store = RestTaskStore::new(config.store)?;
    let analyzer = GeminiAnalyzer::new(config.analyzer)?;
    Ok(TodoApp::new(store, analyzer))
}

/// Fetch, printing setup instructions when the table is missing
async fn load<S: TaskStore, A: TaskAnalyzer>(app: &TodoApp<S, A>) -> Result<()> {
    if let Err(e) = app.fetch().await {
        if matches!(e, TodoError::SetupRequired(_)) {
            eprintln!("{}", render_setup_instructions(&app.store().qualified_table()));
        }
        return Err(e);
    }
    Ok(())
}

pub async fn handle_list<S: TaskStore, A: TaskAnalyzer>(
    app: &TodoApp<S, A>,
    format: OutputFormat,
) -> Result<()> {
    load(app).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&app.snapshot())?),
        OutputFormat::Text => print!("{}", render_snapshot(&app.snapshot())),
    }
    Ok(())
}

pub async fn handle_add<S: TaskStore, A: TaskAnalyzer>(
    app: &TodoApp<S, A>,
    title: &str,
    format: OutputFormat,
) -> Result<()> {
    app.set_input(title)?;
    let record = app.submit().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!("Added:");
            print!("{}", render_record(&record, true));
        },
    }
    Ok(())
}

pub async fn handle_toggle<S: TaskStore, A: TaskAnalyzer>(
    app: &TodoApp<S, A>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    load(app).await?;
    let completed = app.toggle(id).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "id": id,
                "is_completed": completed,
            }))?
        ),
        OutputFormat::Text => println!(
            "Task {} marked {}",
            id,
            if completed { "completed" } else { "pending" }
        ),
    }
    Ok(())
}

pub async fn handle_delete<S: TaskStore, A: TaskAnalyzer>(
    app: &TodoApp<S, A>,
    id: &str,
) -> Result<()> {
    load(app).await?;
    app.delete(id).await?;
    println!("Deleted task {}", id);
    Ok(())
}

pub async fn handle_clear_completed<S: TaskStore, A: TaskAnalyzer>(
    app: &TodoApp<S, A>,
) -> Result<()> {
    load(app).await?;
    let removed = app.clear_completed().await?;
    if removed == 0 {
        println!("No completed tasks");
    } else {
        println!("Cleared {} completed task(s)", removed);
    }
    Ok(())
}

pub fn handle_setup_sql() {
    println!("{}", SETUP_SQL);
}
