use clap::Parser;
use smart_todo::api::TodoServer;
use smart_todo::cli::{Cli, Commands};
use smart_todo::cli_handlers::{
    build_app, handle_add, handle_clear_completed, handle_delete, handle_list, handle_setup_sql,
    handle_toggle,
};
use smart_todo::config::AppConfig;
use smart_todo::error::{Result, TodoError};
use smart_todo::logging::{self, ApplicationMode, LoggingConfig};
use std::io::IsTerminal;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The server logs to a file when asked to or when stdout is redirected
    let log_config = if matches!(cli.command, Commands::Serve { .. }) {
        let file_output = if std::env::var("STODO_LOG_FILE").is_ok()
            || !std::io::stdout().is_terminal()
        {
            logging::server_log_path()
        } else {
            None
        };
        if let Some(dir) = file_output.as_ref().and_then(|p| p.parent()) {
            std::fs::create_dir_all(dir).ok();
        }
        LoggingConfig::from_args(ApplicationMode::Server, cli.quiet, cli.verbose, cli.json)
            .with_file_output(file_output)
    } else {
        LoggingConfig::from_args(ApplicationMode::Cli, cli.quiet, cli.verbose, cli.json)
    };

    if let Err(e) = logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::SetupSql => handle_setup_sql(),

        Commands::List { format } => {
            let app = build_app(AppConfig::resolve()?)?;
            handle_list(&app, format).await?
        },

        Commands::Add { title, format } => {
            let title = title.join(" ");
            // Reject blank titles before touching configuration or the network
            if title.trim().is_empty() {
                return Err(TodoError::InvalidInput("Task title is empty".to_string()));
            }
            let app = build_app(AppConfig::resolve()?)?;
            handle_add(&app, &title, format).await?
        },

        Commands::Toggle { id, format } => {
            let app = build_app(AppConfig::resolve()?)?;
            handle_toggle(&app, &id, format).await?
        },

        Commands::Delete { id } => {
            let app = build_app(AppConfig::resolve()?)?;
            handle_delete(&app, &id).await?
        },

        Commands::ClearCompleted => {
            let app = build_app(AppConfig::resolve()?)?;
            handle_clear_completed(&app).await?
        },

        Commands::Serve { port } => {
            if let Some(dir) = logging::log_dir() {
                let retention_days = std::env::var("STODO_LOG_RETENTION_DAYS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(7);
                logging::cleanup_old_logs(&dir, retention_days).ok();
            }

            let app = Arc::new(build_app(AppConfig::resolve()?)?);
            TodoServer::new(port, app)
                .run()
                .await
                .map_err(|e| TodoError::IoError(std::io::Error::other(format!("{:#}", e))))?
        },
    }

    Ok(())
}
