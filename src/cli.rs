use clap::{Parser, Subcommand, ValueEnum};

const LONG_ABOUT: &str = r#"
Smart-Todo - AI-enriched task list

Every task you add is analyzed by a Gemini model, which suggests a priority
(low, medium, high) and a short list of sub-tasks. Tasks are stored in a
Supabase (PostgREST) table named `todos`.

Configuration (environment variables):
  STODO_SUPABASE_URL / SUPABASE_URL         Project URL
  STODO_SUPABASE_KEY / SUPABASE_ANON_KEY    API key
  STODO_TABLE                               Table name (default: todos)
  STODO_GEMINI_API_KEY / GEMINI_API_KEY     Gemini key (optional; without it
                                            every task gets medium priority)
  STODO_GEMINI_MODEL                        Model (default: gemini-3-flash-preview)

First run:
  stodo setup-sql   ← Print the SQL that creates the table
  stodo add "Plan trip to Jeju"
  stodo list
"#;

#[derive(Parser, Clone)]
#[command(name = "stodo")]
#[command(about = "AI-enriched task list backed by Supabase and Gemini")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// List tasks, newest first, with counts
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze a task with AI and add it
    ///
    /// Examples:
    ///   stodo add "Plan trip to Jeju"
    ///   stodo add Renew passport --format json
    Add {
        /// Task title (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task ID
        id: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Delete every completed task
    ClearCompleted,

    /// Print the SQL that provisions the task table
    SetupSql,

    /// Serve the JSON API for a browser front-end
    ///
    /// Examples:
    ///   stodo serve
    ///   stodo serve --port 8080
    Serve {
        /// Port to listen on (localhost only)
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}
