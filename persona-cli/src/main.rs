mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use persona_cli::api::Api;
use persona_cli::http::{DEFAULT_SERVER_URL, HttpApi};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "persona")]
#[command(about = "Manage persona calendars from the terminal")]
struct Cli {
    /// Base URL of the persona server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List personas
    Personas,
    PersonaAdd {
        name: String,

        /// Color as #RRGGBB
        #[arg(short, long, default_value = "#3B82F6")]
        color: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    PersonaRm {
        /// Persona id or name
        persona: String,
    },
    /// List events, grouped by date
    Events {
        /// Only this persona (id or name)
        #[arg(short, long)]
        persona: Option<String>,

        /// Events starting on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Events starting on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Match title or description
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        tag: Vec<String>,
    },
    EventAdd {
        title: String,

        /// Persona id or name
        #[arg(short, long)]
        persona: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long, default_value = "09:00")]
        start: String,

        #[arg(short, long, default_value = "10:00")]
        end: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        tag: Vec<String>,

        /// none, daily, weekly or monthly
        #[arg(short, long, default_value = "none")]
        repeat: String,

        /// Reminder as channel:minutes, e.g. push:15
        #[arg(short, long)]
        notify: Vec<String>,

        /// Push the event to Google Calendar unless the server already did
        #[arg(long)]
        sync: bool,
    },
    EventRm {
        id: String,
    },
    /// The next events within a week
    Upcoming,
    /// Korean holidays of a month
    Holidays {
        /// YYYY-MM, defaults to the current month
        month: Option<String>,
    },
    /// Stock quotes and market indices
    Stock {
        /// Comma-separated symbols
        #[arg(short, long)]
        symbols: Option<String>,

        /// Keep refreshing
        #[arg(short, long)]
        watch: bool,
    },
    /// Push one event to Google Calendar
    Sync {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let api: Arc<dyn Api> = Arc::new(HttpApi::new(&cli.server));

    match cli.command {
        Commands::Personas => commands::personas::list(api).await,
        Commands::PersonaAdd {
            name,
            color,
            description,
        } => commands::personas::add(api, name, color, description).await,
        Commands::PersonaRm { persona } => commands::personas::remove(api, &persona).await,
        Commands::Events {
            persona,
            from,
            to,
            search,
            tag,
        } => {
            let args = commands::events::ListArgs {
                persona,
                from,
                to,
                search,
                tags: tag,
            };
            commands::events::list(api, args).await
        }
        Commands::EventAdd {
            title,
            persona,
            date,
            start,
            end,
            description,
            tag,
            repeat,
            notify,
            sync,
        } => {
            let args = commands::events::AddArgs {
                title,
                persona,
                date,
                start,
                end,
                description,
                tags: tag,
                repeat,
                notify,
                sync,
            };
            commands::events::add(api, args).await
        }
        Commands::EventRm { id } => commands::events::remove(api, &id).await,
        Commands::Upcoming => commands::events::upcoming(api).await,
        Commands::Holidays { month } => commands::holidays::run(month.as_deref()),
        Commands::Stock { symbols, watch } => {
            commands::stock::run(api, symbols.as_deref(), watch).await
        }
        Commands::Sync { id } => commands::sync::run(api, &id).await,
    }
}
