use clap::{Parser, Subcommand};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use designhub_calendar::calendar::{
    Calendar, CalendarError, ClientScope, EventId, MonthGrid, local_today,
};
use designhub_calendar::config::{AppConfig, CalendarConfig};
use designhub_calendar::core::db::{
    AppointmentRepository, Latency, MemoryStore, ProjectRepository, SqliteStore, StudioData,
    StudioStore, format_hh_mm, parse_date, parse_hh_mm,
};

#[derive(Parser)]
#[command(name = "designhub-calendar")]
#[command(about = "Studio calendar: appointments and project milestones by month")]
struct Cli {
    /// SQLite database file; an in-memory store is used when omitted
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// JSON seed data (appointments and projects) to load at startup
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Apply the configured per-operation latency to the in-memory store
    #[arg(long)]
    simulate_latency: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the month grid with its events
    Month {
        /// Month to show as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
        /// Only show milestones of this client's projects
        #[arg(long)]
        client: Option<i64>,
    },
    /// List appointments in the next N days
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// List projects with their phase progress
    Projects {
        #[arg(long)]
        client: Option<i64>,
    },
    /// Create an appointment
    Add {
        #[arg(long)]
        title: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Time as HH:MM (defaults to the configured default time)
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        client: Option<i64>,
    },
    /// Change an existing appointment
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an appointment
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => AppConfig::load(path).await?,
        None => AppConfig::default(),
    };
    let seed = match &args.seed {
        Some(path) => Some(StudioData::load(path).await?),
        None => None,
    };

    match &args.db {
        Some(path) => {
            let store = SqliteStore::open(path).await?;
            if let Some(seed) = &seed {
                store.import(seed).await?;
            }
            let result = run(store.clone(), config.calendar, args.command).await;
            store.close().await?;
            result
        }
        None => {
            let latency = if args.simulate_latency {
                config.latency
            } else {
                Latency::none()
            };
            let data = match seed {
                Some(seed) => seed,
                None => StudioData::sample()?,
            };
            run(MemoryStore::new(data, latency), config.calendar, args.command).await
        }
    }
}

async fn run<S: StudioStore>(store: S, config: CalendarConfig, command: Command) -> anyhow::Result<()> {
    let mut calendar = Calendar::new(store, config, local_today());

    match command {
        Command::Month { month, client } => {
            if let Some(client) = client {
                calendar = calendar.with_scope(ClientScope::Client(client));
            }
            match month {
                Some(month) => calendar.go_to(parse_date(&format!("{month}-01"))?).await?,
                None => calendar.load().await?,
            }
            print_month(calendar.grid(), calendar.config().max_visible_events);
        }
        Command::Upcoming { days } => {
            let upcoming = calendar
                .store()
                .get_upcoming(OffsetDateTime::now_utc(), days)
                .await?;
            println!("Appointments in the next {days} days: {}", upcoming.len());
            for appointment in upcoming {
                println!(
                    "  #{} {} {} - {}",
                    appointment.id,
                    appointment.date.date(),
                    format_hh_mm(appointment.time),
                    appointment.title
                );
            }
        }
        Command::Projects { client } => {
            let projects = match client {
                Some(client) => calendar.store().get_projects_by_client(client).await?,
                None => calendar.store().get_projects().await?,
            };
            for project in projects {
                println!(
                    "  #{} {} [{} {}%] due {}",
                    project.id,
                    project.name,
                    project.phase,
                    project.phase.progress_percent(),
                    project.target_date
                );
            }
        }
        Command::Add {
            title,
            date,
            time,
            description,
            client,
        } => {
            match date {
                Some(date) => calendar.open_day(parse_date(&date)?),
                None => calendar.open_new_today(),
            }
            if let Some(form) = calendar.editor_mut().form_mut() {
                form.title = title;
                form.description = description;
                form.client_id = client;
                if let Some(time) = time {
                    form.time = parse_hh_mm(&time)?;
                }
            }
            let report = calendar.save_event().await?;
            let notice = report.outcome.notice();
            print_report(notice.unwrap_or("Nothing saved"), report.refresh_error)?;
        }
        Command::Update {
            id,
            title,
            date,
            time,
            description,
        } => {
            calendar.load().await?;
            if !calendar.open_event(EventId::Appointment(id)) {
                anyhow::bail!("Appointment not found: {id}");
            }
            if let Some(form) = calendar.editor_mut().form_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                if let Some(date) = date {
                    form.date = parse_date(&date)?;
                }
                if let Some(time) = time {
                    form.time = parse_hh_mm(&time)?;
                }
            }
            let report = calendar.save_event().await?;
            let notice = report.outcome.notice();
            print_report(notice.unwrap_or("Nothing saved"), report.refresh_error)?;
        }
        Command::Delete { id } => {
            calendar.load().await?;
            if !calendar.open_event(EventId::Appointment(id)) {
                anyhow::bail!("Appointment not found: {id}");
            }
            let report = calendar.delete_event().await?;
            let notice = report.outcome.notice();
            print_report(notice.unwrap_or("Nothing deleted"), report.refresh_error)?;
        }
    }

    Ok(())
}

/// Prints the write's notice, then fails if the reload behind it did.
fn print_report(notice: &str, refresh_error: Option<CalendarError>) -> anyhow::Result<()> {
    println!("{notice}");
    match refresh_error {
        Some(err) => {
            eprintln!("{}: {}", err.user_message(), err.store_error());
            Err(err.into())
        }
        None => Ok(()),
    }
}

fn print_month(grid: &MonthGrid, max_visible: usize) {
    let month = grid.month();
    println!("\n=== {} {} ===", month.month(), month.year());
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in grid.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                let marker = if cell.is_today {
                    '*'
                } else if cell.events.is_empty() {
                    ' '
                } else {
                    '+'
                };
                if cell.is_current_month {
                    format!("{:>3}{}", cell.date.day(), marker)
                } else {
                    format!("  .{}", marker)
                }
            })
            .collect();
        println!("{}", row.join(" "));
    }

    println!();
    for cell in grid.cells().iter().filter(|c| c.is_current_month && !c.events.is_empty()) {
        println!("{} {}:", cell.date.day(), cell.date.month());
        for event in cell.visible_events(max_visible) {
            let time = event.time.map(format_hh_mm).unwrap_or_default();
            println!(
                "  [{:<6}] {:<5} {} ({})",
                event.color.name(),
                time,
                event.title,
                event.id
            );
        }
        let hidden = cell.overflow_count(max_visible);
        if hidden > 0 {
            println!("  +{hidden} more");
        }
    }
}
