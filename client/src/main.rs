// Kålgården scheduler - command-line client
// Entry point and logging setup

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use kalgarden_scheduler::app::{self, AppState};
use kalgarden_scheduler::config;
use kalgarden_scheduler::filter::QuickFilter;
use kalgarden_scheduler::models::{DayData, StudentDay, WeekSchedule};
use kalgarden_scheduler::page::{PageState, SchedulePage};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Command-line access to the Kålgården scheduling API.
#[derive(Debug, Parser)]
#[command(name = "kalgarden-scheduler", version, about)]
struct Cli {
    /// Directory holding settings.json. Falls back to `KALGARDEN_DATA_DIR`.
    #[arg(long = "data-dir", value_name = "path", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether the API answers.
    Health,
    /// Log in and store the access token in the OS keyring.
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored access token.
    Logout,
    /// Show the schedule status of a week.
    Week { year: i32, week: u32 },
    /// List one weekday (0 = Monday) of a week.
    Day {
        year: i32,
        week: u32,
        weekday: u8,
        /// Case-insensitive substring of the student name
        #[arg(long)]
        search: Option<String>,
        /// Class name or id
        #[arg(long)]
        class: Option<String>,
        /// all, missing_staff, special_needs or warnings
        #[arg(long, default_value = "all")]
        filter: QuickFilter,
    },
    /// Create an empty schedule for a week.
    CreateWeek {
        year: i32,
        week: u32,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Copy one week's schedule into another week.
    CopyWeek {
        source_year: i32,
        source_week: u32,
        target_year: i32,
        target_week: u32,
    },
    /// Publish a draft week or turn a published week back into a draft.
    TogglePublish {
        year: i32,
        week: u32,
        /// Confirm without asking
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kalgarden_scheduler=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Kålgården scheduler client");

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => app::default_app_data_dir()?,
    };
    let state = AppState::initialize(data_dir)
        .await
        .context("failed to initialize client")?;

    run(cli.command, &state).await
}

async fn run(command: Command, state: &AppState) -> anyhow::Result<()> {
    match command {
        Command::Health => {
            if state.api().check_health().await {
                println!("healthy");
            } else {
                bail!("API at {} is not healthy", state.settings.effective_base_url());
            }
        }
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let response = state.api().auth.login(&email, &password).await?;
            println!(
                "Logged in as {} {} ({:?})",
                response.user.first_name, response.user.last_name, response.user.role
            );
        }
        Command::Logout => {
            state.api().auth.logout()?;
            println!("Logged out");
        }
        Command::Week { year, week } => {
            let mut page = state.schedule_page();
            match page.open_week(year, week).await? {
                PageState::NoWeek => println!("No schedule for {} week {}", year, week),
                _ => {
                    if let Some(schedule) = page.week() {
                        print_week(schedule);
                    }
                }
            }
        }
        Command::Day {
            year,
            week,
            weekday,
            search,
            class,
            filter,
        } => {
            let mut page = state.schedule_page();
            if page.open_week(year, week).await? == PageState::NoWeek {
                bail!("No schedule for {} week {}", year, week);
            }
            page.select_day(weekday).await?;

            if let Some(term) = search {
                page.set_search(&term);
            }
            if let Some(class) = class {
                page.set_class_filter(Some(resolve_class(state, &class).await?));
            }
            page.set_quick_filter(filter);
            print_day(&page);
        }
        Command::CreateWeek { year, week, notes } => {
            let mut page = state.schedule_page();
            page.open_week(year, week).await?;
            if page.week().is_some() {
                bail!("{} week {} already has a schedule", year, week);
            }
            let created = page.create_week(notes).await?;
            print_week(&created);
        }
        Command::CopyWeek {
            source_year,
            source_week,
            target_year,
            target_week,
        } => {
            let mut page = state.schedule_page();
            page.open_week(target_year, target_week).await?;
            let copied = page.copy_week_from(source_year, source_week).await?;
            print_week(&copied);
        }
        Command::TogglePublish { year, week, yes } => {
            let mut page = state.schedule_page();
            if page.open_week(year, week).await? == PageState::NoWeek {
                bail!("No schedule for {} week {}", year, week);
            }
            let action = page.request_toggle_publish()?;
            if !yes && !ask(&action.prompt())? {
                page.cancel();
                println!("Cancelled");
                return Ok(());
            }
            page.confirm().await?;
            if let Some(schedule) = page.week() {
                print_week(schedule);
            }
        }
    }

    Ok(())
}

async fn resolve_class(state: &AppState, raw: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    let classes = state.queries.classes().await?;
    classes
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(raw.trim()))
        .map(|c| c.id)
        .with_context(|| format!("no class named '{}'", raw))
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn ask(question: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", question);
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "j" | "ja"))
}

fn print_week(week: &WeekSchedule) {
    println!(
        "{} week {}: {:?} (id {})",
        week.year, week.week_number, week.status, week.id
    );
    if let Some(notes) = &week.notes {
        println!("  {}", notes);
    }
}

fn print_day(page: &SchedulePage) {
    let Some(day) = page.day() else {
        println!("Day not loaded");
        return;
    };
    let weekday_name = config::WEEKDAY_NAMES
        .get(usize::from(day.weekday))
        .copied()
        .unwrap_or("?");
    let rows = page.visible_rows();
    println!(
        "{}: {} of {} students",
        weekday_name,
        rows.len(),
        day.student_days.len()
    );
    let filter = page.filter();
    if !filter.is_default() {
        println!(
            "Filter: search '{}', class {}, {:?}",
            filter.search_term,
            filter
                .selected_class
                .map(|id| id.to_string())
                .unwrap_or_else(|| "any".to_string()),
            filter.quick_filter
        );
    }
    for row in rows {
        println!("  {}", format_row(row));
    }
    print_warnings(day);
}

fn format_row(row: &StudentDay) -> String {
    format!(
        "{:<28} {:<6} {:>5}-{:<5} FM: {:<20} EM: {}",
        row.student_name.as_deref().unwrap_or("?"),
        row.class_name.as_deref().unwrap_or(""),
        row.arrival_time.as_deref().unwrap_or(""),
        row.departure_time.as_deref().unwrap_or(""),
        row.fm_staff_name.as_deref().unwrap_or("-"),
        row.em_staff_name.as_deref().unwrap_or("-"),
    )
}

fn print_warnings(day: &DayData) {
    if day.warnings.is_empty() {
        return;
    }
    println!("Warnings:");
    for warning in &day.warnings {
        println!("  [{:?}] {}", warning.severity, warning.message);
    }
}
