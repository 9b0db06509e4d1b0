// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! DriverXP command line client.
//!
//! Keeps a session in the storage directory between invocations, so
//! `driverxp login` followed by `driverxp bookings list` behaves like the
//! web front-end after a page reload.

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use driverxp_client::{
    bookings::{self as views, BookingFilter, BookingStats, InstructorAgenda},
    config::Config,
    models::{
        AnalyticsQuery, BookingFormData, CarQuery, PasswordChange, PasswordReset, RegisterData,
        Role, UserChanges, UserQuery,
    },
    storage::FileStorage,
    time_utils, AppState,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "driverxp", about = "DriverXP driving school client")]
struct Cli {
    /// Override the API base URL
    #[arg(long, env = "DRIVERXP_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DRIVERXP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a student (or instructor) account and sign in
    Register(RegisterArgs),
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Reload the profile from the server first
        #[arg(long)]
        refresh: bool,
    },
    /// Update the signed-in user's profile
    Profile(ProfileArgs),
    ChangePassword {
        #[arg(long, env = "DRIVERXP_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long)]
        new: String,
    },
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    Bookings(BookingsCommand),
    /// List cars
    Cars {
        /// Only cars that can be booked now
        #[arg(long)]
        available: bool,
        #[arg(long)]
        search: Option<String>,
    },
    /// List active instructors
    Instructors,
    /// List users (admin)
    Users {
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Booking analytics (admin)
    Analytics {
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, env = "DRIVERXP_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    role: Option<Role>,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args, Debug)]
struct BookingsCommand {
    #[command(subcommand)]
    command: BookingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BookingsSubcommand {
    /// List my bookings, newest first
    List {
        #[arg(long, default_value = "all")]
        filter: BookingFilter,
        #[arg(long, default_value = "")]
        search: String,
    },
    Show {
        id: String,
    },
    /// Book a lesson (end time defaults to start + 2 hours)
    Book {
        #[arg(long)]
        instructor: String,
        /// Lesson date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Start time, HH:MM
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        car: Option<String>,
        #[arg(long)]
        pickup: Option<String>,
    },
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Instructor dashboard
    Agenda,
    /// Next lessons (student dashboard)
    Next,
    /// Calendar events for the signed-in user's role
    Calendar,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.api_url, storage = %config.storage_dir.display(), "Starting DriverXP client");

    let storage = FileStorage::open(&config.storage_dir)?;
    let state = AppState::new(config, Arc::new(storage))?;
    state.session.init();

    let result = run(&state, cli.command).await;
    state.session.dispose();

    if let Err(e) = &result {
        if let Some(client_error) = e.downcast_ref::<driverxp_client::error::ClientError>() {
            eprintln!("{}", client_error.user_message());
            std::process::exit(1);
        }
    }
    result
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    let now = Local::now().naive_local();
    let today = now.date();

    match command {
        Command::Login { email, password } => {
            let user = state.session.login(&email, &password).await?;
            println!("Signed in as {} ({})", user.full_name(), user.role.as_str());
        }
        Command::Register(args) => {
            let data = RegisterData {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                phone: args.phone,
                password: args.password,
                role: args.role,
                ..Default::default()
            };
            let user = state.session.register(&data).await?;
            println!("Welcome, {}!", user.first_name);
        }
        Command::Logout => {
            state.session.logout();
            println!("Signed out");
        }
        Command::Whoami { refresh } => {
            let user = if refresh {
                Some(state.session.refresh_profile().await?)
            } else {
                state.session.current_user()
            };
            match user {
                Some(user) => print_json(&user)?,
                None => println!("Not signed in"),
            }
        }
        Command::Profile(args) => {
            let changes = UserChanges {
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                address: args.address,
                ..Default::default()
            };
            let user = state.session.save_profile(&changes).await?;
            print_json(&user)?;
        }
        Command::ChangePassword { current, new } => {
            state
                .users
                .change_password(&PasswordChange {
                    current_password: current,
                    new_password: new,
                })
                .await?;
            println!("Password changed");
        }
        Command::ForgotPassword { email } => {
            let message = state.auth.forgot_password(&email).await?;
            println!("{}", message.unwrap_or_else(|| "Check your email".to_string()));
        }
        Command::ResetPassword { token, password } => {
            let message = state
                .auth
                .reset_password(&token, &PasswordReset { password })
                .await?;
            println!("{}", message.unwrap_or_else(|| "Password reset".to_string()));
        }
        Command::Bookings(cmd) => run_bookings(state, cmd.command, now).await?,
        Command::Cars { available, search } => {
            let cars = if available {
                state.cars.available().await?
            } else {
                let query = CarQuery {
                    search,
                    ..Default::default()
                };
                state.cars.list(&query).await?
            };
            for car in cars {
                println!("{}\t{}\t{:?}", car.id, car.describe(), car.status);
            }
        }
        Command::Instructors => {
            for instructor in state.users.instructors().await? {
                println!("{}\t{}\t{}", instructor.id, instructor.full_name(), instructor.email);
            }
        }
        Command::Users { role, search } => {
            let query = UserQuery {
                role,
                search,
                ..Default::default()
            };
            for user in state.users.list(&query).await? {
                println!("{}\t{}\t{}\t{}", user.id, user.full_name(), user.email, user.role.as_str());
            }
        }
        Command::Analytics { start, end } => {
            let report = state
                .bookings
                .analytics(&AnalyticsQuery {
                    start_date: start,
                    end_date: end,
                })
                .await?;
            print_json(&report)?;
            if let Some((hour, count)) = report.busiest_hour() {
                println!("Busiest hour: {}:00 ({} lessons)", hour, count);
            }
        }
    }

    tracing::debug!(today = %today, "Command finished");
    Ok(())
}

async fn run_bookings(
    state: &AppState,
    command: BookingsSubcommand,
    now: chrono::NaiveDateTime,
) -> anyhow::Result<()> {
    let today = now.date();

    match command {
        BookingsSubcommand::List { filter, search } => {
            let bookings = state.bookings.my_bookings().await?;
            let stats = BookingStats::from_bookings(&bookings, today);
            println!(
                "{} total, {} upcoming, {} completed, {} cancelled",
                stats.total, stats.upcoming, stats.completed, stats.cancelled
            );
            for booking in views::select_bookings(&bookings, filter, &search, today) {
                println!(
                    "{}\t{} {}\t{}\t{}",
                    booking.id,
                    booking.lesson_date,
                    time_utils::format_time_12h(&booking.start_time).unwrap_or(booking.start_time.clone()),
                    booking.lesson_type.label(),
                    booking.status.label()
                );
            }
        }
        BookingsSubcommand::Show { id } => {
            print_json(&state.bookings.get(&id).await?)?;
        }
        BookingsSubcommand::Book {
            instructor,
            date,
            start,
            end,
            car,
            pickup,
        } => {
            let lesson_date = time_utils::parse_lesson_date(&date)
                .with_context(|| format!("Invalid lesson date: {}", date))?;
            let mut form = BookingFormData::with_default_end(instructor, lesson_date, &start)
                .with_context(|| format!("Invalid start time: {}", start))?;
            if let Some(end) = end {
                form.end_time = end;
            }
            form.car_id = car;
            form.pickup_location = pickup.map(driverxp_client::models::Location::Address);

            let booking = state.bookings.create(&form).await?;
            println!("Booked lesson {} on {}", booking.id, booking.lesson_date);
        }
        BookingsSubcommand::Cancel { id, reason } => {
            let booking = state.bookings.cancel(&id, reason.as_deref()).await?;
            println!("Lesson {} is now {}", booking.id, booking.status.label());
        }
        BookingsSubcommand::Agenda => {
            let bookings = state.bookings.my_bookings().await?;
            let agenda = InstructorAgenda::build(&bookings, now);
            println!(
                "{} today, {} this week, {} completed, {} need attention",
                agenda.today.len(),
                agenda.this_week,
                agenda.total_completed,
                agenda.needs_attention.len()
            );
            for booking in agenda.today.iter().chain(agenda.upcoming.iter().take(5)) {
                println!("{}\t{} {}", booking.id, booking.lesson_date, booking.start_time);
            }
        }
        BookingsSubcommand::Next => {
            let bookings = state.bookings.my_bookings().await?;
            for booking in views::next_lessons(&bookings, today) {
                println!(
                    "{}\t{} {}\t{}",
                    booking.id,
                    booking.lesson_date,
                    booking.start_time,
                    booking.lesson_type.label()
                );
            }
        }
        BookingsSubcommand::Calendar => {
            let role = state
                .session
                .current_user()
                .map(|u| u.role)
                .unwrap_or_default();
            let bookings = state.bookings.my_bookings().await?;
            for event in views::calendar_events(&bookings, role) {
                println!("{}\t{}\t{}\t{}", event.start, event.end, event.color, event.title);
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging to stderr. JSON when `DRIVERXP_LOG_FORMAT=json`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("driverxp_client=debug,info"));
    let json = std::env::var("DRIVERXP_LOG_FORMAT").as_deref() == Ok("json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
