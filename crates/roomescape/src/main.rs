//! `roomescape` - CLI for the escape-room reservation backend
//!
//! This binary runs the HTTP API and manages the reservation database from
//! the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use roomescape::cli::{
    Cli, Command, ConfigCommand, MemberCommand, ReservationCommand, ServeCommand, ThemeCommand,
    TimeCommand,
};
use roomescape::domain::{MemberView, TIME_FORMAT};
use roomescape::service::{MemberRequest, ReservationRequest, ThemeRequest, TimeRequest};
use roomescape::storage::seed;
use roomescape::{api, init_logging, AppState, Config, Database, Reservation, Theme};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // These must work even when the configuration itself is broken
    if let Command::Config(ConfigCommand::Path) = cli.command {
        println!(
            "{}",
            cli.config
                .unwrap_or_else(Config::default_config_path)
                .display()
        );
        return Ok(());
    }
    if let Command::Config(ConfigCommand::Validate { file }) = cli.command {
        return handle_validate(file.or(cli.config));
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Seed => handle_seed(&config),
        Command::Time(cmd) => handle_time(&state(&config)?, cmd),
        Command::Theme(cmd) => handle_theme(&state(&config)?, cmd),
        Command::Member(cmd) => handle_member(&state(&config)?, cmd),
        Command::Reservation(cmd) => handle_reservation(&state(&config)?, &cmd),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path();
    Database::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

fn state(config: &Config) -> anyhow::Result<AppState> {
    Ok(AppState::new(&open_database(config)?, &config.reservation))
}

fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;
    let addr = config.bind_addr()?;
    let state = state(&config)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(api::serve(state, addr))?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let db = open_database(config)?;
    let stats = db.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": db.path(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("roomescape status");
        println!("-----------------");
        println!("Database:      {}", db.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Members:       {}", stats.members);
        println!("Themes:        {}", stats.themes);
        println!("Time slots:    {}", stats.reservation_times);
        println!("Reservations:  {}", stats.reservations);
    }
    Ok(())
}

fn handle_seed(config: &Config) -> anyhow::Result<()> {
    let db = open_database(config)?;
    if seed::seed_demo_data(&db, Local::now().date_naive())? {
        println!("Demo data inserted into {}", db.path().display());
    } else {
        println!("Database already holds data; nothing inserted.");
    }
    Ok(())
}

fn handle_time(state: &AppState, cmd: TimeCommand) -> anyhow::Result<()> {
    match cmd {
        TimeCommand::List => {
            for time in state.times.find_all_reservation_times()? {
                println!(
                    "{:>4}  {}",
                    time.id.unwrap_or_default(),
                    time.start_at.format(TIME_FORMAT)
                );
            }
        }
        TimeCommand::Add { start_at } => {
            let saved = state.times.add_reservation_time(TimeRequest::new(start_at))?;
            println!(
                "Added time slot {} at {}",
                saved.id.unwrap_or_default(),
                saved.start_at.format(TIME_FORMAT)
            );
        }
        TimeCommand::Remove { id } => {
            state.times.remove_reservation_time(id)?;
            println!("Removed time slot {id}");
        }
    }
    Ok(())
}

fn print_themes(themes: &[Theme]) {
    for theme in themes {
        println!("{:>4}  {}  {}", theme.id.unwrap_or_default(), theme.name, theme.description);
    }
}

fn handle_theme(state: &AppState, cmd: ThemeCommand) -> anyhow::Result<()> {
    match cmd {
        ThemeCommand::List => print_themes(&state.themes.find_all_themes()?),
        ThemeCommand::Add {
            name,
            description,
            thumbnail,
        } => {
            let saved = state
                .themes
                .add_theme(ThemeRequest::new(name, description, thumbnail))?;
            println!("Added theme {} '{}'", saved.id.unwrap_or_default(), saved.name);
        }
        ThemeCommand::Remove { id } => {
            state.themes.remove_theme(id)?;
            println!("Removed theme {id}");
        }
        ThemeCommand::Popular => {
            print_themes(&state.themes.find_popular_themes(Local::now().date_naive())?);
        }
    }
    Ok(())
}

fn handle_member(state: &AppState, cmd: MemberCommand) -> anyhow::Result<()> {
    match cmd {
        MemberCommand::List => {
            for member in state.members.find_all_members()? {
                let view = MemberView::from(&member);
                println!(
                    "{:>4}  {}  <{}>  {}",
                    view.id.unwrap_or_default(),
                    view.name,
                    view.email,
                    member.role
                );
            }
        }
        MemberCommand::Add {
            name,
            email,
            password,
        } => {
            let saved = state
                .members
                .add_member(MemberRequest::new(name, email, password))?;
            println!("Registered member {} <{}>", saved.id.unwrap_or_default(), saved.email);
        }
    }
    Ok(())
}

fn print_reservation(reservation: &Reservation) {
    println!(
        "{:>4}  {}  {}  {:<20}  {}",
        reservation.id.unwrap_or_default(),
        reservation.date,
        reservation.time.start_at.format(TIME_FORMAT),
        reservation.theme.name,
        reservation.member.name
    );
}

fn handle_reservation(state: &AppState, cmd: &ReservationCommand) -> anyhow::Result<()> {
    if let Some(filter) = cmd.filter() {
        for reservation in state.reservations.find_reservations_by_filters(&filter)? {
            print_reservation(&reservation);
        }
        return Ok(());
    }

    match *cmd {
        ReservationCommand::Add {
            member_id,
            date,
            time_id,
            theme_id,
        } => {
            let request = ReservationRequest {
                member_id,
                date,
                time_id,
                theme_id,
            };
            let saved = state
                .reservations
                .add_reservation(request, Local::now().naive_local())?;
            print!("Booked ");
            print_reservation(&saved);
        }
        ReservationCommand::Remove { id } => {
            state.reservations.remove_reservation(id)?;
            println!("Removed reservation {id}");
        }
        ReservationCommand::List { .. } => {}
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!();
                println!("[Reservation]");
                println!(
                    "  Popular period:     {} days",
                    config.reservation.popular_period_days
                );
                println!("  Popular limit:      {}", config.reservation.popular_limit);
            }
        }
        ConfigCommand::Path | ConfigCommand::Validate { .. } => {}
    }
    Ok(())
}
