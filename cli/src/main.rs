//! Carshare CLI
//!
//! Drives the reservation engine against the configured store and prints
//! every result as JSON.
//!
//! ```sh
//! # Dates already taken for vehicle 1
//! carshare blocked-dates 1
//!
//! # Book it as client "juan"
//! carshare book 1 --client juan --start 2024-07-10 --end 2024-07-12
//!
//! # Owner confirms, later completes
//! carshare status 1 confirmed --as ana --role lessor
//!
//! # Validate config without touching the store
//! carshare check
//! ```
//!
//! The acting identity (`--as`, `--role`) is trusted: authentication
//! happens before the engine is called.

use std::error::Error;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use carshare::config::AppConfig;
use carshare::domain::{
    Actor, BookingStatus, Fuel, NewVehicleDto, RegisterClientDto, Transmission, UserRole,
    VehicleFilter, VehicleId,
};
use carshare::{init_tracing, Marketplace};

/// Reservation engine for a peer-to-peer vehicle rental marketplace.
#[derive(Parser, Debug)]
#[command(
    name = "carshare",
    version,
    about = "Reservation and availability engine for peer-to-peer vehicle rentals",
    long_about = "Books vehicles, moves bookings through their lifecycle and records \
                  reviews against a JSON store.\n\n\
                  Default config: ~/.config/carshare/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "CARSHARE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the storage directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and print the effective values.
    Check,

    /// Register a new client account.
    Register {
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        license: Option<String>,
    },

    /// Record an identity verification outcome (admin only).
    Verify {
        user: String,
        /// Mark as not verified instead.
        #[arg(long)]
        revoke: bool,
        #[arg(long = "as")]
        actor: String,
        #[arg(long, default_value = "admin")]
        role: UserRole,
    },

    /// List discoverable vehicles.
    Vehicles {
        /// Viewing user; anonymous when omitted.
        #[arg(long = "as")]
        actor: Option<String>,
        #[arg(long, requires = "actor")]
        role: Option<UserRole>,
        #[arg(long = "type")]
        vehicle_type: Option<String>,
        #[arg(long)]
        max_price: Option<Decimal>,
        #[arg(long)]
        transmission: Option<TransmissionArg>,
        #[arg(long)]
        fuel: Option<FuelArg>,
    },

    /// List a vehicle described by a JSON file.
    AddVehicle {
        file: PathBuf,
        #[arg(long = "as")]
        actor: String,
    },

    /// Dates of a vehicle held by pending or confirmed bookings.
    BlockedDates { vehicle: VehicleId },

    /// Month calendar of a vehicle, as the date picker renders it.
    Calendar {
        vehicle: VehicleId,
        /// Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,
        /// Defaults to the current month.
        #[arg(long)]
        month: Option<u32>,
    },

    /// Request a booking.
    Book {
        vehicle: VehicleId,
        #[arg(long)]
        client: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },

    /// Move a booking to a new status.
    Status {
        booking: u64,
        to: BookingStatus,
        #[arg(long = "as")]
        actor: String,
        #[arg(long)]
        role: UserRole,
    },

    /// Bookings of a client or of an owner's vehicles, newest first.
    Bookings {
        user: String,
        #[arg(long)]
        owner: bool,
    },

    /// Review the other party of a completed booking.
    Review {
        booking: u64,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransmissionArg {
    Automatic,
    Manual,
}

impl From<TransmissionArg> for Transmission {
    fn from(arg: TransmissionArg) -> Self {
        match arg {
            TransmissionArg::Automatic => Transmission::Automatic,
            TransmissionArg::Manual => Transmission::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FuelArg {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
}

impl From<FuelArg> for Fuel {
    fn from(arg: FuelArg) -> Self {
        match arg {
            FuelArg::Gasoline => Fuel::Gasoline,
            FuelArg::Diesel => Fuel::Diesel,
            FuelArg::Electric => Fuel::Electric,
            FuelArg::Hybrid => Fuel::Hybrid,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // ── Load configuration ──────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(carshare::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    // ── Apply CLI overrides ─────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(dir) = cli.data_dir {
        info!("CLI override: data_dir = {}", dir.display());
        config.storage.data_dir = dir;
    }

    // ── Config validation mode ──────────────────────────────────
    if let Command::Check = cli.command {
        println!("Configuration is valid");
        println!("   Config file  : {}", config_path.display());
        println!("   Storage      : {:?}", config.storage.backend);
        println!("   Data dir     : {}", config.storage.data_dir.display());
        println!("   Auto confirm : {}", config.booking.auto_confirm);
        println!("   Log level    : {}", config.logging.level);
        return Ok(());
    }

    let market = Marketplace::open(&config).await?;

    if let Err(e) = run(&market, cli.command).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(market: &Marketplace, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Check => Ok(()),

        Command::Register {
            username,
            name,
            phone,
            license,
        } => {
            let user = market
                .register_client(RegisterClientDto {
                    username,
                    name,
                    phone,
                    license_number: license,
                })
                .await?;
            print_json(&user)
        }

        Command::Verify {
            user,
            revoke,
            actor,
            role,
        } => {
            let actor = Actor::new(actor, role);
            let user = market.set_verification(&actor, &user, !revoke).await?;
            print_json(&user)
        }

        Command::Vehicles {
            actor,
            role,
            vehicle_type,
            max_price,
            transmission,
            fuel,
        } => {
            let viewer = actor.map(|id| Actor::new(id, role.unwrap_or_default()));
            let filter = VehicleFilter {
                vehicle_type,
                max_daily_price: max_price,
                transmission: transmission.map(Into::into),
                fuel: fuel.map(Into::into),
            };
            print_json(&market.list_vehicles(viewer.as_ref(), &filter).await)
        }

        Command::AddVehicle { file, actor } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let dto: NewVehicleDto = serde_json::from_str(&raw)?;
            let vehicle = market
                .add_vehicle(&Actor::new(actor, UserRole::Lessor), dto)
                .await?;
            print_json(&vehicle)
        }

        Command::BlockedDates { vehicle } => print_json(&market.blocked_dates(vehicle).await),

        Command::Calendar {
            vehicle,
            year,
            month,
        } => {
            let today = Utc::now().date_naive();
            let selector = market.selector(vehicle, today).await;
            let grid = selector.month_grid(
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            )?;
            print_json(&grid)
        }

        Command::Book {
            vehicle,
            client,
            start,
            end,
        } => {
            let booking = market.request_booking(vehicle, &client, start, end).await?;
            print_json(&booking)
        }

        Command::Status {
            booking,
            to,
            actor,
            role,
        } => {
            let booking = market
                .update_status(booking, to, &Actor::new(actor, role))
                .await?;
            print_json(&booking)
        }

        Command::Bookings { user, owner } => {
            let bookings = if owner {
                market.bookings_for_owner(&user).await
            } else {
                market.bookings_for_client(&user).await
            };
            print_json(&bookings)
        }

        Command::Review {
            booking,
            reviewer,
            rating,
            comment,
        } => {
            let review = market
                .add_review(booking, &reviewer, rating, &comment)
                .await?;
            print_json(&review)
        }
    }
}
