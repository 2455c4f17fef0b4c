use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{error, info, warn};
use thiserror::Error;
use tokio::runtime;

use guestlist_client::{
    poll, progress_line, reward_progress, AuthError, ClientError, Guestlist, Moderation,
    NewAccount, NewEvent, NewSongRequest, NewVipBooking, RequestStatus, RewardProgress, ScanState,
    SessionState, UserData, VipPackage, POLL_INTERVAL,
};
use guestlist_core::{ApiConfig, ApiError, ApiGateway, QrPayload};
use guestlist_impls::{FilePrefsCache, FileSessionStore, NoBiometrics};

mod logging;

const STATE_DIR_ENV: &str = "GUESTLIST_STATE_DIR";

type App = Guestlist<ApiGateway, FileSessionStore, NoBiometrics, FilePrefsCache>;

#[derive(Parser)]
#[command(name = "guestlist", version, about = "Venue client for the door and the dancefloor")]
struct Cli {
    /// Override the API base url
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email and password
    Login { email: String, password: String },
    /// Create an account
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        marketing: bool,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the logged in user
    Me,
    /// Show loyalty points and reward progress
    Points,
    /// Claim a free-entry reward
    Claim,
    /// Show the free-entry voucher and its door code
    Voucher,
    /// Print the loyalty check-in QR payload
    Qr,
    /// Validate a captured QR payload at the door (staff)
    Scan { payload: String },
    /// Validate a manually entered voucher code at the door (staff)
    Manual { code: String },
    /// Check in by scanning an event QR code
    ScanEvent { code: String },
    /// List song requests, newest first
    Requests {
        /// pending, played or rejected
        #[arg(long)]
        status: Option<String>,
    },
    /// Request a song from the DJ
    RequestSong { title: String, artist: String },
    /// Vote for a pending song request
    Vote { id: String },
    /// Mark a request as played (staff)
    Played { id: String },
    /// Follow pending song requests, refreshing periodically
    Watch,
    /// List upcoming events
    Events,
    /// Show the next event
    NextEvent,
    /// Create an event (staff)
    CreateEvent {
        name: String,
        /// RFC 3339, e.g. 2024-07-15T22:00:00Z
        date: String,
        #[arg(long)]
        venue: Option<String>,
    },
    /// Delete an event (staff)
    DeleteEvent { id: String },
    /// Show the admin dashboard counters (staff)
    Dashboard,
    /// Book a VIP table
    Book {
        event_id: String,
        zone: String,
        /// bronze, silver or gold
        package: String,
        #[arg(long, default_value_t = 4)]
        guests: u32,
    },
    /// List your VIP bookings
    Bookings,
    /// Cancel a VIP booking
    CancelBooking { id: String },
    /// Show notification preferences
    Prefs,
    /// Turn push notifications on or off
    Push {
        #[arg(
            action = clap::ArgAction::Set,
            value_parser = clap::builder::BoolishValueParser::new()
        )]
        enabled: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Gateway(#[from] ApiError),
    #[error("Not logged in. Run `guestlist login` first.")]
    NotLoggedIn,
    #[error("{0}")]
    Usage(String),
    #[error("Signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl CliError {
    fn hint(&self) -> String {
        match self {
            CliError::Gateway(_) => {
                "This is a connection error. Check the API url and your network, then try again."
                    .to_string()
            }
            CliError::NotLoggedIn => "Credentials are only stored after a login.".to_string(),
            _ => "The server rejected the operation; the message above is its reason.".to_string(),
        }
    }
}

fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|home| home.join(".guestlist")))
        .unwrap_or_else(|| PathBuf::from(".guestlist"))
}

fn build_app(api_url: Option<String>) -> Result<App, CliError> {
    let config = ApiConfig { base_url: api_url };
    let gateway = ApiGateway::new(&config)?;

    let dir = state_dir();
    let store = FileSessionStore::new(dir.join("session.json"));
    let cache = FilePrefsCache::new(dir.join("prefs.json"));

    Ok(Guestlist::new(gateway, store, NoBiometrics, cache))
}

/// Restores the session and requires it to end up logged in
async fn require_user(app: &App) -> Result<UserData, CliError> {
    match app.auth.load_user().await? {
        SessionState::LoggedIn { user } => Ok(user),
        SessionState::Locked { .. } => {
            if app.auth.unlock_with_biometrics().await {
                app.auth.current_user().ok_or(CliError::NotLoggedIn)
            } else {
                Err(CliError::NotLoggedIn)
            }
        }
        SessionState::LoggedOut => Err(CliError::NotLoggedIn),
    }
}

fn parse_status(status: &str) -> Result<RequestStatus, CliError> {
    match status {
        "pending" => Ok(RequestStatus::Pending),
        "played" => Ok(RequestStatus::Played),
        "rejected" => Ok(RequestStatus::Rejected),
        other => Err(CliError::Usage(format!("Unknown status: {other}"))),
    }
}

fn parse_package(package: &str) -> Result<VipPackage, CliError> {
    match package {
        "bronze" => Ok(VipPackage::Bronze),
        "silver" => Ok(VipPackage::Silver),
        "gold" => Ok(VipPackage::Gold),
        other => Err(CliError::Usage(format!("Unknown package: {other}"))),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let app = build_app(cli.api_url)?;

    match cli.command {
        Command::Login { email, password } => {
            let user = app.auth.login(&email, &password).await?;
            info!("Logged in as {}", user.name);
        }
        Command::Register {
            name,
            email,
            password,
            phone,
            marketing,
        } => {
            let user = app
                .auth
                .register(NewAccount {
                    name,
                    email,
                    password,
                    phone,
                    accept_marketing: marketing,
                })
                .await?;

            info!("Welcome, {}", user.name);
        }
        Command::Logout => {
            app.auth.logout().await?;
            info!("Logged out");
        }
        Command::Me => {
            let user = require_user(&app).await?;
            println!("{} <{}>", user.name, user.email);

            if user.is_admin() {
                println!("{}", "admin".bright_yellow());
            }
        }
        Command::Points => {
            require_user(&app).await?;

            let data = app.loyalty.fetch().await?;
            let voucher = app.loyalty.existing_voucher().await?;

            println!("{} points, {} check-ins", data.points, data.check_ins_count);

            match reward_progress(&data, voucher.as_ref()) {
                RewardProgress::Accruing { .. } => println!("{}", progress_line(&data)),
                RewardProgress::Ready => println!("Free entry is ready to claim!"),
                RewardProgress::Claimed(voucher) => {
                    println!("Voucher {} is waiting at the door", voucher.code)
                }
                RewardProgress::Consumed => println!("{}", progress_line(&data)),
            }
        }
        Command::Claim => {
            require_user(&app).await?;

            let voucher = app.loyalty.claim_reward().await?;
            println!("Claimed! Your door code is {}", voucher.code.bold());
        }
        Command::Voucher => {
            let user = require_user(&app).await?;

            let voucher = app
                .loyalty
                .existing_voucher()
                .await?
                .ok_or_else(|| CliError::Usage("No unused voucher. Claim one first.".to_string()))?;

            println!("Code: {}", voucher.code.bold());

            if let Some(payload) = guestlist_client::entry_qr(&voucher, &user.id) {
                println!("{}", payload.encode());
            }
        }
        Command::Qr => {
            let user = require_user(&app).await?;
            println!("{}", QrPayload::checkin(&user.id).encode());
        }
        Command::Scan { payload } => {
            require_user(&app).await?;

            app.scanner.arm();
            report_scan(app.scanner.handle_scan(&payload).await);
        }
        Command::Manual { code } => {
            require_user(&app).await?;

            app.scanner.arm();
            report_scan(app.scanner.submit_manual(&code).await);
        }
        Command::ScanEvent { code } => {
            require_user(&app).await?;

            let scan = app.loyalty.scan_event_code(&code).await?;
            println!(
                "+{} points at {}. You now have {}.",
                scan.points_earned, scan.event_name, scan.total_points
            );
        }
        Command::Requests { status } => {
            require_user(&app).await?;

            let status = status.as_deref().map(parse_status).transpose()?;
            let requests = app.dj.list(status).await?;

            for request in requests {
                println!(
                    "[{}] {} - {} ({} votes)",
                    request.status.as_str(),
                    request.song_title,
                    request.artist_name,
                    request.votes
                );
            }
        }
        Command::RequestSong { title, artist } => {
            let user = require_user(&app).await?;

            let ack = app
                .dj
                .request(NewSongRequest {
                    song_title: title,
                    artist_name: artist,
                    user_name: Some(user.name),
                    location: None,
                })
                .await?;

            println!("{}", ack.message);
        }
        Command::Vote { id } => {
            require_user(&app).await?;
            app.dj.vote(&id).await?;
            println!("Voted");
        }
        Command::Played { id } => {
            require_user(&app).await?;
            app.dj.moderate(&id, Moderation::Played).await?;
            println!("Marked as played");
        }
        Command::Watch => {
            require_user(&app).await?;

            let dj = Arc::new(app.dj);
            let handle = poll(POLL_INTERVAL, move || {
                let dj = dj.clone();

                async move {
                    match dj.list(Some(RequestStatus::Pending)).await {
                        Ok(requests) => {
                            println!("-- {} pending --", requests.len());

                            for request in requests {
                                println!(
                                    "{} - {} ({} votes)",
                                    request.song_title, request.artist_name, request.votes
                                );
                            }
                        }
                        Err(e) => warn!("Could not refresh requests: {e}"),
                    }
                }
            });

            tokio::signal::ctrl_c().await?;
            handle.stop();
        }
        Command::Events => {
            let events = app.events.list(None).await?;

            for event in events {
                println!(
                    "{} at {} ({})",
                    event.name,
                    event.venue_name,
                    event.event_date.format("%Y-%m-%d")
                );
            }
        }
        Command::CreateEvent { name, date, venue } => {
            require_user(&app).await?;

            let event_date: DateTime<Utc> = date
                .parse()
                .map_err(|_| CliError::Usage(format!("Invalid date: {date}")))?;

            let created = app
                .content
                .create(NewEvent {
                    name,
                    event_date,
                    description: None,
                    venue_name: venue,
                    venue_address: None,
                })
                .await?;

            println!("{}", created.message);
        }
        Command::DeleteEvent { id } => {
            require_user(&app).await?;
            app.content.delete(&id).await?;
            println!("Deleted");
        }
        Command::Dashboard => {
            require_user(&app).await?;

            let dashboard = app.content.dashboard().await?;
            println!(
                "{} users, {} pending requests",
                dashboard.stats.total_users, dashboard.stats.pending_requests
            );
        }
        Command::NextEvent => {
            let event = app.events.next().await?;
            println!("{} at {}", event.name.bold(), event.venue_name);

            for entry in event.lineup {
                println!("  {}", entry.name);
            }
        }
        Command::Book {
            event_id,
            zone,
            package,
            guests,
        } => {
            let user = require_user(&app).await?;
            let package = parse_package(&package)?;

            let ack = app
                .vip
                .book(NewVipBooking {
                    event_id,
                    zone,
                    package,
                    guest_count: guests,
                    bottle_preferences: None,
                    special_requests: None,
                    customer_name: user.name,
                    customer_email: user.email,
                    customer_phone: None,
                })
                .await?;

            println!("{}", ack.message);
        }
        Command::Bookings => {
            require_user(&app).await?;

            for booking in app.vip.my_bookings().await? {
                println!(
                    "[{}] {} zone, {} package, {} guests",
                    booking.status.as_str(),
                    booking.zone,
                    booking.package.as_str(),
                    booking.guest_count
                );
            }
        }
        Command::CancelBooking { id } => {
            require_user(&app).await?;
            app.vip.cancel(&id).await?;
            println!("Cancelled");
        }
        Command::Prefs => {
            require_user(&app).await?;

            let prefs = app.prefs.fetch().await;
            let line = |name: &str, on: bool| {
                let state = if on { "on".green() } else { "off".red() };
                println!("{name}: {state}");
            };

            line("push", prefs.push_enabled);
            line("new events", prefs.new_events);
            line("event reminders", prefs.event_reminders);
            line("promotions", prefs.promotions);
            line("loyalty updates", prefs.loyalty_updates);
            line("dj updates", prefs.dj_updates);
            line("newsletter", prefs.newsletter_email);
        }
        Command::Push { enabled } => {
            require_user(&app).await?;
            app.prefs.toggle_push(enabled).await?;
            info!("Push notifications {}", if enabled { "on" } else { "off" });
        }
    }

    Ok(())
}

fn report_scan(state: ScanState) {
    match state {
        ScanState::Done(outcome) => println!("{}", outcome.summary()),
        other => println!("{other:?}"),
    }
}

fn main() {
    logging::init_logger();

    let cli = Cli::parse();

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("guestlist-async")
        .build()
        .expect("runtime is built");

    if let Err(error) = runtime.block_on(run(cli)) {
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).bright_black().italic());
        std::process::exit(1);
    }
}
