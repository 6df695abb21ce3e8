//! Command-line interface for the marketplace session client.
//!
//! Every command restores the saved session cookie, resolves the current
//! identity, runs, and saves the cookie again:
//! - `status` - Who is logged in, plus the trial banner for companies
//! - `login` / `register` / `logout` - Session lifecycle
//! - `trial` - Refresh and show the trial snapshot
//! - `profile <id>` - Open an influencer profile through the trial gate
//! - `guard <path>` - Check whether the session may stay on a route
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, HttpTransport};
use crate::config::Config;
use crate::models::{RegisterRequest, UserRole};
use crate::navigation::{MemoryNavigator, RouteDecision};
use crate::profiles::{ProfileView, ProfileViewer};
use crate::session::{SessionError, SessionManager, SessionSnapshot};
use crate::trial::{can_view, TrialSummary};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "marketlink")]
#[command(author, version, long_about = None)]
#[command(about = "Session and trial-gate client for the influencer marketplace")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "marketlink.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (overrides the config file)
    #[arg(long, env = "MARKETLINK_API_URL")]
    pub api_url: Option<String>,

    /// Route the session is currently on, used for redirect decisions
    #[arg(long, default_value = "/")]
    pub path: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the logged-in user and trial state
    Status,

    /// Log in with email and password
    Login {
        email: String,
        /// Password (can also be set via MARKETLINK_PASSWORD env var)
        #[arg(long, env = "MARKETLINK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in with it
    Register {
        email: String,
        #[arg(long, env = "MARKETLINK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Full name or company name
        #[arg(long)]
        name: String,
        /// company, influencer or admin
        #[arg(long, default_value = "company")]
        role: UserRole,
    },

    /// End the session
    Logout,

    /// Refresh and show the trial status
    Trial,

    /// Open an influencer profile
    Profile {
        /// Profile ID
        id: i64,
    },

    /// Check whether the session may stay on a route
    Guard {
        /// Route path, e.g. /empresa/dashboard
        path: String,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// A resolved session wired to the real backend.
struct Connection {
    session: Arc<SessionManager>,
    transport: Arc<HttpTransport>,
    navigator: Arc<MemoryNavigator>,
    cookie_file: PathBuf,
}

impl Connection {
    async fn open(cli: &Cli, config: &Config) -> Result<Self> {
        let mut api = config.api.clone();
        if let Some(url) = &cli.api_url {
            api.base_url = url.clone();
        }

        let transport = Arc::new(HttpTransport::new(&api)?);
        let cookie_file = config.session.cookie_file.clone();
        transport.restore_cookies(&cookie_file)?;

        let navigator = Arc::new(MemoryNavigator::new(cli.path.clone()));
        let client = ApiClient::new(transport.clone(), navigator.clone(), &config.routes.login)
            .with_refresh_timeout(Duration::from_secs(api.refresh_timeout));
        let session = Arc::new(SessionManager::new(
            Arc::new(client),
            config.routes.clone(),
        ));

        session.initialize().await;

        Ok(Self {
            session,
            transport,
            navigator,
            cookie_file,
        })
    }

    /// Persist cookies and report the navigations the session issued.
    fn close(self) -> Result<()> {
        self.transport.persist_cookies(&self.cookie_file)?;
        for path in self.navigator.history() {
            println!("-> navigate to {}", path);
        }
        Ok(())
    }
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    let conn = Connection::open(cli, config).await?;
    let result = match &cli.command {
        Commands::Status => {
            print_snapshot(&conn.session.snapshot());
            Ok(())
        }
        Commands::Login { email, password } => cmd_login(&conn, email, password).await,
        Commands::Register {
            email,
            password,
            name,
            role,
        } => {
            let registration = RegisterRequest {
                email: email.clone(),
                password: password.clone(),
                full_name: name.clone(),
                role: *role,
            };
            cmd_register(&conn, registration).await
        }
        Commands::Logout => {
            conn.session.logout().await;
            println!("Logged out.");
            Ok(())
        }
        Commands::Trial => cmd_trial(&conn).await,
        Commands::Profile { id } => cmd_profile(&conn, *id).await,
        Commands::Guard { path } => {
            cmd_guard(&conn, path);
            Ok(())
        }
        Commands::Config(_) => Ok(()),
    };

    // save whatever the server set even when the command failed
    conn.close()?;
    result
}

async fn cmd_login(conn: &Connection, email: &str, password: &str) -> Result<()> {
    match conn.session.login(email, password).await {
        Ok(user) => {
            println!("Logged in as {} ({})", user.email, user.role);
            print_snapshot(&conn.session.snapshot());
            Ok(())
        }
        Err(err) => Err(explain_denial(conn, err)),
    }
}

async fn cmd_register(conn: &Connection, registration: RegisterRequest) -> Result<()> {
    println!("Registering {} as {}...", registration.email, registration.role);
    match conn.session.register(registration).await {
        Ok(user) => {
            println!("Account created. Logged in as {} ({})", user.email, user.role);
            print_snapshot(&conn.session.snapshot());
            Ok(())
        }
        Err(err) => Err(explain_denial(conn, err)),
    }
}

fn explain_denial(conn: &Connection, err: SessionError) -> anyhow::Error {
    use crate::api::LoginDenial;

    let message = match conn.session.route_login_denial(&err) {
        LoginDenial::InvalidCredentials => "Incorrect email or password".to_string(),
        LoginDenial::PendingApproval => {
            "Account is pending approval by an administrator".to_string()
        }
        LoginDenial::Inactive(detail) => format!("Account is inactive: {}", detail),
        LoginDenial::Other => return anyhow::Error::new(err).context("Login failed"),
    };
    anyhow::anyhow!(message)
}

async fn cmd_trial(conn: &Connection) -> Result<()> {
    let session = &conn.session;
    if !session.is_authenticated() {
        anyhow::bail!("Not logged in");
    }
    session.refresh_trial_status().await;

    let snapshot = session.snapshot();
    match &snapshot.trial_status {
        Some(status) => {
            println!();
            println!("=== Trial Status ===");
            println!();
            println!("{}", TrialSummary::from_status(status));
            println!();
            println!("Has trial:        {}", yes_no(status.has_trial));
            println!("Active:           {}", yes_no(status.is_active));
            println!("Subscription:     {}", yes_no(status.has_subscription));
            if let Some(end) = status.trial_end {
                println!("Ends:             {}", end.format("%Y-%m-%d %H:%M UTC"));
            }
            println!("Free view used:   {}", yes_no(status.has_viewed_free_profile));
            if let Some(id) = status.viewed_profile_id {
                println!("Viewed profile:   #{}", id);
            }
            println!("Can view more:    {}", yes_no(status.can_view_more_profiles));
            let decision = can_view(Some(status), 0);
            println!("Gate:             {}", decision.reason.as_str());
            println!();
        }
        None => println!("No trial applies to this account."),
    }
    Ok(())
}

async fn cmd_profile(conn: &Connection, id: i64) -> Result<()> {
    if !conn.session.is_authenticated() {
        anyhow::bail!("Not logged in");
    }

    let viewer = ProfileViewer::new(conn.session.clone());
    let view = viewer
        .view(id)
        .await
        .with_context(|| format!("Failed to open profile {}", id))?;

    match view {
        ProfileView::Granted(profile) => {
            println!();
            println!("=== Profile: {} ===", profile.display_handle());
            println!();
            println!("ID:          {}", profile.id);
            if let Some(bio) = &profile.bio {
                println!("Bio:         {}", bio);
            }
            print_channel(
                "Instagram",
                profile.instagram_handle.as_deref(),
                profile.instagram_followers,
            );
            print_channel("TikTok", profile.tiktok_handle.as_deref(), profile.tiktok_followers);
            print_channel(
                "YouTube",
                profile.youtube_handle.as_deref(),
                profile.youtube_subscribers,
            );
            if let Some(rate) = profile.average_engagement_rate {
                println!("Engagement:  {:.2}%", rate);
            }
            if let Some(price) = profile.suggested_rate_per_post {
                println!("Rate/post:   {:.2}", price);
            }
            println!("Campaigns:   {}", profile.total_campaigns_completed);
            println!();
        }
        ProfileView::Paywall(notice) => {
            println!("[!!] {}", notice);
        }
    }
    Ok(())
}

fn cmd_guard(conn: &Connection, path: &str) {
    match conn.session.guard(path) {
        RouteDecision::Wait => println!("WAIT: identity still loading"),
        RouteDecision::RedirectToLogin => {
            println!("REDIRECT {} (not logged in)", conn.session.routes().login)
        }
        RouteDecision::Redirect(target) => println!("REDIRECT {} (not your area)", target),
        RouteDecision::Allow => println!("ALLOW {}", path),
    }
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Built-in defaults will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:        {}", config.api.base_url);
            println!("  Request Timeout: {}s", config.api.request_timeout);
            println!("  Refresh Timeout: {}s", config.api.refresh_timeout);
            println!();
            println!("Routes:");
            println!("  Login:           {}", config.routes.login);
            println!("  Pending:         {}", config.routes.pending_approval);
            println!("  Company:         {}", config.routes.company_dashboard);
            println!("  Influencer:      {}", config.routes.influencer_dashboard);
            println!("  Admin:           {}", config.routes.admin_dashboard);
            println!("  Subscribe:       {}", config.routes.subscribe);
            println!();
            println!("Session:");
            println!("  Cookie File:     {}", config.session.cookie_file.display());
            println!();
            println!("Logging:");
            println!("  Level:           {}", config.logging.level);
            println!();
            Ok(())
        }
        Err(e) => {
            println!("[FAIL] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            Err(e)
        }
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    let Some(user) = &snapshot.user else {
        println!("Not logged in.");
        return;
    };

    println!();
    println!("=== Session ===");
    println!();
    println!("User:        {} <{}>", user.full_name, user.email);
    println!("ID:          {}", user.id);
    println!("Role:        {}", user.role);
    println!("Approved:    {}", yes_no(user.is_approved));
    if let Some(status) = &snapshot.trial_status {
        println!("Trial:       {}", TrialSummary::from_status(status));
    }
    println!();
}

fn print_channel(name: &str, handle: Option<&str>, audience: Option<i64>) {
    if let Some(handle) = handle {
        let audience = audience.map(format_count).unwrap_or_else(|| "-".to_string());
        println!("{:<12} @{} ({})", format!("{}:", name), handle, audience);
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Format an audience size in a human-readable way
fn format_count(count: i64) -> String {
    const K: i64 = 1_000;
    const M: i64 = K * 1_000;

    if count >= M {
        format!("{:.1}M", count as f64 / M as f64)
    } else if count >= K {
        format!("{:.1}K", count as f64 / K as f64)
    } else {
        count.to_string()
    }
}
