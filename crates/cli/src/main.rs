//! Paybank CLI - custodial balance ledger from the command line
//!
//! Usage:
//! ```bash
//! paybank init
//! paybank register --phone 0812000111 --pin 123456 --first-name Alice
//! paybank login --phone 0812000111 --pin 123456
//! paybank topup --token $TOKEN 100
//! paybank pay --token $TOKEN 40 --remarks lunch
//! paybank transfer --token $TOKEN --to <ACCOUNT_ID> 30 --remarks rent
//! paybank history --token $TOKEN
//! ```
//!
//! Every command prints one JSON envelope on stdout; logs go to stderr.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use paybank_core::Profile;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;
mod config;
mod db;
mod output;

use commands::{account, audit, wallet};
use config::AppConfig;

/// Paybank - custodial balance ledger on SQLite
#[derive(Parser)]
#[command(name = "paybank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML config file
    #[arg(long, short, global = true, env = "PAYBANK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database URL, overrides [database].url
    #[arg(long, global = true, env = "PAYBANK_DB")]
    pub db: Option<String>,

    /// Credential signing secret, overrides [auth].secret
    #[arg(long, global = true, env = "PAYBANK_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bearer credential from `login`
#[derive(Args)]
pub struct TokenArg {
    #[arg(long, env = "PAYBANK_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub address: String,
}

impl From<ProfileArgs> for Profile {
    fn from(args: ProfileArgs) -> Self {
        Profile {
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init,

    /// Register a new account
    Register {
        #[arg(long)]
        phone: String,
        /// 4 to 8 digits
        #[arg(long)]
        pin: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Log in and receive access + refresh credentials
    Login {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        pin: String,
    },

    /// Exchange a refresh credential for a new pair
    Refresh {
        /// Refresh credential
        #[arg(long)]
        token: String,
    },

    /// Credit your account
    Topup {
        #[command(flatten)]
        auth: TokenArg,
        amount: Decimal,
    },

    /// Pay a merchant from your account
    Pay {
        #[command(flatten)]
        auth: TokenArg,
        amount: Decimal,
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Transfer to another account
    Transfer {
        #[command(flatten)]
        auth: TokenArg,
        /// Destination account ID
        #[arg(long)]
        to: Uuid,
        amount: Decimal,
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Show your transaction history
    History {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// Update your profile
    Profile {
        #[command(flatten)]
        auth: TokenArg,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Show your current balance
    Balance {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// Check the ledger chain of your account
    Verify {
        #[command(flatten)]
        auth: TokenArg,
    },

    /// Show database status
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => return report(Err(err)),
    };
    init_logging(&config.log_level);
    if let Err(err) = config.validate() {
        return report(Err(err.into()));
    }

    report(run(cli.command, &config).await)
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(cli.db.clone(), cli.token_secret.clone());
    Ok(config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Print the envelope and pick the exit code
fn report(outcome: Result<Value>) -> ExitCode {
    let (envelope, code) = match outcome.and_then(|value| Ok(output::success(&value)?)) {
        Ok(envelope) => (envelope, ExitCode::SUCCESS),
        Err(err) => (output::failure(&err), ExitCode::FAILURE),
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{envelope}"),
    }
    code
}

async fn run(command: Commands, config: &AppConfig) -> Result<Value> {
    let ctx = db::open(config).await?;

    let result = match command {
        Commands::Init => Ok(serde_json::json!({ "database": config.database.url })),

        Commands::Register {
            phone,
            pin,
            profile,
        } => account::register(&ctx, &phone, &pin, profile.into()).await,

        Commands::Login { phone, pin } => account::login(&ctx, &phone, &pin).await,

        Commands::Refresh { token } => account::refresh(&ctx, &token).await,

        Commands::Topup { auth, amount } => wallet::top_up(&ctx, &auth.token, amount).await,

        Commands::Pay {
            auth,
            amount,
            remarks,
        } => wallet::pay(&ctx, &auth.token, amount, &remarks).await,

        Commands::Transfer {
            auth,
            to,
            amount,
            remarks,
        } => wallet::transfer(&ctx, &auth.token, to, amount, &remarks).await,

        Commands::History { auth } => audit::history(&ctx, &auth.token).await,

        Commands::Profile { auth, profile } => {
            account::update_profile(&ctx, &auth.token, profile.into()).await
        }

        Commands::Balance { auth } => account::balance(&ctx, &auth.token).await,

        Commands::Verify { auth } => audit::verify(&ctx, &auth.token).await,

        Commands::Status => audit::status(&ctx, config).await,
    };

    ctx.db().close().await;
    result
}
