use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use medrx_authn::{Argon2PasswordEncoder, PasswordEncoder};

mod app;
mod config;
mod logging;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// medrx prescription API server
#[derive(Parser)]
#[command(name = "medrx-server", version, about)]
struct Cli {
    /// YAML configuration file; `MEDRX__*` environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Validate the configuration and exit
    CheckConfig,
    /// Print an Argon2 PHC hash for an identity's `password_hash`
    HashPassword {
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

fn read_password_line() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::HashPassword { password } => {
            let raw = match password {
                Some(p) => p,
                None => read_password_line()?,
            };
            anyhow::ensure!(!raw.is_empty(), "password must not be empty");
            let hash = Argon2PasswordEncoder::default().encode(&raw)?;
            println!("{hash}");
            Ok(())
        }
        Command::CheckConfig => {
            let cfg = config::load(cli.config.as_deref())?;
            logging::init(&cfg.logging)?;
            app::check(&cfg)?;
            println!("configuration OK");
            Ok(())
        }
        Command::Serve => {
            let cfg = config::load(cli.config.as_deref())?;
            logging::init(&cfg.logging)?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                bind_addr = %cfg.api_gateway.bind_addr,
                "starting medrx-server"
            );
            app::run(cfg).await
        }
    }
}
