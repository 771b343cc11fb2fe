//! ttyrelay: entry point.
//!
//! Connects the local terminal to the BBS text session over a WebSocket.
//! Typed bytes are relayed to the server in raw mode; server output is
//! written to stdout untouched.  An interrupt (SIGINT from outside the
//! terminal) or the end of local input closes the session gracefully.
//!
//! # Usage
//!
//! ```text
//! ttyrelay [OPTIONS]
//!
//! Options:
//!   --addr <HOST>               BBS host [default: bbs-server.mattiselin.repl.co]
//!   --path <PATH>               WebSocket path [default: /ws]
//!   --plaintext                 Use ws:// instead of wss://
//!   --psk <KEY>                 Pre-shared key
//!   --db-auth <URL>             Signed DB URL, used when no PSK is set
//!   --username <NAME>           Session owner
//!   --close-timeout-ms <MS>     Bound on each send and the close handshake [default: 500]
//!   --max-read-errors <N>       Consecutive stdin failures tolerated [default: 16]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable        | Flag          |
//! |-----------------|---------------|
//! | `BBS_ADDR`      | `--addr`      |
//! | `PSK`           | `--psk`       |
//! | `REPLIT_DB_URL` | `--db-auth`   |
//! | `REPL_OWNER`    | `--username`  |
//!
//! Logs go to stderr (level from `RUST_LOG`, default `info`) so that stdout
//! only ever carries what the server sent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ttyrelay::application::{run_relay, RelayParts};
use ttyrelay::domain::config::{endpoint_url, DEFAULT_ADDR, DEFAULT_PATH};
use ttyrelay::domain::{AuthConfig, RelayConfig};
use ttyrelay::infrastructure::ws_channel::{self, build_request};
use ttyrelay::infrastructure::{spawn_interrupt_listener, CrosstermTerminal, StdinInput};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Terminal relay for the BBS WebSocket server.
#[derive(Debug, Parser)]
#[command(
    name = "ttyrelay",
    about = "Attach the local terminal to a remote BBS session over WebSocket",
    version
)]
struct Cli {
    /// Host (optionally with `:port`) of the BBS server.
    #[arg(long, default_value = DEFAULT_ADDR, env = "BBS_ADDR")]
    addr: String,

    /// WebSocket endpoint path on the server.
    #[arg(long, default_value = DEFAULT_PATH)]
    path: String,

    /// Connect with `ws://` instead of `wss://`.
    #[arg(long)]
    plaintext: bool,

    /// Pre-shared key sent as `X-BBS-PSK`.
    #[arg(long, default_value = "", env = "PSK", hide_env_values = true)]
    psk: String,

    /// Signed database URL sent as `X-BBS-DBAuth` when no PSK is set.
    #[arg(long, default_value = "", env = "REPLIT_DB_URL", hide_env_values = true)]
    db_auth: String,

    /// Name sent as `X-BBS-Username`.
    #[arg(long, default_value = "", env = "REPL_OWNER")]
    username: String,

    /// Upper bound, in milliseconds, on each send to the server and on
    /// waiting for the server to finish the close handshake.
    #[arg(long, default_value_t = 500)]
    close_timeout_ms: u64,

    /// Consecutive stdin read failures after which input is treated as gone.
    #[arg(long, default_value_t = 16)]
    max_read_errors: u32,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--max-read-errors` is zero, or if the URL or a
    /// credential cannot be turned into a valid upgrade request.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        anyhow::ensure!(
            self.max_read_errors > 0,
            "--max-read-errors must be at least 1"
        );

        let config = RelayConfig {
            url: endpoint_url(&self.addr, &self.path, !self.plaintext),
            auth: AuthConfig {
                psk: self.psk,
                db_auth: self.db_auth,
                username: self.username,
            },
            close_timeout: Duration::from_millis(self.close_timeout_ms),
            max_read_errors: self.max_read_errors,
        };

        // Surface bad URLs and header values before dialing.
        build_request(&config).context("invalid connection settings")?;

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_relay_config()?;

    // Several rustls providers may be compiled in through dependencies; pick
    // ring explicitly.  Installing twice only fails if one is already set.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let (source, sink) = ws_channel::connect(&config).await?;
    let interrupts = spawn_interrupt_listener();
    let input = StdinInput::spawn().context("failed to start stdin reader")?;

    let parts = RelayParts {
        source,
        sink,
        input,
        output: tokio::io::stdout(),
        terminal: Arc::new(CrosstermTerminal),
        interrupts,
    };

    match run_relay(parts, &config).await {
        Ok(outcome) => {
            info!("session ended: {outcome:?}");
            Ok(())
        }
        Err(e) => {
            error!("session failed: {e}");
            Err(e.into())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
